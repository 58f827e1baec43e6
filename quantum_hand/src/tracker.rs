//! Hand tracking collaborators — simulated, piped-in landmark stream, and
//! LeapMotion hardware.
//!
//! Every collaborator implements [`Tracker`] and runs on its own thread via
//! [`spawn_tracker`], publishing palm positions into the session's
//! latest-value hand slot at whatever cadence it detects hands.  Consumers
//! don't need to know where a sample came from.

use std::io::{self, BufRead, BufReader, Stdin};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::TrackerError;
use crate::input::{InputEvent, InputSender};

// ════════════════════════════════════════════════════════════════════════════
// HandSample
// ════════════════════════════════════════════════════════════════════════════

/// Palm position normalised to the render surface: (0, 0) top-left,
/// (1, 1) bottom-right, already mirrored if the source needs it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandSample {
    pub x: f32,
    pub y: f32,
}

impl HandSample {
    /// Surface coordinates on a `width × height` surface.
    pub fn project(self, width: usize, height: usize) -> (f32, f32) {
        (self.x * width as f32, self.y * height as f32)
    }
}

/// Result of one tracker poll.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Detection {
    Hand(HandSample),
    /// Nothing in view this round.
    NoHand,
    /// The source is exhausted; the tracker thread exits.
    Ended,
}

// ════════════════════════════════════════════════════════════════════════════
// Tracker trait
// ════════════════════════════════════════════════════════════════════════════

/// A hand-tracking collaborator.
///
/// `poll` may block, but should return within roughly one camera frame so
/// the thread notices a stop request promptly.
pub trait Tracker: Send + 'static {
    fn name(&self) -> &'static str;

    /// Acquire the device / model / stream.  An error here means tracking
    /// is unavailable for the whole session.
    fn open(&mut self) -> Result<(), TrackerError>;

    fn poll(&mut self) -> Result<Detection, TrackerError>;

    /// Release the device.  Called exactly once, on the tracker thread, as
    /// it exits after a successful `open`.
    fn close(&mut self) {}
}

// ════════════════════════════════════════════════════════════════════════════
// Spawn helper / handle
// ════════════════════════════════════════════════════════════════════════════

/// A running tracker thread.  Dropping the handle stops it.
pub struct TrackerHandle {
    name:   &'static str,
    stop:   Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

/// Spawn `tracker` on its own thread, feeding `input`.
pub fn spawn_tracker(tracker: Box<dyn Tracker>, input: InputSender) -> TrackerHandle {
    let name = tracker.name();
    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    let thread = thread::Builder::new()
        .name(format!("tracker-{}", name))
        .spawn(move || tracker_thread(tracker, input, flag));

    match thread {
        Ok(handle) => TrackerHandle { name, stop, thread: Some(handle) },
        Err(e) => {
            warn!(tracker = name, error = %e, "could not spawn tracker thread");
            TrackerHandle { name, stop, thread: None }
        }
    }
}

impl TrackerHandle {
    pub fn name(&self) -> &'static str { self.name }

    /// Ask the thread to finish and wait for it; the tracker's `close`
    /// hook has run by the time this returns.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                warn!(tracker = self.name, "tracker thread panicked");
            }
            debug!(tracker = self.name, "tracker stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for TrackerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn tracker_thread(mut tracker: Box<dyn Tracker>, input: InputSender, stop: Arc<AtomicBool>) {
    let name = tracker.name();

    if let Err(e) = tracker.open() {
        warn!(tracker = name, error = %e, "hand tracking unavailable, pointer only");
        input.deliver(InputEvent::TrackingUnavailable(e.to_string()), &stop);
        return;
    }
    info!(tracker = name, "hand tracking started");
    input.deliver(InputEvent::TrackingReady { tracker: name }, &stop);

    while !stop.load(Ordering::Relaxed) {
        match tracker.poll() {
            Ok(Detection::Hand(sample)) => {
                if !input.publish_hand(sample) { break; }
            }
            Ok(Detection::NoHand) => {}
            Ok(Detection::Ended) => {
                info!(tracker = name, "tracker stream ended");
                input.deliver(InputEvent::TrackingEnded, &stop);
                break;
            }
            Err(e) => {
                warn!(tracker = name, error = %e, "tracker failed, pointer only");
                input.deliver(InputEvent::TrackingUnavailable(e.to_string()), &stop);
                break;
            }
        }
    }

    tracker.close();
    debug!(tracker = name, "tracker closed");
}

// ════════════════════════════════════════════════════════════════════════════
// SimTracker — scripted hand (always available)
// ════════════════════════════════════════════════════════════════════════════

const SIM_FRAME:   Duration = Duration::from_millis(33);
/// Seconds per enter/leave cycle, and how long the hand is in view.
const SIM_CYCLE:   f32 = 10.0;
const SIM_VISIBLE: f32 = 6.0;

/// A hand that drifts along a Lissajous path at ~30 fps, in view for six
/// seconds out of every ten.  While it is away the pointer can take over
/// after a click.
#[derive(Debug, Default)]
pub struct SimTracker {
    started: Option<Instant>,
}

impl SimTracker {
    pub fn new() -> Self { Self::default() }
}

/// Whether the simulated hand is in view `t` seconds after start.
pub fn sim_visible(t: f32) -> bool {
    t.rem_euclid(SIM_CYCLE) < SIM_VISIBLE
}

/// Simulated palm position `t` seconds after start.
pub fn sim_position(t: f32) -> HandSample {
    HandSample {
        x: 0.5 + 0.35 * (0.7 * t).sin(),
        y: 0.5 + 0.30 * (1.1 * t).sin(),
    }
}

impl Tracker for SimTracker {
    fn name(&self) -> &'static str { "sim" }

    fn open(&mut self) -> Result<(), TrackerError> {
        self.started = Some(Instant::now());
        Ok(())
    }

    fn poll(&mut self) -> Result<Detection, TrackerError> {
        thread::sleep(SIM_FRAME);
        let t = self.started.map_or(0.0, |s| s.elapsed().as_secs_f32());
        Ok(if sim_visible(t) { Detection::Hand(sim_position(t)) } else { Detection::NoHand })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkStreamTracker — JSON landmark frames from an external vision process
// ════════════════════════════════════════════════════════════════════════════

/// Landmark indices used for the palm point.
const WRIST:      usize = 0;
const MIDDLE_MCP: usize = 9;

/// How long one poll waits for a line before reporting `NoHand`.
const STREAM_POLL: Duration = Duration::from_millis(50);

/// One hand landmark in normalised camera coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

/// A detection result as emitted by a MediaPipe-Hands style pipeline.
#[derive(Debug, Deserialize)]
struct LandmarkFrame {
    #[serde(rename = "multiHandLandmarks", alias = "hands", default)]
    hands: Vec<Vec<Landmark>>,
}

/// Palm centre: the mean of the wrist and the middle-finger MCP joint.
pub fn palm_center(landmarks: &[Landmark]) -> Option<(f32, f32)> {
    let wrist = landmarks.get(WRIST)?;
    let mcp   = landmarks.get(MIDDLE_MCP)?;
    Some(((wrist.x + mcp.x) / 2.0, (wrist.y + mcp.y) / 2.0))
}

/// Parse one JSON line into the first hand's palm position.
/// `mirror` flips x for a selfie-facing camera.
pub fn parse_frame(line: &str, mirror: bool) -> Result<Option<HandSample>, TrackerError> {
    let frame: LandmarkFrame = serde_json::from_str(line)?;
    let Some(hand) = frame.hands.first() else { return Ok(None) };
    let (x, y) = palm_center(hand).ok_or_else(|| {
        TrackerError::Malformed(format!("expected at least {} landmarks, got {}", MIDDLE_MCP + 1, hand.len()))
    })?;
    Ok(Some(HandSample { x: if mirror { 1.0 - x } else { x }, y }))
}

/// Reads newline-delimited landmark frames from any reader (stdin in
/// production).  A background reader thread forwards lines so `poll` never
/// blocks longer than [`STREAM_POLL`].
pub struct LandmarkStreamTracker<R> {
    reader: Option<R>,
    lines:  Option<Receiver<io::Result<String>>>,
    mirror: bool,
}

impl<R: BufRead + Send + 'static> LandmarkStreamTracker<R> {
    pub fn new(reader: R, mirror: bool) -> Self {
        LandmarkStreamTracker { reader: Some(reader), lines: None, mirror }
    }
}

impl LandmarkStreamTracker<BufReader<Stdin>> {
    pub fn stdin(mirror: bool) -> Self {
        Self::new(BufReader::new(io::stdin()), mirror)
    }
}

impl<R: BufRead + Send + 'static> Tracker for LandmarkStreamTracker<R> {
    fn name(&self) -> &'static str { "landmarks" }

    fn open(&mut self) -> Result<(), TrackerError> {
        let reader = self.reader.take()
            .ok_or_else(|| TrackerError::Unavailable("landmark stream already consumed".into()))?;
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("landmark-reader".into())
            .spawn(move || {
                for line in reader.lines() {
                    let failed = line.is_err();
                    if tx.send(line).is_err() || failed { break; }
                }
            })?;
        self.lines = Some(rx);
        Ok(())
    }

    fn poll(&mut self) -> Result<Detection, TrackerError> {
        let Some(lines) = self.lines.as_ref() else { return Ok(Detection::Ended) };
        match lines.recv_timeout(STREAM_POLL) {
            Ok(Ok(line)) => {
                if line.trim().is_empty() {
                    return Ok(Detection::NoHand);
                }
                match parse_frame(&line, self.mirror) {
                    Ok(Some(sample)) => Ok(Detection::Hand(sample)),
                    Ok(None)         => Ok(Detection::NoHand),
                    Err(e) => {
                        warn!(error = %e, "skipping landmark frame");
                        Ok(Detection::NoHand)
                    }
                }
            }
            Ok(Err(e))                          => Err(TrackerError::Io(e)),
            Err(RecvTimeoutError::Timeout)      => Ok(Detection::NoHand),
            Err(RecvTimeoutError::Disconnected) => Ok(Detection::Ended),
        }
    }

    fn close(&mut self) {
        // The reader thread may stay parked on a blocking read; with the
        // receiver gone it exits on its next line.
        self.lines = None;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapTracker — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Interaction volume (mm) mapped onto the surface: x across, y (height
/// above the device) down the screen.
const LEAP_X_RANGE: (f32, f32) = (-200.0, 200.0);
const LEAP_Y_RANGE: (f32, f32) = (100.0, 400.0);

/// Map a LeapMotion palm position (mm) to a normalised sample.  Higher
/// hands land nearer the top of the screen.
pub fn leap_to_sample(x_mm: f32, y_mm: f32) -> HandSample {
    let nx = (x_mm - LEAP_X_RANGE.0) / (LEAP_X_RANGE.1 - LEAP_X_RANGE.0);
    let ny = (y_mm - LEAP_Y_RANGE.0) / (LEAP_Y_RANGE.1 - LEAP_Y_RANGE.0);
    HandSample { x: nx.clamp(0.0, 1.0), y: 1.0 - ny.clamp(0.0, 1.0) }
}

/// Hand source backed by a LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed;
/// without the feature, `open` reports tracking as unavailable.  The LeapC
/// connection lives on its own polling thread and palm samples are
/// forwarded over a channel.
#[cfg(feature = "leap")]
#[derive(Default)]
pub struct LeapTracker {
    samples: Option<Receiver<HandSample>>,
    stop:    Arc<AtomicBool>,
    thread:  Option<JoinHandle<()>>,
}

#[cfg(not(feature = "leap"))]
#[derive(Default)]
pub struct LeapTracker;

impl LeapTracker {
    pub fn new() -> Self { Self::default() }
}

#[cfg(feature = "leap")]
impl Tracker for LeapTracker {
    fn name(&self) -> &'static str { "leap" }

    fn open(&mut self) -> Result<(), TrackerError> {
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();
        let (sample_tx, sample_rx) = mpsc::channel();
        let stop = self.stop.clone();

        let thread = thread::Builder::new()
            .name("leap-poll".into())
            .spawn(move || {
                use leaprs::*;

                let mut connection = match Connection::create(ConnectionConfig::default()) {
                    Ok(c)  => c,
                    Err(e) => { let _ = ready_tx.send(Err(format!("LeapC connection: {:?}", e))); return; }
                };
                if let Err(e) = connection.open() {
                    let _ = ready_tx.send(Err(format!("LeapMotion device: {:?}", e)));
                    return;
                }
                let _ = ready_tx.send(Ok(()));

                while !stop.load(Ordering::Relaxed) {
                    let msg = match connection.poll(100) {
                        Ok(m)  => m,
                        Err(_) => continue,
                    };
                    if let Event::Tracking(frame) = msg.event() {
                        if let Some(hand) = frame.hands().next() {
                            let palm = hand.palm().position();
                            if sample_tx.send(leap_to_sample(palm.x, palm.y)).is_err() { return; }
                        }
                    }
                }
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.samples = Some(sample_rx);
                self.thread  = Some(thread);
                Ok(())
            }
            Ok(Err(reason)) => Err(TrackerError::Unavailable(reason)),
            Err(_) => Err(TrackerError::Unavailable("LeapC polling thread exited".into())),
        }
    }

    fn poll(&mut self) -> Result<Detection, TrackerError> {
        let Some(samples) = self.samples.as_ref() else { return Ok(Detection::Ended) };
        match samples.recv_timeout(Duration::from_millis(100)) {
            Ok(sample) => {
                // Only the freshest palm position matters.
                let latest = samples.try_iter().last().unwrap_or(sample);
                Ok(Detection::Hand(latest))
            }
            Err(RecvTimeoutError::Timeout)      => Ok(Detection::NoHand),
            Err(RecvTimeoutError::Disconnected) => Ok(Detection::Ended),
        }
    }

    fn close(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        self.samples = None;
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(not(feature = "leap"))]
impl Tracker for LeapTracker {
    fn name(&self) -> &'static str { "leap" }

    fn open(&mut self) -> Result<(), TrackerError> {
        Err(TrackerError::Unavailable(
            "built without the `leap` feature (cargo run --features leap)".into(),
        ))
    }

    fn poll(&mut self) -> Result<Detection, TrackerError> {
        Ok(Detection::Ended)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
