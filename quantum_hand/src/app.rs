//! Top-level session: lifecycle, input draining and the frame loop.
//!
//! `Session` owns the `Scene`, the `Canvas`, the consumer half of the input
//! queue and the running tracker.  Each tick it matches the surface size,
//! applies every queued input event, steps the particle engine and draws.

use std::time::Instant;

use tracing::{debug, info, warn};

use quantum_field::{Canvas, Renderer, Sample, Scene, Source};
use quantum_field::render::BG_COLOR;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::input::{input_queue, InputEvent, InputQueue, InputSender};
use crate::tracker::{spawn_tracker, Tracker, TrackerHandle};
use crate::window::Viewport;

// ════════════════════════════════════════════════════════════════════════════
// Status
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState { Stopped, Running }

/// What the host shows about hand tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingStatus {
    /// Pointer-only by configuration.
    Disabled,
    /// Tracker thread spawned, waiting for the device / model.
    Loading(&'static str),
    Active(&'static str),
    /// Could not start or failed mid-session; pointer only from here on.
    Unavailable(String),
    /// The tracker's stream finished.
    Ended,
}

// ════════════════════════════════════════════════════════════════════════════
// Session
// ════════════════════════════════════════════════════════════════════════════

pub struct Session {
    scene:    Scene,
    renderer: Renderer,
    canvas:   Canvas,
    /// Last surface size with non-zero area; tracked samples project onto it.
    surface:  (usize, usize),

    // ── input ─────────────────────────────────────────────────────────────
    queue:    InputQueue,
    sender:   InputSender,
    tracker:  Option<TrackerHandle>,
    tracking: TrackingStatus,

    // ── lifecycle ─────────────────────────────────────────────────────────
    state:    RunState,
    started:  Instant,
    frames:   u64,
}

impl Session {
    pub fn new(cfg: &AppConfig, width: usize, height: usize) -> Self {
        let scene = match cfg.seed {
            Some(seed) => Scene::seeded(cfg.engine.clone(), width, height, seed),
            None       => Scene::new(cfg.engine.clone(), width, height),
        };
        let (sender, queue) = input_queue(cfg.queue_capacity);

        Session {
            scene,
            renderer: Renderer::new(cfg.style.clone()),
            canvas:   Canvas::new(width, height, BG_COLOR),
            surface:  (width, height),
            queue,
            sender,
            tracker:  None,
            tracking: TrackingStatus::Disabled,
            state:    RunState::Stopped,
            started:  Instant::now(),
            frames:   0,
        }
    }

    /// A producer handle for the window (or any other input source).
    pub fn sender(&self) -> InputSender { self.sender.clone() }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Begin running; `tracker`, if any, is spawned on its own thread.
    pub fn start(&mut self, tracker: Option<Box<dyn Tracker>>) {
        if self.state == RunState::Running {
            return;
        }
        self.state   = RunState::Running;
        self.started = Instant::now();
        self.canvas.clear();

        self.tracking = match tracker {
            Some(t) => {
                let handle = spawn_tracker(t, self.sender.clone());
                let name = handle.name();
                self.tracker = Some(handle);
                TrackingStatus::Loading(name)
            }
            None => TrackingStatus::Disabled,
        };
        info!(tracking = ?self.tracking, "session started");
    }

    /// Halt the frame loop and release the tracker.  Safe to call twice.
    pub fn stop(&mut self) {
        if let Some(mut handle) = self.tracker.take() {
            handle.stop();
        }
        if self.state == RunState::Running {
            self.state = RunState::Stopped;
            info!(frames = self.frames, "session stopped");
        }
    }

    pub fn is_running(&self) -> bool { self.state == RunState::Running }

    // ── Per-frame tick ────────────────────────────────────────────────────

    /// One frame at the current wall-clock time.
    pub fn tick(&mut self, size: (usize, usize)) {
        let elapsed = self.started.elapsed().as_secs_f32();
        self.tick_at(size, elapsed);
    }

    /// One frame on a `size` surface, `elapsed` seconds into the session.
    pub fn tick_at(&mut self, (width, height): (usize, usize), elapsed: f32) {
        if self.canvas.resize(width, height) {
            debug!(width, height, "surface resized");
        }
        if width > 0 && height > 0 {
            self.surface = (width, height);
        }

        self.drain_input();
        if !self.is_running() {
            return;
        }

        self.scene.step();
        self.renderer.draw(&self.scene, &mut self.canvas, elapsed);
        self.frames += 1;
    }

    fn drain_input(&mut self) {
        for event in self.queue.drain() {
            self.handle(event);
        }
    }

    fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::Hand(sample) => {
                // Minimised before any real size was seen: nowhere to project.
                let (w, h) = self.surface;
                if w > 0 && h > 0 {
                    let (x, y) = sample.project(w, h);
                    self.scene.apply(Sample::Tracked { x, y });
                }
            }
            InputEvent::Pointer { x, y } => self.scene.apply(Sample::Manual { x, y }),
            InputEvent::Click            => self.scene.apply(Sample::Reset),

            InputEvent::TrackingReady { tracker } => {
                self.tracking = TrackingStatus::Active(tracker);
            }
            InputEvent::TrackingUnavailable(reason) => {
                warn!(%reason, "continuing with pointer only");
                self.tracking = TrackingStatus::Unavailable(reason);
            }
            InputEvent::TrackingEnded => {
                self.tracking = TrackingStatus::Ended;
            }
            InputEvent::Quit => self.stop(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn scene(&self)    -> &Scene          { &self.scene }
    pub fn canvas(&self)   -> &Canvas         { &self.canvas }
    pub fn tracking(&self) -> &TrackingStatus { &self.tracking }
    pub fn frames(&self)   -> u64             { self.frames }

    /// One-line status for the title bar.
    pub fn status_line(&self) -> String {
        let tracking = match &self.tracking {
            TrackingStatus::Disabled       => "pointer only".to_string(),
            TrackingStatus::Loading(name)  => format!("loading {} tracker…", name),
            TrackingStatus::Active(name)   => format!("{} tracking", name),
            TrackingStatus::Unavailable(_) => "tracking unavailable, pointer only".to_string(),
            TrackingStatus::Ended          => "tracking ended, pointer only".to_string(),
        };
        let control = match self.scene.target().source {
            Source::Tracked => "hand in control (click for mouse)",
            Source::Manual  => "mouse in control",
        };
        format!("{} · {}", tracking, control)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// This is the entry point called from `main.rs`.  It opens the window,
/// starts the configured tracker, and drives the input/tick/render loop at
/// the configured frame rate until the window closes or `Esc` is pressed.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    let mut viewport = Viewport::open(&cfg)?;
    let (width, height) = viewport.size();

    let mut session = Session::new(&cfg, width, height);
    let input = session.sender();
    session.start(cfg.tracker.build(cfg.mirror));

    while session.is_running() {
        // 1. Window input → queue
        if !viewport.poll_input(&input) {
            break;
        }

        // 2. Drain queue, step, draw
        session.tick(viewport.size());

        // 3. Present
        viewport.set_status(&session.status_line());
        viewport.present(session.canvas())?;
    }

    session.stop();
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::tests::{FailingTracker, FastTracker, SteadyTracker};
    use crate::tracker::HandSample;
    use quantum_field::Vec2;
    use std::sync::atomic::Ordering;
    use std::thread;
    use std::time::Duration;

    fn make_session() -> Session {
        let cfg = AppConfig { seed: Some(11), ..AppConfig::default() };
        let mut s = Session::new(&cfg, 800, 600);
        s.start(None);
        s
    }

    fn tick_until<F: Fn(&Session) -> bool>(s: &mut Session, done: F) {
        for _ in 0..500 {
            s.tick_at((800, 600), 0.0);
            if done(s) { return; }
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn starts_pointer_only_at_center() {
        let s = make_session();
        assert!(s.is_running());
        assert_eq!(s.tracking(), &TrackingStatus::Disabled);
        assert_eq!(s.scene().target().position, Vec2::new(400.0, 300.0));
        assert_eq!(s.scene().target().source, Source::Manual);
    }

    #[test]
    fn hand_samples_are_projected_onto_the_surface() {
        let mut s = make_session();
        s.sender().offer(InputEvent::Hand(HandSample { x: 0.25, y: 0.5 }));
        s.tick_at((800, 600), 0.0);
        assert_eq!(s.scene().target().position, Vec2::new(200.0, 300.0));
        assert_eq!(s.scene().target().source, Source::Tracked);
    }

    #[test]
    fn queued_precedence_scenario() {
        let mut s = make_session();
        let tx = s.sender();
        let square = (800, 800);

        tx.offer(InputEvent::Hand(HandSample { x: 0.125, y: 0.125 })); // (100, 100)
        tx.offer(InputEvent::Pointer { x: 50.0, y: 50.0 });
        s.tick_at(square, 0.0);
        assert_eq!(s.scene().target().position, Vec2::new(100.0, 100.0));

        tx.offer(InputEvent::Click);
        tx.offer(InputEvent::Pointer { x: 50.0, y: 50.0 });
        s.tick_at(square, 0.0);
        assert_eq!(s.scene().target().position, Vec2::new(50.0, 50.0));
        assert_eq!(s.scene().target().source, Source::Manual);

        tx.offer(InputEvent::Hand(HandSample { x: 0.25, y: 0.25 })); // (200, 200)
        s.tick_at(square, 0.0);
        assert_eq!(s.scene().target().position, Vec2::new(200.0, 200.0));
        assert_eq!(s.scene().target().source, Source::Tracked);
    }

    #[test]
    fn minimised_surface_projects_onto_last_real_size() {
        let mut s = make_session();
        s.tick_at((800, 600), 0.0);
        s.sender().offer(InputEvent::Hand(HandSample { x: 0.5, y: 0.5 }));
        s.tick_at((0, 0), 0.0);
        assert_eq!(s.scene().target().position, Vec2::new(400.0, 300.0));
        assert_eq!(s.scene().target().source, Source::Tracked);

        s.sender().offer(InputEvent::Hand(HandSample { x: 0.25, y: 0.25 }));
        s.tick_at((0, 0), 0.0);
        assert_eq!(s.scene().target().position, Vec2::new(200.0, 150.0));
    }

    #[test]
    fn hand_sample_is_dropped_without_any_real_size() {
        let cfg = AppConfig { seed: Some(11), ..AppConfig::default() };
        let mut s = Session::new(&cfg, 0, 0);
        s.start(None);
        s.sender().offer(InputEvent::Hand(HandSample { x: 0.5, y: 0.5 }));
        s.tick_at((0, 0), 0.0);
        assert_eq!(s.scene().target().source, Source::Manual);
    }

    #[test]
    fn clicks_and_quit_get_through_a_flooding_tracker() {
        let cfg = AppConfig { seed: Some(11), queue_capacity: 8, ..AppConfig::default() };
        let mut s = Session::new(&cfg, 800, 600);
        s.start(Some(Box::new(FastTracker)));
        tick_until(&mut s, |s| s.scene().target().source == Source::Tracked);
        assert_eq!(s.tracking(), &TrackingStatus::Active("fast"));

        let tx = s.sender();
        for _ in 0..20 {
            thread::sleep(Duration::from_millis(1));
            assert!(tx.offer(InputEvent::Click));
            s.tick_at((800, 600), 0.0);
            // The click lands after this tick's hand sample.
            assert_eq!(s.scene().target().source, Source::Manual);
        }

        assert!(tx.offer(InputEvent::Quit));
        s.tick_at((800, 600), 0.0);
        assert!(!s.is_running());
    }

    #[test]
    fn tick_steps_engine_and_draws() {
        let mut s = make_session();
        for _ in 0..10 { s.tick_at((800, 600), 0.1); }
        assert_eq!(s.frames(), 10);
        assert_eq!(s.scene().engine().len(), 30);
        assert!(s.canvas().pixels().iter().any(|&p| p != BG_COLOR));
    }

    #[test]
    fn resize_keeps_particle_positions() {
        let mut s = make_session();
        for _ in 0..5 { s.tick_at((800, 600), 0.0); }
        let before: Vec<_> = s.scene().engine().particles().to_vec();

        s.tick_at((400, 300), 0.0);
        assert_eq!(s.canvas().size(), (400, 300));
        for old in &before {
            let now = s.scene().engine().particles().iter().find(|p| p.id == old.id).unwrap();
            assert!((now.pos - (old.pos + old.vel)).length() < 1e-4);
        }
    }

    #[test]
    fn quit_event_stops_the_session() {
        let mut s = make_session();
        s.tick_at((800, 600), 0.0);
        s.sender().offer(InputEvent::Quit);
        s.tick_at((800, 600), 0.0);
        assert!(!s.is_running());
        assert_eq!(s.frames(), 1);
    }

    #[test]
    fn unavailable_tracker_leaves_pointer_working() {
        let cfg = AppConfig::default();
        let mut s = Session::new(&cfg, 800, 600);
        s.start(Some(Box::new(FailingTracker)));
        assert_eq!(s.tracking(), &TrackingStatus::Loading("failing"));

        tick_until(&mut s, |s| matches!(s.tracking(), TrackingStatus::Unavailable(_)));
        assert!(matches!(s.tracking(), TrackingStatus::Unavailable(_)));
        assert!(s.is_running());
        assert!(s.status_line().contains("unavailable"));

        s.sender().offer(InputEvent::Pointer { x: 10.0, y: 20.0 });
        s.tick_at((800, 600), 0.0);
        assert_eq!(s.scene().target().position, Vec2::new(10.0, 20.0));
    }

    #[test]
    fn active_tracker_takes_control_and_stop_closes_it() {
        let cfg = AppConfig::default();
        let mut s = Session::new(&cfg, 800, 600);
        let tracker = SteadyTracker::new(0.5, 0.25);
        let closed = tracker.closed.clone();
        s.start(Some(Box::new(tracker)));

        tick_until(&mut s, |s| s.scene().target().source == Source::Tracked);
        assert_eq!(s.tracking(), &TrackingStatus::Active("steady"));
        assert_eq!(s.scene().target().position, Vec2::new(400.0, 150.0));

        s.stop();
        assert!(!s.is_running());
        assert!(closed.load(Ordering::Relaxed));
        // Idempotent.
        s.stop();
    }

    #[test]
    fn ticks_after_stop_do_nothing() {
        let mut s = make_session();
        s.stop();
        s.tick_at((800, 600), 0.0);
        assert_eq!(s.frames(), 0);
        assert!(s.scene().engine().is_empty());
    }
}
