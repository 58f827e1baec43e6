//! The message boundary between input producers and the frame loop.
//!
//! Discrete events (pointer moves, clicks, quit, tracker status) travel
//! through a bounded `sync_channel`.  Palm positions don't: a tracker may
//! run far faster than the frame loop and only its newest position matters,
//! so it overwrites a single latest-value slot instead.  The session drains
//! both once at the start of every tick, so the scene only ever has one
//! writer and a busy tracker can never crowd a click or quit out of the
//! queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError, TrySendError};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::thread;
use std::time::Duration;

use crate::tracker::HandSample;

/// How long a tracker waits before retrying a full queue.
const RETRY_BACKOFF: Duration = Duration::from_millis(1);

// ════════════════════════════════════════════════════════════════════════════
// InputEvent
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    /// Palm position from the tracker, normalised to the surface.
    Hand(HandSample),

    /// Pointer moved, in surface coordinates.
    Pointer { x: f32, y: f32 },

    /// Pointer clicked; hand priority back to the pointer.
    Click,

    /// The tracker opened successfully.
    TrackingReady { tracker: &'static str },

    /// The tracker could not start (or failed mid-session); continue with
    /// the pointer only.
    TrackingUnavailable(String),

    /// The tracker's stream ended cleanly.
    TrackingEnded,

    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// Queue halves
// ════════════════════════════════════════════════════════════════════════════

type HandSlot = Mutex<Option<HandSample>>;

/// Create an input queue holding at most `capacity` pending discrete events
/// plus the latest palm position.
pub fn input_queue(capacity: usize) -> (InputSender, InputQueue) {
    let capacity = capacity.max(1);
    let (tx, rx) = mpsc::sync_channel(capacity);
    let hand = Arc::new(Mutex::new(None));
    let sender = InputSender { tx, hand: Arc::downgrade(&hand) };
    (sender, InputQueue { rx, hand, capacity })
}

/// Producer half.  Cheap to clone; one per producer.
#[derive(Clone, Debug)]
pub struct InputSender {
    tx:   SyncSender<InputEvent>,
    hand: Weak<HandSlot>,
}

impl InputSender {
    /// Non-blocking send for producers on the frame-loop thread.  A full
    /// queue drops the event and returns `false`.
    pub fn offer(&self, event: InputEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(ev)) => {
                tracing::trace!(?ev, "input queue full, event dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Send from a background producer, waiting for room rather than
    /// dropping.  Gives up only when `stop` is raised or the queue is gone.
    pub fn deliver(&self, mut event: InputEvent, stop: &AtomicBool) -> bool {
        loop {
            match self.tx.try_send(event) {
                Ok(()) => return true,
                Err(TrySendError::Disconnected(_)) => return false,
                Err(TrySendError::Full(ev)) => {
                    if stop.load(Ordering::Relaxed) {
                        return false;
                    }
                    event = ev;
                    thread::sleep(RETRY_BACKOFF);
                }
            }
        }
    }

    /// Replace the pending palm position.  Never blocks and never touches
    /// the event queue; returns `false` once the session is gone.
    pub fn publish_hand(&self, sample: HandSample) -> bool {
        let Some(slot) = self.hand.upgrade() else { return false };
        *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(sample);
        true
    }
}

/// Consumer half, owned by the session.
#[derive(Debug)]
pub struct InputQueue {
    rx:       Receiver<InputEvent>,
    hand:     Arc<HandSlot>,
    capacity: usize,
}

impl InputQueue {
    /// Take everything pending: the latest palm position first (if one
    /// arrived since the last drain), then at most one queue's worth of
    /// discrete events in send order.
    pub fn drain(&self) -> Vec<InputEvent> {
        let mut out = Vec::new();
        let latest = self.hand.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(sample) = latest {
            out.push(InputEvent::Hand(sample));
        }

        let mut taken = 0;
        while taken < self.capacity {
            match self.rx.try_recv() {
                Ok(ev) => { out.push(ev); taken += 1; }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        out
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
