//! Input fusion — two position streams and a reset signal collapse into one
//! canonical [`TargetPoint`].
//!
//! Tracked samples always win.  Manual samples only land while the pointer
//! already owns the point, otherwise two independently clocked streams would
//! fight over it frame by frame.

use glam::Vec2;

// ════════════════════════════════════════════════════════════════════════════
// Source / TargetPoint
// ════════════════════════════════════════════════════════════════════════════

/// Which stream currently has write priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    /// The hand tracker wrote last; manual samples are suppressed.
    Tracked,
    /// The pointer owns the point.
    Manual,
}

/// The single authoritative coordinate driving spawn and rendering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetPoint {
    pub position: Vec2,
    pub source:   Source,
}

// ════════════════════════════════════════════════════════════════════════════
// Sample — the message carried by the host's input queue
// ════════════════════════════════════════════════════════════════════════════

/// One input message, already in render-surface coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sample {
    Tracked { x: f32, y: f32 },
    Manual  { x: f32, y: f32 },
    Reset,
}

// ════════════════════════════════════════════════════════════════════════════
// InputFusion
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct InputFusion {
    point: TargetPoint,
}

impl InputFusion {
    /// Start at `position` with the pointer in control.
    pub fn new(position: Vec2) -> Self {
        InputFusion {
            point: TargetPoint { position, source: Source::Manual },
        }
    }

    /// Start at the centre of a `width × height` surface.
    pub fn centered(width: usize, height: usize) -> Self {
        Self::new(Vec2::new(width as f32 / 2.0, height as f32 / 2.0))
    }

    pub fn target(&self) -> TargetPoint { self.point }

    pub fn position(&self) -> Vec2 { self.point.position }

    pub fn source(&self) -> Source { self.point.source }

    /// Overwrites the point and hands priority to the tracker, whatever the
    /// current source.
    pub fn on_tracked_sample(&mut self, x: f32, y: f32) {
        self.point = TargetPoint {
            position: Vec2::new(x, y),
            source:   Source::Tracked,
        };
    }

    /// Applied only while the pointer owns the point.  Returns `true` when
    /// the sample moved the point.
    pub fn on_manual_sample(&mut self, x: f32, y: f32) -> bool {
        if self.point.source != Source::Manual {
            return false;
        }
        self.point.position = Vec2::new(x, y);
        true
    }

    /// Hands priority back to the pointer without moving the point.
    pub fn on_reset_signal(&mut self) {
        self.point.source = Source::Manual;
    }

    pub fn apply(&mut self, sample: Sample) {
        match sample {
            Sample::Tracked { x, y } => self.on_tracked_sample(x, y),
            Sample::Manual  { x, y } => { self.on_manual_sample(x, y); }
            Sample::Reset            => self.on_reset_signal(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
