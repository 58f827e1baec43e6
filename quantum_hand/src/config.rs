//! Command-line configuration.

use clap::{Parser, ValueEnum};

use quantum_field::{EngineConfig, RenderStyle};

use crate::tracker::{LandmarkStreamTracker, LeapTracker, SimTracker, Tracker};

// ════════════════════════════════════════════════════════════════════════════
// TrackerKind
// ════════════════════════════════════════════════════════════════════════════

/// Which hand-tracking collaborator feeds the tracked channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TrackerKind {
    /// Scripted hand that drifts in and out of view.
    Sim,
    /// Newline-delimited JSON landmark frames on stdin.
    Stdin,
    /// LeapMotion controller (needs `--features leap`).
    Leap,
    /// Pointer only.
    #[value(name = "none")]
    Off,
}

impl TrackerKind {
    pub fn build(self, mirror: bool) -> Option<Box<dyn Tracker>> {
        match self {
            TrackerKind::Sim   => Some(Box::new(SimTracker::new())),
            TrackerKind::Stdin => Some(Box::new(LandmarkStreamTracker::stdin(mirror))),
            TrackerKind::Leap  => Some(Box::new(LeapTracker::new())),
            TrackerKind::Off   => None,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Args
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Parser)]
#[command(name = "quantum_hand", version, about = "Hand-tracked quantum particle field")]
pub struct Args {
    /// Initial window width.
    #[arg(long, default_value_t = 1280)]
    pub width: usize,

    /// Initial window height.
    #[arg(long, default_value_t = 800)]
    pub height: usize,

    /// Target frame rate.
    #[arg(long, default_value_t = 60)]
    pub fps: usize,

    /// Hand-tracking source.
    #[arg(long, value_enum, default_value_t = TrackerKind::Sim)]
    pub tracker: TrackerKind,

    /// Don't mirror landmark x coordinates (use for rear-facing cameras).
    #[arg(long)]
    pub no_mirror: bool,

    /// Seed the particle RNG for a reproducible run.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Particles spawned per frame.
    #[arg(long, default_value_t = 3)]
    pub spawn_per_tick: usize,

    /// Maximum distance at which two particles are linked.
    #[arg(long, default_value_t = 80.0)]
    pub link_distance: f32,

    /// Pending input events held between frames.
    #[arg(long, default_value_t = 256)]
    pub queue_capacity: usize,
}

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub width:          usize,
    pub height:         usize,
    pub fps:            usize,
    pub tracker:        TrackerKind,
    /// Mirror landmark x so the effect follows the hand like a mirror.
    pub mirror:         bool,
    pub seed:           Option<u64>,
    pub engine:         EngineConfig,
    pub style:          RenderStyle,
    pub queue_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            width:          1280,
            height:         800,
            fps:            60,
            tracker:        TrackerKind::Sim,
            mirror:         true,
            seed:           None,
            engine:         EngineConfig::default(),
            style:          RenderStyle::default(),
            queue_capacity: 256,
        }
    }
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        let defaults = AppConfig::default();
        AppConfig {
            width:          args.width.max(1),
            height:         args.height.max(1),
            fps:            args.fps.clamp(1, 240),
            tracker:        args.tracker,
            mirror:         !args.no_mirror,
            seed:           args.seed,
            engine:         EngineConfig {
                spawn_per_tick: args.spawn_per_tick,
                link_distance:  args.link_distance.max(0.0),
                ..defaults.engine
            },
            style:          defaults.style,
            queue_capacity: args.queue_capacity.max(1),
        }
    }
}
