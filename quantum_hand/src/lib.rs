//! # quantum_hand
//!
//! Hand-tracked quantum particle field.  A hand tracker and the mouse both
//! steer one target point; a festive red-and-gold particle field follows it
//! in a software-rendered window.
//!
//! ## Input → action mapping
//!
//! | Input | Action |
//! |---|---|
//! | Hand detected | Target follows the palm (always wins) |
//! | Mouse move | Target follows the mouse — only while the mouse has control |
//! | Left click / `Space` | Give control back to the mouse until the next hand sample |
//! | `Esc` / `Q` | Quit |
//!
//! ## Trackers
//!
//! * `--tracker sim` (default) — **Simulation**: a scripted hand drifts in
//!   and out of view.
//! * `--tracker stdin` — **Landmark stream**: newline-delimited JSON hand
//!   landmarks from an external vision process, e.g.
//!   `python hands.py | quantum_hand --tracker stdin`.
//! * `--tracker leap` — **Hardware**: a LeapMotion controller via LeapC
//!   (build with `--features leap`).
//! * `--tracker none` — mouse only.
//!
//! If a tracker cannot start the window keeps running in mouse-only mode
//! and says so in its title bar.

pub mod config;
pub mod error;
pub mod input;
pub mod tracker;
pub mod window;
pub mod app;
