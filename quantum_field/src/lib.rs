//! # quantum_field
//!
//! A particle field that follows one on-screen target point.  The point is
//! fed by two independent position streams (a hand tracker and a pointer)
//! and a reset signal; the field spawns, ages, links and draws particles
//! around it every frame.
//!
//! ## Pipeline
//!
//! ```text
//! Sample ──► InputFusion ──► TargetPoint ──► ParticleEngine ──► Renderer ──► Canvas
//!            (precedence)                    (spawn / physics /   (fixed z-order)
//!                                             retire / links)
//! ```
//!
//! [`Scene`] owns the fusion state and the particle pool; the [`Renderer`]
//! only borrows it.  Nothing in this crate blocks or spawns threads — the
//! host drives [`Scene::step`] and [`Renderer::draw`] once per frame.
//!
//! ## Precedence
//!
//! | Current source | Tracked sample | Manual sample | Reset |
//! |---|---|---|---|
//! | `Manual`  | applied → `Tracked` | applied | no-op |
//! | `Tracked` | applied | ignored | → `Manual` (position kept) |

pub mod canvas;
pub mod fusion;
pub mod particle;
pub mod render;
pub mod rings;
pub mod scene;

pub use canvas::Canvas;
pub use fusion::{InputFusion, Sample, Source, TargetPoint};
pub use particle::{EngineConfig, Link, Particle, ParticleEngine};
pub use render::{RenderStyle, Renderer};
pub use rings::RingConfig;
pub use scene::Scene;

pub use glam::Vec2;
