//! Particle lifecycle — spawn, physics, retirement and the proximity pass.
//!
//! Each particle is born near the target point with a fixed velocity, then
//! fades (`life`) and shrinks (`size`) every tick until it is swept.  With
//! the default constants a particle lives 50 ticks, so the pool settles
//! around `spawn_per_tick × 50` members.

use std::f32::consts::TAU;
use std::ops::Range;

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

// ════════════════════════════════════════════════════════════════════════════
// Palette
// ════════════════════════════════════════════════════════════════════════════

/// Festive red / gold palette, packed ARGB.
pub const PALETTE: [u32; 6] = [
    0xFFE60000, // red
    0xFFFFD700, // gold
    0xFFFFFFFF, // white
    0xFFFF6B6B, // light red
    0xFFFFA500, // orange
    0xFFC9A961, // antique gold
];

// ════════════════════════════════════════════════════════════════════════════
// EngineConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Particles are born within this distance of the target.
    pub spawn_radius:   f32,
    pub spawn_per_tick: usize,
    /// Subtracted from `life` every tick.
    pub decay:          f32,
    /// Multiplied into `size` every tick.
    pub shrink:         f32,
    pub speed:          Range<f32>,
    pub size:           Range<f32>,
    /// Pairs closer than this are linked.
    pub link_distance:  f32,
    /// Link opacity at distance zero.
    pub link_opacity:   f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            spawn_radius:   30.0,
            spawn_per_tick: 3,
            decay:          0.02,
            shrink:         0.98,
            speed:          1.0..4.0,
            size:           2.0..6.0,
            link_distance:  80.0,
            link_opacity:   0.3,
        }
    }
}

impl EngineConfig {
    /// Expected number of ticks a particle stays alive.
    pub fn lifetime_ticks(&self) -> f32 {
        if self.decay > 0.0 { 1.0 / self.decay } else { f32::INFINITY }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Particle / Link
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Unique for the lifetime of the engine; never reused.
    pub id:    u64,
    pub pos:   Vec2,
    pub vel:   Vec2,
    pub life:  f32,
    pub size:  f32,
    pub color: u32,
}

/// A drawable connection between two live particles (indices into
/// [`ParticleEngine::particles`], valid until the next tick).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Link {
    pub a:        usize,
    pub b:        usize,
    pub distance: f32,
    pub opacity:  f32,
}

/// Opacity of a link between two particles `distance` apart.
///
/// `max` at distance zero, falling linearly to exactly `0.0` at
/// `threshold` and beyond.
pub fn link_opacity(distance: f32, threshold: f32, max: f32) -> f32 {
    if threshold <= 0.0 || !(distance < threshold) {
        return 0.0;
    }
    max * (1.0 - distance.max(0.0) / threshold).clamp(0.0, 1.0)
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleEngine
// ════════════════════════════════════════════════════════════════════════════

pub struct ParticleEngine {
    cfg:       EngineConfig,
    particles: Vec<Particle>,
    links:     Vec<Link>,
    next_id:   u64,
    rng:       SmallRng,
}

impl ParticleEngine {
    pub fn new(cfg: EngineConfig) -> Self {
        Self::with_rng(cfg, SmallRng::from_entropy())
    }

    /// Deterministic engine for reproducible runs and tests.
    pub fn seeded(cfg: EngineConfig, seed: u64) -> Self {
        Self::with_rng(cfg, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(cfg: EngineConfig, rng: SmallRng) -> Self {
        ParticleEngine {
            cfg,
            particles: Vec::new(),
            links:     Vec::new(),
            next_id:   0,
            rng,
        }
    }

    // ── Per-tick update ───────────────────────────────────────────────────

    /// Advance one frame around `target`: spawn, move, retire, link.
    pub fn tick(&mut self, target: Vec2) {
        self.spawn(target);
        self.advance();
        self.retire();
        self.link_pass();
    }

    fn spawn(&mut self, target: Vec2) {
        for _ in 0..self.cfg.spawn_per_tick {
            let offset = Vec2::from_angle(self.rng.gen_range(0.0..TAU))
                * sample(&mut self.rng, 0.0..self.cfg.spawn_radius);
            let vel = Vec2::from_angle(self.rng.gen_range(0.0..TAU))
                * sample(&mut self.rng, self.cfg.speed.clone());
            let size  = sample(&mut self.rng, self.cfg.size.clone());
            let color = PALETTE[self.rng.gen_range(0..PALETTE.len())];

            self.particles.push(Particle {
                id:   self.next_id,
                pos:  target + offset,
                vel,
                life: 1.0,
                size,
                color,
            });
            self.next_id += 1;
        }
    }

    fn advance(&mut self) {
        let (decay, shrink) = (self.cfg.decay, self.cfg.shrink);
        for p in &mut self.particles {
            p.pos  += p.vel;
            p.life -= decay;
            p.size *= shrink;
        }
    }

    fn retire(&mut self) {
        let before = self.particles.len();
        self.particles.retain(|p| p.life > 0.0);
        let retired = before - self.particles.len();
        if retired > 0 {
            tracing::trace!(retired, live = self.particles.len(), "particles retired");
        }
    }

    /// O(n²) over unordered pairs; fine for a pool of a few hundred.
    fn link_pass(&mut self) {
        self.links.clear();
        let (threshold, max) = (self.cfg.link_distance, self.cfg.link_opacity);
        for (i, p) in self.particles.iter().enumerate() {
            for (j, q) in self.particles.iter().enumerate().skip(i + 1) {
                let distance = p.pos.distance(q.pos);
                if distance < threshold {
                    self.links.push(Link {
                        a: i,
                        b: j,
                        distance,
                        opacity: link_opacity(distance, threshold, max),
                    });
                }
            }
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn particles(&self) -> &[Particle] { &self.particles }
    pub fn links(&self)     -> &[Link]     { &self.links }
    pub fn len(&self)       -> usize       { self.particles.len() }
    pub fn is_empty(&self)  -> bool        { self.particles.is_empty() }
}

/// Uniform sample from a half-open range; an empty range yields its start.
fn sample(rng: &mut SmallRng, range: Range<f32>) -> f32 {
    if range.start < range.end { rng.gen_range(range) } else { range.start }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
