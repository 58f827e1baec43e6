//! Per-frame renderer.
//!
//! Draw order (back to front):
//!
//! 1. dark wash over the previous frame — leaves fading trails
//! 2. breathing background rings
//! 3. proximity links
//! 4. particles
//! 5. radial halo at the target
//! 6. centre marker
//!
//! Surface width/height are read from the [`Canvas`] on every call; nothing
//! size-dependent is cached between frames.
//!
//! Ring and halo radii are multiplied by [`viewport_basis`], `min(w, h) / 800`,
//! so the rings and halo keep their share of the surface when the window is
//! resized.  At 1280×800 the basis is 1 and the halo is the nominal 80 units;
//! particle positions, sizes and the centre marker never scale.

use crate::canvas::{rgb, Canvas, GradientStop};
use crate::rings::{viewport_basis, RingConfig};
use crate::scene::Scene;

// ════════════════════════════════════════════════════════════════════════════
// Style constants
// ════════════════════════════════════════════════════════════════════════════

pub const BG_COLOR:   u32 = rgb(10, 20, 40);
pub const GOLD:       u32 = rgb(255, 215, 0);
pub const LANTERN:    u32 = rgb(230, 0, 0);

#[derive(Clone, Debug, PartialEq)]
pub struct RenderStyle {
    pub wash_color:    u32,
    /// Opacity of the per-frame wash; lower = longer trails.
    pub wash_alpha:    f32,
    pub rings:         RingConfig,
    pub ring_color:    u32,
    pub link_color:    u32,
    pub halo_radius:   f32,
    pub halo_stops:    Vec<GradientStop>,
    pub marker_radius: f32,
    pub marker_color:  u32,
    /// Blur extent of the marker glow, and its opacity at the disc edge.
    pub marker_glow:       f32,
    pub marker_glow_alpha: f32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        RenderStyle {
            wash_color:    BG_COLOR,
            wash_alpha:    0.1,
            rings:         RingConfig::default(),
            ring_color:    GOLD,
            link_color:    GOLD,
            halo_radius:   80.0,
            halo_stops:    vec![
                GradientStop::new(0.0, GOLD,    0.3),
                GradientStop::new(0.5, LANTERN, 0.2),
                GradientStop::new(1.0, rgb(0, 0, 0), 0.0),
            ],
            marker_radius: 15.0,
            marker_color:  GOLD,
            marker_glow:       20.0,
            marker_glow_alpha: 0.35,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Renderer
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct Renderer {
    style: RenderStyle,
}

impl Renderer {
    pub fn new(style: RenderStyle) -> Self {
        Renderer { style }
    }

    /// Draw one frame of `scene` onto `canvas`.  `elapsed` is wall-clock
    /// seconds since the session started and drives the ring oscillation.
    pub fn draw(&self, scene: &Scene, canvas: &mut Canvas, elapsed: f32) {
        let s = &self.style;
        let target = scene.target().position;
        let basis = viewport_basis(canvas.width(), canvas.height());

        // ── 1. Trail wash ─────────────────────────────────────────────────
        canvas.wash(s.wash_color, s.wash_alpha);

        // ── 2. Rings ──────────────────────────────────────────────────────
        for i in 0..s.rings.count {
            let r = s.rings.radius(i, elapsed, basis);
            canvas.stroke_circle(target, r, s.rings.width, s.ring_color, s.rings.alpha_of(i));
        }

        // ── 3. Links ──────────────────────────────────────────────────────
        let particles = scene.engine().particles();
        for link in scene.engine().links() {
            canvas.line(particles[link.a].pos, particles[link.b].pos, s.link_color, link.opacity);
        }

        // ── 4. Particles ──────────────────────────────────────────────────
        for p in particles {
            canvas.fill_circle(p.pos, p.size, p.color, p.life.clamp(0.0, 1.0));
        }

        // ── 5. Halo ───────────────────────────────────────────────────────
        canvas.radial_gradient(target, s.halo_radius * basis, &s.halo_stops);

        // ── 6. Centre marker ──────────────────────────────────────────────
        canvas.glow(target, s.marker_radius, s.marker_glow, s.marker_color, s.marker_glow_alpha);
        canvas.fill_circle(target, s.marker_radius, s.marker_color, 1.0);
    }

    /// Halo radius used on a `width × height` surface.
    pub fn halo_radius_for(&self, width: usize, height: usize) -> f32 {
        self.style.halo_radius * viewport_basis(width, height)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::Sample;
    use crate::particle::EngineConfig;

    fn scene_at(x: f32, y: f32) -> Scene {
        let mut scene = Scene::seeded(EngineConfig::default(), 200, 200, 3);
        scene.apply(Sample::Tracked { x, y });
        scene
    }

    #[test]
    fn marker_is_solid_gold() {
        let scene = scene_at(100.0, 100.0);
        let mut canvas = Canvas::new(200, 200, BG_COLOR);
        Renderer::default().draw(&scene, &mut canvas, 0.0);
        assert_eq!(canvas.pixel(100, 100), Some(GOLD));
    }

    #[test]
    fn far_corner_only_gets_the_wash() {
        let scene = scene_at(20.0, 20.0);
        let mut canvas = Canvas::new(400, 400, rgb(255, 255, 255));
        Renderer::default().draw(&scene, &mut canvas, 0.0);
        // Nothing but the wash reaches (399, 399) — rings top out near 300·0.5.
        let expected = crate::canvas::blend(rgb(255, 255, 255), BG_COLOR, 0.1);
        assert_eq!(canvas.pixel(399, 399), Some(expected));
    }

    #[test]
    fn particles_are_drawn() {
        let mut scene = scene_at(100.0, 100.0);
        for _ in 0..5 { scene.step(); }
        let mut canvas = Canvas::new(200, 200, BG_COLOR);
        Renderer::default().draw(&scene, &mut canvas, 0.0);
        let p = &scene.engine().particles()[0];
        let (x, y) = (p.pos.x as usize, p.pos.y as usize);
        assert_ne!(canvas.pixel(x, y), Some(BG_COLOR));
    }

    #[test]
    fn halo_radius_tracks_surface_size() {
        let r = Renderer::default();
        assert_eq!(r.halo_radius_for(1280, 800), 80.0);
        assert_eq!(r.halo_radius_for(640, 400), 40.0);
    }

    #[test]
    fn marker_glow_follows_style() {
        let scene = scene_at(100.0, 100.0);
        let dark = Renderer::new(RenderStyle { marker_glow_alpha: 0.0, ..RenderStyle::default() });
        let lit  = Renderer::default();
        let (mut a, mut b) = (Canvas::new(200, 200, BG_COLOR), Canvas::new(200, 200, BG_COLOR));
        dark.draw(&scene, &mut a, 0.0);
        lit.draw(&scene, &mut b, 0.0);
        // Just outside the disc, inside the glow.
        assert_ne!(a.pixel(118, 100), b.pixel(118, 100));
    }

    #[test]
    fn draw_survives_empty_surface() {
        let scene = scene_at(10.0, 10.0);
        let mut canvas = Canvas::new(0, 0, BG_COLOR);
        Renderer::default().draw(&scene, &mut canvas, 1.0);
        assert!(canvas.pixels().is_empty());
    }
}
