//! Background rings — concentric circles around the target point that
//! breathe on the wall clock, independent of the particle tick.

/// Side length (in surface units) at which the ring and halo constants are
/// used unscaled.
pub const REFERENCE_EXTENT: f32 = 800.0;

/// Scale factor for ring and halo geometry on a `width × height` surface.
///
/// Recomputed every frame from the live surface size.
pub fn viewport_basis(width: usize, height: usize) -> f32 {
    width.min(height) as f32 / REFERENCE_EXTENT
}

#[derive(Clone, Debug, PartialEq)]
pub struct RingConfig {
    pub count:     usize,
    pub base:      f32,
    pub step:      f32,
    pub amplitude: f32,
    /// Angular frequency in rad/s.
    pub omega:     f32,
    /// Alpha of the innermost ring; each further ring loses `alpha_step`.
    pub alpha:      f32,
    pub alpha_step: f32,
    pub width:      f32,
}

impl Default for RingConfig {
    fn default() -> Self {
        RingConfig {
            count:      3,
            base:       100.0,
            step:       50.0,
            amplitude:  30.0,
            omega:      2.0,
            alpha:      0.1,
            alpha_step: 0.03,
            width:      2.0,
        }
    }
}

impl RingConfig {
    /// Radius of ring `i` at `t` seconds: `base + i·step + amplitude·sin(ω·t + i)`,
    /// scaled by `basis`.
    pub fn radius(&self, i: usize, t: f32, basis: f32) -> f32 {
        let i_f = i as f32;
        let r = self.base + i_f * self.step + self.amplitude * (self.omega * t + i_f).sin();
        (r * basis).max(0.0)
    }

    pub fn radii(&self, t: f32, basis: f32) -> Vec<f32> {
        (0..self.count).map(|i| self.radius(i, t, basis)).collect()
    }

    pub fn alpha_of(&self, i: usize) -> f32 {
        (self.alpha - i as f32 * self.alpha_step).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn radii_at_time_zero() {
        let c = RingConfig::default();
        let r = c.radii(0.0, 1.0);
        assert_eq!(r.len(), 3);
        assert!((r[0] - 100.0).abs() < 1e-4);
        assert!((r[1] - (150.0 + 30.0 * 1.0f32.sin())).abs() < 1e-4);
        assert!((r[2] - (200.0 + 30.0 * 2.0f32.sin())).abs() < 1e-4);
    }

    #[test]
    fn innermost_ring_peaks_at_quarter_period() {
        let c = RingConfig::default();
        // ω·t = π/2
        let r = c.radius(0, FRAC_PI_2 / 2.0, 1.0);
        assert!((r - 130.0).abs() < 1e-3);
    }

    #[test]
    fn basis_scales_radii() {
        let c = RingConfig::default();
        let full = c.radius(1, 0.3, viewport_basis(1280, 800));
        let half = c.radius(1, 0.3, viewport_basis(640, 400));
        assert!((full - 2.0 * half).abs() < 1e-3);
    }

    #[test]
    fn default_window_basis_is_one() {
        assert_eq!(viewport_basis(1280, 800), 1.0);
        assert_eq!(viewport_basis(0, 800), 0.0);
    }

    #[test]
    fn ring_alphas_fade_outward() {
        let c = RingConfig::default();
        assert!((c.alpha_of(0) - 0.1).abs() < 1e-6);
        assert!((c.alpha_of(1) - 0.07).abs() < 1e-6);
        assert!((c.alpha_of(2) - 0.04).abs() < 1e-6);
        assert_eq!(c.alpha_of(10), 0.0);
    }
}
