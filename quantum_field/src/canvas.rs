//! Software canvas — a persistent CPU framebuffer with alpha-blended
//! primitives.
//!
//! Pixels are packed `0xAARRGGBB` with the alpha byte always `0xFF`; every
//! primitive takes a straight colour plus a separate opacity in `[0, 1]` and
//! composites source-over.  The buffer is never cleared between frames
//! unless the caller asks for it, which is what makes trail effects work.

use glam::Vec2;

// ════════════════════════════════════════════════════════════════════════════
// Colour helpers
// ════════════════════════════════════════════════════════════════════════════

/// Pack an opaque colour.
pub const fn rgb(r: u8, g: u8, b: u8) -> u32 {
    0xFF000000 | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Alpha-blend two ARGB colours. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
pub fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t).round() as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}

/// One colour stop of a radial gradient.  `offset` runs 0 (centre) → 1 (rim).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color:  u32,
    pub alpha:  f32,
}

impl GradientStop {
    pub const fn new(offset: f32, color: u32, alpha: f32) -> Self {
        GradientStop { offset, color, alpha }
    }
}

/// Colour and alpha of `stops` at `t`.  Stops must be sorted by offset.
pub fn gradient_at(stops: &[GradientStop], t: f32) -> (u32, f32) {
    let Some(first) = stops.first() else { return (0xFF000000, 0.0) };
    if t <= first.offset {
        return (first.color, first.alpha);
    }
    for pair in stops.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if t <= hi.offset {
            let span = hi.offset - lo.offset;
            let f = if span > 0.0 { (t - lo.offset) / span } else { 1.0 };
            return lerp_premultiplied(lo, hi, f);
        }
    }
    let last = stops[stops.len() - 1];
    (last.color, last.alpha)
}

/// Interpolate two stops in premultiplied colour, so a fully transparent
/// stop fades the other stop's hue out instead of pulling it toward its own.
fn lerp_premultiplied(lo: GradientStop, hi: GradientStop, f: f32) -> (u32, f32) {
    let alpha = lo.alpha + (hi.alpha - lo.alpha) * f;
    if alpha <= 0.0 {
        return (hi.color, 0.0);
    }
    let channel = |shift: u32| {
        let a = ((lo.color >> shift) & 0xFF) as f32 * lo.alpha;
        let b = ((hi.color >> shift) & 0xFF) as f32 * hi.alpha;
        ((a + (b - a) * f) / alpha).round().clamp(0.0, 255.0) as u32
    };
    (0xFF000000 | channel(16) << 16 | channel(8) << 8 | channel(0), alpha)
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    width:      usize,
    height:     usize,
    buf:        Vec<u32>,
    background: u32,
}

impl Canvas {
    pub fn new(width: usize, height: usize, background: u32) -> Self {
        Canvas {
            width,
            height,
            buf: vec![background; width * height],
            background,
        }
    }

    pub fn width(&self)  -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn size(&self)   -> (usize, usize) { (self.width, self.height) }

    /// Raw pixels, row-major, ready for a window blit.
    pub fn pixels(&self) -> &[u32] { &self.buf }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height { Some(self.buf[y * self.width + x]) } else { None }
    }

    /// Match a new surface size.  The previous content cannot be carried
    /// over, so the buffer restarts from the background colour.
    /// Returns `true` if the size actually changed.
    pub fn resize(&mut self, width: usize, height: usize) -> bool {
        if (width, height) == (self.width, self.height) {
            return false;
        }
        self.width  = width;
        self.height = height;
        self.buf.clear();
        self.buf.resize(width * height, self.background);
        true
    }

    pub fn clear(&mut self) {
        self.buf.fill(self.background);
    }

    /// Composite `color` at `alpha` over every pixel.
    pub fn wash(&mut self, color: u32, alpha: f32) {
        for px in &mut self.buf {
            *px = blend(*px, color, alpha);
        }
    }

    pub fn blend_pixel(&mut self, x: isize, y: isize, color: u32, alpha: f32) {
        if x < 0 || y < 0 || alpha <= 0.0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x < self.width && y < self.height {
            let i = y * self.width + x;
            self.buf[i] = blend(self.buf[i], color, alpha);
        }
    }

    /// Anti-aliased filled disc.
    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: u32, alpha: f32) {
        self.shade(center, radius + 1.0, |d| {
            alpha * (radius + 0.5 - d).clamp(0.0, 1.0)
        }, |_| color);
    }

    /// Anti-aliased circle outline of the given stroke `width`.
    pub fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: u32, alpha: f32) {
        let half = width / 2.0;
        self.shade(center, radius + half + 1.0, |d| {
            alpha * (half + 0.5 - (d - radius).abs()).clamp(0.0, 1.0)
        }, |_| color);
    }

    /// 1-pixel line from `a` to `b`.
    pub fn line(&mut self, a: Vec2, b: Vec2, color: u32, alpha: f32) {
        let delta = b - a;
        let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let p = a + delta * (i as f32 / steps as f32);
            self.blend_pixel(p.x.round() as isize, p.y.round() as isize, color, alpha);
        }
    }

    /// Disc of `radius` filled from `stops` by normalised distance from
    /// the centre.
    pub fn radial_gradient(&mut self, center: Vec2, radius: f32, stops: &[GradientStop]) {
        if radius <= 0.0 {
            return;
        }
        self.shade(center, radius, |d| {
            if d > radius { 0.0 } else { gradient_at(stops, d / radius).1 }
        }, |d| gradient_at(stops, d / radius).0);
    }

    /// Soft shadow around a disc of `radius`: full `alpha` inside, a
    /// Gaussian fall-off of width `blur` outside.
    pub fn glow(&mut self, center: Vec2, radius: f32, blur: f32, color: u32, alpha: f32) {
        let sigma = (blur / 2.0).max(0.5);
        self.shade(center, radius + blur * 1.5, |d| {
            let out = (d - radius).max(0.0);
            alpha * (-(out * out) / (2.0 * sigma * sigma)).exp()
        }, |_| color);
    }

    /// Visit every pixel within `extent` of `center`, blending
    /// `color_at(d)` at `alpha_at(d)` where `d` is the distance from the
    /// pixel centre.
    fn shade(
        &mut self,
        center:   Vec2,
        extent:   f32,
        alpha_at: impl Fn(f32) -> f32,
        color_at: impl Fn(f32) -> u32,
    ) {
        if self.width == 0 || self.height == 0 || !(extent > 0.0) {
            return;
        }
        let x0 = (center.x - extent).floor().max(0.0) as usize;
        let y0 = (center.y - extent).floor().max(0.0) as usize;
        let x1 = ((center.x + extent).ceil().max(0.0) as usize).min(self.width);
        let y1 = ((center.y + extent).ceil().max(0.0) as usize).min(self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5).distance(center);
                let a = alpha_at(d);
                if a > 0.0 {
                    let i = y * self.width + x;
                    self.buf[i] = blend(self.buf[i], color_at(d), a);
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: u32 = rgb(0, 0, 0);
    const WHITE: u32 = rgb(255, 255, 255);

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(BLACK, WHITE, 0.0), BLACK);
        assert_eq!(blend(BLACK, WHITE, 1.0), WHITE);
        assert_eq!(blend(BLACK, WHITE, 0.5), rgb(128, 128, 128));
        assert_eq!(blend(0xFF102030, 0xFF102030, 0.37), 0xFF102030);
    }

    #[test]
    fn wash_fades_toward_color() {
        let mut c = Canvas::new(4, 4, WHITE);
        c.wash(BLACK, 0.1);
        let first = c.pixel(0, 0).unwrap() & 0xFF;
        assert!((229..=230).contains(&first));
        for _ in 0..100 { c.wash(BLACK, 0.1); }
        let p = c.pixel(3, 3).unwrap() & 0xFF;
        assert!(p < 10, "still bright: {}", p);
    }

    #[test]
    fn resize_reallocates_only_on_change() {
        let mut c = Canvas::new(10, 10, BLACK);
        assert!(!c.resize(10, 10));
        assert!(c.resize(20, 5));
        assert_eq!(c.size(), (20, 5));
        assert_eq!(c.pixels().len(), 100);
        assert_eq!(c.pixel(19, 4), Some(BLACK));
        assert_eq!(c.pixel(20, 0), None);
    }

    #[test]
    fn fill_circle_covers_center_not_corner() {
        let mut c = Canvas::new(21, 21, BLACK);
        c.fill_circle(Vec2::new(10.5, 10.5), 5.0, WHITE, 1.0);
        assert_eq!(c.pixel(10, 10), Some(WHITE));
        assert_eq!(c.pixel(0, 0), Some(BLACK));
    }

    #[test]
    fn stroke_circle_leaves_center_untouched() {
        let mut c = Canvas::new(41, 41, BLACK);
        c.stroke_circle(Vec2::new(20.5, 20.5), 10.0, 2.0, WHITE, 1.0);
        assert_eq!(c.pixel(20, 20), Some(BLACK));
        assert_eq!(c.pixel(30, 20), Some(WHITE));
    }

    #[test]
    fn line_draws_both_endpoints() {
        let mut c = Canvas::new(10, 10, BLACK);
        c.line(Vec2::new(1.0, 1.0), Vec2::new(8.0, 5.0), WHITE, 1.0);
        assert_eq!(c.pixel(1, 1), Some(WHITE));
        assert_eq!(c.pixel(8, 5), Some(WHITE));
    }

    #[test]
    fn primitives_clip_off_surface() {
        let mut c = Canvas::new(8, 8, BLACK);
        c.fill_circle(Vec2::new(-50.0, -50.0), 10.0, WHITE, 1.0);
        c.fill_circle(Vec2::new(4.0, 4.0), 100.0, WHITE, 1.0);
        c.line(Vec2::new(-20.0, 4.0), Vec2::new(30.0, 4.0), WHITE, 1.0);
        c.blend_pixel(-1, 3, WHITE, 1.0);
        assert!(c.pixels().iter().all(|&p| p == WHITE));
    }

    #[test]
    fn zero_sized_canvas_is_inert() {
        let mut c = Canvas::new(0, 0, BLACK);
        c.wash(WHITE, 0.5);
        c.fill_circle(Vec2::ZERO, 10.0, WHITE, 1.0);
        c.radial_gradient(Vec2::ZERO, 10.0, &[GradientStop::new(0.0, WHITE, 1.0)]);
        assert!(c.pixels().is_empty());
    }

    #[test]
    fn gradient_interpolates_between_stops() {
        let stops = [
            GradientStop::new(0.0, WHITE, 0.4),
            GradientStop::new(1.0, BLACK, 0.0),
        ];
        let (c, a) = gradient_at(&stops, 0.5);
        assert_eq!(c, WHITE);
        assert!((a - 0.2).abs() < 1e-6);
        assert_eq!(gradient_at(&stops, -1.0), (WHITE, 0.4));
        assert_eq!(gradient_at(&stops, 2.0), (BLACK, 0.0));
        assert_eq!(gradient_at(&[], 0.5).1, 0.0);
    }

    #[test]
    fn transparent_stop_keeps_the_hue_while_fading() {
        let red = rgb(230, 0, 0);
        let stops = [
            GradientStop::new(0.0, rgb(255, 215, 0), 0.3),
            GradientStop::new(0.5, red, 0.2),
            GradientStop::new(1.0, BLACK, 0.0),
        ];
        for t in [0.6, 0.75, 0.9, 0.99] {
            let (c, a) = gradient_at(&stops, t);
            assert_eq!(c, red, "hue drifted at t = {}", t);
            assert!(a > 0.0 && a < 0.2);
        }
        // Between two visible stops both colours still mix.
        let (mid, a) = gradient_at(&stops, 0.25);
        assert!((a - 0.25).abs() < 1e-6);
        assert!(mid != red && mid != rgb(255, 215, 0));
    }

    #[test]
    fn radial_gradient_brightest_at_center() {
        let mut c = Canvas::new(41, 41, BLACK);
        let stops = [
            GradientStop::new(0.0, WHITE, 1.0),
            GradientStop::new(1.0, WHITE, 0.0),
        ];
        c.radial_gradient(Vec2::new(20.5, 20.5), 20.0, &stops);
        let center = c.pixel(20, 20).unwrap() & 0xFF;
        let mid    = c.pixel(30, 20).unwrap() & 0xFF;
        let edge   = c.pixel(0, 0).unwrap() & 0xFF;
        assert!(center > mid && mid > edge);
        assert_eq!(edge, 0);
    }

    #[test]
    fn glow_falls_off_with_distance() {
        let mut c = Canvas::new(81, 81, BLACK);
        c.glow(Vec2::new(40.5, 40.5), 5.0, 20.0, WHITE, 1.0);
        let near = c.pixel(47, 40).unwrap() & 0xFF;
        let far  = c.pixel(65, 40).unwrap() & 0xFF;
        assert_eq!(c.pixel(40, 40), Some(WHITE));
        assert!(near > far);
    }
}
