//! Software window using `minifb`: presents the canvas and turns mouse and
//! keyboard state into [`InputEvent`]s.
//!
//! | Input | Event |
//! |---|---|
//! | mouse move | `Pointer { x, y }` (manual sample) |
//! | left click / `Space` | `Click` (reset to pointer) |
//! | `Esc` / `Q` | `Quit` |

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, ScaleMode, Window, WindowOptions};
use tracing::info;

use quantum_field::Canvas;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::input::{InputEvent, InputSender};

pub const TITLE: &str = "Quantum Hand";

// ════════════════════════════════════════════════════════════════════════════
// PointerState — edge detection, independent of the window backend
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct PointerState {
    last:     Option<(f32, f32)>,
    was_down: bool,
}

impl PointerState {
    /// Events for this frame's pointer reading: a move when the position
    /// changed, a click on the press edge only.
    pub fn update(&mut self, pos: Option<(f32, f32)>, down: bool) -> Vec<InputEvent> {
        let mut events = Vec::new();
        if let Some((x, y)) = pos {
            if self.last != Some((x, y)) {
                events.push(InputEvent::Pointer { x, y });
                self.last = Some((x, y));
            }
        }
        if down && !self.was_down {
            events.push(InputEvent::Click);
        }
        self.was_down = down;
        events
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Viewport
// ════════════════════════════════════════════════════════════════════════════

pub struct Viewport {
    window:  Window,
    pointer: PointerState,
    title:   String,
}

impl Viewport {
    pub fn open(cfg: &AppConfig) -> Result<Self, AppError> {
        let mut window = Window::new(
            TITLE,
            cfg.width, cfg.height,
            WindowOptions {
                resize:     true,
                scale_mode: ScaleMode::UpperLeft,
                ..WindowOptions::default()
            },
        )?;
        window.set_target_fps(cfg.fps);
        info!(width = cfg.width, height = cfg.height, fps = cfg.fps, "window opened");

        Ok(Viewport {
            window,
            pointer: PointerState::default(),
            title:   TITLE.to_string(),
        })
    }

    /// Current drawable size; re-read every frame.
    pub fn size(&self) -> (usize, usize) { self.window.get_size() }

    /// Translate this frame's mouse/keyboard state into input events.
    /// Returns false when the window has been closed.
    pub fn poll_input(&mut self, input: &InputSender) -> bool {
        if !self.window.is_open() { return false; }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        let quit  = one_shot(Key::Escape) || one_shot(Key::Q);
        let reset = one_shot(Key::Space);

        let pos  = self.window.get_mouse_pos(MouseMode::Discard);
        let down = self.window.get_mouse_down(MouseButton::Left);
        for event in self.pointer.update(pos, down) {
            input.offer(event);
        }
        if reset { input.offer(InputEvent::Click); }
        if quit  { input.offer(InputEvent::Quit); }

        true
    }

    pub fn present(&mut self, canvas: &Canvas) -> Result<(), AppError> {
        let (w, h) = canvas.size();
        if w == 0 || h == 0 {
            // Minimised: keep pumping events without a buffer.
            self.window.update();
            return Ok(());
        }
        self.window.update_with_buffer(canvas.pixels(), w, h)?;
        Ok(())
    }

    /// Show the session status in the title bar (only touched on change).
    pub fn set_status(&mut self, status: &str) {
        let title = format!("{} — {}", TITLE, status);
        if title != self.title {
            self.window.set_title(&title);
            self.title = title;
        }
    }
}
