// Window + software HUD drawing.
// Visual effects provided here:
// 1) A window that shows the composed meme (photo + sprites).
// 2) Keyboard/mouse input turned into editor actions.
// 3) A tiny 5x7 bitmap font for the HUD lines on top of the picture.

use crate::controls::{Action, Axis};
use crate::error::Error;
use crate::types::{FrameBuffer, OverlayKind};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use std::path::PathBuf;

pub struct Drawer {
    window: Window,                   // the on-screen window you see
    was_down: bool,                   // left button state last frame
    last_pointer: Option<(f32, f32)>, // where the last PointerDown/Move was sent
}

impl Drawer {
    /// Create a window the size of the drawing surface.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window, was_down: false, last_pointer: None })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// True while ESC is held down (we'll exit when this is pressed).
    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Everything the user did since the last frame, in a stable order:
    /// buttons, sliders, wheel, then pointer.
    pub fn actions(&mut self) -> Vec<Action> {
        let mut out = Vec::new();

        // Buttons fire once per press
        let buttons = [
            (Key::F, Action::Add(OverlayKind::Fist)),
            (Key::L, Action::Add(OverlayKind::Laser)),
            (Key::Tab, Action::SwitchKind),
            (Key::Delete, Action::DeleteActive),
            (Key::R, Action::Reset),
            (Key::P, Action::Export),
        ];
        for (key, action) in buttons {
            if self.window.is_key_pressed(key, KeyRepeat::No) {
                out.push(action);
            }
        }
        if self.window.is_key_pressed(Key::O, KeyRepeat::No) {
            out.push(Action::Upload(pick_background()));
        }

        // Sliders repeat while held
        let sliders = [
            (Key::Up, Axis::Scale, 1.0),
            (Key::Down, Axis::Scale, -1.0),
            (Key::Right, Axis::Rotation, 1.0),
            (Key::Left, Axis::Rotation, -1.0),
            (Key::PageUp, Axis::Hue, 1.0),
            (Key::PageDown, Axis::Hue, -1.0),
        ];
        for (key, axis, dir) in sliders {
            if self.window.is_key_pressed(key, KeyRepeat::Yes) {
                out.push(Action::Step(axis, dir));
            }
        }

        if let Some((_, dy)) = self.window.get_scroll_wheel() {
            if dy != 0.0 {
                out.push(Action::Wheel(dy.signum()));
            }
        }

        // Pointer: press inside the window grabs, held button drags, release drops
        let down = self.window.get_mouse_down(MouseButton::Left);
        if down && !self.was_down {
            if let Some((x, y)) = self.window.get_mouse_pos(MouseMode::Discard) {
                out.push(Action::PointerDown(x, y));
                self.last_pointer = Some((x, y));
            }
        } else if down {
            if let Some(pos) = self.window.get_mouse_pos(MouseMode::Clamp) {
                if self.last_pointer != Some(pos) {
                    out.push(Action::PointerMove(pos.0, pos.1));
                    self.last_pointer = Some(pos);
                }
            }
        } else if self.was_down {
            out.push(Action::PointerUp);
            self.last_pointer = None;
        }
        self.was_down = down;

        out
    }
}

/// Native "open file" dialog for the background photo. `None` if the user cancelled.
pub fn pick_background() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("Images", &["png", "jpg", "jpeg", "gif", "bmp", "webp"])
        .add_filter("All Files", &["*"])
        .pick_file()
}

/* ---------- Software drawing: pixels, HUD panel, tiny bitmap font ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Darken a horizontal strip so HUD text stays readable on bright photos.
fn shade_strip(fb: &mut FrameBuffer, y: i32, h: i32) {
    for yy in y.max(0)..(y + h).min(fb.height as i32) {
        let row = yy as usize * fb.width;
        for px in &mut fb.pixels[row..row + fb.width] {
            // halve each channel
            *px = (*px >> 1) & 0x00_7F_7F_7F;
        }
    }
}

/// Draw HUD lines: `top` from the top edge down, `bottom` up from the bottom edge.
pub fn draw_hud(fb: &mut FrameBuffer, top: &[String], bottom: &[String]) {
    const LINE: i32 = 10;
    if !top.is_empty() {
        shade_strip(fb, 0, 4 + LINE * top.len() as i32);
        for (i, line) in top.iter().enumerate() {
            draw_text_5x7(fb, 4, 3 + LINE * i as i32, line, 0x00_FF_FF_FF);
        }
    }
    if !bottom.is_empty() {
        let y0 = fb.height as i32 - 4 - LINE * bottom.len() as i32;
        shade_strip(fb, y0, fb.height as i32 - y0);
        for (i, line) in bottom.iter().enumerate() {
            draw_text_5x7(fb, 4, y0 + 3 + LINE * i as i32, line, 0x00_FF_CC_33);
        }
    }
}

/* ---------- 5x7 bitmap font (uppercase ASCII, digits, a little punctuation) ---------- */

/// Return a 5x7 glyph bitmap. Lowercase is drawn as uppercase.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        '/' => g!(0b00001,0b00010,0b00010,0b00100,0b01000,0b01000,0b10000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        '_' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b11111),
        '+' => g!(0b00000,0b00100,0b00100,0b11111,0b00100,0b00100,0b00000),
        '(' => g!(0b00010,0b00100,0b01000,0b01000,0b01000,0b00100,0b00010),
        ')' => g!(0b01000,0b00100,0b00010,0b00010,0b00010,0b00100,0b01000),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y) with a 1-pixel black shadow for contrast.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    if let Some(rows) = glyph5x7(ch) {
        for (shadow, c) in [(1, 0x00000000), (0, color)] {
            for (ry, rowbits) in rows.iter().enumerate() {
                for rx in 0..5 {
                    if (rowbits & (1 << (4 - rx))) != 0 {
                        put_pixel(fb, x + rx + shadow, y + ry as i32 + shadow, c);
                    }
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += 6; // 5 pixels glyph width + 1 pixel spacing
    }
}
