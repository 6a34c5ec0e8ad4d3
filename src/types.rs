// Core types shared by the store, the compositor and the window.

use image::RgbaImage;
use std::fmt;
use std::sync::Arc;

/// The drawing surface is fixed for the whole session.
pub const SURFACE_WIDTH: u32 = 400;
pub const SURFACE_HEIGHT: u32 = 400;

/// Decoded sprite bitmap. Shared by every overlay placed from it; overlays never own it.
pub type Template = Arc<RgbaImage>;

/// Category of an overlay. Decides which sliders and which delete button affect it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    Fist,
    Laser,
}

impl OverlayKind {
    pub const ALL: [OverlayKind; 2] = [OverlayKind::Fist, OverlayKind::Laser];

    pub fn name(self) -> &'static str {
        match self {
            OverlayKind::Fist => "fist",
            OverlayKind::Laser => "laser",
        }
    }

    /// Dense index for per-kind tables (hues, sliders, templates).
    pub fn index(self) -> usize {
        match self {
            OverlayKind::Fist => 0,
            OverlayKind::Laser => 1,
        }
    }

    /// The other kind (Tab in the window cycles through them).
    pub fn next(self) -> OverlayKind {
        match self {
            OverlayKind::Fist => OverlayKind::Laser,
            OverlayKind::Laser => OverlayKind::Fist,
        }
    }
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle to one placed overlay. Allocated by the store, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayId(pub u64);

/// A point in surface coordinates.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// Flatten an RGBA surface onto a solid backdrop so minifb can show it.
    /// Transparent parts of the surface show `backdrop` (0x00RRGGBB).
    pub fn from_surface(surface: &RgbaImage, backdrop: u32) -> Self {
        let (w, h) = surface.dimensions();
        let br = (backdrop >> 16) & 0xFF;
        let bg = (backdrop >> 8) & 0xFF;
        let bb = backdrop & 0xFF;

        let mut pixels = Vec::with_capacity((w as usize) * (h as usize));
        for px in surface.pixels() {
            let [r, g, b, a] = px.0;
            let a = a as u32;
            let inv = 255 - a;
            let r = (r as u32 * a + br * inv + 127) / 255;
            let g = (g as u32 * a + bg * inv + 127) / 255;
            let b = (b as u32 * a + bb * inv + 127) / 255;
            pixels.push((r << 16) | (g << 8) | b);
        }

        FrameBuffer { width: w as usize, height: h as usize, pixels }
    }
}
