// Built-in sprite templates + the registry that hands them to new overlays.
// Visual: without any asset files the editor still has a tan fist and a red laser beam.
// A configured PNG replaces the built-in once it finishes decoding.

use crate::types::{OverlayKind, Template};
use image::{Rgba, RgbaImage};
use std::sync::Arc;

const FIST_SIZE: (u32, u32) = (80, 80);
const LASER_SIZE: (u32, u32) = (160, 24);

/// Current template per kind.
pub struct TemplateRegistry {
    templates: [Template; 2],
}

impl TemplateRegistry {
    /// Start with the procedural sprites.
    pub fn new() -> Self {
        Self {
            templates: [
                Arc::new(default_template(OverlayKind::Fist)),
                Arc::new(default_template(OverlayKind::Laser)),
            ],
        }
    }

    /// Shared handle for placing a new overlay.
    pub fn get(&self, kind: OverlayKind) -> Template {
        Arc::clone(&self.templates[kind.index()])
    }

    /// Replace the template of `kind` (a decoded file arrived). Returns the new handle.
    pub fn set(&mut self, kind: OverlayKind, image: RgbaImage) -> Template {
        let template = Arc::new(image);
        self.templates[kind.index()] = Arc::clone(&template);
        template
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Render the built-in sprite for `kind`.
pub fn default_template(kind: OverlayKind) -> RgbaImage {
    match kind {
        OverlayKind::Fist => draw_fist(),
        OverlayKind::Laser => draw_laser(),
    }
}

/* ---------- tiny software painters (straight alpha, "over" onto the sprite) ---------- */

#[inline]
fn blend_pixel(img: &mut RgbaImage, x: i32, y: i32, color: [u8; 3], alpha: f32) {
    if x < 0 || y < 0 || x >= img.width() as i32 || y >= img.height() as i32 {
        return;
    }
    let a = alpha.clamp(0.0, 1.0);
    if a <= 0.0 {
        return;
    }
    let dst = img.get_pixel_mut(x as u32, y as u32);
    let da = dst.0[3] as f32 / 255.0;
    let out_a = a + da * (1.0 - a);
    let mut out = [0u8; 4];
    for c in 0..3 {
        let v = (color[c] as f32 * a + dst.0[c] as f32 * da * (1.0 - a)) / out_a;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    *dst = Rgba(out);
}

/// Filled ellipse with a 1px anti-aliased rim.
fn fill_ellipse(img: &mut RgbaImage, cx: f32, cy: f32, rx: f32, ry: f32, color: [u8; 3]) {
    let x0 = (cx - rx - 1.0).floor() as i32;
    let x1 = (cx + rx + 1.0).ceil() as i32;
    let y0 = (cy - ry - 1.0).floor() as i32;
    let y1 = (cy + ry + 1.0).ceil() as i32;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = (x as f32 + 0.5 - cx) / rx;
            let dy = (y as f32 + 0.5 - cy) / ry;
            let d = (dx * dx + dy * dy).sqrt();
            // distance outside the rim in roughly-pixel units
            let edge = (d - 1.0) * rx.min(ry);
            blend_pixel(img, x, y, color, 0.5 - edge);
        }
    }
}

fn fill_rect(img: &mut RgbaImage, x: i32, y: i32, w: i32, h: i32, color: [u8; 3]) {
    for yy in y..y + h {
        for xx in x..x + w {
            blend_pixel(img, xx, yy, color, 1.0);
        }
    }
}

fn draw_fist() -> RgbaImage {
    let (w, h) = FIST_SIZE;
    let mut img = RgbaImage::new(w, h);
    let outline = [92, 54, 30];
    let skin = [232, 176, 128];
    let shade = [204, 142, 98];

    // Palm block, drawn twice: dark outline then skin 2px inset
    fill_ellipse(&mut img, 40.0, 50.0, 30.0, 26.0, outline);
    fill_ellipse(&mut img, 40.0, 50.0, 28.0, 24.0, skin);

    // Four knuckles along the top
    for i in 0..4 {
        let cx = 17.0 + i as f32 * 15.5;
        fill_ellipse(&mut img, cx, 24.0, 9.0, 11.0, outline);
        fill_ellipse(&mut img, cx, 24.0, 7.0, 9.0, skin);
    }

    // Finger creases
    for i in 0..3 {
        let x = 24 + i * 15;
        fill_rect(&mut img, x, 26, 2, 16, shade);
    }

    // Thumb wrapped across the front
    fill_ellipse(&mut img, 36.0, 52.0, 20.0, 8.0, outline);
    fill_ellipse(&mut img, 36.0, 52.0, 18.0, 6.0, shade);

    // Wrist stub
    fill_rect(&mut img, 26, 70, 28, 10, outline);
    fill_rect(&mut img, 28, 70, 24, 10, skin);

    img
}

fn draw_laser() -> RgbaImage {
    let (w, h) = LASER_SIZE;
    let mut img = RgbaImage::new(w, h);
    let cy = h as f32 / 2.0;
    let sigma = h as f32 / 5.0;
    let denom = 2.0 * sigma * sigma;

    // Gaussian red glow across the beam; fades at both ends
    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let dy = y as f32 + 0.5 - cy;
            let glow = (-(dy * dy) / denom).exp();
            let t = (x as f32 + 0.5) / w as f32;
            let taper = (t * 8.0).min((1.0 - t) * 8.0).clamp(0.0, 1.0);
            blend_pixel(&mut img, x, y, [255, 30, 20], glow * taper);
        }
    }

    // Hot white core
    for x in 0..w as i32 {
        let t = (x as f32 + 0.5) / w as f32;
        let taper = (t * 8.0).min((1.0 - t) * 8.0).clamp(0.0, 1.0);
        blend_pixel(&mut img, x, cy as i32 - 1, [255, 240, 235], 0.9 * taper);
        blend_pixel(&mut img, x, cy as i32, [255, 255, 255], taper);
    }

    img
}
