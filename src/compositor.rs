// Frame composition: background photo + overlays, in insertion order.
//
// Every frame is rebuilt from scratch:
// 1. clear to transparent
// 2. stretch the background (if any) over the whole surface
// 3. for each overlay: rotate/scale about its center, hue-rotate, draw "over"
//
// Resampling is inverse-mapped bilinear with premultiplied accumulation, so
// sprite edges fade to transparent instead of dark fringes. The routine is
// a pure function of its inputs; rendering twice gives identical bytes.

use crate::gamma::GammaLut;
use crate::hue::HueFilter;
use crate::overlay::Overlay;
use crate::store::OverlayStore;
use crate::types::{OverlayKind, Vec2};
use image::{Rgba, RgbaImage};

pub struct Compositor {
    lut: GammaLut,
}

impl Compositor {
    pub fn new() -> Self {
        Self { lut: GammaLut::new() }
    }

    pub fn render(&self, surface: &mut RgbaImage, background: Option<&RgbaImage>, store: &OverlayStore) {
        // 1) Clear
        for px in surface.pixels_mut() {
            *px = Rgba([0, 0, 0, 0]);
        }

        // 2) Background, stretched; never rotated, scaled about or hue-shifted
        if let Some(bg) = background {
            draw_stretched(surface, bg);
        }

        // 3) Overlays bottom to top
        let filters = OverlayKind::ALL.map(|kind| HueFilter::new(store.hue(kind)));
        for overlay in store.overlays() {
            self.draw_overlay(surface, overlay, &filters[overlay.kind.index()]);
        }
    }

    fn draw_overlay(&self, surface: &mut RgbaImage, o: &Overlay, filter: &HueFilter) {
        let (nw, nh) = o.natural_size();
        if nw == 0.0 || nh == 0.0 || o.scale <= 0.0 {
            return;
        }

        // Only scan pixels the rotated box can touch
        let b = o.bounds();
        let x0 = b.min.x.floor().max(0.0) as u32;
        let y0 = b.min.y.floor().max(0.0) as u32;
        let x1 = (b.max.x.ceil().max(0.0) as u32).min(surface.width());
        let y1 = (b.max.y.ceil().max(0.0) as u32).min(surface.height());

        for y in y0..y1 {
            for x in x0..x1 {
                // Pixel center -> sprite-local (unrotated, unscaled) -> template texel space
                let local = o.to_local(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                let u = local.x / o.scale + nw / 2.0;
                let v = local.y / o.scale + nh / 2.0;
                if u < -0.5 || v < -0.5 || u > nw + 0.5 || v > nh + 0.5 {
                    continue;
                }

                let src = sample_bilinear(&o.template, u, v);
                if src[3] == 0 {
                    continue;
                }
                let [r, g, b] = filter.apply([src[0], src[1], src[2]], &self.lut);
                blend_over(surface.get_pixel_mut(x, y), [r, g, b, src[3]]);
            }
        }
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

/// Stretch `bg` across the whole surface, replacing what is there.
fn draw_stretched(surface: &mut RgbaImage, bg: &RgbaImage) {
    let (sw, sh) = surface.dimensions();
    let (bw, bh) = bg.dimensions();
    if bw == 0 || bh == 0 {
        return;
    }
    let fx = bw as f32 / sw as f32;
    let fy = bh as f32 / sh as f32;

    for y in 0..sh {
        for x in 0..sw {
            let u = (x as f32 + 0.5) * fx;
            let v = (y as f32 + 0.5) * fy;
            let px = sample_bilinear_clamped(bg, u, v);
            surface.put_pixel(x, y, Rgba(px));
        }
    }
}

/// Bilinear sample at texel-space (u, v); outside the image counts as transparent.
fn sample_bilinear(img: &RgbaImage, u: f32, v: f32) -> [u8; 4] {
    sample(img, u, v, |img, x, y| {
        if x < 0 || y < 0 || x >= img.width() as i32 || y >= img.height() as i32 {
            [0, 0, 0, 0]
        } else {
            img.get_pixel(x as u32, y as u32).0
        }
    })
}

/// Bilinear sample with edge texels repeated (used for the stretched background).
fn sample_bilinear_clamped(img: &RgbaImage, u: f32, v: f32) -> [u8; 4] {
    sample(img, u, v, |img, x, y| {
        let x = x.clamp(0, img.width() as i32 - 1) as u32;
        let y = y.clamp(0, img.height() as i32 - 1) as u32;
        img.get_pixel(x, y).0
    })
}

#[inline]
fn sample(img: &RgbaImage, u: f32, v: f32, fetch: impl Fn(&RgbaImage, i32, i32) -> [u8; 4]) -> [u8; 4] {
    // Texel centers sit at +0.5
    let fx = u - 0.5;
    let fy = v - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;
    let (x0, y0) = (x0 as i32, y0 as i32);

    let taps = [
        (fetch(img, x0, y0), (1.0 - tx) * (1.0 - ty)),
        (fetch(img, x0 + 1, y0), tx * (1.0 - ty)),
        (fetch(img, x0, y0 + 1), (1.0 - tx) * ty),
        (fetch(img, x0 + 1, y0 + 1), tx * ty),
    ];

    // Premultiply while accumulating so transparent texels carry no colour
    let mut acc = [0.0f32; 4];
    for (px, w) in taps {
        let a = px[3] as f32 * w;
        acc[0] += px[0] as f32 * a;
        acc[1] += px[1] as f32 * a;
        acc[2] += px[2] as f32 * a;
        acc[3] += a;
    }
    if acc[3] <= 0.0 {
        return [0, 0, 0, 0];
    }
    [
        (acc[0] / acc[3]).round().clamp(0.0, 255.0) as u8,
        (acc[1] / acc[3]).round().clamp(0.0, 255.0) as u8,
        (acc[2] / acc[3]).round().clamp(0.0, 255.0) as u8,
        acc[3].round().clamp(0.0, 255.0) as u8,
    ]
}

/// Straight-alpha "source over".
#[inline]
fn blend_over(dst: &mut Rgba<u8>, src: [u8; 4]) {
    if src[3] == 255 {
        *dst = Rgba(src);
        return;
    }
    let sa = src[3] as f32 / 255.0;
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        let v = (src[c] as f32 * sa + dst.0[c] as f32 * da * (1.0 - sa)) / out_a;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    *dst = Rgba(out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SURFACE_HEIGHT, SURFACE_WIDTH, Template};
    use std::sync::Arc;

    fn surface() -> RgbaImage {
        RgbaImage::new(SURFACE_WIDTH, SURFACE_HEIGHT)
    }

    fn solid(w: u32, h: u32, c: [u8; 4]) -> Template {
        Arc::new(RgbaImage::from_pixel(w, h, Rgba(c)))
    }

    #[test]
    fn empty_session_renders_transparent() {
        let mut s = RgbaImage::from_pixel(SURFACE_WIDTH, SURFACE_HEIGHT, Rgba([9, 9, 9, 9]));
        Compositor::new().render(&mut s, None, &OverlayStore::seeded(1));
        assert!(s.pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn background_is_stretched_to_fill() {
        let bg = RgbaImage::from_pixel(7, 3, Rgba([10, 200, 30, 255]));
        let mut s = surface();
        Compositor::new().render(&mut s, Some(&bg), &OverlayStore::seeded(1));
        assert_eq!(s.get_pixel(0, 0).0, [10, 200, 30, 255]);
        assert_eq!(s.get_pixel(399, 399).0, [10, 200, 30, 255]);
        assert_eq!(s.get_pixel(200, 123).0, [10, 200, 30, 255]);
    }

    #[test]
    fn later_overlays_cover_earlier_ones() {
        let mut store = OverlayStore::seeded(2);
        let red = store.add_overlay(solid(40, 40, [255, 0, 0, 255]), OverlayKind::Fist);
        let blue = store.add_overlay(solid(40, 40, [0, 0, 255, 255]), OverlayKind::Laser);
        store.move_to(red, 100.0, 100.0);
        store.move_to(blue, 120.0, 120.0);

        let mut s = surface();
        Compositor::new().render(&mut s, None, &store);
        assert_eq!(s.get_pixel(105, 105).0, [255, 0, 0, 255]);
        assert_eq!(s.get_pixel(130, 130).0, [0, 0, 255, 255]);
        assert_eq!(s.get_pixel(155, 155).0, [0, 0, 255, 255]);
        assert_eq!(s.get_pixel(50, 50).0, [0, 0, 0, 0]);
    }

    #[test]
    fn scale_and_rotation_change_covered_pixels() {
        let mut store = OverlayStore::seeded(3);
        let id = store.add_overlay(solid(100, 10, [0, 255, 0, 255]), OverlayKind::Laser);
        store.move_to(id, 150.0, 195.0); // centered at (200, 200)

        let c = Compositor::new();
        let mut s = surface();
        c.render(&mut s, None, &store);
        assert_eq!(s.get_pixel(240, 200).0[3], 255);
        assert_eq!(s.get_pixel(200, 240).0[3], 0);

        store.set_rotation(OverlayKind::Laser, 90.0).unwrap();
        c.render(&mut s, None, &store);
        assert_eq!(s.get_pixel(240, 200).0[3], 0);
        assert_eq!(s.get_pixel(200, 240).0[3], 255);

        store.set_rotation(OverlayKind::Laser, 0.0).unwrap();
        store.set_scale(OverlayKind::Laser, 2.0).unwrap();
        c.render(&mut s, None, &store);
        assert_eq!(s.get_pixel(290, 200).0[3], 255);
        assert_eq!(s.get_pixel(110, 200).0[3], 255);
        assert_eq!(s.get_pixel(200, 212).0[3], 0);
    }

    #[test]
    fn positive_rotation_turns_clockwise_on_screen() {
        // left half transparent, right half opaque
        let half = Arc::new(RgbaImage::from_fn(40, 40, |x, _| {
            if x >= 20 { Rgba([255, 0, 0, 255]) } else { Rgba([0, 0, 0, 0]) }
        }));
        let mut store = OverlayStore::seeded(3);
        let id = store.add_overlay(half, OverlayKind::Fist);
        store.move_to(id, 180.0, 180.0); // centered at (200, 200)

        let c = Compositor::new();
        let mut s = surface();
        c.render(&mut s, None, &store);
        assert_eq!(s.get_pixel(215, 195).0[3], 255);
        assert_eq!(s.get_pixel(185, 195).0[3], 0);

        // y grows downward: the right half swings below the center
        store.set_rotation(OverlayKind::Fist, 90.0).unwrap();
        c.render(&mut s, None, &store);
        assert_eq!(s.get_pixel(195, 215).0[3], 255);
        assert_eq!(s.get_pixel(195, 185).0[3], 0);
        assert_eq!(s.get_pixel(215, 190).0[3], 0);

        let below = Vec2::new(195.5, 215.5);
        assert!(store.get(id).unwrap().to_local(below).x > 0.0);
        assert_eq!(store.hit_test(below, 1.0), Some(id));
    }

    #[test]
    fn hue_applies_per_kind_and_not_to_background() {
        let bg = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        let mut store = OverlayStore::seeded(4);
        let fist = store.add_overlay(solid(20, 20, [255, 0, 0, 255]), OverlayKind::Fist);
        let laser = store.add_overlay(solid(20, 20, [255, 0, 0, 255]), OverlayKind::Laser);
        store.move_to(fist, 10.0, 10.0);
        store.move_to(laser, 50.0, 10.0);
        store.set_hue(OverlayKind::Laser, 120.0).unwrap();

        let mut s = surface();
        Compositor::new().render(&mut s, Some(&bg), &store);
        assert_eq!(s.get_pixel(300, 300).0, [255, 0, 0, 255]);
        assert_eq!(s.get_pixel(20, 20).0, [255, 0, 0, 255]);
        let shifted = s.get_pixel(60, 20).0;
        assert_ne!(shifted, [255, 0, 0, 255]);
        assert!(shifted[1] > shifted[0], "{shifted:?}");
    }

    #[test]
    fn translucent_sprite_blends_over_background() {
        let bg = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let mut store = OverlayStore::seeded(5);
        let id = store.add_overlay(solid(20, 20, [255, 255, 255, 128]), OverlayKind::Fist);
        store.move_to(id, 0.0, 0.0);
        let mut s = surface();
        Compositor::new().render(&mut s, Some(&bg), &store);
        let px = s.get_pixel(10, 10).0;
        assert_eq!(px[3], 255);
        assert!((px[0] as i16 - 128).abs() <= 1, "{px:?}");
    }

    #[test]
    fn render_is_idempotent() {
        let bg = RgbaImage::from_fn(13, 9, |x, y| Rgba([(x * 19) as u8, (y * 27) as u8, 77, 255]));
        let mut store = OverlayStore::seeded(6);
        store.add_overlay(solid(33, 21, [20, 140, 230, 200]), OverlayKind::Fist);
        store.add_overlay(solid(50, 12, [250, 40, 10, 255]), OverlayKind::Laser);
        store.set_rotation(OverlayKind::Fist, 33.0).unwrap();
        store.set_scale(OverlayKind::Laser, 1.7).unwrap();
        store.set_hue(OverlayKind::Fist, 210.0).unwrap();

        let c = Compositor::new();
        let mut first = surface();
        c.render(&mut first, Some(&bg), &store);
        let mut second = first.clone();
        c.render(&mut second, Some(&bg), &store);
        assert_eq!(first.as_raw(), second.as_raw());
    }
}
