// Overlay store: the ordered list of placed sprites plus one hue per kind.
//
// Insertion order is draw order (last added is on top) and nothing else.

use crate::error::Error;
use crate::hue::wrap_degrees;
use crate::overlay::Overlay;
use crate::types::{OverlayId, OverlayKind, SURFACE_HEIGHT, SURFACE_WIDTH, Template, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct OverlayStore {
    overlays: Vec<Overlay>,
    hues: [f32; 2],
    next_id: u64,
    surface: (f32, f32),
    rng: StdRng,
}

impl OverlayStore {
    /// Empty store for the fixed 400x400 surface, seeded from the OS.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Deterministic placement (tests, reproducible sessions).
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            overlays: Vec::new(),
            hues: [0.0; 2],
            next_id: 1,
            surface: (SURFACE_WIDTH as f32, SURFACE_HEIGHT as f32),
            rng,
        }
    }

    fn alloc_id(&mut self) -> OverlayId {
        let id = self.next_id;
        self.next_id += 1;
        OverlayId(id)
    }

    /// Place a new overlay at natural size somewhere on the surface; it goes on top.
    pub fn add_overlay(&mut self, template: Template, kind: OverlayKind) -> OverlayId {
        let (w, h) = template.dimensions();
        let (w, h) = (w as f32, h as f32);
        let x = self.random_offset(self.surface.0 - w);
        let y = self.random_offset(self.surface.1 - h);
        let id = self.alloc_id();

        self.overlays.push(Overlay {
            id,
            kind,
            template,
            x,
            y,
            width: w,
            height: h,
            scale: 1.0,
            rotation: 0.0,
        });
        log::debug!("added {kind} {id:?} at ({x:.1}, {y:.1})");
        id
    }

    fn random_offset(&mut self, room: f32) -> f32 {
        if room > 0.0 { self.rng.random_range(0.0..=room) } else { 0.0 }
    }

    /// Resize every overlay of `kind` to `scale` times its template, center held fixed.
    pub fn set_scale(&mut self, kind: OverlayKind, scale: f32) -> Result<(), Error> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "{kind} scale must be a positive number, got {scale}"
            )));
        }
        if let Some(o) = self.overlays.iter().find(|o| o.kind == kind && !size_fits(o, scale)) {
            return Err(Error::InvalidParameter(format!(
                "{kind} scale {scale} is out of range for {:?}",
                o.id
            )));
        }
        for o in self.overlays.iter_mut().filter(|o| o.kind == kind) {
            o.resize_about_center(scale);
        }
        Ok(())
    }

    /// Multiply each overlay's own scale by `factor` (wheel nudge). `scale_by(s)`
    /// then `scale_by(1/s)` lands back on the starting size and center.
    /// All-or-nothing: if any resulting scale leaves the representable range,
    /// no overlay changes.
    pub fn scale_by(&mut self, kind: OverlayKind, factor: f32) -> Result<(), Error> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "{kind} scale factor must be a positive number, got {factor}"
            )));
        }
        for o in self.overlays.iter().filter(|o| o.kind == kind) {
            let scale = o.scale * factor;
            if !size_fits(o, scale) {
                return Err(Error::InvalidParameter(format!(
                    "{kind} scale {} x {factor} is out of range for {:?}",
                    o.scale, o.id
                )));
            }
        }
        for o in self.overlays.iter_mut().filter(|o| o.kind == kind) {
            let scale = o.scale * factor;
            o.resize_about_center(scale);
        }
        Ok(())
    }

    pub fn set_rotation(&mut self, kind: OverlayKind, degrees: f32) -> Result<(), Error> {
        if !degrees.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "{kind} rotation must be finite, got {degrees}"
            )));
        }
        let degrees = wrap_degrees(degrees);
        for o in self.overlays.iter_mut().filter(|o| o.kind == kind) {
            o.rotation = degrees;
        }
        Ok(())
    }

    /// Any finite angle is accepted and wrapped into [0, 360).
    pub fn set_hue(&mut self, kind: OverlayKind, degrees: f32) -> Result<(), Error> {
        if !degrees.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "{kind} hue must be finite, got {degrees}"
            )));
        }
        self.hues[kind.index()] = wrap_degrees(degrees);
        Ok(())
    }

    pub fn hue(&self, kind: OverlayKind) -> f32 {
        self.hues[kind.index()]
    }

    /// Remove every overlay of `kind`. Returns how many went away.
    pub fn delete_by_kind(&mut self, kind: OverlayKind) -> usize {
        let before = self.overlays.len();
        self.overlays.retain(|o| o.kind != kind);
        before - self.overlays.len()
    }

    /// Drop all overlays. Hues stay as the sliders left them.
    pub fn clear(&mut self) {
        self.overlays.clear();
    }

    /// Topmost overlay whose hit region contains `p`.
    pub fn hit_test(&self, p: Vec2, hit_fraction: f32) -> Option<OverlayId> {
        self.overlays
            .iter()
            .rev()
            .find(|o| o.contains(p, hit_fraction))
            .map(|o| o.id)
    }

    /// Move one overlay's top-left corner. False if the id is gone.
    pub fn move_to(&mut self, id: OverlayId, x: f32, y: f32) -> bool {
        match self.overlays.iter_mut().find(|o| o.id == id) {
            Some(o) => {
                o.x = x;
                o.y = y;
                true
            }
            None => false,
        }
    }

    /// Point every overlay of `kind` at a new template, sizes recomputed at their scale.
    pub fn retarget(&mut self, kind: OverlayKind, template: &Template) {
        for o in self.overlays.iter_mut().filter(|o| o.kind == kind) {
            o.template = Template::clone(template);
            let scale = if size_fits(o, o.scale) { o.scale } else { 1.0 };
            o.resize_about_center(scale);
        }
    }

    pub fn get(&self, id: OverlayId) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.id == id)
    }

    /// Overlays in draw order.
    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }
}

/// `scale` is positive and the scaled box stays finite and non-empty.
fn size_fits(o: &Overlay, scale: f32) -> bool {
    let (nw, nh) = o.natural_size();
    let (w, h) = (nw * scale, nh * scale);
    scale.is_finite() && scale > 0.0 && w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0
}

impl Default for OverlayStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use std::sync::Arc;

    fn template(w: u32, h: u32) -> Template {
        Arc::new(RgbaImage::new(w, h))
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn add_places_inside_surface_at_natural_size() {
        let mut store = OverlayStore::seeded(7);
        for _ in 0..50 {
            let id = store.add_overlay(template(80, 60), OverlayKind::Fist);
            let o = store.get(id).unwrap();
            assert!(o.x >= 0.0 && o.x <= 320.0, "x = {}", o.x);
            assert!(o.y >= 0.0 && o.y <= 340.0, "y = {}", o.y);
            assert_eq!((o.width, o.height, o.scale, o.rotation), (80.0, 60.0, 1.0, 0.0));
        }
    }

    #[test]
    fn oversized_template_is_pinned_to_origin() {
        let mut store = OverlayStore::seeded(1);
        let id = store.add_overlay(template(500, 20), OverlayKind::Laser);
        assert_eq!(store.get(id).unwrap().x, 0.0);
    }

    #[test]
    fn ids_are_unique_and_order_is_kept() {
        let mut store = OverlayStore::seeded(3);
        let a = store.add_overlay(template(10, 10), OverlayKind::Fist);
        let b = store.add_overlay(template(10, 10), OverlayKind::Laser);
        let c = store.add_overlay(template(10, 10), OverlayKind::Fist);
        assert_ne!(a, b);
        assert_ne!(b, c);

        store.delete_by_kind(OverlayKind::Laser);
        let ids: Vec<_> = store.overlays().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![a, c]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn scale_doubles_size_and_keeps_center() {
        let mut store = OverlayStore::seeded(11);
        let fist = store.add_overlay(template(40, 30), OverlayKind::Fist);
        let laser = store.add_overlay(template(100, 10), OverlayKind::Laser);
        let c0 = store.get(fist).unwrap().center();
        let laser_before = store.get(laser).unwrap().clone();

        store.set_scale(OverlayKind::Fist, 2.0).unwrap();

        let o = store.get(fist).unwrap();
        assert_eq!((o.width, o.height), (80.0, 60.0));
        assert!(close(o.center().x, c0.x) && close(o.center().y, c0.y));

        let l = store.get(laser).unwrap();
        assert_eq!((l.x, l.y, l.width, l.height), (laser_before.x, laser_before.y, 100.0, 10.0));
    }

    #[test]
    fn absolute_scale_lands_on_natural_over_s_and_keeps_center() {
        let mut store = OverlayStore::seeded(5);
        let id = store.add_overlay(template(64, 48), OverlayKind::Laser);
        let before = store.get(id).unwrap().clone();

        for s in [0.3f32, 1.7, 2.9] {
            store.set_scale(OverlayKind::Laser, s).unwrap();
            store.set_scale(OverlayKind::Laser, 1.0 / s).unwrap();
            let o = store.get(id).unwrap();
            assert!(close(o.width, 64.0 / s) && close(o.height, 48.0 / s));
            assert!(close(o.center().x, before.center().x));
            assert!(close(o.center().y, before.center().y));
        }
    }

    #[test]
    fn relative_scale_round_trip() {
        let mut store = OverlayStore::seeded(6);
        let id = store.add_overlay(template(64, 48), OverlayKind::Fist);
        store.set_scale(OverlayKind::Fist, 1.5).unwrap();
        let before = store.get(id).unwrap().clone();

        store.scale_by(OverlayKind::Fist, 2.0).unwrap();
        assert!(close(store.get(id).unwrap().width, 192.0));
        store.scale_by(OverlayKind::Fist, 0.5).unwrap();

        let o = store.get(id).unwrap();
        assert!(close(o.width, before.width) && close(o.height, before.height));
        assert!(close(o.center().x, before.center().x));
        assert!(close(o.center().y, before.center().y));
        assert!(store.scale_by(OverlayKind::Fist, 0.0).is_err());
    }

    #[test]
    fn relative_scale_out_of_range_changes_nothing() {
        let mut store = OverlayStore::seeded(6);
        let a = store.add_overlay(template(80, 80), OverlayKind::Fist);

        for factor in [1e20f32, 1e-30] {
            store.scale_by(OverlayKind::Fist, factor).unwrap();
            let err = store.scale_by(OverlayKind::Fist, factor).unwrap_err();
            assert!(matches!(err, Error::InvalidParameter(_)));
            let o = store.get(a).unwrap();
            assert!(o.scale.is_finite() && o.scale > 0.0, "scale = {}", o.scale);
            assert!(o.x.is_finite() && o.y.is_finite());

            store.set_scale(OverlayKind::Fist, 1.0).unwrap();
            let o = store.get(a).unwrap();
            assert_eq!((o.width, o.height), (80.0, 80.0));
            assert!(o.center().x.is_finite() && o.center().y.is_finite());
        }
    }

    #[test]
    fn relative_scale_is_all_or_nothing_across_overlays() {
        let mut store = OverlayStore::seeded(6);
        let small = store.add_overlay(template(10, 10), OverlayKind::Fist);
        store.scale_by(OverlayKind::Fist, 1e30).unwrap();
        let big = store.add_overlay(template(10, 10), OverlayKind::Fist);

        // fine for `big` at scale 1, overflows for `small`
        assert!(store.scale_by(OverlayKind::Fist, 1e10).is_err());
        assert_eq!(store.get(big).unwrap().scale, 1.0);
        assert_eq!(store.get(small).unwrap().scale, 1e30);
    }

    #[test]
    fn absolute_scale_that_overflows_the_size_is_rejected() {
        let mut store = OverlayStore::seeded(5);
        let id = store.add_overlay(template(80, 80), OverlayKind::Fist);
        assert!(store.set_scale(OverlayKind::Fist, f32::MAX).is_err());
        assert_eq!(store.get(id).unwrap().width, 80.0);
    }

    #[test]
    fn scale_is_absolute_not_incremental() {
        let mut store = OverlayStore::seeded(5);
        let id = store.add_overlay(template(10, 10), OverlayKind::Fist);
        store.set_scale(OverlayKind::Fist, 2.0).unwrap();
        store.set_scale(OverlayKind::Fist, 2.0).unwrap();
        assert_eq!(store.get(id).unwrap().width, 20.0);
    }

    #[test]
    fn non_positive_scale_is_rejected_without_change() {
        let mut store = OverlayStore::seeded(5);
        let id = store.add_overlay(template(10, 10), OverlayKind::Fist);
        for bad in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let err = store.set_scale(OverlayKind::Fist, bad).unwrap_err();
            assert!(matches!(err, Error::InvalidParameter(_)));
        }
        let o = store.get(id).unwrap();
        assert_eq!((o.width, o.scale), (10.0, 1.0));
    }

    #[test]
    fn rotation_is_normalised_per_kind() {
        let mut store = OverlayStore::seeded(2);
        let fist = store.add_overlay(template(10, 10), OverlayKind::Fist);
        let laser = store.add_overlay(template(10, 10), OverlayKind::Laser);
        store.set_rotation(OverlayKind::Fist, -90.0).unwrap();
        assert_eq!(store.get(fist).unwrap().rotation, 270.0);
        assert_eq!(store.get(laser).unwrap().rotation, 0.0);
        assert!(store.set_rotation(OverlayKind::Fist, f32::NAN).is_err());
        assert_eq!(store.get(fist).unwrap().rotation, 270.0);
    }

    #[test]
    fn hue_wraps_instead_of_rejecting() {
        let mut store = OverlayStore::seeded(2);
        store.set_hue(OverlayKind::Laser, 400.0).unwrap();
        let wrapped = store.hue(OverlayKind::Laser);
        store.set_hue(OverlayKind::Laser, 40.0).unwrap();
        assert_eq!(wrapped, store.hue(OverlayKind::Laser));
        assert_eq!(store.hue(OverlayKind::Fist), 0.0);
    }

    #[test]
    fn delete_of_absent_kind_is_a_no_op() {
        let mut store = OverlayStore::seeded(9);
        store.add_overlay(template(10, 10), OverlayKind::Fist);
        store.add_overlay(template(10, 10), OverlayKind::Fist);
        assert_eq!(store.delete_by_kind(OverlayKind::Laser), 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn hit_test_prefers_most_recent() {
        let mut store = OverlayStore::seeded(4);
        let a = store.add_overlay(template(50, 50), OverlayKind::Fist);
        let b = store.add_overlay(template(50, 50), OverlayKind::Laser);
        store.move_to(a, 100.0, 100.0);
        store.move_to(b, 130.0, 130.0);

        assert_eq!(store.hit_test(Vec2::new(110.0, 110.0), 1.0), Some(a));
        assert_eq!(store.hit_test(Vec2::new(140.0, 140.0), 1.0), Some(b));
        assert_eq!(store.hit_test(Vec2::new(170.0, 170.0), 1.0), Some(b));
        assert_eq!(store.hit_test(Vec2::new(10.0, 10.0), 1.0), None);
    }

    #[test]
    fn move_to_unknown_id_reports_false() {
        let mut store = OverlayStore::seeded(4);
        assert!(!store.move_to(OverlayId(99), 1.0, 1.0));
    }

    #[test]
    fn retarget_recomputes_size_at_current_scale() {
        let mut store = OverlayStore::seeded(8);
        let id = store.add_overlay(template(10, 10), OverlayKind::Fist);
        store.set_scale(OverlayKind::Fist, 2.0).unwrap();
        let c = store.get(id).unwrap().center();

        store.retarget(OverlayKind::Fist, &template(30, 40));
        let o = store.get(id).unwrap();
        assert_eq!((o.width, o.height), (60.0, 80.0));
        assert!(close(o.center().x, c.x) && close(o.center().y, c.y));
    }

    #[test]
    fn clear_empties_but_keeps_hues() {
        let mut store = OverlayStore::seeded(8);
        store.add_overlay(template(10, 10), OverlayKind::Fist);
        store.set_hue(OverlayKind::Fist, 90.0).unwrap();
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.hue(OverlayKind::Fist), 90.0);
    }
}
