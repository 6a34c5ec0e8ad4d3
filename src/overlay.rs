// One placed sprite and the geometry of its rotated box.
//
// Rotation is clockwise in degrees about the overlay's center (surface y grows
// downward, so a positive angle turns the sprite clockwise on screen).
// `width`/`height` are always `natural * scale`; the store recomputes them
// from the template on every resize.

use crate::types::{OverlayId, OverlayKind, Template, Vec2};

#[derive(Debug, Clone)]
pub struct Overlay {
    pub id: OverlayId,
    pub kind: OverlayKind,
    pub template: Template,
    /// Top-left of the unrotated, scaled box.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub scale: f32,
    /// Degrees in [0, 360).
    pub rotation: f32,
}

/// Axis-aligned box in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Overlay {
    /// Template size before scaling.
    pub fn natural_size(&self) -> (f32, f32) {
        let (w, h) = self.template.dimensions();
        (w as f32, h as f32)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Set size from the template at `scale`, keeping the center where it is.
    pub(crate) fn resize_about_center(&mut self, scale: f32) {
        let c = self.center();
        let (nw, nh) = self.natural_size();
        self.scale = scale;
        self.width = nw * scale;
        self.height = nh * scale;
        self.x = c.x - self.width / 2.0;
        self.y = c.y - self.height / 2.0;
    }

    /// Map a surface point into the overlay's unrotated frame, relative to its center.
    pub fn to_local(&self, p: Vec2) -> Vec2 {
        let c = self.center();
        let dx = p.x - c.x;
        let dy = p.y - c.y;
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        Vec2::new(cos * dx + sin * dy, -sin * dx + cos * dy)
    }

    /// Point-in-rotated-rectangle. The region is the scaled box shrunk to
    /// `hit_fraction` of its width and height around the center.
    pub fn contains(&self, p: Vec2, hit_fraction: f32) -> bool {
        let local = self.to_local(p);
        let hx = self.width * hit_fraction / 2.0;
        let hy = self.height * hit_fraction / 2.0;
        local.x.abs() <= hx && local.y.abs() <= hy
    }

    /// Axis-aligned box around the rotated sprite.
    pub fn bounds(&self) -> Bounds {
        let c = self.center();
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let hx = (cos.abs() * self.width + sin.abs() * self.height) / 2.0;
        let hy = (sin.abs() * self.width + cos.abs() * self.height) / 2.0;
        Bounds {
            min: Vec2::new(c.x - hx, c.y - hy),
            max: Vec2::new(c.x + hx, c.y + hy),
        }
    }
}
