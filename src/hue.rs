// Hue-rotation colour filter.
//
// Same matrix as the `hue-rotate()` filter function: a rotation of the colour
// around the luminance axis, applied to linear-light RGB. Alpha is untouched.

use crate::gamma::GammaLut;

/// Wrap any angle into [0, 360).
pub fn wrap_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HueFilter {
    m: [[f32; 3]; 3],
    identity: bool,
}

impl HueFilter {
    pub fn new(degrees: f32) -> Self {
        let degrees = wrap_degrees(degrees);
        if degrees == 0.0 {
            return Self::identity();
        }

        let (sin, cos) = degrees.to_radians().sin_cos();
        let m = [
            [
                0.213 + cos * 0.787 - sin * 0.213,
                0.715 - cos * 0.715 - sin * 0.715,
                0.072 - cos * 0.072 + sin * 0.928,
            ],
            [
                0.213 - cos * 0.213 + sin * 0.143,
                0.715 + cos * 0.285 + sin * 0.140,
                0.072 - cos * 0.072 - sin * 0.283,
            ],
            [
                0.213 - cos * 0.213 - sin * 0.787,
                0.715 - cos * 0.715 + sin * 0.715,
                0.072 + cos * 0.928 + sin * 0.072,
            ],
        ];
        Self { m, identity: false }
    }

    pub fn identity() -> Self {
        Self {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            identity: true,
        }
    }

    /// Rotate one sRGB colour.
    #[inline]
    pub fn apply(&self, rgb: [u8; 3], lut: &GammaLut) -> [u8; 3] {
        if self.identity {
            return rgb;
        }
        let lin = [
            lut.srgb_u8_to_linear(rgb[0]),
            lut.srgb_u8_to_linear(rgb[1]),
            lut.srgb_u8_to_linear(rgb[2]),
        ];
        let mut out = [0u8; 3];
        for (row, slot) in self.m.iter().zip(out.iter_mut()) {
            let l = row[0] * lin[0] + row[1] * lin[1] + row[2] * lin[2];
            *slot = lut.linear_to_srgb_u8(l);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_handles_negative_and_large_angles() {
        assert_eq!(wrap_degrees(400.0), 40.0);
        assert_eq!(wrap_degrees(-90.0), 270.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert_eq!(wrap_degrees(0.0), 0.0);
    }

    #[test]
    fn zero_and_full_turn_are_identity() {
        assert_eq!(HueFilter::new(0.0), HueFilter::identity());
        assert_eq!(HueFilter::new(720.0), HueFilter::identity());
        let lut = GammaLut::new();
        assert_eq!(HueFilter::new(0.0).apply([12, 200, 99], &lut), [12, 200, 99]);
    }

    #[test]
    fn periodic_angles_build_the_same_matrix() {
        assert_eq!(HueFilter::new(400.0), HueFilter::new(40.0));
        assert_eq!(HueFilter::new(-320.0), HueFilter::new(40.0));
    }

    #[test]
    fn grey_is_unchanged_by_rotation() {
        let lut = GammaLut::new();
        let out = HueFilter::new(123.0).apply([128, 128, 128], &lut);
        for c in out {
            assert!((c as i16 - 128).abs() <= 2, "{out:?}");
        }
    }

    #[test]
    fn red_moves_toward_green_and_blue() {
        let lut = GammaLut::new();
        let out = HueFilter::new(180.0).apply([255, 0, 0], &lut);
        assert!(out[0] < 255);
        assert!(out[1] > 0 || out[2] > 0, "{out:?}");
    }
}
