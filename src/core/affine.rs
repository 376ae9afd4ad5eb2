use std::ops::Mul;

use serde::{Deserialize, Serialize};

/// Pixel-to-world affine mapping.
///
/// `x = a*col + b*row + c`, `y = d*col + e*row + f`. Pixel `(0, 0)` maps to the
/// grid origin `(c, f)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl AffineTransform {
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        AffineTransform { a, b, c, d, e, f }
    }

    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0)
    }

    pub const fn translation(x: f64, y: f64) -> Self {
        Self::new(1.0, 0.0, x, 0.0, 1.0, y)
    }

    pub const fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, 0.0, sy, 0.0)
    }

    /// Transform covering `(left, bottom, right, top)` with `width x height` pixels
    pub fn from_bounds(
        left: f64,
        bottom: f64,
        right: f64,
        top: f64,
        width: usize,
        height: usize,
    ) -> Self {
        Self::translation(left, top)
            * Self::scale(
                (right - left) / width as f64,
                (bottom - top) / height as f64,
            )
    }

    /// From a GDAL geotransform `[c, a, b, f, d, e]`
    pub const fn from_gdal(gt: [f64; 6]) -> Self {
        Self::new(gt[1], gt[2], gt[0], gt[4], gt[5], gt[3])
    }

    /// To a GDAL geotransform `[c, a, b, f, d, e]`
    pub const fn to_gdal(&self) -> [f64; 6] {
        [self.c, self.a, self.b, self.f, self.d, self.e]
    }

    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.a * col + self.b * row + self.c,
            self.d * col + self.e * row + self.f,
        )
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.e - self.b * self.d
    }

    /// True when there is no rotation or shear term
    pub fn is_rectilinear(&self) -> bool {
        self.b == 0.0 && self.d == 0.0
    }

    /// World-to-pixel mapping, `None` for a singular transform
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let ia = self.e / det;
        let ib = -self.b / det;
        let id = -self.d / det;
        let ie = self.a / det;
        Some(Self::new(
            ia,
            ib,
            -(ia * self.c + ib * self.f),
            id,
            ie,
            -(id * self.c + ie * self.f),
        ))
    }

    /// Coefficient-wise comparison within `tolerance`
    pub fn almost_equals(&self, other: &Self, tolerance: f64) -> bool {
        let lhs = [self.a, self.b, self.c, self.d, self.e, self.f];
        let rhs = [other.a, other.b, other.c, other.d, other.e, other.f];
        lhs.iter().zip(rhs.iter()).all(|(l, r)| (l - r).abs() <= tolerance)
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// `lhs * rhs` applies `rhs` first, then `lhs`.
impl Mul for AffineTransform {
    type Output = AffineTransform;

    fn mul(self, rhs: AffineTransform) -> AffineTransform {
        AffineTransform::new(
            self.a * rhs.a + self.b * rhs.d,
            self.a * rhs.b + self.b * rhs.e,
            self.a * rhs.c + self.b * rhs.f + self.c,
            self.d * rhs.a + self.e * rhs.d,
            self.d * rhs.b + self.e * rhs.e,
            self.d * rhs.c + self.e * rhs.f + self.f,
        )
    }
}

impl std::fmt::Display for AffineTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "|{:.6}, {:.6}, {:.6}| |{:.6}, {:.6}, {:.6}|",
            self.a, self.b, self.c, self.d, self.e, self.f
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_translation_then_scale() {
        let t = AffineTransform::translation(100.0, 50.0) * AffineTransform::scale(2.0, -0.5);
        assert_eq!(t.apply(0.0, 0.0), (100.0, 50.0));
        assert_eq!(t.apply(3.0, 4.0), (106.0, 48.0));
        assert!(t.is_rectilinear());
    }

    #[test]
    fn test_gdal_roundtrip_order() {
        let gt = [10.0, 0.5, 0.0, 20.0, 0.0, -0.5];
        let t = AffineTransform::from_gdal(gt);
        assert_eq!(t.c, 10.0);
        assert_eq!(t.e, -0.5);
        assert_eq!(t.to_gdal(), gt);
    }

    #[test]
    fn test_inverse() {
        let t = AffineTransform::new(2.0, 0.3, 5.0, -0.1, -1.5, 7.0);
        let inv = t.inverse().unwrap();
        let (x, y) = t.apply(3.25, -8.0);
        let (col, row) = inv.apply(x, y);
        assert!((col - 3.25).abs() < 1e-9);
        assert!((row + 8.0).abs() < 1e-9);
        assert!((t * inv).almost_equals(&AffineTransform::identity(), 1e-9));
        assert!(AffineTransform::scale(0.0, 1.0).inverse().is_none());
    }

    #[test]
    fn test_from_bounds() {
        let t = AffineTransform::from_bounds(0.0, -1.0, 3.0, 2.0, 3, 3);
        assert!(t.almost_equals(&AffineTransform::new(1.0, 0.0, 0.0, 0.0, -1.0, 2.0), EPS));
    }
}
