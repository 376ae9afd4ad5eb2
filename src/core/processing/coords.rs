use ndarray::Array1;

use crate::core::affine::AffineTransform;
use crate::types::CoordinateEndpoint;

/// Evenly spaced x and y coordinate arrays for a destination grid.
///
/// Runs from the world position of pixel `(0, 0)` to that of the last pixel (or the
/// outer corner, per `endpoint`), endpoints inclusive. Exact only for axis-aligned
/// transforms.
pub fn warp_spatial_coords(
    transform: &AffineTransform,
    width: usize,
    height: usize,
    endpoint: CoordinateEndpoint,
) -> (Array1<f64>, Array1<f64>) {
    let (ul_x, ul_y) = transform.apply(0.0, 0.0);
    let (lr_x, lr_y) = match endpoint {
        CoordinateEndpoint::LastPixel => transform.apply(
            width.saturating_sub(1) as f64,
            height.saturating_sub(1) as f64,
        ),
        CoordinateEndpoint::OuterCorner => transform.apply(width as f64, height as f64),
    };
    (linspace(ul_x, lr_x, width), linspace(ul_y, lr_y, height))
}

fn linspace(start: f64, end: f64, n: usize) -> Array1<f64> {
    match n {
        0 => Array1::zeros(0),
        1 => Array1::from(vec![start]),
        _ => {
            let step = (end - start) / (n - 1) as f64;
            // pin the last value so it matches `end` exactly
            Array1::from_shape_fn(n, |i| if i == n - 1 { end } else { start + step * i as f64 })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_pixel_endpoint() {
        let t = AffineTransform::new(1.0, 0.0, 0.0, 0.0, -1.0, 2.0);
        let (xs, ys) = warp_spatial_coords(&t, 3, 3, CoordinateEndpoint::LastPixel);
        assert_eq!(xs.to_vec(), vec![0.0, 1.0, 2.0]);
        assert_eq!(ys.to_vec(), vec![2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_outer_corner_endpoint() {
        let t = AffineTransform::new(1.0, 0.0, 0.0, 0.0, -1.0, 2.0);
        let (xs, ys) = warp_spatial_coords(&t, 3, 2, CoordinateEndpoint::OuterCorner);
        assert_eq!(xs.to_vec(), vec![0.0, 1.5, 3.0]);
        assert_eq!(ys.to_vec(), vec![2.0, 0.0]);
    }

    #[test]
    fn test_lengths_match_grid() {
        let t = AffineTransform::translation(500_000.0, 4_600_000.0)
            * AffineTransform::scale(30.0, -30.0);
        let (xs, ys) = warp_spatial_coords(&t, 7, 4, CoordinateEndpoint::LastPixel);
        assert_eq!(xs.len(), 7);
        assert_eq!(ys.len(), 4);
        assert_eq!(xs[6], 500_180.0);
        assert_eq!(ys[3], 4_599_910.0);
        let (xs, _) = warp_spatial_coords(&t, 1, 4, CoordinateEndpoint::LastPixel);
        assert_eq!(xs.to_vec(), vec![500_000.0]);
    }
}
