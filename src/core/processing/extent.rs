use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::affine::AffineTransform;
use crate::core::processing::dims::SpatialDims;
use crate::error::{Error, Result};
use crate::grid::LabeledGrid;
use crate::types::ResolutionMode;

/// Relative tolerance on the step between consecutive coordinates
const SPACING_TOLERANCE: f64 = 1e-6;
/// Relative tolerance when x and y resolutions must agree
const RESOLUTION_TOLERANCE: f64 = 1e-9;

/// World-space bounds of the first/last coordinates along x and y
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

/// Signed world units per pixel; `y` is negative for north-up grids
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub x: f64,
    pub y: f64,
}

impl Resolution {
    /// Collapse to a single positive pixel size
    pub fn scalar(&self, mode: ResolutionMode) -> Result<f64> {
        let (rx, ry) = (self.x.abs(), self.y.abs());
        match mode {
            ResolutionMode::Average => Ok((rx + ry) / 2.0),
            ResolutionMode::AssertEqual => {
                if (rx - ry).abs() > RESOLUTION_TOLERANCE * rx.max(ry) {
                    Err(Error::NonUniformResolution {
                        res_x: self.x,
                        res_y: self.y,
                    })
                } else {
                    Ok(rx)
                }
            }
        }
    }
}

/// Pixel size, bounds and resolution of a grid's spatial axes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridExtent {
    pub width: usize,
    pub height: usize,
    pub bounds: Bounds,
    pub resolution: Resolution,
}

impl GridExtent {
    /// Read bounds from the first and last coordinate values of each spatial axis.
    ///
    /// Fails on axes with fewer than two coordinates, and (when `check_spacing`)
    /// on coordinates that are not evenly spaced.
    pub fn from_grid(grid: &LabeledGrid, dims: &SpatialDims, check_spacing: bool) -> Result<Self> {
        let xs = spatial_coord(grid, &dims.x)?;
        let ys = spatial_coord(grid, &dims.y)?;

        let res_x = axis_resolution(&dims.x, xs)?;
        let res_y = axis_resolution(&dims.y, ys)?;
        if check_spacing {
            check_uniform_spacing(&dims.x, xs, res_x)?;
            check_uniform_spacing(&dims.y, ys, res_y)?;
        }

        let extent = GridExtent {
            width: xs.len(),
            height: ys.len(),
            bounds: Bounds {
                left: xs[0],
                bottom: ys[ys.len() - 1],
                right: xs[xs.len() - 1],
                top: ys[0],
            },
            resolution: Resolution { x: res_x, y: res_y },
        };
        debug!(
            "Grid extent {}x{}, bounds {:?}, resolution {:?}",
            extent.width, extent.height, extent.bounds, extent.resolution
        );
        Ok(extent)
    }

    /// Outer pixel-corner bounds implied by the source affine (first coordinate as corner)
    pub fn pixel_corner_bounds(&self) -> Bounds {
        let Bounds { left, top, .. } = self.bounds;
        Bounds {
            left,
            top,
            right: left + self.resolution.x * self.width as f64,
            bottom: top + self.resolution.y * self.height as f64,
        }
    }
}

fn spatial_coord<'a>(grid: &'a LabeledGrid, dim: &str) -> Result<&'a Array1<f64>> {
    grid.coord(dim)
        .ok_or_else(|| Error::InvalidGrid(format!("no coordinate array for dimension '{}'", dim)))
}

fn axis_resolution(dim: &str, coord: &Array1<f64>) -> Result<f64> {
    let size = coord.len();
    if size < 2 {
        return Err(Error::DegenerateGrid {
            dim: dim.to_string(),
            size,
            resolution: f64::NAN,
        });
    }
    let resolution = (coord[size - 1] - coord[0]) / (size - 1) as f64;
    if resolution == 0.0 || !resolution.is_finite() {
        return Err(Error::DegenerateGrid {
            dim: dim.to_string(),
            size,
            resolution,
        });
    }
    Ok(resolution)
}

fn check_uniform_spacing(dim: &str, coord: &Array1<f64>, resolution: f64) -> Result<()> {
    let tolerance = SPACING_TOLERANCE * resolution.abs();
    for (index, (a, b)) in coord.iter().zip(coord.iter().skip(1)).enumerate() {
        let step = b - a;
        if (step - resolution).abs() > tolerance {
            return Err(Error::NonUniformSpacing {
                dim: dim.to_string(),
                index,
            });
        }
    }
    Ok(())
}

/// `translate(left, top) * scale(res_x, res_y)`: pixel `(0, 0)` lands on `(left, top)`
pub fn source_affine(bounds: &Bounds, resolution: &Resolution) -> AffineTransform {
    AffineTransform::translation(bounds.left, bounds.top)
        * AffineTransform::scale(resolution.x, resolution.y)
}
