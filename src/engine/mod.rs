//! Seams to the external collaborators: the resampling engine that fills a
//! destination pixel buffer, and the transform calculator that sizes the
//! destination grid. `io::gdal::GdalWarper` implements both.
use ndarray::{Array2, ArrayView2};

use crate::core::affine::AffineTransform;
use crate::core::processing::extent::Bounds;
use crate::error::Result;
use crate::grid::RasterElement;
use crate::types::{Crs, ResamplingMethod};

/// Everything the resampling engine needs besides the pixel buffers
#[derive(Debug, Clone, Copy)]
pub struct WarpParams<'a> {
    pub src_transform: AffineTransform,
    pub src_crs: &'a Crs,
    pub src_nodata: f64,
    pub dst_transform: AffineTransform,
    pub dst_crs: &'a Crs,
    pub dst_nodata: f64,
    pub resampling: ResamplingMethod,
}

/// Destination transform and pixel size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DestinationGrid {
    pub transform: AffineTransform,
    pub width: usize,
    pub height: usize,
}

pub trait ResamplingEngine {
    /// Resample `source` into `destination` in place. Destination pixels outside
    /// the source footprint receive `params.dst_nodata`.
    fn reproject<T: RasterElement>(
        &self,
        source: ArrayView2<'_, T>,
        destination: &mut Array2<T>,
        params: &WarpParams<'_>,
    ) -> Result<()>;
}

pub trait TransformCalculator {
    /// Destination transform and size for a source of `width x height` pixels
    /// covering `bounds` (outer pixel corners). Without `resolution` the
    /// calculator picks a default pixel size.
    fn calculate_default_transform(
        &self,
        src_crs: &Crs,
        dst_crs: &Crs,
        width: usize,
        height: usize,
        bounds: &Bounds,
        resolution: Option<f64>,
    ) -> Result<DestinationGrid>;
}

impl<E: ResamplingEngine> ResamplingEngine for &E {
    fn reproject<T: RasterElement>(
        &self,
        source: ArrayView2<'_, T>,
        destination: &mut Array2<T>,
        params: &WarpParams<'_>,
    ) -> Result<()> {
        (**self).reproject(source, destination, params)
    }
}

impl<C: TransformCalculator> TransformCalculator for &C {
    fn calculate_default_transform(
        &self,
        src_crs: &Crs,
        dst_crs: &Crs,
        width: usize,
        height: usize,
        bounds: &Bounds,
        resolution: Option<f64>,
    ) -> Result<DestinationGrid> {
        (**self).calculate_default_transform(src_crs, dst_crs, width, height, bounds, resolution)
    }
}
