use tracing::info;

use crate::core::processing::dims::resolve_spatial_dims;
use crate::core::processing::extent::GridExtent;
use crate::engine::{DestinationGrid, TransformCalculator};
use crate::error::Result;
use crate::grid::LabeledGrid;
use crate::types::{Crs, ResolutionMode};

/// Ask the calculator for the destination transform and size.
///
/// The calculator receives the outer pixel-corner bounds implied by the source
/// affine, so an identity request reproduces the source grid.
pub fn plan_destination<C: TransformCalculator>(
    calculator: &C,
    extent: &GridExtent,
    src_crs: &Crs,
    dst_crs: &Crs,
    dst_resolution: Option<f64>,
) -> Result<DestinationGrid> {
    let bounds = extent.pixel_corner_bounds();
    let dst = calculator.calculate_default_transform(
        src_crs,
        dst_crs,
        extent.width,
        extent.height,
        &bounds,
        dst_resolution,
    )?;
    info!(
        "Destination grid {}x{} ({} -> {}, resolution {:?}), transform {}",
        dst.width, dst.height, src_crs, dst_crs, dst_resolution, dst.transform
    );
    Ok(dst)
}

/// Scalar destination resolution taken from a reference grid
pub fn resolution_from_reference(reference: &LabeledGrid, check_spacing: bool) -> Result<f64> {
    let dims = resolve_spatial_dims(reference)?;
    let extent = GridExtent::from_grid(reference, &dims, check_spacing)?;
    extent.resolution.scalar(ResolutionMode::Average)
}
