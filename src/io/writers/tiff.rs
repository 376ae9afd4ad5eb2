use std::path::Path;

use gdal::raster::Buffer;
use gdal::{Dataset, DriverManager};
use ndarray::{ArrayD, Ix2};
use tracing::info;

use crate::core::affine::AffineTransform;
use crate::core::processing::dims::resolve_spatial_dims;
use crate::core::processing::extent::{GridExtent, source_affine};
use crate::core::processing::nodata::resolve_nodata;
use crate::error::{Error, Result};
use crate::grid::{LabeledGrid, RasterElement};
use crate::io::gdal::crs_to_wkt;
use crate::io::writers::metadata::embed_tiff_metadata;
use crate::with_grid_array;

/// Affine of a grid whose first coordinates mark the upper-left pixel corner.
///
/// Needs at least two coordinates per spatial axis; grids with a single row or
/// column must be written with an explicit transform.
pub fn grid_geotransform(grid: &LabeledGrid) -> Result<AffineTransform> {
    let dims = resolve_spatial_dims(grid)?;
    let extent = GridExtent::from_grid(grid, &dims, false)?;
    Ok(source_affine(&extent.bounds, &extent.resolution))
}

fn write_band<T: RasterElement>(output: &Path, data: &ArrayD<T>) -> Result<Dataset> {
    let view = data
        .view()
        .into_dimensionality::<Ix2>()
        .map_err(|e| Error::UnsupportedLayout(e.to_string()))?;
    let (rows, cols) = view.dim();
    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let ds = driver.create_with_band_type::<T, _>(output, cols, rows, 1)?;
    let mut buf = Buffer::new((cols, rows), view.iter().copied().collect());
    let mut band = ds.rasterband(1)?;
    band.write((0, 0), (cols, rows), &mut buf)?;
    Ok(ds)
}

/// Write a 2-D `(y, x)` grid as a single-band GeoTIFF in its own element type,
/// with georeferencing, nodata and attributes embedded.
///
/// `transform` overrides the affine derived from the coordinate arrays.
pub fn write_grid_geotiff(
    grid: &LabeledGrid,
    output: &Path,
    transform: Option<&AffineTransform>,
) -> Result<Dataset> {
    let dims = resolve_spatial_dims(grid)?;
    if grid.dims() != [dims.y.as_str(), dims.x.as_str()] {
        return Err(Error::UnsupportedLayout(format!(
            "GeoTIFF output needs dimension order ({}, {}), got {:?}",
            dims.y,
            dims.x,
            grid.dims()
        )));
    }
    let geotransform = match transform {
        Some(t) => t.to_gdal(),
        None => grid_geotransform(grid)?.to_gdal(),
    };

    let mut ds = with_grid_array!(grid.data(), a => write_band(output, a)?);
    ds.set_geo_transform(&geotransform)?;
    if let Some(crs) = grid.crs() {
        ds.set_projection(&crs_to_wkt(&crs)?)?;
    }
    if let Some(nodata) = resolve_nodata(grid.attrs()) {
        ds.rasterband(1)?.set_no_data_value(Some(nodata))?;
    }
    embed_tiff_metadata(&mut ds, grid)?;

    info!(
        "Wrote {} GeoTIFF {:?} ({:?})",
        grid.data().dtype(),
        output,
        grid.data().shape()
    );
    Ok(ds)
}
