//! High-level, ergonomic library API: reproject in-memory grids, read and write
//! GeoTIFFs, and batch helpers for directories. Prefer using these entrypoints
//! over the low-level processing modules when integrating gridwarp.
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::core::affine::AffineTransform;
use crate::core::params::ReprojectParams;
use crate::core::processing::nodata::NODATA_ATTRS;
use crate::core::processing::reproject::{Reprojected, Reprojector};
use crate::error::{CrsError, Result};
use crate::grid::{CRS_ATTR, LabeledGrid};
use crate::io::gdal::{GdalGridReader, GdalWarper};
use crate::io::writers::metadata::write_metadata_sidecar;
use crate::io::writers::tiff::write_grid_geotiff;
use crate::types::{Crs, ResamplingMethod};

/// Reprojector backed by GDAL for both resampling and destination sizing
pub fn gdal_reprojector() -> Reprojector<GdalWarper, GdalWarper> {
    Reprojector::new(GdalWarper::default(), GdalWarper::default())
}

/// Reproject a grid from `src_crs` to `dst_crs` with the GDAL backend
pub fn reproject(
    grid: &LabeledGrid,
    src_crs: &Crs,
    dst_crs: &Crs,
    params: &ReprojectParams,
) -> Result<LabeledGrid> {
    gdal_reprojector().reproject(grid, src_crs, dst_crs, params)
}

/// Reproject a grid onto the CRS and resolution of `reference`.
///
/// Missing values are kept as the nodata sentinel and attributes are copied.
pub fn reproject_like(
    grid: &LabeledGrid,
    reference: &LabeledGrid,
    resampling: ResamplingMethod,
) -> Result<LabeledGrid> {
    let params = ReprojectParams::default().with_resampling(resampling);
    reproject_like_with(grid, reference, &params)
}

/// `reproject_like` with full control over parameters. `dst_resolution` is ignored.
pub fn reproject_like_with(
    grid: &LabeledGrid,
    reference: &LabeledGrid,
    params: &ReprojectParams,
) -> Result<LabeledGrid> {
    gdal_reprojector().reproject_like(grid, reference, params)
}

/// Read one band (1-based) of a GDAL-supported raster as a labeled grid
pub fn read_grid(path: &Path, band: usize) -> Result<LabeledGrid> {
    let reader = GdalGridReader::open(path)?;
    reader.read_grid(band)
}

/// Write a grid as GeoTIFF, optionally with a JSON metadata sidecar.
///
/// The geotransform comes from the coordinate arrays, so both spatial axes need
/// at least two coordinates.
pub fn write_grid(grid: &LabeledGrid, output: &Path, sidecar: bool) -> Result<()> {
    write_grid_with_transform(grid, output, sidecar, None)
}

fn write_grid_with_transform(
    grid: &LabeledGrid,
    output: &Path,
    sidecar: bool,
    transform: Option<&AffineTransform>,
) -> Result<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    // Dataset is flushed when dropped
    drop(write_grid_geotiff(grid, output, transform)?);
    if sidecar {
        write_metadata_sidecar(grid, output, transform)?;
    }
    Ok(())
}

/// Where a file should be reprojected to
#[derive(Debug, Clone, PartialEq)]
pub enum ReprojectTarget {
    /// Explicit destination CRS
    Crs(Crs),
    /// Match the CRS and resolution of another raster
    Like(PathBuf),
}

/// Options for file-to-file reprojection
#[derive(Debug, Clone, PartialEq)]
pub struct FileOptions {
    /// 1-based band to read
    pub band: usize,
    /// Write a `.json` sidecar next to each output
    pub sidecar: bool,
    /// Override the nodata attribute of the input grid
    pub nodata: Option<f64>,
}

impl Default for FileOptions {
    fn default() -> Self {
        FileOptions {
            band: 1,
            sidecar: false,
            nodata: None,
        }
    }
}

fn load_input(input: &Path, options: &FileOptions) -> Result<LabeledGrid> {
    let mut grid = read_grid(input, options.band)?;
    if let Some(nodata) = options.nodata {
        grid.attrs_mut()
            .insert("_FillValue".to_string(), nodata.into());
    }
    Ok(grid)
}

/// Reproject one raster file to an output GeoTIFF.
///
/// Unlike the in-memory functions, the output's `spatial_ref` attribute is set
/// to the destination CRS and `_FillValue` to the sentinel the warp used (NaN
/// with `set_missing_to_nan`). The file is georeferenced with the destination
/// transform, so single-row or single-column results can be written.
pub fn reproject_file_to_path(
    input: &Path,
    output: &Path,
    target: &ReprojectTarget,
    params: &ReprojectParams,
    options: &FileOptions,
) -> Result<()> {
    let grid = load_input(input, options)?;
    let reprojector = gdal_reprojector();
    let (planned, dst_crs) = match target {
        ReprojectTarget::Crs(dst_crs) => {
            let src_crs = grid.crs().ok_or(CrsError::Missing {
                attr: CRS_ATTR,
                grid: "source",
            })?;
            let planned = reprojector.reproject_planned(&grid, &src_crs, dst_crs, params)?;
            (planned, dst_crs.clone())
        }
        ReprojectTarget::Like(reference_path) => {
            let reference = read_grid(reference_path, 1)?;
            let dst_crs = reference.crs().ok_or(CrsError::Missing {
                attr: CRS_ATTR,
                grid: "reference",
            })?;
            (
                reprojector.reproject_like_planned(&grid, &reference, params)?,
                dst_crs,
            )
        }
    };
    let Reprojected {
        grid: mut warped,
        destination,
        nodata,
    } = planned;
    let attrs = warped.attrs_mut();
    attrs.insert(CRS_ATTR.to_string(), dst_crs.as_str().into());
    attrs.insert(NODATA_ATTRS[0].to_string(), nodata.into());
    write_grid_with_transform(&warped, output, options.sidecar, Some(&destination.transform))?;
    info!("Reprojected {:?} -> {:?}", input, output);
    Ok(())
}

/// Summary of a directory run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

fn is_raster_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("tif") || e.eq_ignore_ascii_case("tiff"))
            .unwrap_or(false)
}

/// Return the entries of `input_dir` in name order
pub fn iterate_raster_files(input_dir: &Path) -> Result<std::vec::IntoIter<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(input_dir)? {
        files.push(entry?.path());
    }
    files.sort();
    Ok(files.into_iter())
}

/// Reproject every GeoTIFF in `input_dir` into `output_dir`, keeping file names.
/// Non-GeoTIFF entries are skipped. If `continue_on_error` is true, errors are
/// counted in the report and processing continues; otherwise, the first error is returned.
pub fn process_directory_to_path(
    input_dir: &Path,
    output_dir: &Path,
    target: &ReprojectTarget,
    params: &ReprojectParams,
    options: &FileOptions,
    continue_on_error: bool,
) -> Result<BatchReport> {
    std::fs::create_dir_all(output_dir)?;

    let mut report = BatchReport::default();
    for path in iterate_raster_files(input_dir)? {
        let Some(file_name) = path.file_name().filter(|_| is_raster_file(&path)) else {
            report.skipped += 1;
            continue;
        };
        let output_path = output_dir.join(file_name);
        match reproject_file_to_path(&path, &output_path, target, params, options) {
            Ok(()) => report.processed += 1,
            Err(e) => {
                report.errors += 1;
                if !continue_on_error {
                    return Err(e);
                }
                warn!("Failed to reproject {:?}: {}", path, e);
            }
        }
    }

    info!(
        "Batch complete: {} processed, {} skipped, {} errors",
        report.processed, report.skipped, report.errors
    );
    Ok(report)
}
