use std::collections::HashMap;
use std::ffi::CStr;
use std::path::Path;

use gdal::cpl::CslStringList;
use gdal::raster::{Buffer, GdalDataType};
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager, Metadata, errors::GdalError as GdalCrateError};
use ndarray::{Array1, Array2, ArrayView2};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::affine::AffineTransform;
use crate::core::processing::extent::Bounds;
use crate::engine::{DestinationGrid, ResamplingEngine, TransformCalculator, WarpParams};
use crate::error::{CrsError, Error, Result};
use crate::grid::{AttrValue, Attrs, CRS_ATTR, Coords, GridArray, LabeledGrid, RasterElement};
use crate::types::{Crs, ResamplingMethod};

/// Spans within this many pixels of a whole number are not rounded up
const PIXEL_SNAP_TOLERANCE: f64 = 1e-6;

/// Errors encountered when using the GDAL backend
#[derive(Debug, Error)]
pub enum GdalError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] GdalCrateError),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Dimension mismatch: expected {0}x{1}, got {2}x{3}")]
    DimensionMismatch(usize, usize, usize, usize),
    #[error("{call} failed: {message}")]
    Call { call: &'static str, message: String },
}

impl From<GdalCrateError> for Error {
    fn from(e: GdalCrateError) -> Self {
        Error::Gdal(GdalError::Gdal(e))
    }
}

// Helper to extract EPSG code from WKT authority tag
fn parse_epsg(wkt: &str) -> Option<String> {
    const KEY: &str = "AUTHORITY[\"EPSG\",\"";
    if let Some(idx) = wkt.rfind(KEY) {
        let start = idx + KEY.len();
        if let Some(end) = wkt[start..].find('"') {
            let code = &wkt[start..start + end];
            return Some(format!("EPSG:{}", code));
        }
    }
    None
}

fn last_cpl_error() -> String {
    unsafe {
        let msg = gdal_sys::CPLGetLastErrorMsg();
        if msg.is_null() {
            String::new()
        } else {
            CStr::from_ptr(msg).to_string_lossy().into_owned()
        }
    }
}

fn spatial_ref(crs: &Crs) -> Result<SpatialRef> {
    SpatialRef::from_definition(crs.as_str()).map_err(|e| {
        CrsError::Invalid {
            crs: crs.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// OGC WKT for any definition GDAL understands (EPSG code, WKT, PROJ string)
pub fn crs_to_wkt(crs: &Crs) -> Result<String> {
    spatial_ref(crs)?.to_wkt().map_err(|e| {
        CrsError::Invalid {
            crs: crs.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

fn resample_alg(method: ResamplingMethod) -> gdal_sys::GDALResampleAlg::Type {
    use gdal_sys::GDALResampleAlg::*;
    match method {
        ResamplingMethod::Nearest => GRA_NearestNeighbour,
        ResamplingMethod::Bilinear => GRA_Bilinear,
        ResamplingMethod::Cubic => GRA_Cubic,
        ResamplingMethod::CubicSpline => GRA_CubicSpline,
        ResamplingMethod::Lanczos => GRA_Lanczos,
        ResamplingMethod::Average => GRA_Average,
        ResamplingMethod::Mode => GRA_Mode,
    }
}

/// In-memory single-band dataset with georeferencing attached
fn mem_dataset<T: RasterElement>(
    cols: usize,
    rows: usize,
    transform: &AffineTransform,
    wkt: &str,
) -> Result<Dataset> {
    let driver = DriverManager::get_driver_by_name("MEM")?;
    let mut ds = driver.create_with_band_type::<T, _>("", cols, rows, 1)?;
    ds.set_geo_transform(&transform.to_gdal())?;
    ds.set_projection(wkt)?;
    Ok(ds)
}

/// Number of whole pixels of size `res` needed to cover `span`
fn pixel_count(span: f64, res: f64) -> usize {
    let n = span.abs() / res;
    let rounded = n.round();
    let n = if (n - rounded).abs() < PIXEL_SNAP_TOLERANCE {
        rounded
    } else {
        n.ceil()
    };
    (n as usize).max(1)
}

/// Keep the north-west corner of `grid`, re-tile it with square `res` pixels
fn snap_to_resolution(grid: &DestinationGrid, res: f64) -> DestinationGrid {
    let t = &grid.transform;
    let x0 = t.c;
    let x1 = t.c + t.a * grid.width as f64;
    let y0 = t.f;
    let y1 = t.f + t.e * grid.height as f64;
    let (xmin, xmax) = (x0.min(x1), x0.max(x1));
    let (ymin, ymax) = (y0.min(y1), y0.max(y1));
    DestinationGrid {
        transform: AffineTransform::translation(xmin, ymax) * AffineTransform::scale(res, -res),
        width: pixel_count(xmax - xmin, res),
        height: pixel_count(ymax - ymin, res),
    }
}

/// GDAL-backed resampling engine and transform calculator.
///
/// Buffers are staged in MEM datasets and warped with `GDALReprojectImage`;
/// destination sizing uses `GDALSuggestedWarpOutput2`.
#[derive(Debug, Clone, Copy)]
pub struct GdalWarper {
    /// Working memory for the warper in bytes; 0 lets GDAL decide
    pub warp_memory_limit: f64,
    /// Allowed error in pixels for the approximate transformer
    pub max_error: f64,
}

impl Default for GdalWarper {
    fn default() -> Self {
        GdalWarper {
            warp_memory_limit: 0.0,
            max_error: 0.125,
        }
    }
}

impl ResamplingEngine for GdalWarper {
    fn reproject<T: RasterElement>(
        &self,
        source: ArrayView2<'_, T>,
        destination: &mut Array2<T>,
        params: &WarpParams<'_>,
    ) -> Result<()> {
        let (src_rows, src_cols) = source.dim();
        let (dst_rows, dst_cols) = destination.dim();
        let src_wkt = crs_to_wkt(params.src_crs)?;
        let dst_wkt = crs_to_wkt(params.dst_crs)?;

        let src_ds = mem_dataset::<T>(src_cols, src_rows, &params.src_transform, &src_wkt)?;
        {
            let mut band = src_ds.rasterband(1)?;
            band.set_no_data_value(Some(params.src_nodata))?;
            let mut buf = Buffer::new((src_cols, src_rows), source.iter().copied().collect());
            band.write((0, 0), (src_cols, src_rows), &mut buf)?;
        }

        let dst_ds = mem_dataset::<T>(dst_cols, dst_rows, &params.dst_transform, &dst_wkt)?;
        {
            let mut band = dst_ds.rasterband(1)?;
            band.set_no_data_value(Some(params.dst_nodata))?;
            band.fill(params.dst_nodata, None)?;
        }

        debug!(
            "GDALReprojectImage {}x{} -> {}x{} ({})",
            src_cols, src_rows, dst_cols, dst_rows, params.resampling
        );
        let rc = unsafe {
            gdal_sys::GDALReprojectImage(
                src_ds.c_dataset(),
                std::ptr::null(),
                dst_ds.c_dataset(),
                std::ptr::null(),
                resample_alg(params.resampling),
                self.warp_memory_limit,
                self.max_error,
                None,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
            )
        };
        if rc != gdal_sys::CPLErr::CE_None {
            return Err(GdalError::Call {
                call: "GDALReprojectImage",
                message: last_cpl_error(),
            }
            .into());
        }

        let band = dst_ds.rasterband(1)?;
        let buf = band.read_as::<T>((0, 0), (dst_cols, dst_rows), (dst_cols, dst_rows), None)?;
        let warped = Array2::from_shape_vec((dst_rows, dst_cols), buf.data().to_vec())
            .map_err(|_| GdalError::DimensionMismatch(dst_cols, dst_rows, dst_cols, dst_rows))?;
        destination.assign(&warped);
        Ok(())
    }
}

impl TransformCalculator for GdalWarper {
    fn calculate_default_transform(
        &self,
        src_crs: &Crs,
        dst_crs: &Crs,
        width: usize,
        height: usize,
        bounds: &Bounds,
        resolution: Option<f64>,
    ) -> Result<DestinationGrid> {
        if let Some(res) = resolution {
            if !(res.is_finite() && res > 0.0) {
                return Err(Error::InvalidArgument {
                    arg: "dst_resolution",
                    value: res.to_string(),
                });
            }
        }
        let src_srs = spatial_ref(src_crs)?;
        let dst_srs = spatial_ref(dst_crs)?;
        let src_transform = AffineTransform::from_bounds(
            bounds.left,
            bounds.bottom,
            bounds.right,
            bounds.top,
            width,
            height,
        );

        let suggested = if src_srs == dst_srs {
            debug!("Source and destination CRS match; keeping source extent");
            DestinationGrid {
                transform: src_transform,
                width,
                height,
            }
        } else {
            suggest_warp_output(&src_srs, &dst_srs, width, height, &src_transform, src_crs, dst_crs)?
        };

        Ok(match resolution {
            Some(res) => snap_to_resolution(&suggested, res),
            None => suggested,
        })
    }
}

fn suggest_warp_output(
    src_srs: &SpatialRef,
    dst_srs: &SpatialRef,
    width: usize,
    height: usize,
    src_transform: &AffineTransform,
    src_crs: &Crs,
    dst_crs: &Crs,
) -> Result<DestinationGrid> {
    let unsupported = |reason: String| CrsError::Unsupported {
        src: src_crs.to_string(),
        dst: dst_crs.to_string(),
        reason,
    };

    let driver = DriverManager::get_driver_by_name("MEM")?;
    let mut ds = driver.create("", width, height, 0)?;
    ds.set_geo_transform(&src_transform.to_gdal())?;
    ds.set_projection(&src_srs.to_wkt()?)?;

    let mut options = CslStringList::new();
    options.set_name_value("DST_SRS", &dst_srs.to_wkt()?)?;

    let mut gt = [0.0f64; 6];
    let mut pixels: std::ffi::c_int = 0;
    let mut lines: std::ffi::c_int = 0;
    let mut extent = [0.0f64; 4];
    let rc = unsafe {
        let transformer = gdal_sys::GDALCreateGenImgProjTransformer2(
            ds.c_dataset(),
            std::ptr::null_mut(),
            options.as_ptr() as _,
        );
        if transformer.is_null() {
            return Err(unsupported(last_cpl_error()).into());
        }
        let rc = gdal_sys::GDALSuggestedWarpOutput2(
            ds.c_dataset(),
            Some(gdal_sys::GDALGenImgProjTransform),
            transformer,
            gt.as_mut_ptr(),
            &mut pixels,
            &mut lines,
            extent.as_mut_ptr(),
            0,
        );
        gdal_sys::GDALDestroyGenImgProjTransformer(transformer);
        rc
    };
    if rc != gdal_sys::CPLErr::CE_None || pixels <= 0 || lines <= 0 {
        return Err(unsupported(last_cpl_error()).into());
    }

    Ok(DestinationGrid {
        transform: AffineTransform::from_gdal(gt),
        width: pixels as usize,
        height: lines as usize,
    })
}

/// Metadata extracted from a GDAL-supported dataset
#[derive(Debug, Clone)]
pub struct GdalMetadata {
    /// Width (pixels) of the raster
    pub size_x: usize,
    /// Height (lines) of the raster
    pub size_y: usize,
    /// Number of raster bands
    pub bands: usize,
    /// Affine geotransform coefficients ([origin_x, pixel_width, rot_x, origin_y, rot_y, pixel_height])
    pub geotransform: [f64; 6],
    /// Projection, shortened to `EPSG:xxxx` when the WKT carries an EPSG authority
    pub projection: String,
    /// Geographic (lon/lat) CRS
    pub geographic: bool,
    /// Additional metadata key-value pairs
    pub metadata: HashMap<String, String>,
}

/// Loads bands of a GDAL-supported raster as labeled grids
pub struct GdalGridReader {
    pub dataset: Dataset,
    pub metadata: GdalMetadata,
}

impl GdalGridReader {
    /// Open a GDAL-supported dataset (e.g., GeoTIFF, NetCDF, HDF5, ENVI)
    pub fn open<P: AsRef<Path>>(path: P) -> std::result::Result<Self, GdalError> {
        let dataset = Dataset::open(path.as_ref())?;
        let (size_x, size_y) = dataset.raster_size();
        let (size_x, size_y) = (size_x as usize, size_y as usize);
        let bands = dataset.raster_count() as usize;
        if bands == 0 {
            return Err(GdalError::UnsupportedFormat("No raster bands found".into()));
        }
        let geotransform = match dataset.geo_transform() {
            Ok(gt) => gt,
            Err(_) => [0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        };
        let proj = dataset.projection();
        let geographic = dataset
            .spatial_ref()
            .map(|srs| srs.is_geographic())
            .unwrap_or(false);
        let projection = if proj.starts_with("EPSG:") {
            proj
        } else if let Some(code) = parse_epsg(&proj) {
            code
        } else {
            proj
        };
        // Collect metadata entries (domain "")
        let mut metadata_map = HashMap::new();
        if let Some(entries) = dataset.metadata_domain("") {
            for entry in entries {
                if let Some((key, val)) = entry.split_once('=') {
                    metadata_map.insert(key.to_string(), val.to_string());
                }
            }
        }
        Ok(GdalGridReader {
            dataset,
            metadata: GdalMetadata {
                size_x,
                size_y,
                bands,
                geotransform,
                projection,
                geographic,
                metadata: metadata_map,
            },
        })
    }

    /// Read a single band (1-based index) as an ndarray of shape (height, width)
    pub fn read_band<T: RasterElement>(
        &self,
        index: usize,
    ) -> std::result::Result<Array2<T>, GdalError> {
        if index == 0 || index > self.metadata.bands {
            return Err(GdalError::UnsupportedFormat(format!(
                "Band index {} out of range",
                index
            )));
        }
        let band = self.dataset.rasterband(index)?;
        let window = (self.metadata.size_x, self.metadata.size_y);
        let buf = band.read_as::<T>((0, 0), window, window, None)?;
        let data_vec = buf.data().to_vec();
        Array2::from_shape_vec((self.metadata.size_y, self.metadata.size_x), data_vec).map_err(
            |_| {
                GdalError::DimensionMismatch(
                    self.metadata.size_x,
                    self.metadata.size_y,
                    self.metadata.size_x,
                    self.metadata.size_y,
                )
            },
        )
    }

    /// Read a band in its native type as a labeled grid.
    ///
    /// Coordinates mark the upper-left corner of each pixel, matching the
    /// affine convention of the reprojection core; dims are `latitude`/`longitude` for
    /// geographic CRSs and `y`/`x` otherwise.
    pub fn read_grid(&self, index: usize) -> Result<LabeledGrid> {
        let gt = self.metadata.geotransform;
        if gt[2] != 0.0 || gt[4] != 0.0 {
            return Err(Error::UnsupportedLayout(format!(
                "rotated geotransform {:?}",
                gt
            )));
        }

        if index == 0 || index > self.metadata.bands {
            return Err(GdalError::UnsupportedFormat(format!(
                "Band index {} out of range",
                index
            ))
            .into());
        }
        let band_type = self.dataset.rasterband(index)?.band_type();
        let data: GridArray = match band_type {
            GdalDataType::UInt8 => self.read_band::<u8>(index)?.into(),
            GdalDataType::UInt16 => self.read_band::<u16>(index)?.into(),
            GdalDataType::Int16 => self.read_band::<i16>(index)?.into(),
            GdalDataType::UInt32 => self.read_band::<u32>(index)?.into(),
            GdalDataType::Int32 => self.read_band::<i32>(index)?.into(),
            GdalDataType::Float32 => self.read_band::<f32>(index)?.into(),
            GdalDataType::Float64 => self.read_band::<f64>(index)?.into(),
            other => {
                return Err(GdalError::UnsupportedFormat(format!("band type {:?}", other)).into());
            }
        };

        let (x_dim, y_dim) = if self.metadata.geographic {
            ("longitude", "latitude")
        } else {
            ("x", "y")
        };
        let xs = Array1::from_shape_fn(self.metadata.size_x, |i| gt[0] + i as f64 * gt[1]);
        let ys = Array1::from_shape_fn(self.metadata.size_y, |j| gt[3] + j as f64 * gt[5]);
        let mut coords = Coords::new();
        coords.insert(x_dim.to_string(), xs);
        coords.insert(y_dim.to_string(), ys);

        let mut attrs: Attrs = self
            .metadata
            .metadata
            .iter()
            .map(|(k, v)| (k.clone(), AttrValue::Text(v.clone())))
            .collect();
        if !self.metadata.projection.is_empty() {
            attrs.insert(
                CRS_ATTR.to_string(),
                AttrValue::Text(self.metadata.projection.clone()),
            );
        }
        if let Some(nodata) = self.dataset.rasterband(index)?.no_data_value() {
            attrs.insert("_FillValue".to_string(), AttrValue::Float(nodata));
        }

        info!(
            "Read band {} as {} grid {}x{} ({})",
            index,
            data.dtype(),
            self.metadata.size_x,
            self.metadata.size_y,
            self.metadata.projection
        );
        LabeledGrid::new(
            data,
            vec![y_dim.to_string(), x_dim.to_string()],
            coords,
            attrs,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_epsg_takes_outermost_authority() {
        let wkt = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],AUTHORITY["EPSG","4326"]]"#;
        assert_eq!(parse_epsg(wkt), Some("EPSG:4326".to_string()));
        assert_eq!(parse_epsg("LOCAL_CS[\"unknown\"]"), None);
    }

    #[test]
    fn test_pixel_count_snaps_near_integers() {
        assert_eq!(pixel_count(3.0000000001, 1.0), 3);
        assert_eq!(pixel_count(3.2, 1.0), 4);
        assert_eq!(pixel_count(-2.0, 0.5), 4);
        assert_eq!(pixel_count(0.0, 1.0), 1);
    }

    #[test]
    fn test_snap_to_resolution_keeps_north_west_corner() {
        let grid = DestinationGrid {
            transform: AffineTransform::new(1.0, 0.0, 10.0, 0.0, -1.0, 50.0),
            width: 4,
            height: 3,
        };
        let snapped = snap_to_resolution(&grid, 0.5);
        assert_eq!((snapped.width, snapped.height), (8, 6));
        assert_eq!(snapped.transform.apply(0.0, 0.0), (10.0, 50.0));
        assert_eq!(snapped.transform.e, -0.5);
    }
}
