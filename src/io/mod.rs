//! I/O layer for GDAL-backed rasters.
//! Provides the `gdal` reader and warp backend, and `writers` for GeoTIFF
//! outputs and metadata embedding/sidecars.
pub mod gdal;
pub use gdal::{GdalError, GdalGridReader, GdalMetadata, GdalWarper, crs_to_wkt};

pub mod writers;
