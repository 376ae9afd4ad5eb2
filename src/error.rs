//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Precondition failures (dimensions, spacing, degenerate grids) are detected before
//! any engine call; CRS failures are surfaced from the GDAL backend unchanged.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures tied to a coordinate reference system descriptor
#[derive(Debug, Error)]
pub enum CrsError {
    #[error("missing CRS: attribute '{attr}' not set on {grid} grid")]
    Missing { attr: &'static str, grid: &'static str },

    #[error("invalid CRS '{crs}': {reason}")]
    Invalid { crs: String, reason: String },

    #[error("unsupported CRS pairing {src} -> {dst}: {reason}")]
    Unsupported {
        src: String,
        dst: String,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] crate::io::GdalError),

    #[error("CRS error: {0}")]
    Crs(#[from] CrsError),

    #[error("Cannot resolve spatial dimensions (need latitude/longitude or x/y), got: {dims:?}")]
    DimensionResolution { dims: Vec<String> },

    #[error("Non-uniform resolution: x={res_x}, y={res_y}")]
    NonUniformResolution { res_x: f64, res_y: f64 },

    #[error("Non-uniform coordinate spacing along '{dim}' at index {index}")]
    NonUniformSpacing { dim: String, index: usize },

    #[error("Degenerate grid along '{dim}': size {size}, resolution {resolution}")]
    DegenerateGrid {
        dim: String,
        size: usize,
        resolution: f64,
    },

    #[error("Unsupported grid layout: {0}")]
    UnsupportedLayout(String),

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Nodata value {nodata} is not representable as {dtype}")]
    NodataOutOfRange { nodata: f64, dtype: &'static str },

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },
}
