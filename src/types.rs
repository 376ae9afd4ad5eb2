//! Shared types and enums used across gridwarp.
//! Includes the opaque `Crs` descriptor, `ResamplingMethod`, and the behavioural
//! switches (`ResolutionMode`, `CoordinateEndpoint`, `DimensionNaming`).
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Coordinate reference system descriptor (EPSG code, WKT, PROJ string).
///
/// Never parsed locally; interpretation belongs to the engines.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Crs(String);

impl Crs {
    pub fn new(definition: impl Into<String>) -> Self {
        Crs(definition.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Crs {
    fn from(s: &str) -> Self {
        Crs(s.to_string())
    }
}

impl From<String> for Crs {
    fn from(s: String) -> Self {
        Crs(s)
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResamplingMethod {
    Nearest,
    Bilinear,
    Cubic,
    #[value(name = "cubic_spline", alias = "cubic-spline")]
    CubicSpline,
    Lanczos,
    Average,
    Mode,
}

impl std::fmt::Display for ResamplingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResamplingMethod::Nearest => "nearest",
            ResamplingMethod::Bilinear => "bilinear",
            ResamplingMethod::Cubic => "cubic",
            ResamplingMethod::CubicSpline => "cubic_spline",
            ResamplingMethod::Lanczos => "lanczos",
            ResamplingMethod::Average => "average",
            ResamplingMethod::Mode => "mode",
        };
        write!(f, "{}", s)
    }
}

/// How two per-axis resolutions collapse into one scalar
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMode {
    /// Mean of the x and y magnitudes
    Average,
    /// Fail unless both magnitudes agree
    AssertEqual,
}

/// Where the generated coordinate arrays end
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateEndpoint {
    /// Last value is the transform applied at `(width-1, height-1)`
    LastPixel,
    /// Last value is the transform applied at `(width, height)`
    OuterCorner,
}

/// Which grid names the output spatial dimensions in `reproject_like`
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionNaming {
    Reference,
    Source,
}
