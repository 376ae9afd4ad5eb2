use serde::{Deserialize, Serialize};

use crate::types::{CoordinateEndpoint, DimensionNaming, ResamplingMethod};

/// Nodata sentinel used when a grid declares none
pub const DEFAULT_NODATA: f64 = -999.0;

/// Default resampling kernel
pub const DEFAULT_RESAMPLING: ResamplingMethod = ResamplingMethod::Nearest;

/// Reprojection parameters suitable for config files and CLI presets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReprojectParams {
    /// Destination pixel size in destination CRS units; None lets the calculator choose
    pub dst_resolution: Option<f64>,
    pub resampling: ResamplingMethod,
    /// Widen to f64 and replace nodata cells with NaN
    pub set_missing_to_nan: bool,
    /// Copy source attributes verbatim (CRS/bounds attributes are not updated)
    pub copy_attributes: bool,
    pub default_nodata: f64,
    pub coordinate_endpoint: CoordinateEndpoint,
    /// Output dimension naming for `reproject_like`
    pub dimension_naming: DimensionNaming,
    /// Reject spatial coordinates that are not evenly spaced
    pub check_spacing: bool,
}

impl Default for ReprojectParams {
    fn default() -> Self {
        Self {
            dst_resolution: None,
            resampling: DEFAULT_RESAMPLING,
            set_missing_to_nan: false,
            copy_attributes: true,
            default_nodata: DEFAULT_NODATA,
            coordinate_endpoint: CoordinateEndpoint::LastPixel,
            dimension_naming: DimensionNaming::Reference,
            check_spacing: true,
        }
    }
}

impl ReprojectParams {
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.dst_resolution = Some(resolution);
        self
    }

    pub fn with_resampling(mut self, resampling: ResamplingMethod) -> Self {
        self.resampling = resampling;
        self
    }

    pub fn with_missing_as_nan(mut self, enabled: bool) -> Self {
        self.set_missing_to_nan = enabled;
        self
    }

    pub fn with_copy_attributes(mut self, enabled: bool) -> Self {
        self.copy_attributes = enabled;
        self
    }
}
