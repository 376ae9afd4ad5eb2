use crate::error::{Error, Result};
use crate::grid::LabeledGrid;

/// Names of the x/y dimensions of a grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpatialDims {
    pub x: String,
    pub y: String,
}

impl SpatialDims {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        SpatialDims {
            x: x.into(),
            y: y.into(),
        }
    }
}

/// Identify the spatial x/y dimensions: `longitude`/`latitude` first, then `x`/`y`.
pub fn resolve_spatial_dims(grid: &LabeledGrid) -> Result<SpatialDims> {
    if grid.has_dim("latitude") && grid.has_dim("longitude") {
        Ok(SpatialDims::new("longitude", "latitude"))
    } else if grid.has_dim("x") && grid.has_dim("y") {
        Ok(SpatialDims::new("x", "y"))
    } else {
        Err(Error::DimensionResolution {
            dims: grid.dims().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Attrs, Coords};
    use ndarray::{Array1, Array2};

    fn grid_with_dims(y: &str, x: &str) -> LabeledGrid {
        let mut coords = Coords::new();
        coords.insert(y.to_string(), Array1::from(vec![1.0, 0.0]));
        coords.insert(x.to_string(), Array1::from(vec![0.0, 1.0]));
        LabeledGrid::new(
            Array2::<f32>::zeros((2, 2)),
            vec![y.to_string(), x.to_string()],
            coords,
            Attrs::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_resolves_projected_dims() {
        let dims = resolve_spatial_dims(&grid_with_dims("y", "x")).unwrap();
        assert_eq!(dims, SpatialDims::new("x", "y"));
    }

    #[test]
    fn test_resolves_geographic_dims() {
        let dims = resolve_spatial_dims(&grid_with_dims("latitude", "longitude")).unwrap();
        assert_eq!(dims.x, "longitude");
        assert_eq!(dims.y, "latitude");
    }

    #[test]
    fn test_rejects_other_conventions() {
        for (y, x) in [("lat", "lon"), ("northing", "easting"), ("latitude", "x")] {
            let err = resolve_spatial_dims(&grid_with_dims(y, x)).unwrap_err();
            match err {
                Error::DimensionResolution { dims } => {
                    assert_eq!(dims, vec![y.to_string(), x.to_string()])
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }
}
