use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use gdal::{Dataset, Metadata};
use serde::Serialize;
use tracing::{info, warn};

use crate::core::affine::AffineTransform;
use crate::error::Result;
use crate::grid::{AttrValue, LabeledGrid};
use crate::io::writers::tiff::grid_geotransform;

/// JSON sidecar describing a written grid
#[derive(Debug, Serialize)]
pub struct GridSidecar<'a> {
    pub dims: &'a [String],
    pub shape: &'a [usize],
    pub dtype: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geotransform: Option<[f64; 6]>,
    pub attrs: &'a BTreeMap<String, AttrValue>,
    pub created: String,
}

impl<'a> GridSidecar<'a> {
    /// Describe `grid`; `transform` overrides the affine derived from its coordinates
    pub fn from_grid(grid: &'a LabeledGrid, transform: Option<&AffineTransform>) -> Self {
        let geotransform = match transform {
            Some(t) => Some(t.to_gdal()),
            None => match grid_geotransform(grid) {
                Ok(t) => Some(t.to_gdal()),
                Err(e) => {
                    warn!("Sidecar written without geotransform: {}", e);
                    None
                }
            },
        };
        GridSidecar {
            dims: grid.dims(),
            shape: grid.data().shape(),
            dtype: grid.data().dtype(),
            crs: grid.crs().map(|c| c.as_str().to_string()),
            geotransform,
            attrs: grid.attrs(),
            created: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Embed grid attributes into a GeoTIFF dataset as metadata items
pub fn embed_tiff_metadata(ds: &mut Dataset, grid: &LabeledGrid) -> Result<()> {
    for (key, value) in grid.attrs() {
        if value.is_null() {
            continue;
        }
        ds.set_metadata_item(key, &value.to_string(), "")?;
    }
    Ok(())
}

/// Write `<output>.json` next to the raster
pub fn write_metadata_sidecar(
    grid: &LabeledGrid,
    output_path: &Path,
    transform: Option<&AffineTransform>,
) -> Result<PathBuf> {
    let sidecar_path = output_path.with_extension("json");
    let json_string = serde_json::to_string_pretty(&GridSidecar::from_grid(grid, transform))?;
    std::fs::write(&sidecar_path, json_string)?;
    info!("Created metadata sidecar: {:?}", sidecar_path);
    Ok(sidecar_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Attrs, CRS_ATTR, Coords};
    use ndarray::{Array1, Array2};

    #[test]
    fn test_sidecar_contents() {
        let mut coords = Coords::new();
        coords.insert("x".into(), Array1::from(vec![0.5, 1.5]));
        coords.insert("y".into(), Array1::from(vec![1.5, 0.5]));
        let mut attrs = Attrs::new();
        attrs.insert(CRS_ATTR.into(), "EPSG:32633".into());
        attrs.insert("_FillValue".into(), AttrValue::Int(-9999));
        let grid = LabeledGrid::new(
            Array2::<i32>::zeros((2, 2)),
            vec!["y".into(), "x".into()],
            coords,
            attrs,
        )
        .unwrap();

        let json = serde_json::to_value(GridSidecar::from_grid(&grid, None)).unwrap();
        assert_eq!(json["dims"], serde_json::json!(["y", "x"]));
        assert_eq!(json["dtype"], "int32");
        assert_eq!(json["crs"], "EPSG:32633");
        assert_eq!(json["attrs"]["_FillValue"], -9999);
        assert_eq!(
            json["geotransform"],
            serde_json::json!([0.5, 1.0, 0.0, 1.5, 0.0, -1.0])
        );
        assert!(json["created"].as_str().is_some());
    }

    #[test]
    fn test_sidecar_for_single_column_uses_given_transform() {
        let mut coords = Coords::new();
        coords.insert("x".into(), Array1::from(vec![100.0]));
        coords.insert("y".into(), Array1::from(vec![50.0, 40.0]));
        let grid = LabeledGrid::new(
            Array2::<f32>::zeros((2, 1)),
            vec!["y".into(), "x".into()],
            coords,
            Attrs::new(),
        )
        .unwrap();

        let derived = serde_json::to_value(GridSidecar::from_grid(&grid, None)).unwrap();
        assert!(derived.get("geotransform").is_none());

        let transform = AffineTransform::new(10.0, 0.0, 100.0, 0.0, -10.0, 50.0);
        let json = serde_json::to_value(GridSidecar::from_grid(&grid, Some(&transform))).unwrap();
        assert_eq!(
            json["geotransform"],
            serde_json::json!([100.0, 10.0, 0.0, 50.0, 0.0, -10.0])
        );
    }
}
