//! GeoTIFF write/read and directory batch tests.

use gridwarp::api::{FileOptions, ReprojectTarget, process_directory_to_path};
use gridwarp::grid::{Attrs, CRS_ATTR, Coords};
use gridwarp::{AttrValue, Crs, GdalGridReader, GridArray, LabeledGrid, ReprojectParams};
use ndarray::{Array1, Array2};

fn utm_grid() -> LabeledGrid {
    let mut coords = Coords::new();
    // upper-left pixel corners of a 30 m grid
    coords.insert(
        "x".into(),
        Array1::from_shape_fn(4, |i| 500015.0 + 30.0 * i as f64),
    );
    coords.insert(
        "y".into(),
        Array1::from_shape_fn(3, |j| 4999985.0 - 30.0 * j as f64),
    );
    let mut attrs = Attrs::new();
    attrs.insert(CRS_ATTR.into(), "EPSG:32633".into());
    attrs.insert("_FillValue".into(), AttrValue::Int(-9999));
    attrs.insert("units".into(), "m".into());
    LabeledGrid::new(
        Array2::from_shape_fn((3, 4), |(r, c)| (r * 4 + c) as i16),
        vec!["y".into(), "x".into()],
        coords,
        attrs,
    )
    .unwrap()
}

#[test]
fn test_geotiff_round_trip_with_sidecar() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grid.tif");
    let grid = utm_grid();

    gridwarp::write_grid(&grid, &path, true).unwrap();
    let back = gridwarp::read_grid(&path, 1).unwrap();

    assert!(matches!(back.data(), GridArray::I16(_)));
    assert_eq!(back.data(), grid.data());
    assert_eq!(back.dims(), ["y", "x"]);
    for dim in ["x", "y"] {
        let written = grid.coord(dim).unwrap();
        let read = back.coord(dim).unwrap();
        assert_eq!(written.len(), read.len());
        for (a, b) in written.iter().zip(read.iter()) {
            assert!((a - b).abs() < 1e-6, "{dim}: {a} vs {b}");
        }
    }
    assert_eq!(back.crs(), Some(Crs::from("EPSG:32633")));
    assert_eq!(
        back.attrs().get("_FillValue").and_then(AttrValue::as_f64),
        Some(-9999.0)
    );
    assert_eq!(
        back.attrs().get("units").and_then(AttrValue::as_str),
        Some("m")
    );

    let sidecar = std::fs::read_to_string(dir.path().join("grid.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&sidecar).unwrap();
    assert_eq!(json["dtype"], "int16");
    assert_eq!(json["shape"], serde_json::json!([3, 4]));
    assert_eq!(json["crs"], "EPSG:32633");
}

#[test]
fn test_read_grid_rejects_bad_band() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grid.tif");
    gridwarp::write_grid(&utm_grid(), &path, false).unwrap();
    assert!(gridwarp::read_grid(&path, 2).is_err());
    assert!(!dir.path().join("grid.json").exists());
}

#[test]
fn test_directory_batch_reprojects_geotiffs() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    gridwarp::write_grid(&utm_grid(), &input.path().join("a.tif"), false).unwrap();
    gridwarp::write_grid(&utm_grid(), &input.path().join("b.tiff"), false).unwrap();
    std::fs::write(input.path().join("readme.txt"), "not a raster").unwrap();

    let report = process_directory_to_path(
        input.path(),
        output.path(),
        &ReprojectTarget::Crs(Crs::from("EPSG:4326")),
        &ReprojectParams::default(),
        &FileOptions::default(),
        false,
    )
    .unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.errors, 0);

    let warped = gridwarp::read_grid(&output.path().join("a.tif"), 1).unwrap();
    assert_eq!(warped.crs(), Some(Crs::from("EPSG:4326")));
    assert_eq!(warped.dims(), ["latitude", "longitude"]);
    assert!(warped.data().shape().iter().all(|&n| n >= 1));
}

#[test]
fn test_reproject_like_file_target() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.tif");
    let reference = dir.path().join("ref.tif");
    let output = dir.path().join("out.tif");
    gridwarp::write_grid(&utm_grid(), &input, false).unwrap();

    let mut coords = Coords::new();
    coords.insert("x".into(), Array1::from_shape_fn(8, |i| 500007.5 + 15.0 * i as f64));
    coords.insert("y".into(), Array1::from_shape_fn(6, |j| 4999992.5 - 15.0 * j as f64));
    let mut attrs = Attrs::new();
    attrs.insert(CRS_ATTR.into(), "EPSG:32633".into());
    let reference_grid = LabeledGrid::new(
        Array2::<f32>::zeros((6, 8)),
        vec!["y".into(), "x".into()],
        coords,
        attrs,
    )
    .unwrap();
    gridwarp::write_grid(&reference_grid, &reference, false).unwrap();

    gridwarp::reproject_file_to_path(
        &input,
        &output,
        &ReprojectTarget::Like(reference.clone()),
        &ReprojectParams::default(),
        &FileOptions::default(),
    )
    .unwrap();

    let out = gridwarp::read_grid(&output, 1).unwrap();
    assert_eq!(out.data().shape(), &[6, 8]);
}

// ============================================================================
// Georeferencing and nodata of reprojected files
// ============================================================================

fn utm_float_grid_without_nodata() -> LabeledGrid {
    let source = utm_grid();
    let mut attrs = Attrs::new();
    attrs.insert(CRS_ATTR.into(), "EPSG:32633".into());
    attrs.insert("units".into(), "m".into());
    LabeledGrid::new(
        Array2::from_shape_fn((3, 4), |(r, c)| (r * 4 + c) as f32),
        source.dims().to_vec(),
        source.coords().clone(),
        attrs,
    )
    .unwrap()
}

fn assert_geotransform(path: &std::path::Path, expected: [f64; 6]) {
    let gt = GdalGridReader::open(path).unwrap().metadata.geotransform;
    for (got, want) in gt.iter().zip(expected.iter()) {
        assert!((got - want).abs() < 1e-6, "{gt:?} vs {expected:?}");
    }
}

fn reproject_to_utm(input: &std::path::Path, output: &std::path::Path, params: &ReprojectParams) {
    gridwarp::reproject_file_to_path(
        input,
        output,
        &ReprojectTarget::Crs(Crs::from("EPSG:32633")),
        params,
        &FileOptions::default(),
    )
    .unwrap();
}

#[test]
fn test_coarser_resolution_keeps_upper_left_corner() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.tif");
    let output = dir.path().join("out.tif");
    gridwarp::write_grid(&utm_grid(), &input, false).unwrap();
    assert_geotransform(&input, [500015.0, 30.0, 0.0, 4999985.0, 0.0, -30.0]);

    reproject_to_utm(&input, &output, &ReprojectParams::default().with_resolution(60.0));

    assert_geotransform(&output, [500015.0, 60.0, 0.0, 4999985.0, 0.0, -60.0]);
    let out = gridwarp::read_grid(&output, 1).unwrap();
    assert_eq!(out.data().shape(), &[2, 2]);
    assert_eq!(out.coord("x").unwrap().to_vec(), vec![500015.0, 500075.0]);
}

#[test]
fn test_output_declares_nodata_used_for_missing_cells() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.tif");
    gridwarp::write_grid(&utm_float_grid_without_nodata(), &input, false).unwrap();
    let back = gridwarp::read_grid(&input, 1).unwrap();
    assert!(back.attrs().get("_FillValue").is_none());

    let params = ReprojectParams::default().with_resolution(60.0);
    let fill_value = |path: &std::path::Path| {
        gridwarp::read_grid(path, 1)
            .unwrap()
            .attrs()
            .get("_FillValue")
            .and_then(AttrValue::as_f64)
    };

    let default_out = dir.path().join("default.tif");
    reproject_to_utm(&input, &default_out, &params);
    assert_eq!(fill_value(&default_out), Some(-999.0));

    let bare_out = dir.path().join("bare.tif");
    reproject_to_utm(&input, &bare_out, &params.clone().with_copy_attributes(false));
    let bare = gridwarp::read_grid(&bare_out, 1).unwrap();
    assert!(bare.attrs().get("units").is_none());
    assert_eq!(fill_value(&bare_out), Some(-999.0));

    let nan_out = dir.path().join("nan.tif");
    reproject_to_utm(&input, &nan_out, &params.with_missing_as_nan(true));
    let masked = gridwarp::read_grid(&nan_out, 1).unwrap();
    assert!(matches!(masked.data(), GridArray::F64(_)));
    assert!(fill_value(&nan_out).is_some_and(f64::is_nan));
}

#[test]
fn test_single_pixel_output_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.tif");
    let output = dir.path().join("out.tif");
    gridwarp::write_grid(&utm_grid(), &input, false).unwrap();

    gridwarp::reproject_file_to_path(
        &input,
        &output,
        &ReprojectTarget::Crs(Crs::from("EPSG:32633")),
        &ReprojectParams::default().with_resolution(120.0),
        &FileOptions {
            sidecar: true,
            ..FileOptions::default()
        },
    )
    .unwrap();

    assert_geotransform(&output, [500015.0, 120.0, 0.0, 4999985.0, 0.0, -120.0]);
    let out = gridwarp::read_grid(&output, 1).unwrap();
    assert_eq!(out.data().shape(), &[1, 1]);

    let sidecar = std::fs::read_to_string(dir.path().join("out.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&sidecar).unwrap();
    assert_eq!(
        json["geotransform"],
        serde_json::json!([500015.0, 120.0, 0.0, 4999985.0, 0.0, -120.0])
    );
}
