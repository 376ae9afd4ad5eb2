#![doc = r#"
gridwarp — reproject geo-referenced labeled 2-D grids.

This crate takes a grid of values with named spatial dimensions (`latitude`/`longitude`
or `y`/`x`), coordinate arrays and attributes, and warps it into another coordinate
reference system or onto the CRS and resolution of a reference grid. Resampling and
destination sizing are delegated to pluggable engines; a GDAL backend is included and
powers the gridwarp CLI.

Requirements
------------
- GDAL development headers and runtime available on your system.
- Rust 2024 edition toolchain.

Quick start: reproject a file
-----------------------------
```rust,no_run
use std::path::Path;
use gridwarp::api::{FileOptions, ReprojectTarget, reproject_file_to_path};
use gridwarp::{Crs, ReprojectParams, ResamplingMethod};

fn main() -> gridwarp::Result<()> {
    let params = ReprojectParams::default()
        .with_resolution(30.0)
        .with_resampling(ResamplingMethod::Bilinear);

    reproject_file_to_path(
        Path::new("/data/dem.tif"),
        Path::new("/out/dem_utm.tif"),
        &ReprojectTarget::Crs(Crs::from("EPSG:32633")),
        &params,
        &FileOptions::default(),
    )
}
```

Reproject in memory
-------------------
```rust,no_run
use std::path::Path;
use gridwarp::{ResamplingMethod, read_grid, reproject_like};

fn main() -> gridwarp::Result<()> {
    let grid = read_grid(Path::new("/data/temperature.tif"), 1)?;
    let reference = read_grid(Path::new("/data/land_cover.tif"), 1)?;

    let aligned = reproject_like(&grid, &reference, ResamplingMethod::Average)?;
    println!("{:?} -> {:?}", grid.data().shape(), aligned.data().shape());
    Ok(())
}
```

Custom engines
--------------
Implement [`engine::ResamplingEngine`] and [`engine::TransformCalculator`] and hand them
to [`Reprojector::new`] to run the same orchestration over another backend.

Error handling
--------------
All public functions return `gridwarp::Result<T>`; match on [`Error`] variants to tell
dimension, spacing and CRS problems apart from backend failures.

```rust,no_run
use gridwarp::{Crs, CrsError, Error, ReprojectParams, read_grid, reproject};
use std::path::Path;

fn main() {
    let grid = match read_grid(Path::new("/data/in.tif"), 1) {
        Ok(g) => g,
        Err(e) => return eprintln!("read failed: {e}"),
    };
    match reproject(&grid, &Crs::from("EPSG:4326"), &Crs::from("EPSG:3857"), &ReprojectParams::default()) {
        Ok(_) => {}
        Err(Error::DimensionResolution { dims }) => eprintln!("no spatial dims in {dims:?}"),
        Err(Error::Crs(CrsError::Invalid { crs, .. })) => eprintln!("bad CRS {crs}"),
        Err(other) => eprintln!("Other error: {other}"),
    }
}
```

Useful modules
--------------
- [`api`] — high-level, ergonomic entry points.
- [`grid`] — the `LabeledGrid` container.
- [`core`] — dimension, extent and nodata resolution, planning and the `Reprojector`.
- [`engine`] — resampling engine and transform calculator seams.
- [`io`] — GDAL reader, warp backend and GeoTIFF writers.
- [`error`] — crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod engine;
pub mod error;
pub mod grid;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use core::affine::AffineTransform;
pub use core::params::ReprojectParams;
pub use core::processing::reproject::{Reprojected, Reprojector};
pub use error::{CrsError, Error, Result};
pub use grid::{AttrValue, GridArray, LabeledGrid, RasterElement};
pub use types::{CoordinateEndpoint, Crs, DimensionNaming, ResamplingMethod, ResolutionMode};

// Engines
pub use engine::{DestinationGrid, ResamplingEngine, TransformCalculator, WarpParams};

// Readers and writers
pub use io::gdal::{GdalError, GdalGridReader, GdalMetadata, GdalWarper};
pub use io::writers::metadata::{embed_tiff_metadata, write_metadata_sidecar};
pub use io::writers::tiff::write_grid_geotiff;

// High-level API re-exports
pub use api::{
    BatchReport, gdal_reprojector, process_directory_to_path, read_grid, reproject,
    reproject_file_to_path, reproject_like, write_grid,
};
