use ndarray::{Array2, ArrayD, Ix2};
use num_traits::{NumCast, ToPrimitive};
use tracing::{debug, info};

use crate::core::params::ReprojectParams;
use crate::core::processing::coords::warp_spatial_coords;
use crate::core::processing::dims::{SpatialDims, resolve_spatial_dims};
use crate::core::processing::extent::{GridExtent, source_affine};
use crate::core::processing::nodata::resolve_nodata;
use crate::core::processing::planner::{plan_destination, resolution_from_reference};
use crate::engine::{DestinationGrid, ResamplingEngine, TransformCalculator, WarpParams};
use crate::error::{CrsError, Error, Result};
use crate::grid::{Attrs, CRS_ATTR, GridArray, LabeledGrid, RasterElement};
use crate::types::{Crs, DimensionNaming};
use crate::with_grid_array;

/// A reprojected grid together with the destination grid it was sampled on
#[derive(Debug, Clone, PartialEq)]
pub struct Reprojected {
    pub grid: LabeledGrid,
    pub destination: DestinationGrid,
    /// Sentinel the engine used for cells without data
    pub nodata: f64,
}

/// Sequences dimension resolution, affine planning, nodata handling, resampling
/// and coordinate reconstruction around a resampling engine and a transform
/// calculator.
pub struct Reprojector<E, C> {
    engine: E,
    calculator: C,
}

impl<E: ResamplingEngine, C: TransformCalculator> Reprojector<E, C> {
    pub fn new(engine: E, calculator: C) -> Self {
        Reprojector { engine, calculator }
    }

    /// Reproject `grid` from `src_crs` to `dst_crs`.
    ///
    /// The result keeps the source dimension order. Attributes are copied verbatim
    /// when `params.copy_attributes` is set; CRS or bounds attributes are not
    /// rewritten for the new grid.
    pub fn reproject(
        &self,
        grid: &LabeledGrid,
        src_crs: &Crs,
        dst_crs: &Crs,
        params: &ReprojectParams,
    ) -> Result<LabeledGrid> {
        self.reproject_planned(grid, src_crs, dst_crs, params)
            .map(|r| r.grid)
    }

    /// `reproject`, also returning the destination grid and the nodata sentinel
    pub fn reproject_planned(
        &self,
        grid: &LabeledGrid,
        src_crs: &Crs,
        dst_crs: &Crs,
        params: &ReprojectParams,
    ) -> Result<Reprojected> {
        self.reproject_with_dims(grid, src_crs, dst_crs, params, None)
    }

    /// Reproject `grid` onto the CRS and (averaged) resolution of `reference`.
    ///
    /// Both grids must carry a `spatial_ref` attribute. With
    /// `DimensionNaming::Reference` the output spatial dimensions take the
    /// reference grid's names.
    pub fn reproject_like(
        &self,
        grid: &LabeledGrid,
        reference: &LabeledGrid,
        params: &ReprojectParams,
    ) -> Result<LabeledGrid> {
        self.reproject_like_planned(grid, reference, params)
            .map(|r| r.grid)
    }

    /// `reproject_like`, also returning the destination grid and the nodata sentinel
    pub fn reproject_like_planned(
        &self,
        grid: &LabeledGrid,
        reference: &LabeledGrid,
        params: &ReprojectParams,
    ) -> Result<Reprojected> {
        let src_crs = grid.crs().ok_or(CrsError::Missing {
            attr: CRS_ATTR,
            grid: "source",
        })?;
        let dst_crs = reference.crs().ok_or(CrsError::Missing {
            attr: CRS_ATTR,
            grid: "reference",
        })?;
        let reference_dims = resolve_spatial_dims(reference)?;
        let resolution = resolution_from_reference(reference, params.check_spacing)?;
        info!(
            "Matching reference grid: crs {}, resolution {}",
            dst_crs, resolution
        );

        let output_dims = match params.dimension_naming {
            DimensionNaming::Reference => Some(reference_dims),
            DimensionNaming::Source => None,
        };
        let params = params.clone().with_resolution(resolution);
        self.reproject_with_dims(grid, &src_crs, &dst_crs, &params, output_dims.as_ref())
    }

    fn reproject_with_dims(
        &self,
        grid: &LabeledGrid,
        src_crs: &Crs,
        dst_crs: &Crs,
        params: &ReprojectParams,
        output_dims: Option<&SpatialDims>,
    ) -> Result<Reprojected> {
        let dims = resolve_spatial_dims(grid)?;
        check_layout(grid, &dims)?;

        let extent = GridExtent::from_grid(grid, &dims, params.check_spacing)?;
        let src_transform = source_affine(&extent.bounds, &extent.resolution);

        let nodata = match resolve_nodata(grid.attrs()) {
            Some(v) => v,
            None => {
                debug!(
                    "No nodata attribute, using default {}",
                    params.default_nodata
                );
                params.default_nodata
            }
        };
        with_grid_array!(grid.data(), a => check_nodata(a, nodata)?);

        let dst = plan_destination(
            &self.calculator,
            &extent,
            src_crs,
            dst_crs,
            params.dst_resolution,
        )?;

        let warp = WarpParams {
            src_transform,
            src_crs,
            src_nodata: nodata,
            dst_transform: dst.transform,
            dst_crs,
            dst_nodata: nodata,
            resampling: params.resampling,
        };
        info!(
            "Reprojecting {}x{} {} grid -> {}x{} ({}, nodata {})",
            extent.width,
            extent.height,
            grid.data().dtype(),
            dst.width,
            dst.height,
            params.resampling,
            nodata
        );
        let data = with_grid_array!(grid.data(), source => {
            self.warp_array(source, &dst, &warp, params.set_missing_to_nan)?
        });

        let out_dims = output_dims.unwrap_or(&dims);
        let (xs, ys) = warp_spatial_coords(
            &dst.transform,
            dst.width,
            dst.height,
            params.coordinate_endpoint,
        );
        let mut coords = grid.coords().clone();
        coords.remove(&dims.x);
        coords.remove(&dims.y);
        coords.insert(out_dims.x.clone(), xs);
        coords.insert(out_dims.y.clone(), ys);

        let new_dims = grid
            .dims()
            .iter()
            .map(|d| {
                if *d == dims.x {
                    out_dims.x.clone()
                } else if *d == dims.y {
                    out_dims.y.clone()
                } else {
                    d.clone()
                }
            })
            .collect();

        let attrs = if params.copy_attributes {
            grid.attrs().clone()
        } else {
            Attrs::new()
        };

        Ok(Reprojected {
            grid: LabeledGrid::new(data, new_dims, coords, attrs)?,
            destination: dst,
            nodata: if params.set_missing_to_nan {
                f64::NAN
            } else {
                nodata
            },
        })
    }

    fn warp_array<T: RasterElement>(
        &self,
        source: &ArrayD<T>,
        dst: &DestinationGrid,
        warp: &WarpParams<'_>,
        set_missing_to_nan: bool,
    ) -> Result<GridArray> {
        let nodata = nodata_as::<T>(warp.src_nodata)?;
        let source = source
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|e| Error::UnsupportedLayout(e.to_string()))?
            .to_owned();

        let mut destination = Array2::<T>::zeros((dst.height, dst.width));
        self.engine
            .reproject(source.view(), &mut destination, warp)?;

        if set_missing_to_nan {
            Ok(GridArray::F64(mask_nodata(&destination, nodata).into_dyn()))
        } else {
            Ok(T::wrap(destination.into_dyn()))
        }
    }
}

/// The grid must be 2-D and laid out `(y, x)`
fn check_layout(grid: &LabeledGrid, dims: &SpatialDims) -> Result<()> {
    let expected = [dims.y.as_str(), dims.x.as_str()];
    if grid.dims().len() != 2 {
        return Err(Error::UnsupportedLayout(format!(
            "expected 2 dimensions, got {:?}",
            grid.dims()
        )));
    }
    if grid.dims()[0] != expected[0] || grid.dims()[1] != expected[1] {
        return Err(Error::UnsupportedLayout(format!(
            "expected dimension order {:?}, got {:?}",
            expected,
            grid.dims()
        )));
    }
    Ok(())
}

fn check_nodata<T: RasterElement>(_data: &ArrayD<T>, nodata: f64) -> Result<()> {
    nodata_as::<T>(nodata).map(|_| ())
}

/// Cast the sentinel into the element type, rejecting lossy casts
fn nodata_as<T: RasterElement>(nodata: f64) -> Result<T> {
    let value: Option<T> = NumCast::from(nodata);
    match value {
        Some(v)
            if v
                .to_f64()
                .is_some_and(|back| back == nodata || (back.is_nan() && nodata.is_nan())) =>
        {
            Ok(v)
        }
        _ => Err(Error::NodataOutOfRange {
            nodata,
            dtype: T::DTYPE,
        }),
    }
}

/// Widen to f64 with sentinel cells replaced by NaN
fn mask_nodata<T: RasterElement>(data: &Array2<T>, nodata: T) -> Array2<f64> {
    data.mapv(|v| {
        if v == nodata {
            f64::NAN
        } else {
            v.to_f64().unwrap_or(f64::NAN)
        }
    })
}
