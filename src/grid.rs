//! In-memory labeled grid: typed values with named dimensions, per-dimension
//! coordinate arrays and free-form attributes.
use std::collections::BTreeMap;

use gdal::raster::GdalType;
use ndarray::{Array1, ArrayD};
use num_traits::{NumCast, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Crs;

/// Attribute key holding the grid's CRS descriptor
pub const CRS_ATTR: &str = "spatial_ref";

/// Attribute value attached to a grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl AttrValue {
    /// Numeric view of the attribute. Text parses if it looks like a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(v) => Some(*v as f64),
            AttrValue::Float(v) => Some(*v),
            AttrValue::Text(s) => s.trim().parse::<f64>().ok(),
            AttrValue::Null => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }
}

impl std::fmt::Display for AttrValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::Float(v) => write!(f, "{}", v),
            AttrValue::Text(s) => write!(f, "{}", s),
            AttrValue::Null => Ok(()),
        }
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Text(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Text(v)
    }
}

pub type Coords = BTreeMap<String, Array1<f64>>;
pub type Attrs = BTreeMap<String, AttrValue>;

/// Element types a grid can hold. Mirrors the GDAL-native raster types.
pub trait RasterElement:
    GdalType + Copy + PartialEq + Zero + NumCast + ToPrimitive + std::fmt::Debug + 'static
{
    /// Short dtype name used in logs and errors
    const DTYPE: &'static str;

    fn wrap(array: ArrayD<Self>) -> GridArray;
}

macro_rules! raster_element {
    ($($ty:ty => $variant:ident, $name:literal;)*) => {
        $(
            impl RasterElement for $ty {
                const DTYPE: &'static str = $name;

                fn wrap(array: ArrayD<Self>) -> GridArray {
                    GridArray::$variant(array)
                }
            }
        )*
    };
}

raster_element! {
    u8 => U8, "uint8";
    u16 => U16, "uint16";
    i16 => I16, "int16";
    u32 => U32, "uint32";
    i32 => I32, "int32";
    f32 => F32, "float32";
    f64 => F64, "float64";
}

/// Typed value storage of a grid
#[derive(Debug, Clone, PartialEq)]
pub enum GridArray {
    U8(ArrayD<u8>),
    U16(ArrayD<u16>),
    I16(ArrayD<i16>),
    U32(ArrayD<u32>),
    I32(ArrayD<i32>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
}

/// Runs `$body` with `$arr` bound to the typed array inside a `GridArray`.
#[macro_export]
macro_rules! with_grid_array {
    ($value:expr, $arr:ident => $body:expr) => {
        match $value {
            $crate::grid::GridArray::U8($arr) => $body,
            $crate::grid::GridArray::U16($arr) => $body,
            $crate::grid::GridArray::I16($arr) => $body,
            $crate::grid::GridArray::U32($arr) => $body,
            $crate::grid::GridArray::I32($arr) => $body,
            $crate::grid::GridArray::F32($arr) => $body,
            $crate::grid::GridArray::F64($arr) => $body,
        }
    };
}

impl GridArray {
    pub fn shape(&self) -> &[usize] {
        with_grid_array!(self, a => a.shape())
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    pub fn dtype(&self) -> &'static str {
        match self {
            GridArray::U8(_) => u8::DTYPE,
            GridArray::U16(_) => u16::DTYPE,
            GridArray::I16(_) => i16::DTYPE,
            GridArray::U32(_) => u32::DTYPE,
            GridArray::I32(_) => i32::DTYPE,
            GridArray::F32(_) => f32::DTYPE,
            GridArray::F64(_) => f64::DTYPE,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, GridArray::F32(_) | GridArray::F64(_))
    }

    /// Copy of the values widened to `f64`
    pub fn to_f64(&self) -> ArrayD<f64> {
        with_grid_array!(self, a => a.mapv(|v| v.to_f64().unwrap_or(f64::NAN)))
    }
}

impl<T: RasterElement> From<ArrayD<T>> for GridArray {
    fn from(array: ArrayD<T>) -> Self {
        T::wrap(array)
    }
}

impl<T: RasterElement> From<ndarray::Array2<T>> for GridArray {
    fn from(array: ndarray::Array2<T>) -> Self {
        T::wrap(array.into_dyn())
    }
}

/// A grid of values indexed by named dimensions, with coordinate arrays and attributes
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledGrid {
    data: GridArray,
    dims: Vec<String>,
    coords: Coords,
    attrs: Attrs,
}

impl LabeledGrid {
    /// Build a grid, checking that dims are unique, match the array rank, and each
    /// has a coordinate array of the matching length.
    pub fn new(
        data: impl Into<GridArray>,
        dims: Vec<String>,
        coords: Coords,
        attrs: Attrs,
    ) -> Result<Self> {
        let data = data.into();
        let shape = data.shape();
        if dims.len() != shape.len() {
            return Err(Error::InvalidGrid(format!(
                "{} dimension names for an array of rank {}",
                dims.len(),
                shape.len()
            )));
        }
        for (i, dim) in dims.iter().enumerate() {
            if dims[..i].contains(dim) {
                return Err(Error::InvalidGrid(format!("duplicate dimension '{}'", dim)));
            }
            let coord = coords.get(dim).ok_or_else(|| {
                Error::InvalidGrid(format!("no coordinate array for dimension '{}'", dim))
            })?;
            if coord.len() != shape[i] {
                return Err(Error::InvalidGrid(format!(
                    "coordinate '{}' has length {}, dimension size is {}",
                    dim,
                    coord.len(),
                    shape[i]
                )));
            }
        }
        Ok(LabeledGrid {
            data,
            dims,
            coords,
            attrs,
        })
    }

    pub fn data(&self) -> &GridArray {
        &self.data
    }

    pub fn into_data(self) -> GridArray {
        self.data
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn has_dim(&self, name: &str) -> bool {
        self.dims.iter().any(|d| d == name)
    }

    pub fn coords(&self) -> &Coords {
        &self.coords
    }

    pub fn coord(&self, name: &str) -> Option<&Array1<f64>> {
        self.coords.get(name)
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut Attrs {
        &mut self.attrs
    }

    /// Size of a named dimension
    pub fn dim_size(&self, name: &str) -> Option<usize> {
        self.dims
            .iter()
            .position(|d| d == name)
            .map(|i| self.data.shape()[i])
    }

    /// CRS descriptor from the `spatial_ref` attribute, when set to text
    pub fn crs(&self) -> Option<Crs> {
        self.attrs
            .get(CRS_ATTR)
            .and_then(AttrValue::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(Crs::from)
    }
}
