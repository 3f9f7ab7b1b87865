//! Materialized dataset values.

use ndarray::{ArrayD, Zip};

use crate::dtype::ElementType;

/// An n-dimensional array in one of the five storage classes.
///
/// Signed and unsigned integers of every width share the 64-bit storage of
/// their class; the exact [`ElementType`] travels alongside in the dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayValues {
    Bool(ArrayD<bool>),
    Int(ArrayD<i64>),
    UInt(ArrayD<u64>),
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
}

impl ArrayValues {
    pub fn shape(&self) -> &[usize] {
        match self {
            ArrayValues::Bool(a) => a.shape(),
            ArrayValues::Int(a) => a.shape(),
            ArrayValues::UInt(a) => a.shape(),
            ArrayValues::Float32(a) => a.shape(),
            ArrayValues::Float64(a) => a.shape(),
        }
    }

    /// Convert into the storage class of `to`.
    pub fn cast(&self, to: ElementType) -> ArrayValues {
        match to {
            ElementType::Bool => ArrayValues::Bool(self.map_to(|b| b, |i| i != 0, |u| u != 0, |f| f != 0.0)),
            t if t.is_signed_int() => {
                ArrayValues::Int(self.map_to(i64::from, |i| i, |u| u as i64, |f| f as i64))
            }
            t if t.is_unsigned_int() => {
                ArrayValues::UInt(self.map_to(u64::from, |i| i as u64, |u| u, |f| f as u64))
            }
            ElementType::Float32 => ArrayValues::Float32(self.map_to(
                |b| f32::from(u8::from(b)),
                |i| i as f32,
                |u| u as f32,
                |f| f as f32,
            )),
            _ => ArrayValues::Float64(self.map_to(
                |b| f64::from(u8::from(b)),
                |i| i as f64,
                |u| u as f64,
                |f| f,
            )),
        }
    }

    fn map_to<T: Clone>(
        &self,
        from_bool: impl Fn(bool) -> T,
        from_int: impl Fn(i64) -> T,
        from_uint: impl Fn(u64) -> T,
        from_float: impl Fn(f64) -> T,
    ) -> ArrayD<T> {
        match self {
            ArrayValues::Bool(a) => a.mapv(from_bool),
            ArrayValues::Int(a) => a.mapv(from_int),
            ArrayValues::UInt(a) => a.mapv(from_uint),
            ArrayValues::Float32(a) => a.mapv(|x| from_float(f64::from(x))),
            ArrayValues::Float64(a) => a.mapv(from_float),
        }
    }

    /// Element-wise equality of two arrays of the same storage class and shape.
    ///
    /// NaN compares equal to NaN only when `equal_nan` is set.
    pub fn array_equal(&self, other: &ArrayValues, equal_nan: bool) -> bool {
        if self.shape() != other.shape() {
            return false;
        }
        match (self, other) {
            (ArrayValues::Bool(a), ArrayValues::Bool(b)) => a == b,
            (ArrayValues::Int(a), ArrayValues::Int(b)) => a == b,
            (ArrayValues::UInt(a), ArrayValues::UInt(b)) => a == b,
            (ArrayValues::Float32(a), ArrayValues::Float32(b)) => Zip::from(a)
                .and(b)
                .all(|&x, &y| x == y || (equal_nan && x.is_nan() && y.is_nan())),
            (ArrayValues::Float64(a), ArrayValues::Float64(b)) => Zip::from(a)
                .and(b)
                .all(|&x, &y| x == y || (equal_nan && x.is_nan() && y.is_nan())),
            _ => false,
        }
    }

    /// True when both arrays hold NaN at exactly the same positions.
    ///
    /// Non-float storage never holds NaN, so two such arrays always match.
    pub fn nan_mask_matches(&self, other: &ArrayValues) -> bool {
        if self.shape() != other.shape() {
            return false;
        }
        match (self, other) {
            (ArrayValues::Float32(a), ArrayValues::Float32(b)) => {
                Zip::from(a).and(b).all(|x, y| x.is_nan() == y.is_nan())
            }
            (ArrayValues::Float64(a), ArrayValues::Float64(b)) => {
                Zip::from(a).and(b).all(|x, y| x.is_nan() == y.is_nan())
            }
            (ArrayValues::Float32(a), _) => !a.iter().any(|x| x.is_nan()),
            (ArrayValues::Float64(a), _) => !a.iter().any(|x| x.is_nan()),
            (_, ArrayValues::Float32(b)) => !b.iter().any(|x| x.is_nan()),
            (_, ArrayValues::Float64(b)) => !b.iter().any(|x| x.is_nan()),
            _ => true,
        }
    }
}
