//! Element types of dataset values.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Storage type of a single dataset element.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ElementType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
}

impl ElementType {
    pub fn is_float(self) -> bool {
        matches!(self, ElementType::Float32 | ElementType::Float64)
    }

    pub fn is_signed_int(self) -> bool {
        matches!(
            self,
            ElementType::Int8 | ElementType::Int16 | ElementType::Int32 | ElementType::Int64
        )
    }

    pub fn is_unsigned_int(self) -> bool {
        matches!(
            self,
            ElementType::UInt8 | ElementType::UInt16 | ElementType::UInt32 | ElementType::UInt64
        )
    }

    /// Width in bits (bool counts as 8).
    pub fn bits(self) -> u32 {
        match self {
            ElementType::Bool | ElementType::Int8 | ElementType::UInt8 => 8,
            ElementType::Int16 | ElementType::UInt16 => 16,
            ElementType::Int32 | ElementType::UInt32 | ElementType::Float32 => 32,
            ElementType::Int64 | ElementType::UInt64 | ElementType::Float64 => 64,
        }
    }

    /// Significand bits including the implicit leading bit, for floating types.
    pub fn significand_bits(self) -> Option<u32> {
        match self {
            ElementType::Float32 => Some(f32::MANTISSA_DIGITS),
            ElementType::Float64 => Some(f64::MANTISSA_DIGITS),
            _ => None,
        }
    }

    /// True if every value of `self` converts to `to` without change.
    ///
    /// Integers of up to 16 bits fit a float32 significand; every integer
    /// type is accepted by float64, matching the usual "safe" casting table.
    pub fn can_cast_safely(self, to: ElementType) -> bool {
        if self == to || self == ElementType::Bool {
            return true;
        }
        let (from_bits, to_bits) = (self.bits(), to.bits());
        if self.is_unsigned_int() {
            return match to {
                t if t.is_unsigned_int() => to_bits >= from_bits,
                t if t.is_signed_int() => to_bits > from_bits,
                ElementType::Float32 => from_bits <= 16,
                ElementType::Float64 => true,
                _ => false,
            };
        }
        if self.is_signed_int() {
            return match to {
                t if t.is_signed_int() => to_bits >= from_bits,
                ElementType::Float32 => from_bits <= 16,
                ElementType::Float64 => true,
                _ => false,
            };
        }
        matches!((self, to), (ElementType::Float32, ElementType::Float64))
    }
}
