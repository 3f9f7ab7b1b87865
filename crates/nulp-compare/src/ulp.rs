//! Units-in-the-last-place arithmetic.
//!
//! Errors are measured in multiples of the spacing of the reference value,
//! so the same relative disagreement scores the same near zero and near the
//! top of the exponent range.

/// Floating types the comparator measures in ULPs.
pub trait UlpFloat: Copy + PartialEq {
    /// Significand bits including the implicit leading bit.
    const SIGNIFICAND_BITS: u32;

    /// Distance from `self` to the next representable value away from zero,
    /// carrying the sign of `self`. NaN for NaN and the infinities.
    ///
    /// The largest finite magnitude uses the gap below it.
    fn spacing(self) -> Self;

    fn is_nan(self) -> bool;

    fn is_finite(self) -> bool;

    fn to_f64(self) -> f64;
}

impl UlpFloat for f64 {
    const SIGNIFICAND_BITS: u32 = f64::MANTISSA_DIGITS;

    fn spacing(self) -> Self {
        if !self.is_finite() {
            return f64::NAN;
        }
        let a = self.abs();
        let up = a.next_up();
        let gap = if up.is_finite() { up - a } else { a - a.next_down() };
        gap.copysign(self)
    }

    fn is_nan(self) -> bool {
        f64::is_nan(self)
    }

    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }

    fn to_f64(self) -> f64 {
        self
    }
}

impl UlpFloat for f32 {
    const SIGNIFICAND_BITS: u32 = f32::MANTISSA_DIGITS;

    fn spacing(self) -> Self {
        if !self.is_finite() {
            return f32::NAN;
        }
        let a = self.abs();
        let up = a.next_up();
        let gap = if up.is_finite() { up - a } else { a - a.next_down() };
        gap.copysign(self)
    }

    fn is_nan(self) -> bool {
        f32::is_nan(self)
    }

    fn is_finite(self) -> bool {
        f32::is_finite(self)
    }

    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

/// Distance between `value` and `reference` in units of `spacing(reference)`.
///
/// Equal values give 0; a non-finite value on either side of a
/// disagreement gives +inf.
pub fn ulp_distance<T: UlpFloat>(value: T, reference: T) -> f64 {
    if value == reference {
        return 0.0;
    }
    if !value.is_finite() || !reference.is_finite() {
        return f64::INFINITY;
    }
    let diff = (value.to_f64() - reference.to_f64()).abs();
    diff / reference.spacing().to_f64().abs()
}

/// Largest [`ulp_distance`] over all positions where the reference is not NaN.
pub fn max_ulp_error<T: UlpFloat>(
    values: impl IntoIterator<Item = T>,
    reference: impl IntoIterator<Item = T>,
) -> f64 {
    values
        .into_iter()
        .zip(reference)
        .filter(|(_, r)| !r.is_nan())
        .map(|(v, r)| ulp_distance(v, r))
        .fold(0.0, f64::max)
}

/// Bit position of the worst error: `floor(log2(ulp_error)) + 1`.
///
/// Saturates for an infinite error.
pub fn error_bits(ulp_error: f64) -> i32 {
    if ulp_error.is_infinite() {
        return i32::MAX;
    }
    (ulp_error.log2().floor() as i32).saturating_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spacing_at_one() {
        assert_eq!(1.0f64.spacing(), f64::EPSILON);
        assert_eq!(1.0f32.spacing(), f32::EPSILON);
        assert_eq!((-1.0f64).spacing(), -f64::EPSILON);
        assert_eq!(2.0f64.spacing(), 2.0 * f64::EPSILON);
    }

    #[test]
    fn test_spacing_at_zero_is_smallest_subnormal() {
        assert_eq!(0.0f64.spacing(), f64::from_bits(1));
        assert_eq!(0.0f32.spacing(), f32::from_bits(1));
    }

    #[test]
    fn test_spacing_of_non_finite() {
        assert!(f64::NAN.spacing().is_nan());
        assert!(f64::INFINITY.spacing().is_nan());
        assert!(f32::NEG_INFINITY.spacing().is_nan());
    }

    #[test]
    fn test_spacing_at_max_uses_gap_below() {
        let gap = f64::MAX.spacing();
        assert!(gap.is_finite());
        assert_eq!(f64::MAX - gap, f64::MAX.next_down());
    }

    #[test]
    fn test_one_step_is_one_ulp() {
        let r = 2.0f64;
        assert_eq!(ulp_distance(r.next_up(), r), 1.0);
        assert_eq!(ulp_distance(2.0000000000000004, r), 1.0);
        assert_eq!(error_bits(1.0), 1);
    }

    #[test]
    fn test_step_below_a_power_of_two_is_half_ulp() {
        let r = 2.0f64;
        assert_eq!(ulp_distance(r.next_down(), r), 0.5);
        assert_eq!(error_bits(0.5), 0);
    }

    #[test]
    fn test_non_finite_disagreement_is_infinite() {
        assert_eq!(ulp_distance(f64::INFINITY, f64::INFINITY), 0.0);
        assert_eq!(ulp_distance(1.0, f64::INFINITY), f64::INFINITY);
        assert_eq!(ulp_distance(f64::NEG_INFINITY, 1.0), f64::INFINITY);
        assert_eq!(error_bits(f64::INFINITY), i32::MAX);
    }

    #[test]
    fn test_max_skips_nan_positions() {
        let values = [1.0f64, f64::NAN, 3.0f64.next_up().next_up()];
        let reference = [1.0f64, f64::NAN, 3.0];
        assert_eq!(max_ulp_error(values, reference), 2.0);
    }

    #[test]
    fn test_float32_error() {
        let r = 1.5f32;
        let v = r.next_up().next_up().next_up().next_up();
        assert_eq!(max_ulp_error([v], [r]), 4.0);
        assert_eq!(error_bits(4.0), 3);
    }

    #[test]
    fn test_error_bits() {
        assert_eq!(error_bits(3.0), 2);
        assert_eq!(error_bits(1024.0), 11);
        assert_eq!(error_bits(1023.0), 10);
    }
}
