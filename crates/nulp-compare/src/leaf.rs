//! Comparison of one dataset against its reference.

use nulp_tree::{ArrayValues, DatasetNode, ElementType, TreeError};
use tracing::warn;

use crate::options::CompareOptions;
use crate::outcome::{Outcome, StructuralReason, UlpSummary};
use crate::ulp::{UlpFloat, max_ulp_error};

/// Compare `candidate` against `reference`.
///
/// Never fails: problems reading either side become a structural outcome
/// for this leaf alone.
pub fn compare_datasets(
    candidate: &dyn DatasetNode,
    reference: &dyn DatasetNode,
    options: &CompareOptions,
) -> Outcome {
    match try_compare(candidate, reference, options) {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!("cannot compare {}: {}", reference.path(), err);
            Outcome::StructuralDiff(StructuralReason::Unreadable {
                message: err.to_string(),
            })
        }
    }
}

fn try_compare(
    candidate: &dyn DatasetNode,
    reference: &dyn DatasetNode,
    options: &CompareOptions,
) -> Result<Outcome, TreeError> {
    let (candidate_shape, reference_shape) = (candidate.shape(), reference.shape());
    if candidate_shape != reference_shape {
        return Ok(Outcome::StructuralDiff(StructuralReason::ShapeMismatch {
            candidate: candidate_shape,
            reference: reference_shape,
        }));
    }

    let (candidate_type, reference_type) = (candidate.dtype()?, reference.dtype()?);
    if !candidate_type.can_cast_safely(reference_type) {
        return Ok(Outcome::StructuralDiff(StructuralReason::IncompatibleDtype {
            candidate: candidate_type,
            reference: reference_type,
        }));
    }

    let values = candidate.read()?.cast(reference_type);
    let expected = reference.read()?;
    let is_float = reference_type.is_float();

    if is_float && !values.nan_mask_matches(&expected) {
        return Ok(Outcome::StructuralDiff(StructuralReason::NanPatternMismatch));
    }
    if values.array_equal(&expected, is_float) {
        return Ok(Outcome::Equal);
    }

    let class = reference.text_attr(&options.class_attr)?;
    Ok(classify_difference(
        &values,
        &expected,
        reference_type,
        class.as_deref(),
        options,
    ))
}

/// Outcome for arrays known to differ.
///
/// Without a class tag the element type decides whether the ULP branch
/// applies.
fn classify_difference(
    values: &ArrayValues,
    expected: &ArrayValues,
    reference_type: ElementType,
    class: Option<&str>,
    options: &CompareOptions,
) -> Outcome {
    let float_class = match class {
        Some(tag) => options.is_float_class(tag),
        None => reference_type.is_float(),
    };
    let differs_by_class = || {
        Outcome::StructuralDiff(StructuralReason::DiffersByClass {
            class: class.map_or_else(|| reference_type.to_string(), str::to_string),
        })
    };
    if !float_class {
        return differs_by_class();
    }

    match (values, expected) {
        (ArrayValues::Float64(v), ArrayValues::Float64(r)) => Outcome::NumericDiff(UlpSummary::new(
            max_ulp_error(v.iter().copied(), r.iter().copied()),
            f64::SIGNIFICAND_BITS,
        )),
        (ArrayValues::Float32(v), ArrayValues::Float32(r)) => Outcome::NumericDiff(UlpSummary::new(
            max_ulp_error(v.iter().copied(), r.iter().copied()),
            f32::SIGNIFICAND_BITS,
        )),
        // A floating class tag on integer or boolean data.
        _ => differs_by_class(),
    }
}
