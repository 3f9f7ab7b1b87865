//! Per-entry comparison outcomes.
//!
//! Every reference entry the walker visits produces exactly one
//! [`LeafEvent`], whatever happened to it.

use nulp_tree::{ElementType, EntryKind};
use serde::{Deserialize, Serialize};

use crate::ulp::error_bits;

/// How deep into the significand a numeric difference reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The worst error stays in the lower half of the significand.
    Normal,
    /// The worst error reaches the upper half of the significand.
    Elevated,
}

impl core::fmt::Display for Severity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Severity::Normal => write!(f, "normal"),
            Severity::Elevated => write!(f, "elevated"),
        }
    }
}

/// Measured size of a floating-point difference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UlpSummary {
    /// Largest error in units of the reference spacing.
    pub ulp_error: f64,
    /// `floor(log2(ulp_error)) + 1`.
    pub maxp: i32,
    /// Significand bits of the reference type, implicit bit included.
    pub significand_bits: u32,
    /// `2^(maxp - significand_bits)`: the error relative to the value.
    pub error_ratio: f64,
    pub severity: Severity,
}

impl UlpSummary {
    pub fn new(ulp_error: f64, significand_bits: u32) -> Self {
        let maxp = error_bits(ulp_error);
        let nsig = significand_bits as i32;
        let severity = if maxp > nsig / 2 {
            Severity::Elevated
        } else {
            Severity::Normal
        };
        Self {
            ulp_error,
            maxp,
            significand_bits,
            error_ratio: 2f64.powi(maxp.saturating_sub(nsig)),
            severity,
        }
    }
}

/// Why a leaf could not be compared numerically, or why it failed outright.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StructuralReason {
    ShapeMismatch {
        candidate: Vec<usize>,
        reference: Vec<usize>,
    },
    IncompatibleDtype {
        candidate: ElementType,
        reference: ElementType,
    },
    NanPatternMismatch,
    /// Values differ and the class has no numeric tolerance.
    DiffersByClass { class: String },
    KindMismatch {
        candidate: EntryKind,
        reference: EntryKind,
    },
    Unreadable { message: String },
}

impl core::fmt::Display for StructuralReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StructuralReason::ShapeMismatch {
                candidate,
                reference,
            } => write!(f, "shape {:?} differs from reference {:?}", candidate, reference),
            StructuralReason::IncompatibleDtype {
                candidate,
                reference,
            } => write!(f, "incompatible dtypes: {} cannot be cast safely to {}", candidate, reference),
            StructuralReason::NanPatternMismatch => write!(f, "NaN pattern differs"),
            StructuralReason::DiffersByClass { class } => write!(f, "differs (class {})", class),
            StructuralReason::KindMismatch {
                candidate,
                reference,
            } => write!(f, "{} where reference has a {}", candidate, reference),
            StructuralReason::Unreadable { message } => write!(f, "unreadable: {}", message),
        }
    }
}

/// Result of visiting one reference entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    Equal,
    NumericDiff(UlpSummary),
    StructuralDiff(StructuralReason),
    /// Present in the reference, absent from the candidate.
    Missing,
    /// Internal entry, never compared.
    Skipped,
}

impl Outcome {
    /// True for anything that is neither equal nor skipped.
    pub fn is_difference(&self) -> bool {
        matches!(
            self,
            Outcome::NumericDiff(_) | Outcome::StructuralDiff(_) | Outcome::Missing
        )
    }
}

/// An outcome at a path of the reference tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeafEvent {
    pub path: String,
    pub outcome: Outcome,
}

impl LeafEvent {
    pub fn new(path: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            path: path.into(),
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_ulp_on_double_is_normal() {
        let summary = UlpSummary::new(1.0, 53);
        assert_eq!(summary.maxp, 1);
        assert_eq!(summary.severity, Severity::Normal);
        assert_eq!(summary.error_ratio, 2f64.powi(-52));
    }

    #[test]
    fn test_severity_threshold_is_half_the_significand() {
        // 2^26 ULPs reaches bit 27 of 53.
        assert_eq!(UlpSummary::new(2f64.powi(25), 53).severity, Severity::Normal);
        assert_eq!(UlpSummary::new(2f64.powi(26), 53).severity, Severity::Elevated);
        assert_eq!(UlpSummary::new(2f64.powi(11), 24).severity, Severity::Normal);
        assert_eq!(UlpSummary::new(2f64.powi(12), 24).severity, Severity::Elevated);
    }

    #[test]
    fn test_infinite_error_is_elevated() {
        let summary = UlpSummary::new(f64::INFINITY, 53);
        assert_eq!(summary.severity, Severity::Elevated);
        assert!(summary.error_ratio.is_infinite());
    }

    #[test]
    fn test_is_difference() {
        assert!(!Outcome::Equal.is_difference());
        assert!(!Outcome::Skipped.is_difference());
        assert!(Outcome::Missing.is_difference());
        assert!(Outcome::StructuralDiff(StructuralReason::NanPatternMismatch).is_difference());
    }

    #[test]
    fn test_reason_display() {
        let reason = StructuralReason::DiffersByClass {
            class: "logical".into(),
        };
        assert_eq!(reason.to_string(), "differs (class logical)");
        let reason = StructuralReason::IncompatibleDtype {
            candidate: ElementType::Float64,
            reference: ElementType::Float32,
        };
        assert_eq!(
            reason.to_string(),
            "incompatible dtypes: float64 cannot be cast safely to float32"
        );
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let event = LeafEvent::new("/b", Outcome::Missing);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["path"], "/b");
        assert_eq!(json["outcome"]["outcome"], "missing");
    }
}
