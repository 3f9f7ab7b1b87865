//! Validation reporting: terminal lines per event and a machine-readable
//! summary of the whole run.

use std::path::PathBuf;

use serde::Serialize;

use crate::outcome::{LeafEvent, Outcome, Severity, StructuralReason};
use crate::version::Version;

/// Styling hint for a report line; the binary maps it to terminal colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Dim,
    /// Red.
    Warning,
    /// Red and bold.
    Error,
    /// Bold.
    Emphasis,
    /// Blue headings.
    Info,
}

impl LeafEvent {
    pub fn tone(&self) -> Tone {
        match &self.outcome {
            Outcome::Equal | Outcome::Skipped => Tone::Dim,
            Outcome::NumericDiff(summary) => match summary.severity {
                Severity::Normal => Tone::Plain,
                Severity::Elevated => Tone::Warning,
            },
            Outcome::StructuralDiff(_) => Tone::Error,
            Outcome::Missing => Tone::Warning,
        }
    }

    /// Equal outcomes are only shown in verbose mode.
    pub fn is_shown(&self, verbose: bool) -> bool {
        verbose || !matches!(self.outcome, Outcome::Equal)
    }

    /// The report line, without styling.
    pub fn line(&self) -> String {
        let path = &self.path;
        match &self.outcome {
            Outcome::Equal => format!("  {:15}: equal", path),
            Outcome::NumericDiff(summary) => {
                let maxp = if summary.ulp_error.is_infinite() {
                    "inf".to_string()
                } else {
                    summary.maxp.to_string()
                };
                format!(
                    "• {:15}: 2**({} - {}) = {}",
                    path,
                    maxp,
                    summary.significand_bits,
                    one_digit(summary.error_ratio)
                )
            }
            Outcome::StructuralDiff(reason @ StructuralReason::DiffersByClass { .. }) => {
                format!("  {:15}: {}", path, reason)
            }
            Outcome::StructuralDiff(reason) => format!("✘ {:15}: {}", path, reason),
            Outcome::Missing => format!("✘ {:15}: missing", path),
            Outcome::Skipped => format!("- skipping {}", path),
        }
    }
}

/// `x` rounded to one significant digit, printed like C's `%.1g`: plain
/// decimals for exponents -4 through 0, otherwise `de±XX`.
fn one_digit(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if x == 0.0 {
        return "0".to_string();
    }
    let scientific = format!("{:.0e}", x);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific;
    };
    if (-4..=0).contains(&exponent) {
        format!("{:.*}", exponent.unsigned_abs() as usize, x)
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.unsigned_abs())
    }
}

/// One side of the comparison.
#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub path: PathBuf,
    /// Text of the identifying block, up to its first NUL.
    pub identifying_block: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
}

/// Number of events of each kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub equal: u64,
    pub numeric: u64,
    /// Subset of `numeric`.
    pub elevated: u64,
    pub structural: u64,
    pub missing: u64,
    pub skipped: u64,
}

/// Everything a validation run found.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// RFC 3339 creation time.
    pub generated_at: String,
    pub candidate: FileSummary,
    pub reference: FileSummary,
    pub counts: OutcomeCounts,
    pub events: Vec<LeafEvent>,
    /// Top-level candidate keys missing from the reference.
    pub extra_keys: Vec<String>,
}

impl ValidationReport {
    pub fn new(candidate: FileSummary, reference: FileSummary) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            candidate,
            reference,
            counts: OutcomeCounts::default(),
            events: Vec::new(),
            extra_keys: Vec::new(),
        }
    }

    /// Record one event.
    pub fn add_event(&mut self, event: LeafEvent) {
        match &event.outcome {
            Outcome::Equal => self.counts.equal += 1,
            Outcome::NumericDiff(summary) => {
                self.counts.numeric += 1;
                if summary.severity == Severity::Elevated {
                    self.counts.elevated += 1;
                }
            }
            Outcome::StructuralDiff(_) => self.counts.structural += 1,
            Outcome::Missing => self.counts.missing += 1,
            Outcome::Skipped => self.counts.skipped += 1,
        }
        self.events.push(event);
    }

    pub fn set_extra_keys(&mut self, keys: Vec<String>) {
        self.extra_keys = keys;
    }

    /// True if any numeric, structural or missing event was recorded.
    pub fn has_differences(&self) -> bool {
        self.events.iter().any(|e| e.outcome.is_difference())
    }

    /// `Extra keys in validate: a, b`, or `None` when there are none.
    pub fn extra_keys_line(&self) -> Option<String> {
        if self.extra_keys.is_empty() {
            None
        } else {
            Some(format!("Extra keys in validate: {}", self.extra_keys.join(", ")))
        }
    }

    /// One-line tally of the run.
    pub fn summary_line(&self) -> String {
        let c = &self.counts;
        format!(
            "{} equal, {} numeric ({} elevated), {} structural, {} missing, {} skipped",
            c.equal, c.numeric, c.elevated, c.structural, c.missing, c.skipped
        )
    }

    /// Serialize to a pretty JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
