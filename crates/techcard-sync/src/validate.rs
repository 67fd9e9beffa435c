//! Value validation and keystroke filtering
//!
//! Two gates with different strictness:
//! - [`keystroke_filter`] runs while a field has focus and silently refuses
//!   text that could never become a number of the inferred type.
//! - [`validate`] judges the finished text and produces a [`Verdict`] with a
//!   per-type message. It only blocks final submission.
//!
//! Blank text is always valid; required-ness belongs to the caller.

use crate::infer::ValueType;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Message for rejected integers
pub const INTEGER_ERROR: &str = "Enter a whole number";
/// Message for rejected reals
pub const REAL_ERROR: &str = "Enter a number (for example: 12.5)";
/// Message for rejected booleans
pub const BOOLEAN_ERROR: &str = "Enter yes/no, true/false or 1/0";

/// Accepted boolean words (compared case-insensitively)
pub const BOOLEAN_WORDS: [&str; 8] = ["true", "false", "yes", "no", "1", "0", "да", "нет"];

static INTEGER: Lazy<Regex> = Lazy::new(|| compile(r"^-?[0-9]+$"));
static REAL: Lazy<Regex> = Lazy::new(|| compile(r"^-?[0-9]*\.?[0-9]+$"));
static INTEGER_KEYS: Lazy<Regex> = Lazy::new(|| compile(r"^-?[0-9]*$"));
static REAL_KEYS: Lazy<Regex> = Lazy::new(|| compile(r"^-?[0-9]*[.,]?[0-9]*$"));

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    // Patterns are literals above
    Regex::new(pattern).expect("static validation pattern")
}

/// Outcome of validating one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// Whether the text is acceptable
    pub is_valid: bool,
    /// Human-readable reason when invalid
    pub error_message: Option<String>,
    /// Canonical text when valid and non-blank (`"12,5"` → `"12.5"`)
    pub normalized: Option<String>,
}

impl Verdict {
    /// Valid verdict with optional normalized text
    #[inline]
    #[must_use]
    pub fn valid(normalized: Option<String>) -> Self {
        Self {
            is_valid: true,
            error_message: None,
            normalized,
        }
    }

    /// Invalid verdict with message
    #[inline]
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error_message: Some(message.into()),
            normalized: None,
        }
    }
}

/// Validate finished text against a type
#[must_use]
pub fn validate(candidate: &str, value_type: ValueType) -> Verdict {
    let text = candidate.trim();
    if text.is_empty() {
        return Verdict::valid(None);
    }

    match value_type {
        ValueType::Integer => {
            if INTEGER.is_match(text) {
                Verdict::valid(Some(text.to_string()))
            } else {
                Verdict::invalid(INTEGER_ERROR)
            }
        }
        ValueType::Real => {
            let dotted = text.replacen(',', ".", 1);
            let finite = dotted.parse::<f64>().is_ok_and(f64::is_finite);
            if REAL.is_match(&dotted) && finite {
                Verdict::valid(Some(dotted))
            } else {
                Verdict::invalid(REAL_ERROR)
            }
        }
        ValueType::Boolean => {
            let lowered = text.to_lowercase();
            if BOOLEAN_WORDS.contains(&lowered.as_str()) {
                Verdict::valid(Some(lowered))
            } else {
                Verdict::invalid(BOOLEAN_ERROR)
            }
        }
        ValueType::String => Verdict::valid(Some(candidate.to_string())),
    }
}

/// Check whether the field may take `candidate` as its new text
///
/// Integers admit digits and a leading minus; reals additionally admit one
/// `.` or `,`. Other types accept anything.
#[must_use]
pub fn keystroke_filter(candidate: &str, value_type: ValueType) -> bool {
    if candidate.is_empty() {
        return true;
    }
    match value_type {
        ValueType::Integer => INTEGER_KEYS.is_match(candidate),
        ValueType::Real => REAL_KEYS.is_match(candidate),
        ValueType::Boolean | ValueType::String => true,
    }
}
