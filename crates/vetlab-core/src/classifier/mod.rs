//! Status classifier for lab result values.
//!
//! Maps a free-text value and a free-text reference range to a
//! [`StatusCategory`]. Pure; depends on nothing but its two inputs.

mod range;

pub use range::*;

use thiserror::Error;

use crate::models::StatusCategory;

/// Classifier errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifierError {
    #[error("Unrecognized reference range format: {0:?}")]
    UnrecognizedRangeFormat(String),
}

pub type ClassifierResult<T> = Result<T, ClassifierError>;

/// Classify `value` against `reference_range`.
///
/// - empty value → `Pending`, whatever the range
/// - categorical range → `Normal` on case-insensitive match, else `Abnormal`
/// - numeric range with a non-numeric value → `Abnormal`
/// - interval / bound → `Low`, `Normal` or `High`
/// - unrecognized range with a numeric value → `Normal`
pub fn classify(value: &str, reference_range: &str) -> StatusCategory {
    if value.is_empty() {
        return StatusCategory::Pending;
    }

    let range = ReferenceRange::recognize(reference_range);
    if let Some(ReferenceRange::Categorical(token)) = &range {
        return if value.trim().to_lowercase() == *token {
            StatusCategory::Normal
        } else {
            StatusCategory::Abnormal
        };
    }

    let Some(numeric) = parse_number(value) else {
        return StatusCategory::Abnormal;
    };

    match range {
        Some(range) => range.compare(numeric),
        None => {
            tracing::debug!(
                reference_range,
                "unrecognized reference range, defaulting to Normal"
            );
            StatusCategory::Normal
        }
    }
}
