//! Reference-range expressions.
//!
//! Four shapes are recognized, compared lowercase after trimming:
//! - categorical token (`Negative`, `None Seen`, ...)
//! - closed interval (`13.0 – 17.0`, `1.5 – 4.5 lakh`, `4,000 – 11,000`)
//! - upper bound only (`< 140`)
//! - lower bound only (`> 40`)

use std::fmt;

use super::{ClassifierError, ClassifierResult};
use crate::models::StatusCategory;

/// Qualitative reference values matched by exact (case-insensitive) equality.
pub const CATEGORICAL_TOKENS: &[&str] = &[
    "absent",
    "negative",
    "none seen",
    "pale yellow",
    "formed",
    "brown",
];

/// Unit word that may trail an interval and is dropped before parsing.
pub const UNIT_QUALIFIER: &str = "lakh";

/// A parsed reference-range expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceRange {
    /// Lowercased qualitative token
    Categorical(String),
    Interval { min: f64, max: f64 },
    /// `< limit`
    Below(f64),
    /// `> limit`
    Above(f64),
}

impl ReferenceRange {
    /// Strict parse: the shape must be recognized and every bound numeric.
    pub fn parse(expr: &str) -> ClassifierResult<Self> {
        match Self::recognize(expr) {
            Some(range) if range.has_numeric_bounds() => Ok(range),
            _ => Err(ClassifierError::UnrecognizedRangeFormat(expr.to_string())),
        }
    }

    /// Lenient parse used at classification time. Unparseable bounds come
    /// back as NaN, which compares false both ways.
    pub(crate) fn recognize(expr: &str) -> Option<Self> {
        let clean = expr.trim().to_lowercase();
        if CATEGORICAL_TOKENS.contains(&clean.as_str()) {
            return Some(ReferenceRange::Categorical(clean));
        }

        let processed = clean.replacen(UNIT_QUALIFIER, "", 1);
        let processed = processed.trim();

        if processed.contains(is_range_dash) {
            let mut parts = processed.split(is_range_dash);
            let min = parse_bound(parts.next());
            let max = parse_bound(parts.next());
            return Some(ReferenceRange::Interval { min, max });
        }
        if let Some(limit) = processed.strip_prefix('<') {
            return Some(ReferenceRange::Below(parse_bound(Some(limit))));
        }
        if let Some(limit) = processed.strip_prefix('>') {
            return Some(ReferenceRange::Above(parse_bound(Some(limit))));
        }
        None
    }

    fn has_numeric_bounds(&self) -> bool {
        match self {
            ReferenceRange::Categorical(_) => true,
            ReferenceRange::Interval { min, max } => !min.is_nan() && !max.is_nan(),
            ReferenceRange::Below(limit) | ReferenceRange::Above(limit) => !limit.is_nan(),
        }
    }

    /// Status of an already-parsed numeric value against a quantitative range.
    /// Categorical ranges never match a number.
    pub fn compare(&self, value: f64) -> StatusCategory {
        match *self {
            ReferenceRange::Categorical(_) => StatusCategory::Abnormal,
            ReferenceRange::Interval { min, max } => {
                if value < min {
                    StatusCategory::Low
                } else if value > max {
                    StatusCategory::High
                } else {
                    StatusCategory::Normal
                }
            }
            ReferenceRange::Below(limit) => {
                if value < limit {
                    StatusCategory::Normal
                } else {
                    StatusCategory::High
                }
            }
            ReferenceRange::Above(limit) => {
                if value > limit {
                    StatusCategory::Normal
                } else {
                    StatusCategory::Low
                }
            }
        }
    }
}

impl fmt::Display for ReferenceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceRange::Categorical(token) => f.write_str(token),
            ReferenceRange::Interval { min, max } => write!(f, "{} – {}", min, max),
            ReferenceRange::Below(limit) => write!(f, "< {}", limit),
            ReferenceRange::Above(limit) => write!(f, "> {}", limit),
        }
    }
}

fn is_range_dash(c: char) -> bool {
    c == '–' || c == '-'
}

fn parse_bound(part: Option<&str>) -> f64 {
    part.and_then(parse_number).unwrap_or(f64::NAN)
}

/// Spelled-out infinity, accepted (case-sensitive) in place of digits.
const INFINITY: &str = "Infinity";

/// Parse the leading decimal number of `text`, ignoring thousands separators.
///
/// Trailing text is ignored ("12 mg" → 12); no leading number → `None`.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|&c| c != ',').collect();
    let s = cleaned.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    if s[end..].starts_with(INFINITY) {
        let infinity = f64::INFINITY;
        return Some(if bytes.first() == Some(&b'-') { -infinity } else { infinity });
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    // Exponent only counts when it has digits
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}
