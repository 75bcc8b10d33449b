//! Test panel models.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::classifier::classify;

/// Clinical classification of a single result value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StatusCategory {
    Normal,
    High,
    Low,
    Abnormal,
    /// No value entered yet
    Pending,
}

impl StatusCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCategory::Normal => "Normal",
            StatusCategory::High => "High",
            StatusCategory::Low => "Low",
            StatusCategory::Abnormal => "Abnormal",
            StatusCategory::Pending => "Pending",
        }
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parameter of a panel template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterDefinition {
    pub name: String,
    pub unit: String,
    /// Reference-range expression (e.g. "13.0 – 17.0", "< 140", "Negative")
    #[serde(rename = "refRange")]
    pub reference_range: String,
}

impl ParameterDefinition {
    pub fn new(
        name: impl Into<String>,
        unit: impl Into<String>,
        reference_range: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            reference_range: reference_range.into(),
        }
    }

    /// Start an empty, pending result for this parameter.
    pub fn instantiate(&self) -> ParameterResult {
        ParameterResult {
            name: self.name.clone(),
            value: String::new(),
            unit: self.unit.clone(),
            reference_range: self.reference_range.clone(),
            status: StatusCategory::Pending,
        }
    }
}

/// A parameter definition with an entered value and its status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterResult {
    pub name: String,
    #[serde(deserialize_with = "value_as_string")]
    pub value: String,
    pub unit: String,
    #[serde(rename = "refRange")]
    pub reference_range: String,
    pub status: StatusCategory,
}

impl ParameterResult {
    /// Replace the value and recompute the status against the reference range.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.reclassify();
    }

    pub fn reclassify(&mut self) {
        self.status = classify(&self.value, &self.reference_range);
    }

    pub fn is_normal(&self) -> bool {
        self.status == StatusCategory::Normal
    }
}

/// Stored values may have been written as JSON numbers.
fn value_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawValue {
        Text(String),
        Number(serde_json::Number),
        Null,
    }

    Ok(match RawValue::deserialize(deserializer)? {
        RawValue::Text(s) => s,
        RawValue::Number(n) => n.to_string(),
        RawValue::Null => String::new(),
    })
}

/// A working copy of one template's parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Panel {
    /// Full template name
    #[serde(rename = "name")]
    pub template_name: String,
    pub parameters: Vec<ParameterResult>,
}

impl Panel {
    /// Template name truncated at its first en-dash.
    pub fn short_name(&self) -> &str {
        short_name(&self.template_name)
    }
}

/// "CBP – Complete Blood Picture" → "CBP". Names without an en-dash are only trimmed.
pub fn short_name(template_name: &str) -> &str {
    template_name
        .split('–')
        .next()
        .unwrap_or(template_name)
        .trim()
}
