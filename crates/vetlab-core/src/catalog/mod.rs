//! Reference-range catalog of panel templates.
//!
//! Templates are read-only. Selecting one clones its parameter list into a
//! fresh [`Panel`], so edits to a working panel never reach the catalog.

mod templates;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classifier::ReferenceRange;
use crate::models::{Panel, ParameterDefinition};

/// Catalog errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Unknown panel template: {0}")]
    UnknownTemplate(String),

    #[error("Template {template:?}, parameter {parameter:?}: unrecognized reference range {range:?}")]
    UnrecognizedRangeFormat {
        template: String,
        parameter: String,
        range: String,
    },

    #[error("Invalid template JSON: {0}")]
    InvalidJson(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// A named bundle of parameter definitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PanelTemplate {
    pub name: String,
    pub parameters: Vec<ParameterDefinition>,
}

impl PanelTemplate {
    /// Deep-copy into a working panel with every value pending.
    pub fn instantiate(&self) -> Panel {
        Panel {
            template_name: self.name.clone(),
            parameters: self
                .parameters
                .iter()
                .map(ParameterDefinition::instantiate)
                .collect(),
        }
    }
}

/// Ordered set of panel templates.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    templates: Vec<PanelTemplate>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// The built-in lab templates.
    pub fn builtin() -> Self {
        let templates = templates::BUILTIN_TEMPLATES
            .iter()
            .map(|(name, rows)| PanelTemplate {
                name: (*name).to_string(),
                parameters: rows
                    .iter()
                    .map(|(param, unit, range)| ParameterDefinition::new(*param, *unit, *range))
                    .collect(),
            })
            .collect();
        Self { templates }
    }

    /// Build a catalog from authored templates, rejecting any reference range
    /// the classifier does not recognize.
    pub fn from_templates(templates: Vec<PanelTemplate>) -> CatalogResult<Self> {
        for template in &templates {
            for param in &template.parameters {
                if ReferenceRange::parse(&param.reference_range).is_err() {
                    return Err(CatalogError::UnrecognizedRangeFormat {
                        template: template.name.clone(),
                        parameter: param.name.clone(),
                        range: param.reference_range.clone(),
                    });
                }
            }
        }
        Ok(Self { templates })
    }

    /// Parse and validate templates from a JSON array.
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        let templates: Vec<PanelTemplate> =
            serde_json::from_str(json).map_err(|e| CatalogError::InvalidJson(e.to_string()))?;
        Self::from_templates(templates)
    }

    pub fn template_names(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().map(|t| t.name.as_str())
    }

    pub fn templates(&self) -> &[PanelTemplate] {
        &self.templates
    }

    pub fn get(&self, name: &str) -> Option<&PanelTemplate> {
        self.templates.iter().find(|t| t.name == name)
    }

    /// Instantiate a working panel from the named template.
    pub fn instantiate(&self, name: &str) -> CatalogResult<Panel> {
        self.get(name)
            .map(PanelTemplate::instantiate)
            .ok_or_else(|| CatalogError::UnknownTemplate(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
