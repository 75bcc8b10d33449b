//! In-progress report builder (patient selection + working panels).

use serde::{Deserialize, Serialize};

use super::{AssemblyError, AssemblyResult};
use crate::catalog::Catalog;
use crate::models::{Panel, ParameterResult};

/// Working state for a report that has not been submitted yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PanelBuilder {
    /// Selected patient; empty until one is chosen
    #[serde(default)]
    pub patient_id: String,
    #[serde(default)]
    pub panels: Vec<Panel>,
}

impl PanelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_patient(&mut self, patient_id: impl Into<String>) {
        self.patient_id = patient_id.into();
    }

    /// Append a fresh copy of the named template.
    pub fn add_panel(&mut self, catalog: &Catalog, template_name: &str) -> AssemblyResult<&Panel> {
        let panel = catalog.instantiate(template_name)?;
        self.panels.push(panel);
        Ok(&self.panels[self.panels.len() - 1])
    }

    pub fn remove_panel(&mut self, index: usize) -> AssemblyResult<Panel> {
        if index >= self.panels.len() {
            return Err(AssemblyError::PanelOutOfRange(index));
        }
        Ok(self.panels.remove(index))
    }

    pub fn clear_panels(&mut self) {
        self.panels.clear();
    }

    /// Enter a value; the parameter's status is recomputed immediately.
    pub fn set_value(
        &mut self,
        panel: usize,
        parameter: usize,
        value: impl Into<String>,
    ) -> AssemblyResult<&ParameterResult> {
        let result = self
            .panels
            .get_mut(panel)
            .ok_or(AssemblyError::PanelOutOfRange(panel))?
            .parameters
            .get_mut(parameter)
            .ok_or(AssemblyError::ParameterOutOfRange { panel, parameter })?;
        result.set_value(value);
        Ok(result)
    }

    /// Reset to an empty builder.
    pub fn clear(&mut self) {
        self.patient_id.clear();
        self.panels.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.patient_id.is_empty() && self.panels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StatusCategory;

    #[test]
    fn test_add_and_edit_panels() {
        let catalog = Catalog::builtin();
        let mut builder = PanelBuilder::new();
        builder.select_patient("P001");
        builder.add_panel(&catalog, "Lipid Profile").unwrap();
        builder.add_panel(&catalog, "Fecal Analysis").unwrap();

        let hdl = builder.set_value(0, 2, "35").unwrap();
        assert_eq!(hdl.status, StatusCategory::Low);

        let consistency = builder.set_value(1, 2, "Watery").unwrap();
        assert_eq!(consistency.status, StatusCategory::Abnormal);

        let removed = builder.remove_panel(0).unwrap();
        assert_eq!(removed.template_name, "Lipid Profile");
        assert_eq!(builder.panels.len(), 1);
    }

    #[test]
    fn test_out_of_range_edits() {
        let catalog = Catalog::builtin();
        let mut builder = PanelBuilder::new();
        builder.add_panel(&catalog, "Milk Analysis").unwrap();

        assert_eq!(
            builder.set_value(3, 0, "1").unwrap_err(),
            AssemblyError::PanelOutOfRange(3)
        );
        assert_eq!(
            builder.set_value(0, 9, "1").unwrap_err(),
            AssemblyError::ParameterOutOfRange {
                panel: 0,
                parameter: 9
            }
        );
        assert_eq!(
            builder.remove_panel(1).unwrap_err(),
            AssemblyError::PanelOutOfRange(1)
        );
    }

    #[test]
    fn test_unknown_template_leaves_builder_unchanged() {
        let catalog = Catalog::builtin();
        let mut builder = PanelBuilder::new();
        assert!(builder.add_panel(&catalog, "Nope").is_err());
        assert!(builder.panels.is_empty());
    }

    #[test]
    fn test_draft_round_trip_keeps_values() {
        let catalog = Catalog::builtin();
        let mut builder = PanelBuilder::new();
        builder.select_patient("P002");
        builder.add_panel(&catalog, "Thyroid Profile").unwrap();
        builder.set_value(0, 0, "2.1").unwrap();

        let json = serde_json::to_string(&builder).unwrap();
        assert!(json.contains("\"patientId\":\"P002\""));
        let restored: PanelBuilder = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, builder);
    }
}
