//! Interpretation collaborators.

use vetlab_core::{DiagnosticReport, Patient};

/// Shown in place of the narrative when the service fails.
pub const FAILURE_MESSAGE: &str =
    "Error generating AI interpretation. Please review results manually.";

/// Shown when the service answers with no text.
pub const EMPTY_MESSAGE: &str = "Unable to generate interpretation.";

/// External text-generation service producing a narrative for a report.
///
/// Opaque to the rest of the system: the returned text is displayed verbatim.
pub trait Interpreter: Send + Sync {
    fn interpret(&self, patient: &Patient, report: &DiagnosticReport) -> anyhow::Result<String>;
}

impl<F> Interpreter for F
where
    F: Fn(&Patient, &DiagnosticReport) -> anyhow::Result<String> + Send + Sync,
{
    fn interpret(&self, patient: &Patient, report: &DiagnosticReport) -> anyhow::Result<String> {
        self(patient, report)
    }
}

/// Run `interpreter`, degrading failures to the fixed display strings.
pub fn interpret_or_fallback(
    interpreter: &dyn Interpreter,
    patient: &Patient,
    report: &DiagnosticReport,
) -> String {
    match interpreter.interpret(patient, report) {
        Ok(text) if text.is_empty() => EMPTY_MESSAGE.to_string(),
        Ok(text) => text,
        Err(e) => {
            tracing::error!(report_id = %report.id, error = %e, "interpretation failed");
            FAILURE_MESSAGE.to_string()
        }
    }
}

/// Offline interpreter that summarizes the flagged parameters (for testing).
#[derive(Debug, Clone, Copy, Default)]
pub struct MockInterpreter;

impl Interpreter for MockInterpreter {
    fn interpret(&self, patient: &Patient, report: &DiagnosticReport) -> anyhow::Result<String> {
        let mut text = format!(
            "{} ({}, {}, {} years old): {}\n",
            patient.name, patient.species, patient.breed, patient.age, report.test_type
        );

        let flagged: Vec<_> = report.flagged().collect();
        if flagged.is_empty() {
            text.push_str("All parameters are within reference ranges.");
            return Ok(text);
        }

        text.push_str(&format!(
            "{} of {} parameters outside reference range:\n",
            flagged.len(),
            report.parameters.len()
        ));
        for p in flagged {
            text.push_str(&format!(
                "- {}: {} {} (Ref: {}) - Status: {}\n",
                p.name, p.value, p.unit, p.reference_range, p.status
            ));
        }
        Ok(text)
    }
}
