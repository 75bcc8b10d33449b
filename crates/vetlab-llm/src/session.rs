//! Background interpretation bound to the selected report.
//!
//! A request runs on its own thread. Its result is applied only if the same
//! request is still current when it arrives; selecting another report or
//! cancelling drops it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use vetlab_core::{DiagnosticReport, Patient};

use crate::interpreter::{interpret_or_fallback, Interpreter};

/// Session errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpretationError {
    #[error("No interpretation is pending")]
    NotPending,

    #[error("Timed out waiting for interpretation of {0}")]
    WaitTimeout(String),
}

pub type InterpretationResult<T> = Result<T, InterpretationError>;

/// A finished interpretation for the current report.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpretationOutcome {
    pub report_id: String,
    /// Narrative or fixed failure text, displayed verbatim
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Ticket {
    report_id: String,
    generation: u64,
}

struct Completed {
    ticket: Ticket,
    text: String,
}

struct InFlight {
    ticket: Ticket,
    cancelled: Arc<AtomicBool>,
}

/// Tracks the selected report and at most one in-flight interpretation.
pub struct InterpretationSession {
    interpreter: Arc<dyn Interpreter>,
    selected: Option<String>,
    generation: u64,
    in_flight: Option<InFlight>,
    tx: Sender<Completed>,
    rx: Receiver<Completed>,
}

impl InterpretationSession {
    pub fn new(interpreter: Arc<dyn Interpreter>) -> Self {
        let (tx, rx) = channel();
        Self {
            interpreter,
            selected: None,
            generation: 0,
            in_flight: None,
            tx,
            rx,
        }
    }

    pub fn selected_report(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Change the selected report. A pending request for another report is cancelled.
    pub fn select_report(&mut self, report_id: Option<&str>) {
        if self.selected.as_deref() == report_id {
            return;
        }
        self.cancel();
        self.selected = report_id.map(str::to_string);
    }

    /// Start interpreting `report`, selecting it. Replaces any pending request.
    pub fn request(&mut self, patient: &Patient, report: &DiagnosticReport) {
        self.select_report(Some(&report.id));
        self.cancel();

        self.generation += 1;
        let ticket = Ticket {
            report_id: report.id.clone(),
            generation: self.generation,
        };
        let cancelled = Arc::new(AtomicBool::new(false));
        self.in_flight = Some(InFlight {
            ticket: ticket.clone(),
            cancelled: cancelled.clone(),
        });

        let interpreter = self.interpreter.clone();
        let tx = self.tx.clone();
        let patient = patient.clone();
        let report = report.clone();
        tracing::info!(report_id = %report.id, generation = ticket.generation, "requesting interpretation");

        thread::spawn(move || {
            let text = interpret_or_fallback(interpreter.as_ref(), &patient, &report);
            if cancelled.load(Ordering::Acquire) {
                tracing::debug!(report_id = %ticket.report_id, "dropping cancelled interpretation");
                return;
            }
            // The session may be gone; nothing to deliver to then
            let _ = tx.send(Completed { ticket, text });
        });
    }

    /// Abandon the pending request, if any.
    pub fn cancel(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.cancelled.store(true, Ordering::Release);
            tracing::debug!(report_id = %in_flight.ticket.report_id, "cancelled interpretation");
        }
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Non-blocking: the current request's result if it has arrived.
    pub fn poll(&mut self) -> Option<InterpretationOutcome> {
        while let Ok(completed) = self.rx.try_recv() {
            if let Some(outcome) = self.accept(completed) {
                return Some(outcome);
            }
        }
        None
    }

    /// Block until the current request finishes or `timeout` passes.
    pub fn wait(&mut self, timeout: Duration) -> InterpretationResult<InterpretationOutcome> {
        let report_id = match &self.in_flight {
            Some(in_flight) => in_flight.ticket.report_id.clone(),
            None => return Err(InterpretationError::NotPending),
        };
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(completed) => {
                    if let Some(outcome) = self.accept(completed) {
                        return Ok(outcome);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return Err(InterpretationError::WaitTimeout(report_id));
                }
            }
        }
    }

    /// Keep a completion only if it belongs to the current request.
    fn accept(&mut self, completed: Completed) -> Option<InterpretationOutcome> {
        let current = self
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.ticket == completed.ticket);
        if !current {
            tracing::debug!(report_id = %completed.ticket.report_id, "discarding stale interpretation");
            return None;
        }
        self.in_flight = None;
        Some(InterpretationOutcome {
            report_id: completed.ticket.report_id,
            text: completed.text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{MockInterpreter, FAILURE_MESSAGE};
    use std::sync::mpsc::sync_channel;
    use std::sync::Mutex;
    use vetlab_core::models::seed_patients;

    fn report(id: &str) -> DiagnosticReport {
        DiagnosticReport {
            id: id.into(),
            patient_id: "P001".into(),
            date: "2024-05-17".into(),
            test_type: "Thyroid Profile".into(),
            parameters: vec![],
            summary: String::new(),
            clinician: "Dr. Lab Specialist".into(),
        }
    }

    /// Interpreter that blocks until the test releases it.
    fn gated() -> (Arc<dyn Interpreter>, std::sync::mpsc::SyncSender<()>) {
        let (release, gate) = sync_channel::<()>(0);
        let gate = Mutex::new(gate);
        let interpreter: Arc<dyn Interpreter> =
            Arc::new(move |_: &Patient, r: &DiagnosticReport| -> anyhow::Result<String> {
                gate.lock().unwrap().recv()?;
                Ok(format!("narrative for {}", r.id))
            });
        (interpreter, release)
    }

    #[test]
    fn test_request_delivers_result() {
        let mut session = InterpretationSession::new(Arc::new(MockInterpreter));
        let patient = &seed_patients()[0];
        session.request(patient, &report("REP-1001"));
        assert!(session.is_pending());

        let outcome = session.wait(Duration::from_secs(5)).unwrap();
        assert_eq!(outcome.report_id, "REP-1001");
        assert!(outcome.text.contains("Buddy"));
        assert!(!session.is_pending());
    }

    #[test]
    fn test_selection_change_discards_result() {
        let (interpreter, release) = gated();
        let mut session = InterpretationSession::new(interpreter);
        let patient = &seed_patients()[0];

        session.request(patient, &report("REP-1001"));
        session.select_report(Some("REP-1002"));
        assert!(!session.is_pending());

        release.send(()).unwrap();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(session.poll(), None);
        assert_eq!(session.selected_report(), Some("REP-1002"));
    }

    #[test]
    fn test_newer_request_wins() {
        let (interpreter, release) = gated();
        let mut session = InterpretationSession::new(interpreter);
        let patient = &seed_patients()[0];

        session.request(patient, &report("REP-1001"));
        session.request(patient, &report("REP-1002"));
        release.send(()).unwrap();
        release.send(()).unwrap();

        let outcome = session.wait(Duration::from_secs(5)).unwrap();
        assert_eq!(outcome.report_id, "REP-1002");
        assert_eq!(outcome.text, "narrative for REP-1002");
    }

    #[test]
    fn test_failure_becomes_fixed_message() {
        let failing = |_: &Patient, _: &DiagnosticReport| -> anyhow::Result<String> {
            anyhow::bail!("connection refused")
        };
        let mut session = InterpretationSession::new(Arc::new(failing));
        session.request(&seed_patients()[0], &report("REP-1001"));

        let outcome = session.wait(Duration::from_secs(5)).unwrap();
        assert_eq!(outcome.text, FAILURE_MESSAGE);
    }

    #[test]
    fn test_wait_without_request() {
        let mut session = InterpretationSession::new(Arc::new(MockInterpreter));
        assert_eq!(
            session.wait(Duration::from_millis(10)),
            Err(InterpretationError::NotPending)
        );
    }
}
