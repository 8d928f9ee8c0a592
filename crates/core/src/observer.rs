use crate::{error::ServiceFailure, machine::TransitionRecord};
use std::sync::Mutex;
use tracing::{info, warn};

/// Receives the diagnostic trace of a session.
///
/// An observer lives exactly as long as the session it is handed to.
pub trait SessionObserver: Send + Sync {
    /// Called once on start and after every transition.
    fn on_transition(&self, record: &TransitionRecord);

    /// Called when an external call fails or times out in `state`.
    fn on_service_failure(&self, state: &str, failure: &ServiceFailure);
}

/// Writes the trace as structured `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SessionObserver for TracingObserver {
    fn on_transition(&self, record: &TransitionRecord) {
        info!(
            state = %record.state,
            extracted_person = record.extracted_person.as_deref().unwrap_or(""),
            last_utterance = %record.last_utterance,
            "Session transition"
        );
    }

    fn on_service_failure(&self, state: &str, failure: &ServiceFailure) {
        warn!(
            state = %state,
            service = %failure.service,
            error = %failure.message,
            "Service call failed; continuing session"
        );
    }
}

/// Keeps the trace in memory, for tests and post-session inspection.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    transitions: Mutex<Vec<TransitionRecord>>,
    failures: Mutex<Vec<(String, ServiceFailure)>>,
}

impl RecordingObserver {
    pub fn transitions(&self) -> Vec<TransitionRecord> {
        self.transitions
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }

    pub fn failures(&self) -> Vec<(String, ServiceFailure)> {
        self.failures.lock().map(|f| f.clone()).unwrap_or_default()
    }

    /// The sequence of state names visited, in order.
    pub fn states(&self) -> Vec<String> {
        self.transitions().into_iter().map(|r| r.state).collect()
    }
}

impl SessionObserver for RecordingObserver {
    fn on_transition(&self, record: &TransitionRecord) {
        if let Ok(mut transitions) = self.transitions.lock() {
            transitions.push(record.clone());
        }
    }

    fn on_service_failure(&self, state: &str, failure: &ServiceFailure) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.push((state.to_string(), failure.clone()));
        }
    }
}

impl<T: SessionObserver + ?Sized> SessionObserver for std::sync::Arc<T> {
    fn on_transition(&self, record: &TransitionRecord) {
        (**self).on_transition(record)
    }

    fn on_service_failure(&self, state: &str, failure: &ServiceFailure) {
        (**self).on_service_failure(state, failure)
    }
}
