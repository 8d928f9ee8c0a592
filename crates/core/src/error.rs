use serde::Serialize;
use std::fmt;

/// The external collaborator a call was made to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ServiceKind {
    Voice,
    Attention,
    Listen,
    Completion,
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKind::Voice => write!(f, "voice"),
            ServiceKind::Attention => write!(f, "attention"),
            ServiceKind::Listen => write!(f, "listen"),
            ServiceKind::Completion => write!(f, "completion"),
        }
    }
}

/// A failed (or timed out) call to an external service.
///
/// Failures never end a session; they are carried back into the state machine
/// as outcomes and select the recovery transition of the current state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{service} service failed: {message}")]
pub struct ServiceFailure {
    pub service: ServiceKind,
    pub message: String,
}

impl ServiceFailure {
    pub fn new(service: ServiceKind, message: impl Into<String>) -> Self {
        Self {
            service,
            message: message.into(),
        }
    }
}

/// Errors raised when the session machine is driven incorrectly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MachineError {
    #[error("outcome '{outcome}' does not apply in state '{state}'")]
    UnexpectedOutcome { state: String, outcome: String },
    #[error("the session has already finished")]
    Finished,
}
