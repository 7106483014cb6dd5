//! Session lifecycle state machine.
//!
//! Every entry into a busy state (`connecting`, `loading`, `processing`) is
//! paired with exactly one exit when the operation that caused it completes.
//! Only one operation may be in flight at a time.

use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Idle,
    Connecting,
    Connected,
    Loading,
    Processing,
    Error,
    Disconnected,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Connecting => "connecting",
            SessionStatus::Connected => "connected",
            SessionStatus::Loading => "loading",
            SessionStatus::Processing => "processing",
            SessionStatus::Error => "error",
            SessionStatus::Disconnected => "disconnected",
        }
    }

    pub fn is_busy(self) -> bool {
        matches!(
            self,
            SessionStatus::Connecting | SessionStatus::Loading | SessionStatus::Processing
        )
    }

    /// Whether the input box should accept a new chat turn.
    pub fn accepts_input(self) -> bool {
        !self.is_busy()
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of backend call driving a busy state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    HealthCheck,
    RegisterDataSource,
    ChatTurn,
    ToolCall,
}

impl Operation {
    fn busy_state(self) -> SessionStatus {
        match self {
            Operation::HealthCheck => SessionStatus::Connecting,
            Operation::RegisterDataSource => SessionStatus::Loading,
            Operation::ChatTurn | Operation::ToolCall => SessionStatus::Processing,
        }
    }

    fn exit_state(self, succeeded: bool) -> SessionStatus {
        match (self, succeeded) {
            (_, true) => SessionStatus::Connected,
            (Operation::HealthCheck, false) => SessionStatus::Disconnected,
            (_, false) => SessionStatus::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    /// Another operation is still in flight.
    Busy {
        current: SessionStatus,
        requested: Operation,
    },
    /// A completion arrived with nothing in flight.
    NotBusy,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionError::Busy { current, .. } => {
                write!(f, "session is busy ({current}); wait for the current request to finish")
            }
            TransitionError::NotBusy => f.write_str("no request is in flight"),
        }
    }
}

impl StdError for TransitionError {}

#[derive(Debug, Default)]
pub struct SessionStatusMachine {
    status: SessionStatus,
    in_flight: Option<Operation>,
    data_loaded: bool,
}

impl SessionStatusMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn data_loaded(&self) -> bool {
        self.data_loaded
    }

    /// Enter the busy state for `operation`.
    ///
    /// Health checks and registrations may start from any settled state;
    /// chat turns and tool calls are rejected while another call is pending.
    pub fn begin(&mut self, operation: Operation) -> Result<SessionStatus, TransitionError> {
        if self.in_flight.is_some() || self.status.is_busy() {
            return Err(TransitionError::Busy {
                current: self.status,
                requested: operation,
            });
        }
        self.in_flight = Some(operation);
        Ok(self.set(operation.busy_state()))
    }

    /// Leave the busy state of the in-flight operation.
    pub fn complete(&mut self, succeeded: bool) -> Result<SessionStatus, TransitionError> {
        let operation = self.in_flight.take().ok_or(TransitionError::NotBusy)?;
        if succeeded && operation == Operation::RegisterDataSource {
            self.data_loaded = true;
        }
        Ok(self.set(operation.exit_state(succeeded)))
    }

    fn set(&mut self, next: SessionStatus) -> SessionStatus {
        debug!(from = %self.status, to = %next, "session status transition");
        self.status = next;
        next
    }
}
