use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reels_core::ReelQueue;

/// Queue shared between the foreground navigator and the background collector.
///
/// Every access is a single short critical section and the lock is never held
/// across an await point.
pub type SharedQueue = Arc<Mutex<ReelQueue>>;

pub(crate) fn lock_queue(queue: &SharedQueue) -> MutexGuard<'_, ReelQueue> {
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct AutomationError {
    pub kind: FailureKind,
    pub message: String,
}

impl AutomationError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The session is gone; nothing further can be done with it.
    pub fn is_fatal(&self) -> bool {
        self.kind == FailureKind::SessionClosed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    /// The content surface could not be reached or rendered.
    Navigation,
    /// A bounded wait ran out.
    Timeout,
    ElementNotFound,
    SessionClosed,
    /// The automation endpoint itself could not be reached.
    Unavailable,
    Protocol,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Navigation => write!(f, "navigation error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::ElementNotFound => write!(f, "element not found"),
            FailureKind::SessionClosed => write!(f, "session closed"),
            FailureKind::Unavailable => write!(f, "automation endpoint unavailable"),
            FailureKind::Protocol => write!(f, "protocol error"),
        }
    }
}

/// Caller-visible failures of controller operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("navigator is not ready")]
    NotReady,
    #[error("navigator failed during setup; build a new controller")]
    Failed,
    #[error("controller has been shut down")]
    Closed,
    #[error("setup failed: {0}")]
    Setup(AutomationError),
    #[error("recovery failed: {0}")]
    Recovery(AutomationError),
    #[error("interaction failed: {0}")]
    Interaction(AutomationError),
}
