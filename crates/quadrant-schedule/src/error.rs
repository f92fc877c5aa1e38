//! Error types for scheduling operations.

use quadrant_models::{ErrorKind, ModelError};
use quadrant_persistence::PersistenceError;
use thiserror::Error;

use crate::validator::Conflict;

/// Errors that can occur while estimating or scheduling tasks.
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// PERT triple out of range or out of order.
    #[error("invalid estimate: {0}")]
    InvalidEstimate(String),

    /// Proposed dates are malformed.
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    /// Task, module, project or dependency target not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The same precedence constraint already exists.
    #[error("duplicate dependency: {0}")]
    DuplicateDependency(String),

    /// Dependency cycle detected.
    #[error("dependency cycle detected: {0}")]
    DependencyCycle(String),

    /// Enforced reschedule refused because of conflicts.
    #[error("schedule blocked by {} conflict(s)", .0.len())]
    Blocked(Vec<Conflict>),

    /// Model invariant violated (self-dependency, inverted window, ...).
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Persistence error.
    #[error("persistence error: {0}")]
    Persistence(PersistenceError),
}

impl From<PersistenceError> for ScheduleError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound { kind, id } => {
                ScheduleError::NotFound(format!("{} {}", kind, id))
            }
            PersistenceError::Model(e) => ScheduleError::Model(e),
            other => ScheduleError::Persistence(other),
        }
    }
}

impl ScheduleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScheduleError::InvalidEstimate(_) | ScheduleError::InvalidSchedule(_) => {
                ErrorKind::Validation
            }
            ScheduleError::NotFound(_) => ErrorKind::NotFound,
            ScheduleError::DuplicateDependency(_)
            | ScheduleError::DependencyCycle(_)
            | ScheduleError::Blocked(_) => ErrorKind::Conflict,
            ScheduleError::Model(e) => e.kind(),
            ScheduleError::Persistence(e) => e.kind(),
        }
    }
}

/// Result type alias for scheduling operations.
pub type Result<T> = std::result::Result<T, ScheduleError>;
