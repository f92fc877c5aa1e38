//! Validation errors raised by model constructors.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::change::ChangeStatus;

/// Coarse classification shared by every error type in the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Input violates a documented constraint.
    Validation,
    /// Request clashes with current state (already reviewed, rank taken, ...).
    Conflict,
    NotFound,
    /// An approved change could not be applied because its target is gone.
    StaleEntity,
    Forbidden,
    /// I/O or serialization failure below the domain layer.
    Storage,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Conflict => "conflict",
            ErrorKind::NotFound => "not_found",
            ErrorKind::StaleEntity => "stale_entity",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Storage => "storage",
        };
        f.write_str(s)
    }
}

/// Errors produced when a model value violates one of its invariants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// String does not name one of the four quadrants.
    #[error("invalid priority quadrant: {0}")]
    InvalidQuadrant(String),

    /// String does not name an entity type.
    #[error("invalid entity type: {0}")]
    InvalidEntityType(String),

    /// Rank must be a positive integer.
    #[error("invalid rank {0}: ranks start at 1")]
    InvalidRank(u32),

    /// Date window ends before it starts.
    #[error("invalid date window: start {start} is after end {end}")]
    InvertedWindow {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    /// Time-dependent window without a start date.
    #[error("time-dependent window requires a start date")]
    MissingStartDate,

    /// PERT triple out of range or out of order.
    #[error("invalid estimate: {0}")]
    InvalidEstimate(String),

    /// A task cannot depend on itself.
    #[error("task {0} cannot depend on itself")]
    SelfDependency(String),

    /// Change record has already left the pending state.
    #[error("change {id} already reviewed ({status})")]
    AlreadyReviewed { id: String, status: ChangeStatus },
}

impl ModelError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModelError::AlreadyReviewed { .. } => ErrorKind::Conflict,
            _ => ErrorKind::Validation,
        }
    }
}

/// Result type alias for model validation.
pub type Result<T> = std::result::Result<T, ModelError>;
