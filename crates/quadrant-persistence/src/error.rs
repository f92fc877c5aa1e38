//! Error types for persistence operations.

use std::path::PathBuf;

use quadrant_models::{EntityType, ErrorKind, ModelError, PriorityQuadrant};
use thiserror::Error;

/// Errors that can occur during persistence operations.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Failed to read from file system.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write to file system.
    #[error("failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize data to JSON.
    #[error("failed to serialize: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// Failed to create directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Item not found.
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    /// Item already exists where an append was expected.
    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: String, id: String },

    /// The row targeted by an update no longer exists.
    #[error("{kind} {id} no longer exists")]
    StaleEntity { kind: EntityType, id: String },

    /// Another live entity already holds the rank.
    #[error("rank {rank} in {quadrant} is already held by {kind} {holder}")]
    RankCollision {
        kind: EntityType,
        quadrant: PriorityQuadrant,
        rank: u32,
        holder: String,
    },

    /// Every rank in the bucket has been issued.
    #[error("no ranks left for {kind} in {quadrant}")]
    RankExhausted {
        kind: EntityType,
        quadrant: PriorityQuadrant,
    },

    /// Stored or submitted value violates a model invariant.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Lock poisoned (thread panicked while holding lock).
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl PersistenceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PersistenceError::NotFound { .. } => ErrorKind::NotFound,
            PersistenceError::AlreadyExists { .. } => ErrorKind::Conflict,
            PersistenceError::RankCollision { .. } | PersistenceError::RankExhausted { .. } => {
                ErrorKind::Conflict
            }
            PersistenceError::StaleEntity { .. } => ErrorKind::StaleEntity,
            PersistenceError::Model(e) => e.kind(),
            PersistenceError::ReadError { .. }
            | PersistenceError::WriteError { .. }
            | PersistenceError::SerializeError(_)
            | PersistenceError::DirectoryError { .. }
            | PersistenceError::LockPoisoned(_) => ErrorKind::Storage,
        }
    }
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
