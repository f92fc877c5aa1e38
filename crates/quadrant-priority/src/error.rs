//! Error types for priority workflow operations.

use quadrant_models::{ChangeStatus, EntityType, ErrorKind, ModelError, PriorityQuadrant};
use quadrant_persistence::PersistenceError;
use thiserror::Error;

/// Errors that can occur while requesting, reviewing or ordering priorities.
#[derive(Error, Debug)]
pub enum PriorityError {
    /// Input violates a documented constraint.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Entity or change record not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The change record has already left the pending state.
    #[error("change {id} already reviewed ({status})")]
    AlreadyReviewed { id: String, status: ChangeStatus },

    /// The requested rank is held by another entity.
    #[error("rank {rank} in {quadrant} is already held by {kind} {holder}")]
    RankCollision {
        kind: EntityType,
        quadrant: PriorityQuadrant,
        rank: u32,
        holder: String,
    },

    /// The entity an approved change targets no longer exists.
    #[error("{0} no longer exists")]
    StaleEntity(String),

    /// The user may not perform this action.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Storage failure.
    #[error("persistence error: {0}")]
    Persistence(PersistenceError),
}

impl PriorityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PriorityError::Validation(_) => ErrorKind::Validation,
            PriorityError::NotFound(_) => ErrorKind::NotFound,
            PriorityError::AlreadyReviewed { .. } | PriorityError::RankCollision { .. } => {
                ErrorKind::Conflict
            }
            PriorityError::StaleEntity(_) => ErrorKind::StaleEntity,
            PriorityError::Forbidden(_) => ErrorKind::Forbidden,
            PriorityError::Persistence(e) => e.kind(),
        }
    }
}

impl From<ModelError> for PriorityError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::AlreadyReviewed { id, status } => {
                PriorityError::AlreadyReviewed { id, status }
            }
            other => PriorityError::Validation(other.to_string()),
        }
    }
}

impl From<PersistenceError> for PriorityError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::NotFound { kind, id } => {
                PriorityError::NotFound(format!("{} {}", kind, id))
            }
            PersistenceError::StaleEntity { kind, id } => {
                PriorityError::StaleEntity(format!("{} {}", kind, id))
            }
            PersistenceError::RankCollision {
                kind,
                quadrant,
                rank,
                holder,
            } => PriorityError::RankCollision {
                kind,
                quadrant,
                rank,
                holder,
            },
            PersistenceError::Model(e) => e.into(),
            other => PriorityError::Persistence(other),
        }
    }
}

/// Result type alias for priority operations.
pub type Result<T> = std::result::Result<T, PriorityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_errors_keep_their_kind() {
        let not_found: PriorityError = PersistenceError::NotFound {
            kind: "task".to_string(),
            id: "task-1".to_string(),
        }
        .into();
        assert_eq!(not_found.kind(), ErrorKind::NotFound);

        let stale: PriorityError = PersistenceError::StaleEntity {
            kind: EntityType::Module,
            id: "mod-1".to_string(),
        }
        .into();
        assert!(matches!(stale, PriorityError::StaleEntity(_)));
        assert_eq!(stale.kind(), ErrorKind::StaleEntity);

        let reviewed: PriorityError = PersistenceError::Model(ModelError::AlreadyReviewed {
            id: "chg-1".to_string(),
            status: ChangeStatus::Approved,
        })
        .into();
        assert_eq!(reviewed.kind(), ErrorKind::Conflict);

        let io: PriorityError = PersistenceError::LockPoisoned("boom".to_string()).into();
        assert_eq!(io.kind(), ErrorKind::Storage);
    }

    #[test]
    fn test_model_validation_maps_to_validation() {
        let err: PriorityError = ModelError::InvalidRank(0).into();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
