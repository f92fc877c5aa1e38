//! Priority-change audit records.
//!
//! A record is created either `Pending` or directly `Approved`, and moves at
//! most once from `Pending` to a terminal state. Terminal records are never
//! modified again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ModelError, Result};
use crate::ids::{ChangeId, UserId};
use crate::priority::{EntityRef, EntityType, PriorityQuadrant};

/// Approval state of a change record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeStatus {
    Pending,
    Approved,
    Rejected,
}

impl ChangeStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ChangeStatus::Pending)
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeStatus::Pending => f.write_str("PENDING"),
            ChangeStatus::Approved => f.write_str("APPROVED"),
            ChangeStatus::Rejected => f.write_str("REJECTED"),
        }
    }
}

/// Reviewer verdict on a pending change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    pub fn target_status(&self) -> ChangeStatus {
        match self {
            ReviewDecision::Approve => ChangeStatus::Approved,
            ReviewDecision::Reject => ChangeStatus::Rejected,
        }
    }
}

/// Everything about a change except the identity the log assigns on append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeDraft {
    pub entity_type: EntityType,
    pub entity_id: String,
    pub old_quadrant: PriorityQuadrant,
    pub new_quadrant: PriorityQuadrant,
    pub old_rank: Option<u32>,
    /// `None` asks for the next free rank when the change is applied.
    pub new_rank: Option<u32>,
    pub reason: String,
    pub requested_by: UserId,
    pub status: ChangeStatus,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Append-only audit entry for a requested priority change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityChangeRecord {
    pub id: ChangeId,

    /// Strictly increasing position in the log.
    pub sequence: u64,

    pub entity_type: EntityType,

    pub entity_id: String,

    pub old_quadrant: PriorityQuadrant,

    pub new_quadrant: PriorityQuadrant,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_rank: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_rank: Option<u32>,

    pub reason: String,

    pub requested_by: UserId,

    pub status: ChangeStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<UserId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl PriorityChangeRecord {
    /// Materialises a draft with the identity assigned by the log.
    pub fn from_draft(id: ChangeId, sequence: u64, draft: ChangeDraft) -> Self {
        Self {
            id,
            sequence,
            entity_type: draft.entity_type,
            entity_id: draft.entity_id,
            old_quadrant: draft.old_quadrant,
            new_quadrant: draft.new_quadrant,
            old_rank: draft.old_rank,
            new_rank: draft.new_rank,
            reason: draft.reason,
            requested_by: draft.requested_by,
            status: draft.status,
            reviewed_by: draft.reviewed_by,
            reviewed_at: draft.reviewed_at,
            created_at: draft.created_at,
        }
    }

    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.entity_type, self.entity_id.clone())
    }

    pub fn is_pending(&self) -> bool {
        self.status == ChangeStatus::Pending
    }

    /// Applies a review verdict.
    ///
    /// Only a pending record can move; the record is left untouched on error.
    /// `rank` fills in the target rank when the request left it open.
    pub fn review(
        &mut self,
        decision: ReviewDecision,
        reviewer: UserId,
        rank: Option<u32>,
        at: DateTime<Utc>,
    ) -> Result<()> {
        if self.status.is_terminal() {
            return Err(ModelError::AlreadyReviewed {
                id: self.id.to_string(),
                status: self.status,
            });
        }
        if let Some(rank) = rank {
            if rank == 0 {
                return Err(ModelError::InvalidRank(rank));
            }
        }

        self.status = decision.target_status();
        self.reviewed_by = Some(reviewer);
        self.reviewed_at = Some(at);
        if decision == ReviewDecision::Approve && self.new_rank.is_none() {
            self.new_rank = rank;
        }
        Ok(())
    }
}
