//! Priority-change workflow.
//!
//! Every request appends exactly one [`PriorityChangeRecord`]. Privileged
//! requesters get an `APPROVED` record and the entity is moved at once;
//! everyone else gets a `PENDING` record that a privileged reviewer later
//! approves or rejects. Concurrent approvals for the same entity are
//! applied in commit order; the last one wins.

use std::sync::Arc;

use quadrant_models::{
    ChangeDraft, ChangeId, ChangeStatus, EntityRef, EntityType, ModelError, PrioritizedEntity,
    PriorityChangeRecord, PriorityQuadrant, ReviewDecision, UserId,
};
use quadrant_persistence::{ChangeLog, EntityFilter, EntityStore, PersistenceError};
use serde::Serialize;
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{PriorityError, Result};
use crate::filter::ChangeFilter;
use crate::policy::ApprovalPolicy;

/// Why an approved change could not be applied to its entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum CommitFailure {
    /// The entity was deleted after the request was made.
    StaleEntity { entity: EntityRef },
    /// The explicit rank was taken after the request was made.
    RankCollision {
        quadrant: PriorityQuadrant,
        rank: u32,
        holder: String,
    },
}

/// What happened to the entity after a record was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommitOutcome {
    /// The entity now sits at `quadrant`/`rank`.
    Applied { quadrant: PriorityQuadrant, rank: u32 },
    /// Nothing to apply (pending or rejected).
    NotApplied,
    /// The record is approved but the entity could not be updated.
    Failed(CommitFailure),
}

impl CommitOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommitOutcome::Applied { .. })
    }

    /// Turns a failed commit into the matching error.
    pub fn into_result(self, entity_type: EntityType) -> Result<Self> {
        match self {
            CommitOutcome::Failed(CommitFailure::StaleEntity { entity }) => {
                Err(PriorityError::StaleEntity(entity.to_string()))
            }
            CommitOutcome::Failed(CommitFailure::RankCollision {
                quadrant,
                rank,
                holder,
            }) => Err(PriorityError::RankCollision {
                kind: entity_type,
                quadrant,
                rank,
                holder,
            }),
            other => Ok(other),
        }
    }
}

/// Result of [`PriorityWorkflow::request_change`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestOutcome {
    pub record: PriorityChangeRecord,
    pub needs_approval: bool,
    pub commit: CommitOutcome,
}

/// Result of [`PriorityWorkflow::review`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewOutcome {
    pub record: PriorityChangeRecord,
    pub commit: CommitOutcome,
}

impl ReviewOutcome {
    /// The reviewed record, or the commit failure as an error.
    ///
    /// The record stays `APPROVED` either way.
    pub fn into_result(self) -> Result<PriorityChangeRecord> {
        self.commit.into_result(self.record.entity_type)?;
        Ok(self.record)
    }
}

/// Drives change records from request to applied priority.
pub struct PriorityWorkflow {
    store: Arc<dyn EntityStore>,
    log: Arc<dyn ChangeLog>,
    policy: ApprovalPolicy,
    clock: Arc<dyn Clock>,
}

impl PriorityWorkflow {
    pub fn new(store: Arc<dyn EntityStore>, log: Arc<dyn ChangeLog>, policy: ApprovalPolicy) -> Self {
        Self {
            store,
            log,
            policy,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn policy(&self) -> &ApprovalPolicy {
        &self.policy
    }

    /// Requests a move of `entity` to `new_quadrant`.
    ///
    /// `new_rank` of `None` asks for the next free rank, assigned when the
    /// change is approved.
    pub fn request_change(
        &self,
        entity: &EntityRef,
        new_quadrant: PriorityQuadrant,
        new_rank: Option<u32>,
        reason: impl Into<String>,
        requester: &UserId,
    ) -> Result<RequestOutcome> {
        if let Some(rank) = new_rank {
            if rank == 0 {
                return Err(ModelError::InvalidRank(rank).into());
            }
        }

        let current = self.store.get(entity)?;
        if let Some(rank) = new_rank {
            self.check_rank_free(entity, new_quadrant, rank)?;
        }

        let status = self.policy.initial_status(requester);
        let target_rank = match (status, new_rank) {
            (ChangeStatus::Approved, None) => {
                Some(self.store.issue_rank(entity.entity_type, new_quadrant)?)
            }
            _ => new_rank,
        };

        let record = self.log.append(ChangeDraft {
            entity_type: entity.entity_type,
            entity_id: entity.id.clone(),
            old_quadrant: current.quadrant(),
            new_quadrant,
            old_rank: current.rank(),
            new_rank: target_rank,
            reason: reason.into(),
            requested_by: requester.clone(),
            status,
            reviewed_by: None,
            reviewed_at: None,
            created_at: self.clock.now(),
        })?;

        let commit = if record.status == ChangeStatus::Approved {
            self.commit(&record)?
        } else {
            CommitOutcome::NotApplied
        };

        info!(
            record_id = %record.id,
            entity = %entity,
            requested_by = %requester,
            status = %record.status,
            new_quadrant = %new_quadrant,
            new_rank = record.new_rank,
            "priority change requested"
        );

        Ok(RequestOutcome {
            needs_approval: record.is_pending(),
            record,
            commit,
        })
    }

    /// Approves or rejects a pending change.
    ///
    /// A failed commit after approval is reported in the outcome, not as an
    /// error; the record stays `APPROVED`.
    pub fn review(
        &self,
        record_id: &ChangeId,
        decision: ReviewDecision,
        reviewer: &UserId,
    ) -> Result<ReviewOutcome> {
        let record = self.log.get(record_id)?;

        if !self.policy.is_privileged(reviewer) {
            return Err(PriorityError::Forbidden(format!(
                "{} may not review priority changes",
                reviewer
            )));
        }
        if !record.is_pending() {
            return Err(PriorityError::AlreadyReviewed {
                id: record.id.to_string(),
                status: record.status,
            });
        }

        let rank = match decision {
            ReviewDecision::Approve if record.new_rank.is_none() => Some(
                self.store
                    .issue_rank(record.entity_type, record.new_quadrant)?,
            ),
            _ => None,
        };

        let reviewed = self
            .log
            .review(record_id, decision, reviewer, rank, self.clock.now())?;

        let commit = match reviewed.status {
            ChangeStatus::Approved => self.commit(&reviewed)?,
            _ => CommitOutcome::NotApplied,
        };

        info!(
            record_id = %reviewed.id,
            reviewed_by = %reviewer,
            status = %reviewed.status,
            applied = commit.is_applied(),
            "priority change reviewed"
        );

        Ok(ReviewOutcome {
            record: reviewed,
            commit,
        })
    }

    /// Applies an approved record to its entity.
    fn commit(&self, record: &PriorityChangeRecord) -> Result<CommitOutcome> {
        let entity = record.entity_ref();
        let rank = match record.new_rank {
            Some(rank) => rank,
            None => self
                .store
                .issue_rank(record.entity_type, record.new_quadrant)?,
        };

        let failure = match self.store.commit_priority(
            &entity,
            record.new_quadrant,
            rank,
            self.clock.now(),
        ) {
            Ok(_) => {
                return Ok(CommitOutcome::Applied {
                    quadrant: record.new_quadrant,
                    rank,
                })
            }
            Err(PersistenceError::StaleEntity { .. }) => CommitFailure::StaleEntity {
                entity: entity.clone(),
            },
            Err(PersistenceError::RankCollision {
                quadrant,
                rank,
                holder,
                ..
            }) => CommitFailure::RankCollision {
                quadrant,
                rank,
                holder,
            },
            Err(other) => return Err(other.into()),
        };

        warn!(
            record_id = %record.id,
            entity = %entity,
            failure = ?failure,
            "approved change could not be applied"
        );
        Ok(CommitOutcome::Failed(failure))
    }

    fn check_rank_free(
        &self,
        entity: &EntityRef,
        quadrant: PriorityQuadrant,
        rank: u32,
    ) -> Result<()> {
        let holder = self
            .store
            .list(entity.entity_type, &EntityFilter::new().with_quadrant(quadrant))?
            .into_iter()
            .find(|e| e.rank() == Some(rank) && e.entity_id() != entity.id);

        match holder {
            Some(holder) => Err(PriorityError::RankCollision {
                kind: entity.entity_type,
                quadrant,
                rank,
                holder: holder.entity_id().to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn get_record(&self, record_id: &ChangeId) -> Result<PriorityChangeRecord> {
        Ok(self.log.get(record_id)?)
    }

    /// Records matching `filter`, in sequence order.
    pub fn list_records(&self, filter: &ChangeFilter) -> Result<Vec<PriorityChangeRecord>> {
        Ok(self
            .log
            .list()?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect())
    }

    /// Every change ever requested for one entity, oldest first.
    pub fn history(&self, entity: &EntityRef) -> Result<Vec<PriorityChangeRecord>> {
        self.list_records(
            &ChangeFilter::new()
                .with_entity_type(entity.entity_type)
                .with_entity_id(entity.id.clone()),
        )
    }

    /// Records awaiting review, oldest first.
    pub fn pending(&self) -> Result<Vec<PriorityChangeRecord>> {
        self.list_records(&ChangeFilter::new().with_status(ChangeStatus::Pending))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::policy::{Role, StaticRoles};
    use chrono::{Duration, TimeZone, Utc};
    use quadrant_models::{Entity, ErrorKind, Module, Project, Task};
    use quadrant_persistence::{JsonChangeLog, JsonEntityStore};
    use tempfile::tempdir;

    const Q1: PriorityQuadrant = PriorityQuadrant::ImportantUrgent;
    const Q2: PriorityQuadrant = PriorityQuadrant::ImportantNotUrgent;

    struct Fixture {
        _dir: tempfile::TempDir,
        store: Arc<dyn EntityStore>,
        clock: Arc<FixedClock>,
        workflow: PriorityWorkflow,
    }

    fn admin() -> UserId {
        UserId::from_string("user-admin")
    }

    fn dev() -> UserId {
        UserId::from_string("user-dev")
    }

    fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let store: Arc<dyn EntityStore> = Arc::new(JsonEntityStore::new(dir.path()));
        let log: Arc<dyn ChangeLog> = Arc::new(JsonChangeLog::new(dir.path()));
        let roles = StaticRoles::new()
            .with_role(admin(), Role::Admin)
            .with_role(dev(), Role::Member);
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
        ));
        let workflow = PriorityWorkflow::new(
            store.clone(),
            log,
            ApprovalPolicy::new(Arc::new(roles)),
        )
        .with_clock(clock.clone());

        Fixture {
            _dir: dir,
            store,
            clock,
            workflow,
        }
    }

    impl Fixture {
        fn module(&self, quadrant: PriorityQuadrant, rank: Option<u32>) -> Module {
            let mut module = Module::new("proj-1", "Engine");
            module.quadrant = quadrant;
            module.rank = rank;
            self.store.save(&Entity::from(module.clone())).unwrap();
            module
        }

        fn reload(&self, entity: &EntityRef) -> Entity {
            self.store.get(entity).unwrap()
        }
    }

    #[test]
    fn test_member_request_is_pending_and_entity_untouched() {
        let f = fixture();
        let module = f.module(Q1, Some(3));
        let entity = module.entity_ref();

        let outcome = f
            .workflow
            .request_change(&entity, Q2, None, "can wait", &dev())
            .unwrap();

        assert!(outcome.needs_approval);
        assert_eq!(outcome.record.status, ChangeStatus::Pending);
        assert_eq!(outcome.record.old_quadrant, Q1);
        assert_eq!(outcome.record.old_rank, Some(3));
        assert_eq!(outcome.record.new_rank, None);
        assert_eq!(outcome.commit, CommitOutcome::NotApplied);

        let after = f.reload(&entity);
        assert_eq!((after.quadrant(), after.rank()), (Q1, Some(3)));
    }

    #[test]
    fn test_admin_request_is_applied() {
        let f = fixture();
        let module = f.module(Q1, Some(3));
        let entity = module.entity_ref();

        let outcome = f
            .workflow
            .request_change(&entity, Q2, None, "reshuffle", &admin())
            .unwrap();

        assert!(!outcome.needs_approval);
        assert_eq!(outcome.record.status, ChangeStatus::Approved);
        assert_eq!(outcome.record.new_rank, Some(1));
        assert_eq!(
            outcome.commit,
            CommitOutcome::Applied {
                quadrant: Q2,
                rank: 1
            }
        );

        let after = f.reload(&entity);
        assert_eq!((after.quadrant(), after.rank()), (Q2, Some(1)));
    }

    #[test]
    fn test_max_rank_exhausts_quadrant() {
        let f = fixture();
        let top = f.module(Q1, Some(1));
        let other = f.module(Q1, Some(2));

        let outcome = f
            .workflow
            .request_change(&top.entity_ref(), Q2, Some(u32::MAX), "pin", &admin())
            .unwrap();
        assert!(outcome.commit.is_applied());

        let err = f
            .workflow
            .request_change(&other.entity_ref(), Q2, None, "follow", &admin())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let after = f.reload(&other.entity_ref());
        assert_eq!((after.quadrant(), after.rank()), (Q1, Some(2)));
    }

    #[test]
    fn test_request_validation() {
        let f = fixture();
        let module = f.module(Q1, Some(1));

        let zero = f
            .workflow
            .request_change(&module.entity_ref(), Q2, Some(0), "bad", &admin());
        assert_eq!(zero.unwrap_err().kind(), ErrorKind::Validation);

        let missing = f.workflow.request_change(
            &EntityRef::task("task-missing"),
            Q2,
            None,
            "gone",
            &admin(),
        );
        assert!(matches!(missing, Err(PriorityError::NotFound(_))));

        assert!(f.workflow.list_records(&ChangeFilter::new()).unwrap().is_empty());
    }

    #[test]
    fn test_request_rank_collision() {
        let f = fixture();
        f.module(Q2, Some(2));
        let mover = f.module(Q1, Some(1));

        let result = f
            .workflow
            .request_change(&mover.entity_ref(), Q2, Some(2), "swap", &dev());
        assert!(matches!(
            result,
            Err(PriorityError::RankCollision { rank: 2, .. })
        ));

        // Keeping its own rank is not a collision.
        let own = f
            .workflow
            .request_change(&mover.entity_ref(), Q1, Some(1), "noop", &dev());
        assert!(own.is_ok());
    }

    #[test]
    fn test_review_approve_assigns_fresh_rank() {
        let f = fixture();
        let other = f.module(Q2, Some(5));
        let module = f.module(Q1, Some(3));
        let entity = module.entity_ref();

        let requested = f
            .workflow
            .request_change(&entity, Q2, None, "later", &dev())
            .unwrap();

        f.clock.advance(Duration::hours(1));
        let reviewed = f
            .workflow
            .review(&requested.record.id, ReviewDecision::Approve, &admin())
            .unwrap();

        assert_eq!(reviewed.record.status, ChangeStatus::Approved);
        assert_eq!(reviewed.record.reviewed_by, Some(admin()));
        assert_eq!(reviewed.record.reviewed_at, Some(f.clock.now()));
        assert_eq!(reviewed.record.new_rank, Some(6));
        assert!(reviewed.commit.is_applied());

        let after = f.reload(&entity);
        assert_eq!((after.quadrant(), after.rank()), (Q2, Some(6)));
        assert_ne!(after.rank(), other.rank);
    }

    #[test]
    fn test_review_reject_leaves_entity() {
        let f = fixture();
        let module = f.module(Q1, Some(3));
        let entity = module.entity_ref();

        let requested = f
            .workflow
            .request_change(&entity, Q2, None, "later", &dev())
            .unwrap();
        let reviewed = f
            .workflow
            .review(&requested.record.id, ReviewDecision::Reject, &admin())
            .unwrap();

        assert_eq!(reviewed.record.status, ChangeStatus::Rejected);
        assert_eq!(reviewed.record.new_rank, None);
        assert_eq!(reviewed.commit, CommitOutcome::NotApplied);
        assert_eq!(f.reload(&entity).quadrant(), Q1);
    }

    #[test]
    fn test_review_twice_is_already_reviewed() {
        let f = fixture();
        let module = f.module(Q1, Some(3));

        let requested = f
            .workflow
            .request_change(&module.entity_ref(), Q2, None, "later", &dev())
            .unwrap();
        let first = f
            .workflow
            .review(&requested.record.id, ReviewDecision::Reject, &admin())
            .unwrap();

        let second = f
            .workflow
            .review(&requested.record.id, ReviewDecision::Approve, &admin());
        assert!(matches!(
            second,
            Err(PriorityError::AlreadyReviewed {
                status: ChangeStatus::Rejected,
                ..
            })
        ));
        assert_eq!(
            f.workflow.get_record(&requested.record.id).unwrap(),
            first.record
        );
        assert_eq!(f.reload(&module.entity_ref()).quadrant(), Q1);
    }

    #[test]
    fn test_review_requires_privilege() {
        let f = fixture();
        let module = f.module(Q1, Some(3));
        let requested = f
            .workflow
            .request_change(&module.entity_ref(), Q2, None, "later", &dev())
            .unwrap();

        let result = f
            .workflow
            .review(&requested.record.id, ReviewDecision::Approve, &dev());
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Forbidden);
        assert!(f
            .workflow
            .get_record(&requested.record.id)
            .unwrap()
            .is_pending());
    }

    #[test]
    fn test_review_unknown_record() {
        let f = fixture();
        let result = f.workflow.review(
            &ChangeId::from_string("chg-missing"),
            ReviewDecision::Approve,
            &admin(),
        );
        assert!(matches!(result, Err(PriorityError::NotFound(_))));
    }

    #[test]
    fn test_approve_after_delete_is_stale() {
        let f = fixture();
        let module = f.module(Q1, Some(3));
        let entity = module.entity_ref();

        let requested = f
            .workflow
            .request_change(&entity, Q2, None, "later", &dev())
            .unwrap();
        f.store.delete(&entity).unwrap();

        let reviewed = f
            .workflow
            .review(&requested.record.id, ReviewDecision::Approve, &admin())
            .unwrap();

        assert_eq!(reviewed.record.status, ChangeStatus::Approved);
        assert_eq!(
            reviewed.commit,
            CommitOutcome::Failed(CommitFailure::StaleEntity {
                entity: entity.clone()
            })
        );
        let err = reviewed.into_result().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StaleEntity);

        let stored = f.workflow.get_record(&requested.record.id).unwrap();
        assert_eq!(stored.status, ChangeStatus::Approved);
    }

    #[test]
    fn test_approve_after_rank_taken_reports_collision() {
        let f = fixture();
        let module = f.module(Q1, Some(3));
        let requested = f
            .workflow
            .request_change(&module.entity_ref(), Q2, Some(4), "slot four", &dev())
            .unwrap();

        f.module(Q2, Some(4));

        let reviewed = f
            .workflow
            .review(&requested.record.id, ReviewDecision::Approve, &admin())
            .unwrap();
        assert!(matches!(
            reviewed.commit,
            CommitOutcome::Failed(CommitFailure::RankCollision { rank: 4, .. })
        ));
        assert_eq!(reviewed.record.status, ChangeStatus::Approved);
    }

    #[test]
    fn test_history_and_pending() {
        let f = fixture();
        let project = Project::new("Apollo");
        f.store.save(&Entity::from(project.clone())).unwrap();
        let task = Task::new(project.id.clone(), "Ignition");
        f.store.save(&Entity::from(task.clone())).unwrap();

        let p = project.entity_ref();
        let t = task.entity_ref();
        let first = f.workflow.request_change(&t, Q1, None, "a", &dev()).unwrap();
        f.workflow.request_change(&p, Q1, None, "b", &admin()).unwrap();
        let third = f.workflow.request_change(&t, Q2, None, "c", &dev()).unwrap();

        let history: Vec<ChangeId> = f
            .workflow
            .history(&t)
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(history, vec![first.record.id.clone(), third.record.id.clone()]);

        let pending = f.workflow.pending().unwrap();
        assert_eq!(pending.len(), 2);
        assert!(pending.windows(2).all(|w| w[0].sequence < w[1].sequence));

        let approved_projects = f
            .workflow
            .list_records(
                &ChangeFilter::new()
                    .with_status(ChangeStatus::Approved)
                    .with_entity_type(EntityType::Project),
            )
            .unwrap();
        assert_eq!(approved_projects.len(), 1);
    }
}
