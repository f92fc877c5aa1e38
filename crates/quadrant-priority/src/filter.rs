//! Change record filtering for queries.

use quadrant_models::{ChangeStatus, EntityType, PriorityChangeRecord};

/// Filter criteria for querying the change log.
#[derive(Debug, Clone, Default)]
pub struct ChangeFilter {
    /// Filter by approval status.
    pub status: Option<ChangeStatus>,
    /// Filter by target entity type.
    pub entity_type: Option<EntityType>,
    /// Filter by target entity id.
    pub entity_id: Option<String>,
}

impl ChangeFilter {
    /// Creates a new empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the status filter.
    pub fn with_status(mut self, status: ChangeStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the entity type filter.
    pub fn with_entity_type(mut self, entity_type: EntityType) -> Self {
        self.entity_type = Some(entity_type);
        self
    }

    /// Sets the entity id filter.
    pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Returns true if the record matches this filter.
    pub fn matches(&self, record: &PriorityChangeRecord) -> bool {
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }

        if let Some(entity_type) = self.entity_type {
            if record.entity_type != entity_type {
                return false;
            }
        }

        if let Some(ref entity_id) = self.entity_id {
            if record.entity_id != *entity_id {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quadrant_models::{ChangeDraft, ChangeId, PriorityQuadrant, UserId};

    fn make_record(entity_type: EntityType, entity_id: &str, status: ChangeStatus) -> PriorityChangeRecord {
        let draft = ChangeDraft {
            entity_type,
            entity_id: entity_id.to_string(),
            old_quadrant: PriorityQuadrant::NotImportantNotUrgent,
            new_quadrant: PriorityQuadrant::ImportantUrgent,
            old_rank: None,
            new_rank: Some(1),
            reason: "test".to_string(),
            requested_by: UserId::from_string("user-1"),
            status,
            reviewed_by: None,
            reviewed_at: None,
            created_at: Utc::now(),
        };
        PriorityChangeRecord::from_draft(ChangeId::new(), 1, draft)
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = ChangeFilter::new();
        let record = make_record(EntityType::Task, "task-1", ChangeStatus::Pending);
        assert!(filter.matches(&record));
    }

    #[test]
    fn test_filter_by_status() {
        let filter = ChangeFilter::new().with_status(ChangeStatus::Pending);

        let r1 = make_record(EntityType::Task, "task-1", ChangeStatus::Pending);
        let r2 = make_record(EntityType::Task, "task-1", ChangeStatus::Approved);

        assert!(filter.matches(&r1));
        assert!(!filter.matches(&r2));
    }

    #[test]
    fn test_combined_filters() {
        let filter = ChangeFilter::new()
            .with_status(ChangeStatus::Approved)
            .with_entity_type(EntityType::Module)
            .with_entity_id("mod-1");

        let hit = make_record(EntityType::Module, "mod-1", ChangeStatus::Approved);
        let wrong_type = make_record(EntityType::Task, "mod-1", ChangeStatus::Approved);
        let wrong_id = make_record(EntityType::Module, "mod-2", ChangeStatus::Approved);
        let wrong_status = make_record(EntityType::Module, "mod-1", ChangeStatus::Rejected);

        assert!(filter.matches(&hit));
        assert!(!filter.matches(&wrong_type));
        assert!(!filter.matches(&wrong_id));
        assert!(!filter.matches(&wrong_status));
    }
}
