//! High-water marks for rank issuance.

use std::collections::BTreeMap;

use quadrant_models::{EntityType, PriorityQuadrant};
use serde::{Deserialize, Serialize};

/// Highest rank ever issued or observed per `(entity type, quadrant)`.
///
/// The ledger only moves upward, which is what keeps ranks from being
/// reissued after the entity holding them is deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankLedger {
    #[serde(default)]
    high_water: BTreeMap<EntityType, BTreeMap<PriorityQuadrant, u32>>,
}

impl RankLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest rank recorded for the bucket, 0 if none.
    pub fn high_water(&self, entity_type: EntityType, quadrant: PriorityQuadrant) -> u32 {
        self.high_water
            .get(&entity_type)
            .and_then(|q| q.get(&quadrant))
            .copied()
            .unwrap_or(0)
    }

    /// Records that `rank` is in use; never lowers the mark.
    pub fn observe(&mut self, entity_type: EntityType, quadrant: PriorityQuadrant, rank: u32) {
        let slot = self
            .high_water
            .entry(entity_type)
            .or_default()
            .entry(quadrant)
            .or_insert(0);
        *slot = (*slot).max(rank);
    }

    /// Issues `1 + max(high water, live_max)` and records it.
    ///
    /// Returns `None` once the bucket has reached `u32::MAX`; the mark is
    /// left unchanged.
    pub fn issue(
        &mut self,
        entity_type: EntityType,
        quadrant: PriorityQuadrant,
        live_max: Option<u32>,
    ) -> Option<u32> {
        let floor = self
            .high_water(entity_type, quadrant)
            .max(live_max.unwrap_or(0));
        let next = floor.checked_add(1)?;
        self.observe(entity_type, quadrant, next);
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: EntityType = EntityType::Task;
    const Q: PriorityQuadrant = PriorityQuadrant::ImportantUrgent;

    #[test]
    fn test_first_issue_is_one() {
        let mut ledger = RankLedger::new();
        assert_eq!(ledger.issue(T, Q, None), Some(1));
        assert_eq!(ledger.issue(T, Q, None), Some(2));
    }

    #[test]
    fn test_issue_respects_live_ranks() {
        let mut ledger = RankLedger::new();
        assert_eq!(ledger.issue(T, Q, Some(5)), Some(6));
    }

    #[test]
    fn test_issue_never_goes_back() {
        let mut ledger = RankLedger::new();
        ledger.issue(T, Q, Some(5));
        // Everything deleted: live max is gone, mark stays.
        assert_eq!(ledger.issue(T, Q, None), Some(7));
    }

    #[test]
    fn test_buckets_are_independent() {
        let mut ledger = RankLedger::new();
        ledger.observe(T, Q, 10);
        assert_eq!(ledger.issue(EntityType::Module, Q, None), Some(1));
        assert_eq!(
            ledger.issue(T, PriorityQuadrant::ImportantNotUrgent, None),
            Some(1)
        );
        assert_eq!(ledger.high_water(T, Q), 10);
    }

    #[test]
    fn test_issue_stops_at_max() {
        let mut ledger = RankLedger::new();
        ledger.observe(T, Q, u32::MAX - 1);
        assert_eq!(ledger.issue(T, Q, None), Some(u32::MAX));
        assert_eq!(ledger.issue(T, Q, None), None);
        assert_eq!(ledger.issue(T, Q, Some(u32::MAX)), None);
        assert_eq!(ledger.high_water(T, Q), u32::MAX);
    }

    #[test]
    fn test_observe_does_not_lower() {
        let mut ledger = RankLedger::new();
        ledger.observe(T, Q, 8);
        ledger.observe(T, Q, 3);
        assert_eq!(ledger.high_water(T, Q), 8);
    }

    #[test]
    fn test_ledger_roundtrips_through_json() {
        let mut ledger = RankLedger::new();
        ledger.observe(T, Q, 4);
        let json = serde_json::to_string(&ledger).unwrap();
        assert!(json.contains("IMPORTANT_URGENT"));
        let back: RankLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ledger);
    }
}
