//! Append-only log of priority-change records.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use quadrant_models::{ChangeDraft, ChangeId, PriorityChangeRecord, ReviewDecision, UserId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::atomic::{
    atomic_create_json, atomic_write_json, read_json, read_json_dir, read_json_optional,
};
use crate::error::{PersistenceError, Result};

/// Storage for the priority-change audit trail.
///
/// Records are appended, never removed. The only mutation is the single
/// review transition of a pending record, performed as one transaction.
pub trait ChangeLog: Send + Sync {
    /// Appends a record, assigning its id and the next sequence number.
    fn append(&self, draft: ChangeDraft) -> Result<PriorityChangeRecord>;

    /// Loads a record; `NotFound` if it does not exist.
    fn get(&self, id: &ChangeId) -> Result<PriorityChangeRecord>;

    /// Moves a pending record to its terminal state.
    ///
    /// Fails with `ModelError::AlreadyReviewed` (wrapped) and leaves the
    /// record untouched when it is not pending.
    fn review(
        &self,
        id: &ChangeId,
        decision: ReviewDecision,
        reviewer: &UserId,
        rank: Option<u32>,
        at: DateTime<Utc>,
    ) -> Result<PriorityChangeRecord>;

    /// All records in sequence order.
    fn list(&self) -> Result<Vec<PriorityChangeRecord>>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LogHead {
    last_sequence: u64,
}

/// JSON-file change log.
///
/// ```text
/// base_path/
/// └── changes/
///     ├── head.json          # last issued sequence number
///     └── records/
///         ├── chg-abc.json
///         └── chg-def.json
/// ```
pub struct JsonChangeLog {
    base_path: PathBuf,
    txn: Mutex<()>,
}

impl JsonChangeLog {
    /// Creates a new change log with the given base path.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            txn: Mutex::new(()),
        }
    }

    fn begin(&self) -> Result<MutexGuard<'_, ()>> {
        self.txn
            .lock()
            .map_err(|e| PersistenceError::LockPoisoned(e.to_string()))
    }

    fn head_path(&self) -> PathBuf {
        self.base_path.join("changes").join("head.json")
    }

    fn records_dir(&self) -> PathBuf {
        self.base_path.join("changes").join("records")
    }

    fn record_path(&self, id: &ChangeId) -> PathBuf {
        self.records_dir().join(format!("{}.json", id))
    }

    fn load(&self, id: &ChangeId) -> Result<PriorityChangeRecord> {
        let path = self.record_path(id);
        if !path.exists() {
            return Err(PersistenceError::NotFound {
                kind: "change".to_string(),
                id: id.to_string(),
            });
        }
        read_json(&path)
    }
}

impl ChangeLog for JsonChangeLog {
    fn append(&self, draft: ChangeDraft) -> Result<PriorityChangeRecord> {
        let _txn = self.begin()?;

        let mut head: LogHead = read_json_optional(&self.head_path())?.unwrap_or_default();
        head.last_sequence += 1;

        // Head first: a failed record write leaves a gap, never a reused number.
        atomic_write_json(&self.head_path(), &head)?;

        let record = PriorityChangeRecord::from_draft(ChangeId::new(), head.last_sequence, draft);
        atomic_create_json(&self.record_path(&record.id), &record)?;

        debug!(
            record_id = %record.id,
            sequence = record.sequence,
            status = %record.status,
            "change appended"
        );
        Ok(record)
    }

    fn get(&self, id: &ChangeId) -> Result<PriorityChangeRecord> {
        self.load(id)
    }

    fn review(
        &self,
        id: &ChangeId,
        decision: ReviewDecision,
        reviewer: &UserId,
        rank: Option<u32>,
        at: DateTime<Utc>,
    ) -> Result<PriorityChangeRecord> {
        let _txn = self.begin()?;

        let mut record = self.load(id)?;
        record.review(decision, reviewer.clone(), rank, at)?;
        atomic_write_json(&self.record_path(id), &record)?;

        debug!(record_id = %id, status = %record.status, "change reviewed");
        Ok(record)
    }

    fn list(&self) -> Result<Vec<PriorityChangeRecord>> {
        let mut records: Vec<PriorityChangeRecord> = read_json_dir(&self.records_dir())?;
        records.sort_by_key(|r| r.sequence);
        Ok(records)
    }
}
