//! Persistence layer for Quadrant.
//!
//! This crate defines the storage seams the scheduling engine depends on,
//! [`EntityStore`] and [`ChangeLog`], together with crash-safe JSON file
//! implementations built on atomic file operations (write to temp file,
//! then rename).
//!
//! Each store primitive is a single transaction: the JSON stores hold a
//! store-wide lock for the duration of a read-check-write sequence, so
//! callers never need locking of their own.
//!
//! # Example
//!
//! ```no_run
//! use quadrant_persistence::{EntityStore, JsonEntityStore};
//! use quadrant_models::{Entity, EntityType, PriorityQuadrant, Project};
//!
//! let store = JsonEntityStore::new("/home/user/.quadrant");
//!
//! let project = Project::new("Apollo");
//! store.save(&Entity::from(project)).unwrap();
//!
//! let rank = store
//!     .issue_rank(EntityType::Project, PriorityQuadrant::ImportantUrgent)
//!     .unwrap();
//! assert!(rank >= 1);
//! ```

pub mod atomic;
pub mod change_log;
pub mod entity_store;
pub mod error;
pub mod ranks;

pub use change_log::{ChangeLog, JsonChangeLog};
pub use entity_store::{EntityFilter, EntityStore, JsonEntityStore};
pub use error::{PersistenceError, Result};
pub use ranks::RankLedger;
