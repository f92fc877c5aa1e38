//! Priority management for Quadrant.
//!
//! This crate provides:
//! - The approval workflow for priority changes ([`PriorityWorkflow`])
//! - Rank issuance and quadrant listings ([`PriorityOrdering`])
//! - The privilege boundary between requesters and reviewers ([`ApprovalPolicy`])
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use quadrant_models::{EntityRef, PriorityQuadrant, UserId};
//! use quadrant_persistence::{JsonChangeLog, JsonEntityStore};
//! use quadrant_priority::{ApprovalPolicy, PriorityWorkflow, Role, StaticRoles};
//!
//! let store = Arc::new(JsonEntityStore::new("/tmp/quadrant"));
//! let log = Arc::new(JsonChangeLog::new("/tmp/quadrant"));
//! let roles = StaticRoles::new().with_role("user-alice", Role::ProjectManager);
//! let workflow = PriorityWorkflow::new(store, log, ApprovalPolicy::new(Arc::new(roles)));
//!
//! let outcome = workflow
//!     .request_change(
//!         &EntityRef::task("task-123"),
//!         PriorityQuadrant::ImportantUrgent,
//!         None,
//!         "customer escalation",
//!         &UserId::from_string("user-alice"),
//!     )
//!     .unwrap();
//! assert!(!outcome.needs_approval);
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod filter;
pub mod ordering;
pub mod policy;
pub mod workflow;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{default_data_dir, EngineConfig, DATA_DIR_ENV};
pub use error::{PriorityError, Result};
pub use filter::ChangeFilter;
pub use ordering::{PriorityOrdering, QuadrantBoard, QuadrantLane};
pub use policy::{ApprovalPolicy, Role, RoleResolver, StaticRoles};
pub use workflow::{
    CommitFailure, CommitOutcome, PriorityWorkflow, RequestOutcome, ReviewOutcome,
};
