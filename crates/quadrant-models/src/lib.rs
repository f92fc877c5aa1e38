//! Core data models for Quadrant.
//!
//! This crate provides the fundamental data types shared by the scheduling
//! engine: typed identifiers, Eisenhower priority quadrants, the
//! project → module → task containment tree, dependency edges, PERT
//! estimates and the priority-change audit record.

pub mod change;
pub mod dependency;
pub mod entity;
pub mod error;
pub mod ids;
pub mod pert;
pub mod priority;

// Re-export main types
pub use change::{ChangeDraft, ChangeStatus, PriorityChangeRecord, ReviewDecision};
pub use dependency::{DependencyEdge, DependencyKind};
pub use entity::{DateWindow, Entity, Module, PrioritizedEntity, Project, Task, TaskStatus};
pub use error::{ErrorKind, ModelError, Result};
pub use ids::{ChangeId, ModuleId, ProjectId, TaskId, UserId};
pub use pert::PertEstimate;
pub use priority::{EntityRef, EntityType, PriorityQuadrant};
