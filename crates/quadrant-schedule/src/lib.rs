//! Task scheduling for Quadrant.
//!
//! This crate provides:
//! - PERT three-point estimation ([`pert`])
//! - The precedence graph with cycle rejection ([`graph`])
//! - Advisory date-constraint validation ([`validator`])
//! - Store-backed dependency, estimate and date operations ([`scheduler`])

pub mod error;
pub mod graph;
pub mod pert;
pub mod scheduler;
pub mod validator;

pub use error::{Result, ScheduleError};
pub use graph::DependencyGraph;
pub use pert::{estimate, estimate_of, path_estimate, ExpectedDuration, PathEstimate};
pub use scheduler::{CriticalPath, ScheduleMode, TaskScheduler};
pub use validator::{evaluate, Conflict, ConflictScope, DependencyValidator, ScheduleContext};
