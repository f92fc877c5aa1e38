//! Eisenhower priority quadrants and entity references.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// One of the four Eisenhower buckets crossing importance and urgency.
///
/// The derived ordering is the default sort order:
/// `ImportantUrgent < ImportantNotUrgent < NotImportantUrgent < NotImportantNotUrgent`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityQuadrant {
    /// Do first.
    ImportantUrgent,
    /// Schedule.
    ImportantNotUrgent,
    /// Delegate.
    NotImportantUrgent,
    /// Eliminate. Every new entity starts here.
    #[default]
    NotImportantNotUrgent,
}

impl PriorityQuadrant {
    /// All quadrants in sort order.
    pub const ALL: [PriorityQuadrant; 4] = [
        PriorityQuadrant::ImportantUrgent,
        PriorityQuadrant::ImportantNotUrgent,
        PriorityQuadrant::NotImportantUrgent,
        PriorityQuadrant::NotImportantNotUrgent,
    ];

    /// Builds a quadrant from its two axes.
    pub fn from_axes(important: bool, urgent: bool) -> Self {
        match (important, urgent) {
            (true, true) => PriorityQuadrant::ImportantUrgent,
            (true, false) => PriorityQuadrant::ImportantNotUrgent,
            (false, true) => PriorityQuadrant::NotImportantUrgent,
            (false, false) => PriorityQuadrant::NotImportantNotUrgent,
        }
    }

    pub fn is_important(&self) -> bool {
        matches!(
            self,
            PriorityQuadrant::ImportantUrgent | PriorityQuadrant::ImportantNotUrgent
        )
    }

    pub fn is_urgent(&self) -> bool {
        matches!(
            self,
            PriorityQuadrant::ImportantUrgent | PriorityQuadrant::NotImportantUrgent
        )
    }

    /// Returns the wire name of the quadrant.
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityQuadrant::ImportantUrgent => "IMPORTANT_URGENT",
            PriorityQuadrant::ImportantNotUrgent => "IMPORTANT_NOT_URGENT",
            PriorityQuadrant::NotImportantUrgent => "NOT_IMPORTANT_URGENT",
            PriorityQuadrant::NotImportantNotUrgent => "NOT_IMPORTANT_NOT_URGENT",
        }
    }
}

impl fmt::Display for PriorityQuadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriorityQuadrant {
    type Err = ModelError;

    /// Parses the wire name, ignoring case and accepting `-` for `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        PriorityQuadrant::ALL
            .into_iter()
            .find(|q| q.as_str() == normalized)
            .ok_or_else(|| ModelError::InvalidQuadrant(s.to_string()))
    }
}

/// Concrete kind of a prioritized entity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Project,
    Module,
    Task,
}

impl EntityType {
    pub const ALL: [EntityType; 3] = [EntityType::Project, EntityType::Module, EntityType::Task];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Project => "project",
            EntityType::Module => "module",
            EntityType::Task => "task",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "project" => Ok(EntityType::Project),
            "module" => Ok(EntityType::Module),
            "task" => Ok(EntityType::Task),
            _ => Err(ModelError::InvalidEntityType(s.to_string())),
        }
    }
}

/// Reference to a prioritized entity by type and opaque id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub entity_type: EntityType,
    pub id: String,
}

impl EntityRef {
    pub fn new(entity_type: EntityType, id: impl Into<String>) -> Self {
        Self {
            entity_type,
            id: id.into(),
        }
    }

    pub fn project(id: impl AsRef<str>) -> Self {
        Self::new(EntityType::Project, id.as_ref())
    }

    pub fn module(id: impl AsRef<str>) -> Self {
        Self::new(EntityType::Module, id.as_ref())
    }

    pub fn task(id: impl AsRef<str>) -> Self {
        Self::new(EntityType::Task, id.as_ref())
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.id)
    }
}
