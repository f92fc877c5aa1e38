//! Task-to-task dependency edges.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ModelError, Result};
use crate::ids::TaskId;

/// Direction of a dependency edge, read as `task_id <kind> depends_on_task_id`.
///
/// `A PRECEDES B` and `B FOLLOWS A` describe the same constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DependencyKind {
    /// `task_id` must finish before `depends_on_task_id` starts.
    Precedes,
    /// `task_id` starts only after `depends_on_task_id` finishes.
    Follows,
}

impl DependencyKind {
    pub fn inverse(&self) -> Self {
        match self {
            DependencyKind::Precedes => DependencyKind::Follows,
            DependencyKind::Follows => DependencyKind::Precedes,
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyKind::Precedes => f.write_str("PRECEDES"),
            DependencyKind::Follows => f.write_str("FOLLOWS"),
        }
    }
}

/// A directed precedence relationship between two tasks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Task the edge is stored on.
    pub task_id: TaskId,
    /// The other end of the edge.
    pub depends_on_task_id: TaskId,
    pub kind: DependencyKind,
}

impl DependencyEdge {
    /// Creates an edge, rejecting self-loops.
    pub fn new(task_id: TaskId, depends_on_task_id: TaskId, kind: DependencyKind) -> Result<Self> {
        if task_id == depends_on_task_id {
            return Err(ModelError::SelfDependency(task_id.to_string()));
        }
        Ok(Self {
            task_id,
            depends_on_task_id,
            kind,
        })
    }

    /// `before` must finish before `after` starts.
    pub fn precedes(before: TaskId, after: TaskId) -> Result<Self> {
        Self::new(before, after, DependencyKind::Precedes)
    }

    /// `after` starts only once `before` has finished.
    pub fn follows(after: TaskId, before: TaskId) -> Result<Self> {
        Self::new(after, before, DependencyKind::Follows)
    }

    /// The task that has to finish first.
    pub fn predecessor(&self) -> &TaskId {
        match self.kind {
            DependencyKind::Precedes => &self.task_id,
            DependencyKind::Follows => &self.depends_on_task_id,
        }
    }

    /// The task that waits.
    pub fn successor(&self) -> &TaskId {
        match self.kind {
            DependencyKind::Precedes => &self.depends_on_task_id,
            DependencyKind::Follows => &self.task_id,
        }
    }

    /// Returns the same constraint stored from the other end.
    pub fn inverse(&self) -> Self {
        Self {
            task_id: self.depends_on_task_id.clone(),
            depends_on_task_id: self.task_id.clone(),
            kind: self.kind.inverse(),
        }
    }

    /// True if both edges encode the same `(predecessor, successor)` pair.
    pub fn same_constraint(&self, other: &DependencyEdge) -> bool {
        self.predecessor() == other.predecessor() && self.successor() == other.successor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TaskId {
        TaskId::from_string(s)
    }

    #[test]
    fn test_self_loop_rejected() {
        let result = DependencyEdge::new(t("a"), t("a"), DependencyKind::Precedes);
        assert!(matches!(result, Err(ModelError::SelfDependency(_))));
    }

    #[test]
    fn test_precedes_and_follows_normalize() {
        let p = DependencyEdge::precedes(t("a"), t("b")).unwrap();
        let f = DependencyEdge::follows(t("b"), t("a")).unwrap();

        assert_eq!(p.predecessor(), &t("a"));
        assert_eq!(p.successor(), &t("b"));
        assert_eq!(f.predecessor(), &t("a"));
        assert_eq!(f.successor(), &t("b"));
        assert!(p.same_constraint(&f));
        assert_eq!(p.inverse(), f);
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&DependencyKind::Follows).unwrap();
        assert_eq!(json, "\"FOLLOWS\"");
    }
}
