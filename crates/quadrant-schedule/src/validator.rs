//! Date-constraint validation for proposed task schedules.
//!
//! Validation is advisory: every violated expectation is reported and the
//! caller decides whether to block or warn. A clean result is an empty
//! list, never an error.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use quadrant_models::{Entity, EntityRef, Module, Project, Task, TaskId};
use quadrant_persistence::{EntityFilter, EntityStore};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Result, ScheduleError};
use crate::graph::DependencyGraph;

/// Which constraint a conflict violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictScope {
    Module,
    Project,
    Dependency,
}

impl fmt::Display for ConflictScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictScope::Module => f.write_str("MODULE"),
            ConflictScope::Project => f.write_str("PROJECT"),
            ConflictScope::Dependency => f.write_str("DEPENDENCY"),
        }
    }
}

/// A single violated scheduling expectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub scope: ConflictScope,
    pub referenced_entity_id: String,
    pub message: String,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.scope, self.message)
    }
}

/// Everything the rules look at, already loaded.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleContext<'a> {
    pub module: Option<&'a Module>,
    pub project: &'a Project,
    /// Tasks that must finish before the validated task starts.
    pub predecessors: &'a [Task],
}

/// Applies the containment and precedence rules, in order, without
/// short-circuiting.
pub fn evaluate(
    ctx: &ScheduleContext<'_>,
    proposed_start: NaiveDate,
    proposed_end: Option<NaiveDate>,
) -> Result<Vec<Conflict>> {
    if let Some(end) = proposed_end {
        if end < proposed_start {
            return Err(ScheduleError::InvalidSchedule(format!(
                "proposed end {} is before proposed start {}",
                end, proposed_start
            )));
        }
    }

    let mut conflicts = Vec::new();

    if let Some(module) = ctx.module {
        if let Some(start) = module.window.binding_start() {
            if proposed_start < start {
                conflicts.push(Conflict {
                    scope: ConflictScope::Module,
                    referenced_entity_id: module.id.to_string(),
                    message: format!(
                        "task starts {} but module '{}' starts {}",
                        proposed_start, module.name, start
                    ),
                });
            }
        }
    }

    if let Some(start) = ctx.project.window.binding_start() {
        if proposed_start < start {
            conflicts.push(Conflict {
                scope: ConflictScope::Project,
                referenced_entity_id: ctx.project.id.to_string(),
                message: format!(
                    "task starts {} but project '{}' starts {}",
                    proposed_start, ctx.project.name, start
                ),
            });
        }
    }

    for upstream in ctx.predecessors {
        if upstream.is_complete() {
            continue;
        }
        let Some(end) = upstream.window.end_date else {
            continue;
        };
        if proposed_start < end {
            conflicts.push(Conflict {
                scope: ConflictScope::Dependency,
                referenced_entity_id: upstream.id.to_string(),
                message: format!(
                    "task starts {} but predecessor '{}' ends {}",
                    proposed_start, upstream.title, end
                ),
            });
        }
    }

    Ok(conflicts)
}

/// Loads a task's containers and predecessors from the store and
/// evaluates the scheduling rules against a proposed window.
pub struct DependencyValidator {
    store: Arc<dyn EntityStore>,
}

impl DependencyValidator {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Returns every conflict the proposed dates would cause.
    pub fn validate(
        &self,
        task: &Task,
        proposed_start: NaiveDate,
        proposed_end: Option<NaiveDate>,
    ) -> Result<Vec<Conflict>> {
        let project = match self.store.get(&EntityRef::project(&task.project_id))? {
            Entity::Project(p) => p,
            _ => return Err(ScheduleError::NotFound(format!("project {}", task.project_id))),
        };

        let module = match &task.module_id {
            Some(module_id) => match self.store.get(&EntityRef::module(module_id))? {
                Entity::Module(m) => Some(m),
                _ => return Err(ScheduleError::NotFound(format!("module {}", module_id))),
            },
            None => None,
        };

        let predecessors = self.predecessors_of(task)?;

        let ctx = ScheduleContext {
            module: module.as_ref(),
            project: &project,
            predecessors: &predecessors,
        };
        let conflicts = evaluate(&ctx, proposed_start, proposed_end)?;

        debug!(
            task_id = %task.id,
            proposed_start = %proposed_start,
            conflicts = conflicts.len(),
            "schedule validated"
        );
        Ok(conflicts)
    }

    /// Loads the tasks that must finish before `task` starts.
    ///
    /// Incoming edges may be stored on any task, so every task is scanned.
    /// Edges pointing at deleted tasks are skipped.
    fn predecessors_of(&self, task: &Task) -> Result<Vec<Task>> {
        let mut all: Vec<Task> = self
            .store
            .list(quadrant_models::EntityType::Task, &EntityFilter::new())?
            .into_iter()
            .filter_map(Entity::into_task)
            .collect();

        // The caller's copy may carry edges that are not saved yet.
        all.retain(|t| t.id != task.id);
        all.push(task.clone());

        let graph = DependencyGraph::from_tasks(&all);
        let ids: Vec<TaskId> = graph.predecessors(&task.id).cloned().collect();

        let mut predecessors = Vec::with_capacity(ids.len());
        for id in ids {
            match all.iter().find(|t| t.id == id) {
                Some(upstream) => predecessors.push(upstream.clone()),
                None => warn!(
                    task_id = %task.id,
                    missing = %id,
                    "dependency points at a missing task"
                ),
            }
        }
        Ok(predecessors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadrant_models::{DateWindow, DependencyEdge, TaskStatus};
    use quadrant_persistence::JsonEntityStore;
    use tempfile::tempdir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn setup() -> (tempfile::TempDir, Arc<dyn EntityStore>) {
        let dir = tempdir().unwrap();
        let store: Arc<dyn EntityStore> = Arc::new(JsonEntityStore::new(dir.path()));
        (dir, store)
    }

    fn save(store: &Arc<dyn EntityStore>, entity: impl Into<Entity>) {
        store.save(&entity.into()).unwrap();
    }

    #[test]
    fn test_unconstrained_task_has_no_conflicts() {
        let (_dir, store) = setup();
        let project =
            Project::new("Apollo").with_window(DateWindow::new(Some(date("2025-06-01")), None).unwrap());
        let module = Module::new(project.id.clone(), "Engine");
        let task = Task::new(project.id.clone(), "Ignition").in_module(module.id.clone());
        save(&store, project);
        save(&store, module);
        save(&store, task.clone());

        let validator = DependencyValidator::new(store);
        for start in ["2020-01-01", "2025-05-31", "2030-12-31"] {
            let conflicts = validator.validate(&task, date(start), None).unwrap();
            assert!(conflicts.is_empty());
        }
    }

    #[test]
    fn test_module_start_conflict() {
        let (_dir, store) = setup();
        let project = Project::new("Apollo");
        let module = Module::new(project.id.clone(), "Engine")
            .with_window(DateWindow::time_dependent(date("2025-03-01"), None).unwrap());
        let task = Task::new(project.id.clone(), "Ignition").in_module(module.id.clone());
        save(&store, project);
        save(&store, module.clone());
        save(&store, task.clone());

        let validator = DependencyValidator::new(store);
        let conflicts = validator
            .validate(&task, date("2025-02-15"), Some(date("2025-02-20")))
            .unwrap();

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].scope, ConflictScope::Module);
        assert_eq!(conflicts[0].referenced_entity_id, module.id.to_string());

        let clean = validator.validate(&task, date("2025-03-01"), None).unwrap();
        assert!(clean.is_empty());
    }

    #[test]
    fn test_all_rules_reported_in_order() {
        let (_dir, store) = setup();
        let project = Project::new("Apollo")
            .with_window(DateWindow::time_dependent(date("2025-03-10"), None).unwrap());
        let module = Module::new(project.id.clone(), "Engine")
            .with_window(DateWindow::time_dependent(date("2025-03-05"), None).unwrap());

        let upstream = Task::new(project.id.clone(), "Fuel")
            .with_window(DateWindow::new(None, Some(date("2025-03-20"))).unwrap());
        let mut task = Task::new(project.id.clone(), "Ignition").in_module(module.id.clone());
        task.dependencies
            .push(DependencyEdge::follows(task.id.clone(), upstream.id.clone()).unwrap());

        save(&store, project);
        save(&store, module);
        save(&store, upstream);
        save(&store, task.clone());

        let validator = DependencyValidator::new(store);
        let conflicts = validator.validate(&task, date("2025-03-01"), None).unwrap();

        let scopes: Vec<ConflictScope> = conflicts.iter().map(|c| c.scope).collect();
        assert_eq!(
            scopes,
            vec![
                ConflictScope::Module,
                ConflictScope::Project,
                ConflictScope::Dependency
            ]
        );
    }

    #[test]
    fn test_predecessor_end_date() {
        let (_dir, store) = setup();
        let project = Project::new("Apollo");
        let mut a = Task::new(project.id.clone(), "A")
            .with_window(DateWindow::new(None, Some(date("2025-04-10"))).unwrap());
        let b = Task::new(project.id.clone(), "B");
        // A PRECEDES B, stored on A.
        a.dependencies
            .push(DependencyEdge::precedes(a.id.clone(), b.id.clone()).unwrap());

        save(&store, project);
        save(&store, a.clone());
        save(&store, b.clone());

        let validator = DependencyValidator::new(store.clone());

        let early = validator.validate(&b, date("2025-04-05"), None).unwrap();
        assert_eq!(early.len(), 1);
        assert_eq!(early[0].scope, ConflictScope::Dependency);
        assert_eq!(early[0].referenced_entity_id, a.id.to_string());

        let late = validator.validate(&b, date("2025-04-11"), None).unwrap();
        assert!(late.is_empty());

        // A finished predecessor no longer constrains B.
        a.status = TaskStatus::Done;
        save(&store, a);
        let after_done = validator.validate(&b, date("2025-04-05"), None).unwrap();
        assert!(after_done.is_empty());
    }

    #[test]
    fn test_predecessor_without_end_date_is_ignored() {
        let (_dir, store) = setup();
        let project = Project::new("Apollo");
        let a = Task::new(project.id.clone(), "A");
        let mut b = Task::new(project.id.clone(), "B");
        b.dependencies
            .push(DependencyEdge::follows(b.id.clone(), a.id.clone()).unwrap());
        save(&store, project);
        save(&store, a);
        save(&store, b.clone());

        let validator = DependencyValidator::new(store);
        assert!(validator.validate(&b, date("2025-01-01"), None).unwrap().is_empty());
    }

    #[test]
    fn test_dangling_edge_is_skipped() {
        let (_dir, store) = setup();
        let project = Project::new("Apollo");
        let mut b = Task::new(project.id.clone(), "B");
        b.dependencies.push(
            DependencyEdge::follows(b.id.clone(), TaskId::from_string("task-deleted")).unwrap(),
        );
        save(&store, project);
        save(&store, b.clone());

        let validator = DependencyValidator::new(store);
        assert!(validator.validate(&b, date("2025-01-01"), None).unwrap().is_empty());
    }

    #[test]
    fn test_inverted_proposal_is_rejected() {
        let (_dir, store) = setup();
        let project = Project::new("Apollo");
        let task = Task::new(project.id.clone(), "Ignition");
        save(&store, project);

        let validator = DependencyValidator::new(store);
        let result = validator.validate(&task, date("2025-05-02"), Some(date("2025-05-01")));
        assert!(matches!(result, Err(ScheduleError::InvalidSchedule(_))));
    }

    #[test]
    fn test_missing_project_is_not_found() {
        let (_dir, store) = setup();
        let task = Task::new("proj-missing", "Orphan");

        let validator = DependencyValidator::new(store);
        let result = validator.validate(&task, date("2025-05-01"), None);
        assert!(matches!(result, Err(ScheduleError::NotFound(_))));
    }
}
