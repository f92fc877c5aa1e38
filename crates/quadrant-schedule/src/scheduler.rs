//! Task-level scheduling operations backed by the entity store.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use quadrant_models::{
    DateWindow, DependencyEdge, Entity, EntityRef, EntityType, PertEstimate, ProjectId, Task,
    TaskId, TaskStatus,
};
use quadrant_persistence::{EntityFilter, EntityStore};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Result, ScheduleError};
use crate::graph::DependencyGraph;
use crate::pert::{estimate_of, ExpectedDuration, PathEstimate};
use crate::validator::{Conflict, DependencyValidator};

/// How a reschedule treats conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScheduleMode {
    /// Save the dates and report conflicts.
    #[default]
    Advisory,
    /// Refuse to save when any conflict exists.
    Enforce,
}

/// Longest chain of dependent tasks in a project, by expected duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalPath {
    pub tasks: Vec<TaskId>,
    pub estimate: PathEstimate,
}

/// Applies estimate, dependency and date changes to stored tasks.
pub struct TaskScheduler {
    store: Arc<dyn EntityStore>,
    validator: DependencyValidator,
}

impl TaskScheduler {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            validator: DependencyValidator::new(store.clone()),
            store,
        }
    }

    pub fn validator(&self) -> &DependencyValidator {
        &self.validator
    }

    /// Loads a task by id.
    pub fn task(&self, id: &TaskId) -> Result<Task> {
        match self.store.get(&EntityRef::task(id))? {
            Entity::Task(task) => Ok(task),
            _ => Err(ScheduleError::NotFound(format!("task {}", id))),
        }
    }

    fn all_tasks(&self) -> Result<Vec<Task>> {
        Ok(self
            .store
            .list(EntityType::Task, &EntityFilter::new())?
            .into_iter()
            .filter_map(Entity::into_task)
            .collect())
    }


    /// Records a precedence constraint on the edge's owning task.
    ///
    /// Refuses edges to unknown tasks, duplicates (in either direction) and
    /// edges that would close a cycle.
    pub fn add_dependency(&self, edge: DependencyEdge) -> Result<Task> {
        self.task(&edge.task_id)?;
        self.task(&edge.depends_on_task_id)?;

        let tasks = self.all_tasks()?;
        let mut graph = DependencyGraph::from_tasks(&tasks);
        graph.insert(&edge)?;

        let owner = self.store.update_task(&edge.task_id, &mut |task| {
            if task.dependencies.iter().any(|e| e.same_constraint(&edge)) {
                return false;
            }
            task.dependencies.push(edge.clone());
            task.updated_at = Utc::now();
            true
        })?;

        info!(
            predecessor = %edge.predecessor(),
            successor = %edge.successor(),
            kind = %edge.kind,
            "dependency added"
        );
        Ok(owner)
    }

    /// Removes a precedence constraint, wherever it is stored.
    ///
    /// Returns false if no such constraint existed.
    pub fn remove_dependency(&self, edge: &DependencyEdge) -> Result<bool> {
        let mut removed = false;
        for id in [&edge.task_id, &edge.depends_on_task_id] {
            let result = self.store.update_task(id, &mut |task| {
                let before = task.dependencies.len();
                task.dependencies.retain(|e| !e.same_constraint(edge));
                if task.dependencies.len() == before {
                    return false;
                }
                task.updated_at = Utc::now();
                removed = true;
                true
            });
            match result.map_err(ScheduleError::from) {
                Ok(_) | Err(ScheduleError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }

        if removed {
            info!(
                predecessor = %edge.predecessor(),
                successor = %edge.successor(),
                "dependency removed"
            );
        }
        Ok(removed)
    }

    /// Replaces the task's estimate and returns its PERT statistics.
    pub fn set_estimate(&self, task_id: &TaskId, estimate: PertEstimate) -> Result<ExpectedDuration> {
        estimate.validate().map_err(|e| match e {
            quadrant_models::ModelError::InvalidEstimate(msg) => ScheduleError::InvalidEstimate(msg),
            other => ScheduleError::Model(other),
        })?;

        self.store.update_task(task_id, &mut |task| {
            task.estimate = Some(estimate);
            task.updated_at = Utc::now();
            true
        })?;

        let stats = estimate_of(&estimate);
        info!(
            task_id = %task_id,
            expected = stats.expected,
            std_dev = stats.std_dev,
            "estimate set"
        );
        Ok(stats)
    }

    pub fn clear_estimate(&self, task_id: &TaskId) -> Result<()> {
        self.store.update_task(task_id, &mut |task| {
            if task.estimate.take().is_none() {
                return false;
            }
            task.updated_at = Utc::now();
            true
        })?;
        Ok(())
    }

    /// Records a task's progress. Done tasks stop blocking their successors.
    pub fn set_status(&self, task_id: &TaskId, status: TaskStatus) -> Result<Task> {
        let task = self.store.update_task(task_id, &mut |task| {
            if task.status == status {
                return false;
            }
            task.status = status;
            task.updated_at = Utc::now();
            true
        })?;

        info!(task_id = %task_id, status = ?task.status, "task status set");
        Ok(task)
    }

    /// Validates and applies new dates for a task.
    ///
    /// In [`ScheduleMode::Enforce`] any conflict blocks the change; in
    /// [`ScheduleMode::Advisory`] the dates are saved and the conflicts
    /// returned.
    pub fn reschedule(
        &self,
        task_id: &TaskId,
        start: NaiveDate,
        end: Option<NaiveDate>,
        mode: ScheduleMode,
    ) -> Result<Vec<Conflict>> {
        let task = self.task(task_id)?;
        let conflicts = self.validator.validate(&task, start, end)?;

        if mode == ScheduleMode::Enforce && !conflicts.is_empty() {
            warn!(task_id = %task_id, conflicts = conflicts.len(), "reschedule blocked");
            return Err(ScheduleError::Blocked(conflicts));
        }

        self.store.update_task(task_id, &mut |task| {
            task.window = DateWindow {
                start_date: Some(start),
                end_date: end,
                has_time_dependencies: task.window.has_time_dependencies,
            };
            task.updated_at = Utc::now();
            true
        })?;

        info!(
            task_id = %task_id,
            start = %start,
            conflicts = conflicts.len(),
            "task rescheduled"
        );
        Ok(conflicts)
    }

    /// Finds the chain of dependent tasks with the largest expected total
    /// duration inside a project. Tasks without an estimate count as zero.
    ///
    /// Edges to tasks outside the project are ignored.
    pub fn critical_path(&self, project_id: &ProjectId) -> Result<CriticalPath> {
        let mut tasks: Vec<Task> = self
            .store
            .list(
                EntityType::Task,
                &EntityFilter::new().with_project_id(project_id.clone()),
            )?
            .into_iter()
            .filter_map(Entity::into_task)
            .collect();

        let members: Vec<TaskId> = tasks.iter().map(|t| t.id.clone()).collect();
        for task in &mut tasks {
            task.dependencies.retain(|e| {
                members.contains(e.predecessor()) && members.contains(e.successor())
            });
        }

        let graph = DependencyGraph::from_tasks(&tasks);
        let order = graph.topological_order()?;
        let by_id: HashMap<&TaskId, &Task> = tasks.iter().map(|t| (&t.id, t)).collect();

        // Best path ending at each task, with the predecessor it came from.
        let mut best: HashMap<TaskId, (PathEstimate, Option<TaskId>)> = HashMap::new();
        for id in &order {
            let (upstream, prev) = graph
                .predecessors(id)
                .filter_map(|p| best.get(p).map(|(path, _)| (*path, p)))
                .fold((PathEstimate::default(), None), |acc, (path, p)| {
                    if acc.1.is_none() || path.expected > acc.0.expected {
                        (path, Some(p.clone()))
                    } else {
                        acc
                    }
                });

            let path = match by_id.get(id).and_then(|t| t.estimate.as_ref()) {
                Some(estimate) => upstream.then(estimate_of(estimate)),
                None => upstream,
            };
            best.insert(id.clone(), (path, prev));
        }

        // Ties go to the earliest task in topological order.
        let mut end: Option<(&TaskId, PathEstimate)> = None;
        for id in &order {
            if let Some((path, _)) = best.get(id) {
                if end.map_or(true, |(_, e)| path.expected > e.expected) {
                    end = Some((id, *path));
                }
            }
        }

        let Some((last, estimate)) = end else {
            return Ok(CriticalPath {
                tasks: Vec::new(),
                estimate: PathEstimate::default(),
            });
        };

        let mut chain = vec![last.clone()];
        let mut cursor = last;
        while let Some((_, Some(prev))) = best.get(cursor) {
            chain.push(prev.clone());
            cursor = prev;
        }
        chain.reverse();

        Ok(CriticalPath {
            tasks: chain,
            estimate,
        })
    }
}
