//! Entity store for projects, modules and tasks.

use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use quadrant_models::{
    Entity, EntityRef, EntityType, Module, ModuleId, PrioritizedEntity, PriorityQuadrant, Project,
    ProjectId, Task, TaskId,
};
use tracing::debug;

use crate::atomic::{atomic_write_json, ensure_dir, read_json, read_json_dir, read_json_optional};
use crate::error::{PersistenceError, Result};
use crate::ranks::RankLedger;

/// Filter criteria for listing entities by container.
#[derive(Debug, Clone, Default)]
pub struct EntityFilter {
    /// Entities inside this project (a project matches its own id).
    pub project_id: Option<ProjectId>,
    /// Tasks inside this module (a module matches its own id).
    pub module_id: Option<ModuleId>,
    pub quadrant: Option<PriorityQuadrant>,
}

impl EntityFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project_id(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn with_module_id(mut self, module_id: ModuleId) -> Self {
        self.module_id = Some(module_id);
        self
    }

    pub fn with_quadrant(mut self, quadrant: PriorityQuadrant) -> Self {
        self.quadrant = Some(quadrant);
        self
    }

    /// Returns true if the entity matches this filter.
    pub fn matches(&self, entity: &Entity) -> bool {
        if let Some(ref project_id) = self.project_id {
            if entity.project_scope() != project_id {
                return false;
            }
        }

        if let Some(ref module_id) = self.module_id {
            let in_module = match entity {
                Entity::Project(_) => false,
                Entity::Module(m) => &m.id == module_id,
                Entity::Task(t) => t.module_id.as_ref() == Some(module_id),
            };
            if !in_module {
                return false;
            }
        }

        if let Some(quadrant) = self.quadrant {
            if entity.quadrant() != quadrant {
                return false;
            }
        }

        true
    }
}

/// Durable records for prioritized entities.
///
/// Every method is one transaction. `issue_rank` and `commit_priority` are
/// read-check-write sequences and must be serialized by the implementation
/// per `(entity type, quadrant)` at least.
pub trait EntityStore: Send + Sync {
    /// Loads an entity; `NotFound` if it does not exist.
    fn get(&self, entity: &EntityRef) -> Result<Entity>;

    /// Creates or replaces an entity.
    ///
    /// A ranked entity may not take a rank held by another entity of the
    /// same type in the same quadrant.
    fn save(&self, entity: &Entity) -> Result<()>;

    /// Deletes an entity. Deleting a missing entity is a no-op.
    fn delete(&self, entity: &EntityRef) -> Result<()>;

    /// Lists entities of one type matching `filter`.
    fn list(&self, entity_type: EntityType, filter: &EntityFilter) -> Result<Vec<Entity>>;

    /// Applies `edit` to the stored task as one read-modify-write.
    ///
    /// `edit` sees the committed task and returns whether it changed
    /// anything; nothing is written when it returns false. Priority fields
    /// are owned by `commit_priority` and any edit to them is discarded.
    /// Returns the task as stored afterwards.
    fn update_task(&self, id: &TaskId, edit: &mut dyn FnMut(&mut Task) -> bool) -> Result<Task>;

    /// Issues the next rank for the bucket; never returns the same rank twice.
    ///
    /// Fails with `RankExhausted` once the bucket has handed out `u32::MAX`.
    fn issue_rank(&self, entity_type: EntityType, quadrant: PriorityQuadrant) -> Result<u32>;

    /// Moves an existing entity to `quadrant` at `rank`.
    ///
    /// Fails with `StaleEntity` if the entity is gone and with
    /// `RankCollision` if another entity holds the rank.
    fn commit_priority(
        &self,
        entity: &EntityRef,
        quadrant: PriorityQuadrant,
        rank: u32,
        at: DateTime<Utc>,
    ) -> Result<Entity>;
}

/// JSON-file entity store.
///
/// Entities are stored as individual JSON files organized by type, with the
/// rank ledger alongside:
/// ```text
/// base_path/
/// ├── entities/
/// │   ├── project/proj-abc.json
/// │   ├── module/mod-def.json
/// │   └── task/task-123.json
/// └── ranks.json
/// ```
pub struct JsonEntityStore {
    base_path: PathBuf,
    /// Transaction boundary for every read-check-write primitive.
    txn: Mutex<()>,
}

impl JsonEntityStore {
    /// Creates a new store with the given base path.
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

    fn type_dir(&self, entity_type: EntityType) -> PathBuf {
        self.base_path.join("entities").join(entity_type.as_str())
    }

    fn entity_path(&self, entity_type: EntityType, id: &str) -> PathBuf {
        self.type_dir(entity_type).join(format!("{}.json", id))
    }

    fn ledger_path(&self) -> PathBuf {
        self.base_path.join("ranks.json")
    }

    fn load_ledger(&self) -> Result<RankLedger> {
        Ok(read_json_optional(&self.ledger_path())?.unwrap_or_default())
    }

    fn save_ledger(&self, ledger: &RankLedger) -> Result<()> {
        atomic_write_json(&self.ledger_path(), ledger)
    }

    fn read(&self, entity: &EntityRef) -> Result<Option<Entity>> {
        let path = self.entity_path(entity.entity_type, &entity.id);
        if !path.exists() {
            return Ok(None);
        }
        let loaded = match entity.entity_type {
            EntityType::Project => Entity::Project(read_json::<Project>(&path)?),
            EntityType::Module => Entity::Module(read_json::<Module>(&path)?),
            EntityType::Task => Entity::Task(read_json::<Task>(&path)?),
        };
        Ok(Some(loaded))
    }

    fn write(&self, entity: &Entity) -> Result<()> {
        let path = self.entity_path(entity.entity_type(), entity.entity_id());
        match entity {
            Entity::Project(p) => atomic_write_json(&path, p),
            Entity::Module(m) => atomic_write_json(&path, m),
            Entity::Task(t) => atomic_write_json(&path, t),
        }
    }

    fn read_all(&self, entity_type: EntityType) -> Result<Vec<Entity>> {
        let dir = self.type_dir(entity_type);
        let entities = match entity_type {
            EntityType::Project => read_json_dir::<Project>(&dir)?
                .into_iter()
                .map(Entity::Project)
                .collect(),
            EntityType::Module => read_json_dir::<Module>(&dir)?
                .into_iter()
                .map(Entity::Module)
                .collect(),
            EntityType::Task => read_json_dir::<Task>(&dir)?
                .into_iter()
                .map(Entity::Task)
                .collect(),
        };
        Ok(entities)
    }

    /// Finds another entity holding `rank` in `quadrant`.
    fn rank_holder(
        &self,
        entity_type: EntityType,
        quadrant: PriorityQuadrant,
        rank: u32,
        except_id: &str,
    ) -> Result<Option<String>> {
        Ok(self
            .read_all(entity_type)?
            .into_iter()
            .find(|e| {
                e.quadrant() == quadrant && e.rank() == Some(rank) && e.entity_id() != except_id
            })
            .map(|e| e.entity_id().to_string()))
    }

    fn check_rank_free(
        &self,
        entity_type: EntityType,
        quadrant: PriorityQuadrant,
        rank: u32,
        except_id: &str,
    ) -> Result<()> {
        match self.rank_holder(entity_type, quadrant, rank, except_id)? {
            Some(holder) => Err(PersistenceError::RankCollision {
                kind: entity_type,
                quadrant,
                rank,
                holder,
            }),
            None => Ok(()),
        }
    }
}

impl EntityStore for JsonEntityStore {
    fn get(&self, entity: &EntityRef) -> Result<Entity> {
        self.read(entity)?.ok_or_else(|| PersistenceError::NotFound {
            kind: entity.entity_type.to_string(),
            id: entity.id.clone(),
        })
    }

    fn save(&self, entity: &Entity) -> Result<()> {
        entity.window().validate()?;
        if let Entity::Task(task) = entity {
            if let Some(estimate) = &task.estimate {
                estimate.validate()?;
            }
        }

        let _txn = self.begin()?;
        ensure_dir(&self.type_dir(entity.entity_type()))?;

        if let Some(rank) = entity.rank() {
            self.check_rank_free(
                entity.entity_type(),
                entity.quadrant(),
                rank,
                entity.entity_id(),
            )?;
            let mut ledger = self.load_ledger()?;
            ledger.observe(entity.entity_type(), entity.quadrant(), rank);
            self.save_ledger(&ledger)?;
        }

        self.write(entity)
    }

    fn delete(&self, entity: &EntityRef) -> Result<()> {
        let _txn = self.begin()?;
        let path = self.entity_path(entity.entity_type, &entity.id);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|source| PersistenceError::WriteError { path, source })?;
            debug!(entity = %entity, "entity deleted");
        }
        Ok(())
    }

    fn list(&self, entity_type: EntityType, filter: &EntityFilter) -> Result<Vec<Entity>> {
        Ok(self
            .read_all(entity_type)?
            .into_iter()
            .filter(|e| filter.matches(e))
            .collect())
    }

    fn update_task(&self, id: &TaskId, edit: &mut dyn FnMut(&mut Task) -> bool) -> Result<Task> {
        let _txn = self.begin()?;

        let task_ref = EntityRef::task(id);
        let current = match self.read(&task_ref)? {
            Some(Entity::Task(task)) => task,
            _ => {
                return Err(PersistenceError::NotFound {
                    kind: EntityType::Task.to_string(),
                    id: id.to_string(),
                })
            }
        };

        let mut edited = current.clone();
        if !edit(&mut edited) {
            return Ok(current);
        }
        edited.quadrant = current.quadrant;
        edited.rank = current.rank;

        edited.window.validate()?;
        if let Some(estimate) = &edited.estimate {
            estimate.validate()?;
        }

        atomic_write_json(&self.entity_path(EntityType::Task, id.as_str()), &edited)?;
        debug!(entity = %task_ref, "task updated");
        Ok(edited)
    }

    fn issue_rank(&self, entity_type: EntityType, quadrant: PriorityQuadrant) -> Result<u32> {
        let _txn = self.begin()?;

        let live_max = self
            .read_all(entity_type)?
            .iter()
            .filter(|e| e.quadrant() == quadrant)
            .filter_map(|e| e.rank())
            .max();

        let mut ledger = self.load_ledger()?;
        let rank = ledger
            .issue(entity_type, quadrant, live_max)
            .ok_or(PersistenceError::RankExhausted {
                kind: entity_type,
                quadrant,
            })?;
        self.save_ledger(&ledger)?;

        debug!(entity_type = %entity_type, quadrant = %quadrant, rank, "rank issued");
        Ok(rank)
    }

    fn commit_priority(
        &self,
        entity: &EntityRef,
        quadrant: PriorityQuadrant,
        rank: u32,
        at: DateTime<Utc>,
    ) -> Result<Entity> {
        let _txn = self.begin()?;

        let mut current = self.read(entity)?.ok_or_else(|| PersistenceError::StaleEntity {
            kind: entity.entity_type,
            id: entity.id.clone(),
        })?;

        self.check_rank_free(entity.entity_type, quadrant, rank, &entity.id)?;

        let mut ledger = self.load_ledger()?;
        ledger.observe(entity.entity_type, quadrant, rank);
        self.save_ledger(&ledger)?;

        current.set_priority(quadrant, rank, at);
        self.write(&current)?;

        debug!(entity = %entity, quadrant = %quadrant, rank, "priority committed");
        Ok(current)
    }
}
