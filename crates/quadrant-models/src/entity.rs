//! Projects, modules and tasks.
//!
//! The three entity kinds form a containment tree: a module belongs to a
//! project, a task belongs to a project and optionally to a module. Every
//! entity carries a priority quadrant and a rank within that quadrant.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::dependency::DependencyEdge;
use crate::error::{ModelError, Result};
use crate::ids::{ModuleId, ProjectId, TaskId};
use crate::pert::PertEstimate;
use crate::priority::{EntityRef, EntityType, PriorityQuadrant};

/// Optional scheduling window of a project, module or task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateWindow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    /// When set, contained tasks may not start before `start_date`.
    #[serde(default)]
    pub has_time_dependencies: bool,
}

impl DateWindow {
    /// Creates a window without time dependencies.
    pub fn new(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Result<Self> {
        let window = Self {
            start_date,
            end_date,
            has_time_dependencies: false,
        };
        window.validate()?;
        Ok(window)
    }

    /// Creates a window whose start date constrains contained tasks.
    pub fn time_dependent(start_date: NaiveDate, end_date: Option<NaiveDate>) -> Result<Self> {
        let window = Self {
            start_date: Some(start_date),
            end_date,
            has_time_dependencies: true,
        };
        window.validate()?;
        Ok(window)
    }

    pub fn validate(&self) -> Result<()> {
        if self.has_time_dependencies && self.start_date.is_none() {
            return Err(ModelError::MissingStartDate);
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(ModelError::InvertedWindow { start, end });
            }
        }
        Ok(())
    }

    /// The start date, but only when it constrains contained entities.
    pub fn binding_start(&self) -> Option<NaiveDate> {
        if self.has_time_dependencies {
            self.start_date
        } else {
            None
        }
    }
}

/// Progress of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }
}

/// Capability shared by everything that can be placed in a quadrant.
pub trait PrioritizedEntity {
    fn entity_type(&self) -> EntityType;

    fn entity_id(&self) -> &str;

    fn quadrant(&self) -> PriorityQuadrant;

    /// Rank inside the quadrant; `None` until the entity has been placed.
    fn rank(&self) -> Option<u32>;

    fn created_at(&self) -> DateTime<Utc>;

    /// Project the entity belongs to (a project is its own scope).
    fn project_scope(&self) -> &ProjectId;

    /// Moves the entity to `quadrant` at `rank`.
    fn set_priority(&mut self, quadrant: PriorityQuadrant, rank: u32, at: DateTime<Utc>);

    fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.entity_type(), self.entity_id())
    }
}

/// A top-level project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,

    pub name: String,

    #[serde(default)]
    pub quadrant: PriorityQuadrant,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,

    #[serde(default)]
    pub window: DateWindow,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ProjectId::new(),
            name: name.into(),
            quadrant: PriorityQuadrant::default(),
            rank: None,
            window: DateWindow::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_window(mut self, window: DateWindow) -> Self {
        self.window = window;
        self
    }
}

/// A module grouping tasks inside a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,

    pub project_id: ProjectId,

    pub name: String,

    #[serde(default)]
    pub quadrant: PriorityQuadrant,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,

    #[serde(default)]
    pub window: DateWindow,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Module {
    pub fn new(project_id: impl Into<ProjectId>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ModuleId::new(),
            project_id: project_id.into(),
            name: name.into(),
            quadrant: PriorityQuadrant::default(),
            rank: None,
            window: DateWindow::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_window(mut self, window: DateWindow) -> Self {
        self.window = window;
        self
    }
}

/// A schedulable unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,

    pub project_id: ProjectId,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<ModuleId>,

    pub title: String,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub quadrant: PriorityQuadrant,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,

    #[serde(default)]
    pub window: DateWindow,

    /// At most one estimate; setting a new one replaces it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<PertEstimate>,

    /// Edges whose `task_id` is this task.
    #[serde(default)]
    pub dependencies: Vec<DependencyEdge>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(project_id: impl Into<ProjectId>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::new(),
            project_id: project_id.into(),
            module_id: None,
            title: title.into(),
            status: TaskStatus::Todo,
            quadrant: PriorityQuadrant::default(),
            rank: None,
            window: DateWindow::default(),
            estimate: None,
            dependencies: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn in_module(mut self, module_id: impl Into<ModuleId>) -> Self {
        self.module_id = Some(module_id.into());
        self
    }

    pub fn with_window(mut self, window: DateWindow) -> Self {
        self.window = window;
        self
    }

    pub fn is_complete(&self) -> bool {
        self.status.is_complete()
    }
}

macro_rules! impl_prioritized {
    ($ty:ty, $kind:expr, |$s:ident| $scope:expr) => {
        impl PrioritizedEntity for $ty {
            fn entity_type(&self) -> EntityType {
                $kind
            }

            fn entity_id(&self) -> &str {
                self.id.as_str()
            }

            fn quadrant(&self) -> PriorityQuadrant {
                self.quadrant
            }

            fn rank(&self) -> Option<u32> {
                self.rank
            }

            fn created_at(&self) -> DateTime<Utc> {
                self.created_at
            }

            fn project_scope(&self) -> &ProjectId {
                let $s = self;
                $scope
            }

            fn set_priority(&mut self, quadrant: PriorityQuadrant, rank: u32, at: DateTime<Utc>) {
                self.quadrant = quadrant;
                self.rank = Some(rank);
                self.updated_at = at;
            }
        }
    };
}

impl_prioritized!(Project, EntityType::Project, |p| &p.id);
impl_prioritized!(Module, EntityType::Module, |m| &m.project_id);
impl_prioritized!(Task, EntityType::Task, |t| &t.project_id);

/// Any prioritized entity, as returned by the entity store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity_type", rename_all = "snake_case")]
pub enum Entity {
    Project(Project),
    Module(Module),
    Task(Task),
}

impl Entity {
    fn inner(&self) -> &dyn PrioritizedEntity {
        match self {
            Entity::Project(p) => p,
            Entity::Module(m) => m,
            Entity::Task(t) => t,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn PrioritizedEntity {
        match self {
            Entity::Project(p) => p,
            Entity::Module(m) => m,
            Entity::Task(t) => t,
        }
    }

    /// Display name of the entity (project/module name or task title).
    pub fn label(&self) -> &str {
        match self {
            Entity::Project(p) => &p.name,
            Entity::Module(m) => &m.name,
            Entity::Task(t) => &t.title,
        }
    }

    pub fn window(&self) -> &DateWindow {
        match self {
            Entity::Project(p) => &p.window,
            Entity::Module(m) => &m.window,
            Entity::Task(t) => &t.window,
        }
    }

    pub fn as_project(&self) -> Option<&Project> {
        match self {
            Entity::Project(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_module(&self) -> Option<&Module> {
        match self {
            Entity::Module(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_task(&self) -> Option<&Task> {
        match self {
            Entity::Task(t) => Some(t),
            _ => None,
        }
    }

    pub fn into_task(self) -> Option<Task> {
        match self {
            Entity::Task(t) => Some(t),
            _ => None,
        }
    }
}

impl PrioritizedEntity for Entity {
    fn entity_type(&self) -> EntityType {
        self.inner().entity_type()
    }

    fn entity_id(&self) -> &str {
        self.inner().entity_id()
    }

    fn quadrant(&self) -> PriorityQuadrant {
        self.inner().quadrant()
    }

    fn rank(&self) -> Option<u32> {
        self.inner().rank()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.inner().created_at()
    }

    fn project_scope(&self) -> &ProjectId {
        self.inner().project_scope()
    }

    fn set_priority(&mut self, quadrant: PriorityQuadrant, rank: u32, at: DateTime<Utc>) {
        self.inner_mut().set_priority(quadrant, rank, at)
    }
}

impl From<Project> for Entity {
    fn from(p: Project) -> Self {
        Entity::Project(p)
    }
}

impl From<Module> for Entity {
    fn from(m: Module) -> Self {
        Entity::Module(m)
    }
}

impl From<Task> for Entity {
    fn from(t: Task) -> Self {
        Entity::Task(t)
    }
}
