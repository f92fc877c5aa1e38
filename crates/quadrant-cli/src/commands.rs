//! Command handlers for CLI subcommands.

use std::sync::Arc;

use chrono::NaiveDate;
use quadrant_models::{
    ChangeId, ChangeStatus, DateWindow, DependencyEdge, Entity, EntityRef, EntityType, Module,
    PertEstimate, PrioritizedEntity, PriorityChangeRecord, PriorityQuadrant, Project, ProjectId,
    ReviewDecision, Task, TaskId, TaskStatus, UserId,
};
use quadrant_persistence::{ChangeLog, EntityStore, JsonChangeLog, JsonEntityStore};
use quadrant_priority::{
    ApprovalPolicy, ChangeFilter, CommitOutcome, EngineConfig, PriorityOrdering,
    PriorityWorkflow, StaticRoles,
};
use quadrant_schedule::{estimate_of, Conflict, ScheduleError, ScheduleMode, TaskScheduler};
use serde::Serialize;
use tracing::info;

use crate::cli::{
    Commands, DateArgs, Decision, DependTarget, ModuleCommand, OutputFormat, PlacementArgs,
    ProjectCommand, StatusArg, TaskCommand, TaskStatusArg, WindowArgs,
};

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// z-score for the printed ~95% interval.
const CONFIDENCE_Z: f64 = 1.96;

/// Store, scheduler and workflow wired over one data directory.
struct Engine {
    store: Arc<dyn EntityStore>,
    scheduler: TaskScheduler,
    ordering: PriorityOrdering,
    workflow: PriorityWorkflow,
}

impl Engine {
    fn open(config: &EngineConfig) -> Result<Self> {
        let store: Arc<dyn EntityStore> = Arc::new(JsonEntityStore::new(&config.data_dir));
        let log: Arc<dyn ChangeLog> = Arc::new(JsonChangeLog::new(&config.data_dir));
        let roles = StaticRoles::load(&config.roles_path())?;
        let policy = ApprovalPolicy::new(Arc::new(roles))
            .with_privileged_roles(config.privileged_roles.iter().copied());

        Ok(Self {
            scheduler: TaskScheduler::new(store.clone()),
            ordering: PriorityOrdering::new(store.clone()),
            workflow: PriorityWorkflow::new(store.clone(), log, policy),
            store,
        })
    }

    fn project(&self, id: &str) -> Result<Project> {
        self.store
            .get(&EntityRef::project(id))?
            .as_project()
            .cloned()
            .ok_or_else(|| format!("Not a project: {}", id).into())
    }

    fn module(&self, id: &str) -> Result<Module> {
        self.store
            .get(&EntityRef::module(id))?
            .as_module()
            .cloned()
            .ok_or_else(|| format!("Not a module: {}", id).into())
    }
}

/// Execute a CLI command.
pub fn execute(command: Commands, config: &EngineConfig, format: OutputFormat) -> Result<()> {
    if let Commands::Role { user, role } = &command {
        let path = config.roles_path();
        let mut roles = StaticRoles::load(&path)?;
        roles.assign(UserId::from(user.as_str()), *role);
        roles.save(&path)?;
        info!(user = %user, role = %role, "role assigned");
        println!("{} is now {}", user, role);
        return Ok(());
    }

    let engine = Engine::open(config)?;

    match command {
        Commands::Project(ProjectCommand::Add {
            name,
            placement,
            window,
        }) => cmd_project_add(&engine, name, &placement, &window, format),
        Commands::Module(ModuleCommand::Add {
            project,
            name,
            placement,
            window,
        }) => cmd_module_add(&engine, &project, name, &placement, &window, format),
        Commands::Task(TaskCommand::Add {
            project,
            title,
            module,
            placement,
            window,
        }) => cmd_task_add(
            &engine,
            &project,
            title,
            module.as_deref(),
            &placement,
            &window,
            format,
        ),
        Commands::Task(TaskCommand::Show { task }) => cmd_task_show(&engine, &task, format),
        Commands::Task(TaskCommand::Status { task, status }) => {
            cmd_task_status(&engine, &task, status, format)
        }
        Commands::Estimate { task, values, clear } => {
            cmd_estimate(&engine, &task, &values, clear, format)
        }
        Commands::Depend {
            task,
            target,
            remove,
        } => cmd_depend(&engine, &task, &target, remove, format),
        Commands::Validate { task, dates } => cmd_validate(&engine, &task, &dates, format),
        Commands::Schedule {
            task,
            dates,
            enforce,
        } => cmd_schedule(&engine, &task, &dates, enforce, format),
        Commands::CriticalPath { project } => cmd_critical_path(&engine, &project, format),
        Commands::Request {
            entity_type,
            id,
            quadrant,
            rank,
            reason,
            user,
        } => cmd_request(
            &engine,
            EntityRef::new(entity_type, id),
            quadrant,
            rank,
            reason,
            &UserId::from(user.user),
            format,
        ),
        Commands::Review {
            record,
            decision,
            user,
        } => cmd_review(
            &engine,
            &ChangeId::from(record),
            decision,
            &UserId::from(user.user),
            format,
        ),
        Commands::Board {
            entity_type,
            project,
        } => cmd_board(&engine, entity_type, project, format),
        Commands::Log {
            status,
            entity_type,
            entity,
        } => cmd_log(&engine, status, entity_type, entity, format),
        Commands::Role { .. } => Ok(()),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn build_window(args: &WindowArgs) -> Result<DateWindow> {
    let window = match (args.time_dependent, args.start) {
        (true, Some(start)) => DateWindow::time_dependent(start, args.end)?,
        _ => DateWindow::new(args.start, args.end)?,
    };
    Ok(window)
}

fn print_placed(entity: &Entity, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(entity),
        OutputFormat::Text => {
            println!(
                "Created {} '{}' ({})",
                entity.entity_type(),
                entity.label(),
                entity.entity_id()
            );
            println!(
                "  Priority: {} {}",
                entity.quadrant(),
                fmt_rank(entity.rank())
            );
            Ok(())
        }
    }
}

fn cmd_project_add(
    engine: &Engine,
    name: String,
    placement: &PlacementArgs,
    window: &WindowArgs,
    format: OutputFormat,
) -> Result<()> {
    let mut project = Project::new(name).with_window(build_window(window)?);
    project.quadrant = placement.quadrant;

    let placed = engine.ordering.place(Entity::from(project))?;
    print_placed(&placed, format)
}

fn cmd_module_add(
    engine: &Engine,
    project_id: &str,
    name: String,
    placement: &PlacementArgs,
    window: &WindowArgs,
    format: OutputFormat,
) -> Result<()> {
    let project = engine.project(project_id)?;
    let mut module = Module::new(project.id, name).with_window(build_window(window)?);
    module.quadrant = placement.quadrant;

    let placed = engine.ordering.place(Entity::from(module))?;
    print_placed(&placed, format)
}

fn cmd_task_add(
    engine: &Engine,
    project_id: &str,
    title: String,
    module_id: Option<&str>,
    placement: &PlacementArgs,
    window: &WindowArgs,
    format: OutputFormat,
) -> Result<()> {
    let project = engine.project(project_id)?;
    let mut task = Task::new(project.id.clone(), title).with_window(build_window(window)?);

    if let Some(module_id) = module_id {
        let module = engine.module(module_id)?;
        if module.project_id != project.id {
            return Err(format!(
                "Module {} belongs to project {}, not {}",
                module.id, module.project_id, project.id
            )
            .into());
        }
        task = task.in_module(module.id);
    }
    task.quadrant = placement.quadrant;

    let placed = engine.ordering.place(Entity::from(task))?;
    print_placed(&placed, format)
}

fn cmd_task_show(engine: &Engine, task_id: &str, format: OutputFormat) -> Result<()> {
    let task = engine.scheduler.task(&TaskId::from(task_id))?;

    if format == OutputFormat::Json {
        return print_json(&task);
    }

    println!("Task: {} ({})", task.title, task.id);
    println!("  Project: {}", task.project_id);
    if let Some(module_id) = &task.module_id {
        println!("  Module: {}", module_id);
    }
    println!("  Status: {:?}", task.status);
    println!("  Priority: {} {}", task.quadrant, fmt_rank(task.rank));
    println!(
        "  Window: {} .. {}",
        fmt_date(task.window.start_date),
        fmt_date(task.window.end_date)
    );
    if let Some(estimate) = &task.estimate {
        let stats = estimate_of(estimate);
        println!(
            "  Estimate: {}/{}/{} (expected {:.2}, σ {:.2})",
            estimate.optimistic,
            estimate.most_likely,
            estimate.pessimistic,
            stats.expected,
            stats.std_dev
        );
    }
    for edge in &task.dependencies {
        println!("  {} -> {}", edge.predecessor(), edge.successor());
    }
    Ok(())
}

fn cmd_task_status(
    engine: &Engine,
    task_id: &str,
    status: TaskStatusArg,
    format: OutputFormat,
) -> Result<()> {
    let status = match status {
        TaskStatusArg::Todo => TaskStatus::Todo,
        TaskStatusArg::InProgress => TaskStatus::InProgress,
        TaskStatusArg::Done => TaskStatus::Done,
    };
    let task = engine.scheduler.set_status(&TaskId::from(task_id), status)?;

    match format {
        OutputFormat::Json => print_json(&task),
        OutputFormat::Text => {
            println!("Task {} is now {:?}", task.id, task.status);
            Ok(())
        }
    }
}

fn cmd_estimate(
    engine: &Engine,
    task_id: &str,
    values: &[f64],
    clear: bool,
    format: OutputFormat,
) -> Result<()> {
    let task_id = TaskId::from(task_id);

    if clear {
        engine.scheduler.clear_estimate(&task_id)?;
        println!("Estimate cleared for {}", task_id);
        return Ok(());
    }

    let [o, m, p] = values else {
        return Err("Expected three values: optimistic, most likely, pessimistic".into());
    };
    let estimate = PertEstimate::new(*o, *m, *p)?;
    let stats = engine.scheduler.set_estimate(&task_id, estimate)?;

    match format {
        OutputFormat::Json => print_json(&stats),
        OutputFormat::Text => {
            let (low, high) = stats.confidence_interval(CONFIDENCE_Z);
            println!("Expected duration: {:.2}", stats.expected);
            println!("Standard deviation: {:.2}", stats.std_dev);
            println!("95% interval: {:.2} .. {:.2}", low, high);
            Ok(())
        }
    }
}

fn cmd_depend(
    engine: &Engine,
    task_id: &str,
    target: &DependTarget,
    remove: bool,
    format: OutputFormat,
) -> Result<()> {
    let task_id = TaskId::from(task_id);
    let edge = match (&target.precedes, &target.follows) {
        (Some(after), _) => DependencyEdge::precedes(task_id, TaskId::from(after.as_str()))?,
        (None, Some(before)) => DependencyEdge::follows(task_id, TaskId::from(before.as_str()))?,
        (None, None) => return Err("One of --precedes or --follows is required".into()),
    };

    if remove {
        let removed = engine.scheduler.remove_dependency(&edge)?;
        if !removed {
            return Err(format!(
                "No dependency {} -> {}",
                edge.predecessor(),
                edge.successor()
            )
            .into());
        }
        println!("Removed {} -> {}", edge.predecessor(), edge.successor());
        return Ok(());
    }

    engine.scheduler.add_dependency(edge.clone())?;
    match format {
        OutputFormat::Json => print_json(&edge),
        OutputFormat::Text => {
            println!(
                "{} must finish before {} starts",
                edge.predecessor(),
                edge.successor()
            );
            Ok(())
        }
    }
}

fn print_conflicts(conflicts: &[Conflict], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(conflicts),
        OutputFormat::Text => {
            if conflicts.is_empty() {
                println!("No conflicts.");
            }
            for conflict in conflicts {
                println!("{}  (see {})", conflict, conflict.referenced_entity_id);
            }
            Ok(())
        }
    }
}

fn cmd_validate(engine: &Engine, task_id: &str, dates: &DateArgs, format: OutputFormat) -> Result<()> {
    let task = engine.scheduler.task(&TaskId::from(task_id))?;
    let conflicts = engine
        .scheduler
        .validator()
        .validate(&task, dates.start, dates.end)?;
    print_conflicts(&conflicts, format)
}

fn cmd_schedule(
    engine: &Engine,
    task_id: &str,
    dates: &DateArgs,
    enforce: bool,
    format: OutputFormat,
) -> Result<()> {
    let mode = if enforce {
        ScheduleMode::Enforce
    } else {
        ScheduleMode::Advisory
    };

    match engine
        .scheduler
        .reschedule(&TaskId::from(task_id), dates.start, dates.end, mode)
    {
        Ok(conflicts) => {
            if format == OutputFormat::Text {
                println!("Scheduled {} from {}", task_id, dates.start);
            }
            print_conflicts(&conflicts, format)
        }
        Err(ScheduleError::Blocked(conflicts)) => {
            print_conflicts(&conflicts, format)?;
            Err(ScheduleError::Blocked(conflicts).into())
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_critical_path(engine: &Engine, project_id: &str, format: OutputFormat) -> Result<()> {
    let project = engine.project(project_id)?;
    let path = engine.scheduler.critical_path(&project.id)?;

    if format == OutputFormat::Json {
        return print_json(&path);
    }

    if path.tasks.is_empty() {
        println!("No tasks in {}.", project.name);
        return Ok(());
    }
    for (i, id) in path.tasks.iter().enumerate() {
        let task = engine.scheduler.task(id)?;
        println!("{:>3}. {} ({})", i + 1, task.title, task.id);
    }
    println!(
        "\nExpected total: {:.2} (σ {:.2})",
        path.estimate.expected,
        path.estimate.std_dev()
    );
    Ok(())
}

fn cmd_request(
    engine: &Engine,
    entity: EntityRef,
    quadrant: PriorityQuadrant,
    rank: Option<u32>,
    reason: String,
    requester: &UserId,
    format: OutputFormat,
) -> Result<()> {
    let outcome = engine
        .workflow
        .request_change(&entity, quadrant, rank, reason, requester)?;

    match format {
        OutputFormat::Json => print_json(&outcome)?,
        OutputFormat::Text => {
            print_record(&outcome.record);
            if outcome.needs_approval {
                println!("  Awaiting review.");
            }
            print_commit(&outcome.commit);
        }
    }

    outcome.commit.into_result(entity.entity_type)?;
    Ok(())
}

fn cmd_review(
    engine: &Engine,
    record_id: &ChangeId,
    decision: Decision,
    reviewer: &UserId,
    format: OutputFormat,
) -> Result<()> {
    let decision = match decision {
        Decision::Approve => ReviewDecision::Approve,
        Decision::Reject => ReviewDecision::Reject,
    };
    let outcome = engine.workflow.review(record_id, decision, reviewer)?;

    match format {
        OutputFormat::Json => print_json(&outcome)?,
        OutputFormat::Text => {
            print_record(&outcome.record);
            print_commit(&outcome.commit);
        }
    }

    outcome.into_result()?;
    Ok(())
}

fn cmd_board(
    engine: &Engine,
    entity_type: EntityType,
    project_id: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let scope = project_id.map(ProjectId::from);
    let board = engine
        .ordering
        .list_by_quadrant(entity_type, scope.as_ref())?;

    if format == OutputFormat::Json {
        return print_json(&board);
    }

    for lane in &board.lanes {
        println!("{} ({})", lane.quadrant, lane.entities.len());
        for entity in &lane.entities {
            println!(
                "  {:>5}  {:<30}  {}",
                fmt_rank(entity.rank()),
                truncate(entity.label(), 30),
                entity.entity_id()
            );
        }
    }
    Ok(())
}

fn cmd_log(
    engine: &Engine,
    status: Option<StatusArg>,
    entity_type: Option<EntityType>,
    entity_id: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let mut filter = ChangeFilter::new();
    if let Some(status) = status {
        filter = filter.with_status(match status {
            StatusArg::Pending => ChangeStatus::Pending,
            StatusArg::Approved => ChangeStatus::Approved,
            StatusArg::Rejected => ChangeStatus::Rejected,
        });
    }
    if let Some(entity_type) = entity_type {
        filter = filter.with_entity_type(entity_type);
    }
    if let Some(entity_id) = entity_id {
        filter = filter.with_entity_id(entity_id);
    }

    let records = engine.workflow.list_records(&filter)?;

    if format == OutputFormat::Json {
        return print_json(&records);
    }

    if records.is_empty() {
        println!("No changes found.");
        return Ok(());
    }
    for record in &records {
        println!(
            "{:>5}  {:<9}  {}:{}  {} {} -> {} {}  by {}",
            record.sequence,
            record.status.to_string(),
            record.entity_type,
            record.entity_id,
            record.old_quadrant,
            fmt_rank(record.old_rank),
            record.new_quadrant,
            fmt_rank(record.new_rank),
            record.requested_by
        );
    }
    println!("\n{} change(s)", records.len());
    Ok(())
}

fn print_record(record: &PriorityChangeRecord) {
    println!("Change {} [{}]", record.id, record.status);
    println!("  Entity: {}", record.entity_ref());
    println!(
        "  {} {} -> {} {}",
        record.old_quadrant,
        fmt_rank(record.old_rank),
        record.new_quadrant,
        fmt_rank(record.new_rank)
    );
    if let Some(reviewer) = &record.reviewed_by {
        println!("  Reviewed by: {}", reviewer);
    }
}

fn print_commit(commit: &CommitOutcome) {
    match commit {
        CommitOutcome::Applied { quadrant, rank } => {
            println!("  Applied: {} #{}", quadrant, rank)
        }
        CommitOutcome::NotApplied => {}
        CommitOutcome::Failed(failure) => println!("  Not applied: {:?}", failure),
    }
}

fn fmt_rank(rank: Option<u32>) -> String {
    rank.map(|r| format!("#{}", r))
        .unwrap_or_else(|| "-".to_string())
}

fn fmt_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string())
        .unwrap_or_else(|| "?".to_string())
}

/// Truncate a string to max length with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadrant_persistence::EntityFilter;
    use quadrant_priority::Role;
    use tempfile::tempdir;

    fn config(dir: &tempfile::TempDir) -> EngineConfig {
        EngineConfig::new().with_data_dir(dir.path())
    }

    fn placement(quadrant: PriorityQuadrant) -> PlacementArgs {
        PlacementArgs { quadrant }
    }

    fn only(engine: &Engine, entity_type: EntityType) -> Entity {
        let mut all = engine.store.list(entity_type, &EntityFilter::new()).unwrap();
        assert_eq!(all.len(), 1);
        all.remove(0)
    }

    #[test]
    fn test_role_then_request_flow() {
        let dir = tempdir().unwrap();
        let config = config(&dir);

        for (user, role) in [("user-pm", Role::ProjectManager), ("user-dev", Role::Member)] {
            execute(
                Commands::Role {
                    user: user.to_string(),
                    role,
                },
                &config,
                OutputFormat::Text,
            )
            .unwrap();
        }

        execute(
            Commands::Project(ProjectCommand::Add {
                name: "Apollo".to_string(),
                placement: placement(PriorityQuadrant::ImportantUrgent),
                window: WindowArgs::default(),
            }),
            &config,
            OutputFormat::Json,
        )
        .unwrap();

        let engine = Engine::open(&config).unwrap();
        let project = only(&engine, EntityType::Project);
        assert_eq!(project.rank(), Some(1));

        execute(
            Commands::Request {
                entity_type: EntityType::Project,
                id: project.entity_id().to_string(),
                quadrant: PriorityQuadrant::ImportantNotUrgent,
                rank: None,
                reason: "next quarter".to_string(),
                user: crate::cli::UserArg {
                    user: "user-dev".to_string(),
                },
            },
            &config,
            OutputFormat::Text,
        )
        .unwrap();

        let pending = engine.workflow.pending().unwrap();
        assert_eq!(pending.len(), 1);

        // Members cannot review.
        let forbidden = execute(
            Commands::Review {
                record: pending[0].id.to_string(),
                decision: Decision::Approve,
                user: crate::cli::UserArg {
                    user: "user-dev".to_string(),
                },
            },
            &config,
            OutputFormat::Text,
        );
        assert!(forbidden.is_err());

        execute(
            Commands::Review {
                record: pending[0].id.to_string(),
                decision: Decision::Approve,
                user: crate::cli::UserArg {
                    user: "user-pm".to_string(),
                },
            },
            &config,
            OutputFormat::Json,
        )
        .unwrap();

        let moved = engine.store.get(&project.entity_ref()).unwrap();
        assert_eq!(moved.quadrant(), PriorityQuadrant::ImportantNotUrgent);
        assert!(engine.workflow.pending().unwrap().is_empty());
    }

    #[test]
    fn test_task_add_rejects_foreign_module() {
        let dir = tempdir().unwrap();
        let engine = Engine::open(&config(&dir)).unwrap();

        let apollo = Project::new("Apollo");
        let gemini = Project::new("Gemini");
        let module = Module::new(gemini.id.clone(), "Docking");
        for entity in [
            Entity::from(apollo.clone()),
            Entity::from(gemini),
            Entity::from(module.clone()),
        ] {
            engine.store.save(&entity).unwrap();
        }

        let result = cmd_task_add(
            &engine,
            apollo.id.as_str(),
            "Ignition".to_string(),
            Some(module.id.as_str()),
            &placement(PriorityQuadrant::default()),
            &WindowArgs::default(),
            OutputFormat::Text,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_schedule_enforce_reports_block() {
        let dir = tempdir().unwrap();
        let engine = Engine::open(&config(&dir)).unwrap();

        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let project = Project::new("Apollo");
        let module = Module::new(project.id.clone(), "Engine")
            .with_window(DateWindow::time_dependent(start, None).unwrap());
        let task = Task::new(project.id.clone(), "Ignition").in_module(module.id.clone());
        for entity in [
            Entity::from(project),
            Entity::from(module),
            Entity::from(task.clone()),
        ] {
            engine.store.save(&entity).unwrap();
        }

        let early = DateArgs {
            start: NaiveDate::from_ymd_opt(2025, 2, 15).unwrap(),
            end: None,
        };
        assert!(cmd_schedule(&engine, task.id.as_str(), &early, true, OutputFormat::Text).is_err());
        assert!(cmd_schedule(&engine, task.id.as_str(), &early, false, OutputFormat::Json).is_ok());
    }

    #[test]
    fn test_estimate_requires_three_values() {
        let dir = tempdir().unwrap();
        let engine = Engine::open(&config(&dir)).unwrap();
        let task = Task::new("proj-1", "Ignition");
        engine.store.save(&Entity::from(task.clone())).unwrap();

        assert!(cmd_estimate(&engine, task.id.as_str(), &[1.0, 2.0], false, OutputFormat::Text).is_err());
        cmd_estimate(&engine, task.id.as_str(), &[1.0, 4.0, 7.0], false, OutputFormat::Text).unwrap();

        let stored = engine.scheduler.task(&task.id).unwrap();
        assert_eq!(stored.estimate.unwrap().most_likely, 4.0);
    }

    #[test]
    fn test_task_status_keeps_priority() {
        let dir = tempdir().unwrap();
        let engine = Engine::open(&config(&dir)).unwrap();
        let mut task = Task::new("proj-1", "Ignition");
        task.quadrant = PriorityQuadrant::ImportantUrgent;
        task.rank = Some(3);
        engine.store.save(&Entity::from(task.clone())).unwrap();

        cmd_task_status(&engine, task.id.as_str(), TaskStatusArg::Done, OutputFormat::Json).unwrap();

        let stored = engine.scheduler.task(&task.id).unwrap();
        assert_eq!(stored.status, TaskStatus::Done);
        assert_eq!(stored.quadrant, PriorityQuadrant::ImportantUrgent);
        assert_eq!(stored.rank, Some(3));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("hi", 2), "hi");
    }
}
