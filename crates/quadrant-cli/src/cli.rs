//! Command-line interface definition using clap.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use quadrant_models::{EntityType, PriorityQuadrant};
use quadrant_priority::{default_data_dir, Role};

/// Build version string with git hash and build date.
fn version_string() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const BUILD_DATE: &str = env!("BUILD_DATE");

    // Format: "0.1.0 (abc1234, 2026-01-29)"
    static VERSION_STRING: std::sync::OnceLock<String> = std::sync::OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} ({}, {})", VERSION, GIT_HASH, BUILD_DATE))
}

/// Quadrant - priority and dependency scheduling
#[derive(Parser, Debug)]
#[command(name = "quadrant")]
#[command(author, version = version_string(), about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to data directory
    #[arg(short, long, env = "QUADRANT_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommand),

    /// Manage modules
    #[command(subcommand)]
    Module(ModuleCommand),

    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommand),

    /// Set or clear a task's PERT estimate
    Estimate {
        /// Task ID
        task: String,

        /// Optimistic, most likely and pessimistic durations
        #[arg(num_args = 3, value_names = ["OPTIMISTIC", "MOST_LIKELY", "PESSIMISTIC"], required_unless_present = "clear")]
        values: Vec<f64>,

        /// Remove the estimate instead
        #[arg(long, conflicts_with = "values")]
        clear: bool,
    },

    /// Add or remove a dependency between two tasks
    Depend {
        /// Task the edge is stored on
        task: String,

        #[command(flatten)]
        target: DependTarget,

        /// Remove the dependency instead
        #[arg(long)]
        remove: bool,
    },

    /// Check proposed dates for a task without saving them
    Validate {
        /// Task ID
        task: String,

        #[command(flatten)]
        dates: DateArgs,
    },

    /// Set a task's dates
    Schedule {
        /// Task ID
        task: String,

        #[command(flatten)]
        dates: DateArgs,

        /// Refuse to save when conflicts exist
        #[arg(long)]
        enforce: bool,
    },

    /// Show the longest expected chain of tasks in a project
    CriticalPath {
        /// Project ID
        project: String,
    },

    /// Request a priority change
    Request {
        /// Entity type (project, module, task)
        entity_type: EntityType,

        /// Entity ID
        id: String,

        /// Target quadrant (e.g. important-urgent)
        quadrant: PriorityQuadrant,

        /// Explicit rank (default: next free rank)
        #[arg(long)]
        rank: Option<u32>,

        /// Why the change is needed
        #[arg(long, default_value = "")]
        reason: String,

        #[command(flatten)]
        user: UserArg,
    },

    /// Approve or reject a pending change
    Review {
        /// Change record ID
        record: String,

        /// Verdict
        #[arg(value_enum)]
        decision: Decision,

        #[command(flatten)]
        user: UserArg,
    },

    /// Show entities grouped by quadrant
    Board {
        /// Entity type (project, module, task)
        #[arg(default_value = "task")]
        entity_type: EntityType,

        /// Only entities in this project
        #[arg(long)]
        project: Option<String>,
    },

    /// Show the priority change log
    Log {
        /// Only records with this status
        #[arg(long, value_enum)]
        status: Option<StatusArg>,

        /// Only records for this entity type
        #[arg(long = "type")]
        entity_type: Option<EntityType>,

        /// Only records for this entity ID
        #[arg(long)]
        entity: Option<String>,
    },

    /// Assign a role to a user
    Role {
        /// User ID
        user: String,

        /// Role (admin, project-manager, member, viewer)
        role: Role,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// Create a project
    Add {
        /// Project name
        name: String,

        #[command(flatten)]
        placement: PlacementArgs,

        #[command(flatten)]
        window: WindowArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum ModuleCommand {
    /// Create a module inside a project
    Add {
        /// Project ID
        project: String,

        /// Module name
        name: String,

        #[command(flatten)]
        placement: PlacementArgs,

        #[command(flatten)]
        window: WindowArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Create a task inside a project
    Add {
        /// Project ID
        project: String,

        /// Task title
        title: String,

        /// Module ID
        #[arg(long)]
        module: Option<String>,

        #[command(flatten)]
        placement: PlacementArgs,

        #[command(flatten)]
        window: WindowArgs,
    },

    /// Show a task
    Show {
        /// Task ID
        task: String,
    },

    /// Update a task's progress
    Status {
        /// Task ID
        task: String,

        #[arg(value_enum)]
        status: TaskStatusArg,
    },
}

/// Initial quadrant of a new entity.
#[derive(Args, Debug, Clone)]
pub struct PlacementArgs {
    /// Starting quadrant
    #[arg(long, default_value = "not-important-not-urgent")]
    pub quadrant: PriorityQuadrant,
}

/// Optional date window of a new entity.
#[derive(Args, Debug, Clone, Default)]
pub struct WindowArgs {
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Contained tasks may not start before the start date
    #[arg(long, requires = "start")]
    pub time_dependent: bool,
}

/// Proposed dates for a task.
#[derive(Args, Debug, Clone)]
pub struct DateArgs {
    /// Proposed start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: NaiveDate,

    /// Proposed end date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

/// The other end of a dependency.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct DependTarget {
    /// TASK must finish before this task starts
    #[arg(long)]
    pub precedes: Option<String>,

    /// TASK starts only after this task finishes
    #[arg(long)]
    pub follows: Option<String>,
}

/// Acting user.
#[derive(Args, Debug, Clone)]
pub struct UserArg {
    /// User ID to act as
    #[arg(long = "as", env = "QUADRANT_USER")]
    pub user: String,
}

/// Output format for all commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Decision {
    Approve,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StatusArg {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TaskStatusArg {
    Todo,
    InProgress,
    Done,
}

impl Cli {
    /// Returns the data directory path, using default if not specified.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
