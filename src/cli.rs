use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "trellis",
    about = "Terminal task tracker: workspaces hold tasks, tasks hold steps"
)]
pub struct Cli {
    /// Path to the SQLite database [default: ~/.trellis/trellis.db]
    #[arg(long, env = "TRELLIS_DB", global = true)]
    pub db: Option<String>,

    /// With no command the interactive tree view starts
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Launch the interactive tree view
    Tree {
        /// Workspace name or id [default: the first workspace]
        #[arg(long)]
        workspace: Option<String>,
    },

    /// Print workspaces, tasks and steps as nested JSON
    Dump {
        /// Only this workspace (name or id)
        #[arg(long)]
        workspace: Option<String>,
    },

    /// Manage workspaces
    Workspace {
        #[command(subcommand)]
        action: WorkspaceCommand,
    },

    /// Manage tasks
    Task {
        #[command(subcommand)]
        action: TaskCommand,
    },

    /// Manage steps
    Step {
        #[command(subcommand)]
        action: StepCommand,
    },
}

#[derive(Subcommand)]
pub enum WorkspaceCommand {
    /// List workspaces
    List,
    /// Create a workspace
    Add {
        /// Workspace name (must be unique)
        name: String,
    },
    /// Delete a workspace with all of its tasks and steps
    Rm {
        /// Workspace name or id
        workspace: String,
    },
}

#[derive(Subcommand)]
pub enum TaskCommand {
    /// List tasks with step counts
    List {
        /// Workspace name or id [default: all workspaces]
        #[arg(long)]
        workspace: Option<String>,
        /// Filter by status (active, in_progress, done)
        #[arg(long)]
        status: Option<String>,
    },
    /// Create a task
    Add {
        /// Task name
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
        /// Workspace name or id [default: the first workspace]
        #[arg(short, long)]
        workspace: Option<String>,
    },
    /// Mark a task in progress
    Start { id: i64 },
    /// Mark a task done
    Done { id: i64 },
    /// Make a task active again
    Undone { id: i64 },
    /// Delete a task and its steps
    Rm { id: i64 },
}

#[derive(Subcommand)]
pub enum StepCommand {
    /// List steps, pending first and by priority
    List {
        /// Only steps of this task
        #[arg(long)]
        task: Option<i64>,
        /// Only steps of tasks in this workspace (name or id)
        #[arg(long)]
        workspace: Option<String>,
        /// pending, done or all
        #[arg(long, default_value = "all")]
        status: String,
    },
    /// Add a step to a task
    Add {
        /// Step text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        /// Task id
        #[arg(short, long)]
        task: i64,
        /// Priority (high, medium, low)
        #[arg(short, long, default_value = "medium")]
        priority: String,
        /// Free-form note
        #[arg(short, long, default_value = "")]
        note: String,
    },
    /// Check a step off
    Done { id: i64 },
    /// Uncheck a step
    Undone { id: i64 },
    /// Replace a step's text
    Edit {
        id: i64,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Replace a step's note (an empty note clears it)
    Note {
        id: i64,
        #[arg(num_args = 0..)]
        text: Vec<String>,
    },
    /// Delete a step
    Rm { id: i64 },
}
