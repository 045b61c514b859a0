mod commands;
mod logging;
mod report;
mod tui;

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use robodash_core::{
    Config, DataStore, ExportFormat, ExportScope, FileKeyValueStore, KeyValueStore,
    MemoryKeyValueStore, Priority, Selector, SwotCategory,
};

use crate::logging::{init_file_logging, init_logging, Verbosity};

pub type Store = DataStore<Box<dyn KeyValueStore>>;

#[derive(Parser)]
#[command(name = "robodash")]
#[command(about = "Robotics team dashboard: robots, SWOT, test results, tasks", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding robots.json and activities.json
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Keep everything in memory; nothing is written to disk
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage robots
    #[command(subcommand)]
    Robot(RobotCommand),
    /// Show or edit SWOT analyses
    #[command(subcommand)]
    Swot(SwotCommand),
    /// Record or show test results
    #[command(subcommand)]
    Perf(PerfCommand),
    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommand),
    /// Show or edit notes
    #[command(subcommand)]
    Notes(NotesCommand),
    /// Team KPIs and per-robot totals
    Dashboard,
    /// Recent activity feed
    Activity {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
    /// Export data as JSON or CSV (scope: swot, performance, tasks, all)
    Export {
        scope: ExportScope,
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,
        /// Directory the file is written to
        #[arg(short, long, default_value = ".", value_name = "DIR")]
        output: PathBuf,
        /// Print to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,
    },
    /// Open the terminal dashboard
    Tui,
}

#[derive(Subcommand)]
pub enum RobotCommand {
    /// Add a robot
    Add {
        name: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// List robots with their totals
    List,
    /// Delete a robot and all of its data
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum SwotCommand {
    /// Show a robot's SWOT, or the merged team view
    Show {
        #[arg(short, long, default_value = "team")]
        robot: Selector,
    },
    /// Append one item (category: strengths, weaknesses, opportunities, threats)
    Add {
        category: SwotCategory,
        item: String,
        #[arg(short, long)]
        robot: Selector,
    },
    /// Replace a whole category
    Set {
        category: SwotCategory,
        items: Vec<String>,
        #[arg(short, long)]
        robot: Selector,
    },
}

#[derive(Subcommand)]
pub enum PerfCommand {
    /// Record the test results of one day (overwrites an existing entry)
    Record {
        #[arg(allow_hyphen_values = true)]
        successes: String,
        #[arg(allow_hyphen_values = true)]
        failures: String,
        /// YYYY-MM-DD, defaults to today
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        robot: Selector,
    },
    /// Results by date
    Show {
        #[arg(short, long, default_value = "team")]
        robot: Selector,
    },
}

#[derive(Subcommand)]
pub enum TaskCommand {
    /// Add a task; for the team every robot gets its own copy
    Add {
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
        #[arg(short, long, default_value = "medium")]
        priority: Priority,
        #[arg(short, long, default_value = "team")]
        robot: Selector,
    },
    List {
        #[arg(short, long, default_value = "team")]
        robot: Selector,
    },
    /// Toggle completion of the task at INDEX (as shown by `task list`)
    Toggle {
        index: usize,
        #[arg(short, long, default_value = "team")]
        robot: Selector,
    },
    Delete {
        index: usize,
        #[arg(short, long, default_value = "team")]
        robot: Selector,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum NotesCommand {
    Show {
        #[arg(short, long, default_value = "team")]
        robot: Selector,
    },
    /// Replace a robot's notes
    Set {
        text: String,
        #[arg(short, long)]
        robot: Selector,
    },
}

fn open_store(data_dir: PathBuf, ephemeral: bool) -> Result<Store> {
    let storage: Box<dyn KeyValueStore> = if ephemeral {
        Box::new(MemoryKeyValueStore::new())
    } else {
        Box::new(FileKeyValueStore::new(Some(data_dir))?)
    };
    Ok(DataStore::load(storage))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let verbosity = Verbosity::from_flags(cli.verbose, cli.quiet);
    let config = Config::load_from(cli.config.as_deref())?;
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => config.data_dir()?,
    };

    // No command opens the dashboard.
    let command = cli.command.unwrap_or(Commands::Tui);

    if matches!(command, Commands::Tui) {
        fs::create_dir_all(&data_dir)?;
        init_file_logging(verbosity, &data_dir)?;
    } else {
        init_logging(verbosity);
    }

    let mut store = open_store(data_dir, cli.ephemeral)?;
    commands::run(command, &mut store, &config)
}
