//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::output::{Output, OutputFormat};
use super::task;
use crate::domain::{Filter, Priority};
use crate::storage::Config;

#[derive(Parser)]
#[command(name = "prism")]
#[command(author, version, about = "A local-first task list for the terminal")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the config file's default_format)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Directory holding tasks.jsonl
    #[arg(long, global = true, env = "PRISM_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "PRISM_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a task to the top of the list
    ///
    /// Examples:
    ///   prism add "Buy milk"
    ///   prism add "Plan trip" --priority high
    ///   prism add "Plan trip" --split         # Split into sub-tasks
    Add {
        /// Task text
        text: String,

        /// Priority (none, low, medium, high)
        #[arg(long, short, default_value = "none")]
        priority: Priority,

        /// Ask the configured decomposition service to split the task
        #[arg(long)]
        split: bool,
    },

    /// List tasks
    #[command(visible_alias = "ls")]
    List {
        /// Which tasks to show (all, active, completed)
        #[arg(long, default_value = "all")]
        filter: Filter,
    },

    /// Toggle a task between active and completed
    Toggle {
        /// Task ID or unique prefix
        id: String,
    },

    /// Replace a task's text
    Edit {
        /// Task ID or unique prefix
        id: String,

        /// New text
        text: String,
    },

    /// Set a task's priority
    Priority {
        /// Task ID or unique prefix
        id: String,

        /// New priority (none, low, medium, high)
        priority: Priority,
    },

    /// Remove a task
    Rm {
        /// Task ID or unique prefix
        id: String,
    },

    /// Remove every completed task
    ClearCompleted,

    /// Move a task into another task's position
    Move {
        /// Task to move
        dragged: String,

        /// Task whose position it takes
        target: String,
    },

    /// Show active and completed counts
    Status,
}

/// Installs the stderr log subscriber. `PRISM_LOG` overrides the level.
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("PRISM_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "prism_cli=debug"
        } else {
            "prism_cli=warn"
        })
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::from_path(path)?,
        None => Config::load()?,
    };
    let output = Output::new(cli.format.unwrap_or(config.default_format), cli.verbose);

    output.verbose("Prism starting");

    let data_dir = config.data_dir(cli.data_dir.as_deref())?;
    output.verbose_ctx("store", &format!("Data directory: {}", data_dir.display()));
    let mut store = task::open_store(&data_dir);

    match cli.command {
        Commands::Add {
            text,
            priority,
            split,
        } => {
            if split {
                output.verbose_ctx(
                    "add",
                    &format!("Splitting via {}", config.decompose.provider.as_str()),
                );
                task::add_split(&output, &mut store, &config, &data_dir, &text, priority)?
            } else {
                task::add(&output, &mut store, &text, priority)?
            }
        }
        Commands::List { filter } => {
            output.verbose_ctx("list", &format!("Filter: {}", filter));
            task::list(&output, &store, filter)?
        }
        Commands::Toggle { id } => task::toggle(&output, &mut store, &id)?,
        Commands::Edit { id, text } => task::edit(&output, &mut store, &id, &text)?,
        Commands::Priority { id, priority } => {
            task::set_priority(&output, &mut store, &id, priority)?
        }
        Commands::Rm { id } => task::remove(&output, &mut store, &id)?,
        Commands::ClearCompleted => task::clear_completed(&output, &mut store)?,
        Commands::Move { dragged, target } => {
            task::move_task(&output, &mut store, &dragged, &target)?
        }
        Commands::Status => task::status(&output, &store)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}
