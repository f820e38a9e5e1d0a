//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod workflow;

use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Compile a workflow into its task graph
    Compile {
        /// Workflow definition file
        #[arg(env = "SLUICE_WORKFLOW")]
        workflow: PathBuf,

        /// Run overrides applied before compiling
        #[arg(short, long)]
        overrides: Option<PathBuf>,

        /// Task id of the run being compiled
        #[arg(long, default_value = "1")]
        task_id: u64,

        /// Print the task graph as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve presets and overrides, printing the prepared jobs
    Prepare {
        /// Workflow definition file
        #[arg(env = "SLUICE_WORKFLOW")]
        workflow: PathBuf,

        /// Run overrides applied after presets
        #[arg(short, long)]
        overrides: Option<PathBuf>,
    },
    /// Check every job reference resolves
    Lint {
        /// Workflow definition file
        #[arg(env = "SLUICE_WORKFLOW")]
        workflow: PathBuf,
    },
    /// List the repositories a workflow checks out
    Repos {
        /// Workflow definition file
        #[arg(env = "SLUICE_WORKFLOW")]
        workflow: PathBuf,
    },
    /// List the output keys a workflow publishes
    Outputs {
        /// Workflow definition file
        #[arg(env = "SLUICE_WORKFLOW")]
        workflow: PathBuf,
    },
}

/// Handle a CLI command
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let compiler = workflow::build_compiler(config)?;

    match command {
        Commands::Compile {
            workflow,
            overrides,
            task_id,
            json,
        } => workflow::compile(&compiler, &workflow, overrides.as_deref(), task_id, json).await,
        Commands::Prepare {
            workflow,
            overrides,
        } => workflow::prepare(&compiler, &workflow, overrides.as_deref()).await,
        Commands::Lint { workflow } => workflow::lint(&compiler, &workflow).await,
        Commands::Repos { workflow } => workflow::repos(&compiler, &workflow).await,
        Commands::Outputs { workflow } => workflow::outputs(&compiler, &workflow).await,
    }
}
