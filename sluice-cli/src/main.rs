//! Sluice CLI
//!
//! Compiles, lints and inspects workflow definitions against a spec store
//! snapshot.

mod commands;
mod config;
mod documents;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sluice")]
#[command(about = "Sluice workflow job compiler", long_about = None)]
struct Cli {
    /// Spec store snapshot (YAML or JSON)
    #[arg(short, long, env = "SLUICE_STORE", default_value = "store.yaml")]
    store: PathBuf,

    /// Builder image template; `${BuildOS}` is replaced by the base image
    #[arg(long)]
    builder_image: Option<String>,

    /// Directory output variables are captured into
    #[arg(long)]
    output_dir: Option<String>,

    /// Portal URL used to render task links
    #[arg(long)]
    portal_url: Option<String>,

    /// Deadline for the whole command, in seconds
    #[arg(long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sluice_compiler=info,sluice_client=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut compiler = sluice_compiler::CompilerConfig::from_env();
    if let Some(template) = cli.builder_image {
        compiler.builder_image_template = template;
    }
    if let Some(dir) = cli.output_dir {
        compiler.output_dir = dir;
    }
    if let Some(url) = cli.portal_url {
        compiler.portal_url = url;
    }
    compiler.validate()?;

    let config = Config {
        store_path: cli.store,
        compiler,
    };

    match cli.timeout {
        Some(secs) => tokio::time::timeout(
            Duration::from_secs(secs),
            handle_command(cli.command, &config),
        )
        .await
        .with_context(|| format!("Command timed out after {}s", secs))?,
        None => handle_command(cli.command, &config).await,
    }
}
