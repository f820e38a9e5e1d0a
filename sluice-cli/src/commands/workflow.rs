//! Workflow command handlers

use anyhow::{Context, Result};
use colored::*;
use sluice_client::{JenkinsConnector, SonarAccessor};
use sluice_compiler::{JobCompiler, Lookup, Omission, Services};
use sluice_core::domain::task::{JobTask, JobTaskSpec};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::config::Config;
use crate::documents;

/// Builds a compiler backed by the configured store snapshot
pub fn build_compiler(config: &Config) -> Result<JobCompiler> {
    let store = documents::load_store(&config.store_path)?;
    debug!(store = %config.store_path.display(), "Loaded spec store snapshot");
    let services = Services::new(
        Arc::new(store),
        Arc::new(JenkinsConnector::new()),
        Arc::new(SonarAccessor::new()),
        config.compiler.clone(),
    );
    Ok(JobCompiler::new(services))
}

/// Prepare and compile a workflow
pub async fn compile(
    compiler: &JobCompiler,
    path: &Path,
    overrides: Option<&Path>,
    task_id: u64,
    json: bool,
) -> Result<()> {
    let definition = documents::load_workflow(path)?;
    let overrides = documents::load_overrides(overrides)?;

    let jobs = compiler
        .prepare(&definition.workflow, definition.jobs, &overrides)
        .await
        .context("Failed to prepare jobs")?;
    let graph = compiler
        .compile(&definition.workflow, &jobs, task_id)
        .await
        .context("Failed to compile workflow")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&graph)?);
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "✓ Compiled {} into {} task(s)",
            definition.workflow.name,
            graph.len()
        )
        .green()
        .bold()
    );
    println!();
    for task in &graph.tasks {
        print_task(task);
    }

    Ok(())
}

/// Prepare a workflow's jobs and print them
pub async fn prepare(compiler: &JobCompiler, path: &Path, overrides: Option<&Path>) -> Result<()> {
    let definition = documents::load_workflow(path)?;
    let overrides = documents::load_overrides(overrides)?;

    let jobs = compiler
        .prepare(&definition.workflow, definition.jobs, &overrides)
        .await
        .context("Failed to prepare jobs")?;

    print!("{}", serde_yaml::to_string(&jobs)?);
    Ok(())
}

/// Lint a workflow
pub async fn lint(compiler: &JobCompiler, path: &Path) -> Result<()> {
    let definition = documents::load_workflow(path)?;

    compiler
        .lint(&definition.workflow, &definition.jobs)
        .await
        .context("Lint failed")?;

    println!(
        "{}",
        format!("✓ {} job(s) are valid", definition.jobs.len())
            .green()
            .bold()
    );
    Ok(())
}

/// List repositories
pub async fn repos(compiler: &JobCompiler, path: &Path) -> Result<()> {
    let definition = documents::load_workflow(path)?;
    let lookup = compiler
        .repos(&definition.workflow, &definition.jobs)
        .await?;

    if lookup.value.is_empty() {
        println!("{}", "No repositories found.".yellow());
    }
    for repo in &lookup.value {
        let reference = [repo.branch.as_str(), repo.tag.as_str(), repo.commit_id.as_str()]
            .into_iter()
            .find(|r| !r.is_empty())
            .unwrap_or("-");
        println!("  {} {} {}", "▸".cyan(), repo.key().bold(), reference.dimmed());
    }
    print_omissions(&lookup);

    Ok(())
}

/// List output keys
pub async fn outputs(compiler: &JobCompiler, path: &Path) -> Result<()> {
    let definition = documents::load_workflow(path)?;
    let lookup = compiler
        .outputs(&definition.workflow, &definition.jobs)
        .await?;

    if lookup.value.is_empty() {
        println!("{}", "No outputs found.".yellow());
    }
    for key in &lookup.value {
        println!("  {} {}", "▸".cyan(), key);
    }
    print_omissions(&lookup);

    Ok(())
}

fn print_task(task: &JobTask) {
    println!("  {} {}", "▸".cyan(), task.name.bold());
    println!("    Key:     {}", task.key.dimmed());
    println!("    Type:    {}", task.job_type.to_string().dimmed());
    match &task.spec {
        JobTaskSpec::Freestyle(spec) => {
            println!("    Image:   {}", spec.properties.build_os.dimmed());
            println!(
                "    Steps:   {}",
                spec.steps
                    .iter()
                    .map(|s| s.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
                    .dimmed()
            );
        }
        JobTaskSpec::Jenkins(spec) => {
            println!("    Jenkins: {}", spec.job.job_name.dimmed());
            for param in &spec.job.parameters {
                println!("      - {}={}", param.name.cyan(), param.value);
            }
        }
    }
    println!();
}

fn print_omissions<T>(lookup: &Lookup<T>) {
    for Omission { target, reason } in &lookup.omissions {
        println!("  {} {} {}", "!".yellow(), target.yellow(), reason.dimmed());
    }
}
