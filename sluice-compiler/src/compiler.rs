//! Job Compiler
//!
//! Drives the job variants of one workflow in declaration order. Jobs never
//! compile concurrently, since later jobs may reference outputs of earlier
//! ones.

use sluice_core::domain::job::Job;
use sluice_core::domain::repository::Repository;
use sluice_core::domain::task::TaskGraph;
use sluice_core::domain::workflow::Workflow;
use sluice_core::dto::workflow::RunOverrides;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::context::{JobContext, Services};
use crate::error::{JobError, Result};
use crate::job::{Lookup, instantiate};

/// Compiles workflows into task graphs
#[derive(Clone)]
pub struct JobCompiler {
    services: Services,
}

impl JobCompiler {
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    fn context(&self, workflow: &Workflow) -> JobContext {
        JobContext::new(workflow.clone(), self.services.clone())
    }

    /// Compiles every job into one task graph
    ///
    /// All or nothing: the first failing job aborts compilation and its error
    /// is returned.
    pub async fn compile(
        &self,
        workflow: &Workflow,
        jobs: &[Job],
        task_id: u64,
    ) -> Result<TaskGraph> {
        if let Some(name) = duplicate_name(jobs) {
            return Err(JobError::compile(name, "job name is declared more than once"));
        }

        let ctx = self.context(workflow);
        let mut graph = TaskGraph::default();
        let mut keys = HashSet::new();

        for job in jobs {
            let variant = instantiate(job.clone(), ctx.clone())?;
            let tasks = variant.to_jobs(task_id).await?;

            for task in &tasks {
                if !keys.insert(task.key.clone()) {
                    return Err(JobError::compile(
                        &job.name,
                        format!("task {} is compiled more than once", task.key),
                    ));
                }
            }

            debug!(job = %job.name, tasks = tasks.len(), "Compiled job");
            graph.tasks.extend(tasks);
        }

        info!(
            workflow = %workflow.name,
            task_id,
            tasks = graph.len(),
            "Workflow compiled"
        );

        Ok(graph)
    }

    /// Lints every job; the first unresolved reference is reported
    pub async fn lint(&self, workflow: &Workflow, jobs: &[Job]) -> Result<()> {
        if let Some(name) = duplicate_name(jobs) {
            return Err(JobError::validation(name, "job name is declared more than once"));
        }

        let ctx = self.context(workflow);
        for job in jobs {
            instantiate(job.clone(), ctx.clone())?.lint().await?;
        }
        Ok(())
    }

    /// Resolves presets and applies run-time overrides to every job
    ///
    /// Jobs go through preset, args merge and webhook repository merge in
    /// that order. Overrides naming another job are ignored by each variant.
    pub async fn prepare(
        &self,
        workflow: &Workflow,
        jobs: Vec<Job>,
        overrides: &RunOverrides,
    ) -> Result<Vec<Job>> {
        let ctx = self.context(workflow);
        let mut prepared = Vec::with_capacity(jobs.len());

        for job in jobs {
            let mut variant = instantiate(job, ctx.clone())?;
            variant.set_preset().await?;

            let name = variant.job().name.clone();
            for args in overrides.jobs.iter().filter(|args| args.name == name) {
                variant.merge_args(args)?;
            }
            if let Some(repo) = &overrides.webhook_repo {
                variant.merge_webhook_repo(repo)?;
            }

            prepared.push(variant.into_job());
        }

        Ok(prepared)
    }

    /// Repositories checked out across all jobs
    pub async fn repos(
        &self,
        workflow: &Workflow,
        jobs: &[Job],
    ) -> Result<Lookup<Vec<Repository>>> {
        let ctx = self.context(workflow);
        let mut lookup = Lookup::new(Vec::new());
        for job in jobs {
            lookup.append(instantiate(job.clone(), ctx.clone())?.repos().await?);
        }
        Ok(lookup)
    }

    /// Output keys published across all jobs
    pub async fn outputs(&self, workflow: &Workflow, jobs: &[Job]) -> Result<Lookup<Vec<String>>> {
        let ctx = self.context(workflow);
        let mut lookup = Lookup::new(Vec::new());
        for job in jobs {
            lookup.append(instantiate(job.clone(), ctx.clone())?.outputs().await?);
        }
        Ok(lookup)
    }
}

fn duplicate_name(jobs: &[Job]) -> Option<&str> {
    let mut seen = HashSet::new();
    jobs.iter()
        .map(|job| job.name.as_str())
        .find(|name| !seen.insert(*name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, FakeCiServer, parameter};
    use sluice_core::domain::job::{JenkinsJobSpec, JobKind, ScanningJobSpec};
    use sluice_core::domain::task::StepType;
    use std::sync::Arc;

    fn compiler(store: crate::MemoryStore, ci: FakeCiServer) -> JobCompiler {
        JobCompiler::new(testing::services_with(
            store,
            ci,
            Arc::new(sluice_client::SonarAccessor::new()),
        ))
    }

    fn scan(name: &str, scannings: serde_json::Value) -> Job {
        Job {
            name: name.to_string(),
            kind: JobKind::Scanning,
            spec: serde_json::json!({ "scannings": scannings }),
        }
    }

    fn trigger(name: &str, targets: serde_json::Value) -> Job {
        Job {
            name: name.to_string(),
            kind: JobKind::Jenkins,
            spec: serde_json::json!({ "id": "ci", "jobs": targets }),
        }
    }

    fn store() -> crate::MemoryStore {
        testing::store_with(vec![
            testing::scan_definition("lint-svc", "go vet ./..."),
            testing::scan_definition("sec-svc", "gosec ./..."),
        ])
    }

    #[tokio::test]
    async fn test_compile_preserves_declaration_order() {
        let compiler = compiler(store(), FakeCiServer::default());
        let jobs = vec![
            scan("scan", serde_json::json!([{ "name": "lint-svc" }, { "name": "sec-svc" }])),
            trigger("deploy", serde_json::json!([{ "job_name": "release" }])),
        ];

        let graph = compiler
            .compile(&testing::workflow(), &jobs, 9)
            .await
            .unwrap();

        let keys: Vec<&str> = graph.tasks.iter().map(|task| task.key.as_str()).collect();
        assert_eq!(keys, vec!["scan.lint-svc", "scan.sec-svc", "deploy.release"]);
        for task in &graph.tasks {
            let Some(spec) = task.spec.as_freestyle() else {
                continue;
            };
            let types: Vec<StepType> = spec.steps.iter().map(|step| step.step_type()).collect();
            assert_eq!(types[0], StepType::ToolInstall);
            assert_eq!(types[1], StepType::Checkout);
            assert_eq!(types[2], StepType::PreHook);
            assert_eq!(types.last(), Some(&StepType::PostHook));
        }
    }

    #[tokio::test]
    async fn test_compile_is_all_or_nothing() {
        let compiler = compiler(store(), FakeCiServer::default());
        let jobs = vec![
            scan("scan", serde_json::json!([{ "name": "lint-svc" }])),
            scan("empty", serde_json::json!([])),
        ];

        let err = compiler
            .compile(&testing::workflow(), &jobs, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::EmptyJob(ref name) if name == "empty"));
    }

    #[tokio::test]
    async fn test_compile_rejects_duplicates() {
        let compiler = compiler(store(), FakeCiServer::default());

        let same_name = vec![
            scan("scan", serde_json::json!([{ "name": "lint-svc" }])),
            scan("scan", serde_json::json!([{ "name": "sec-svc" }])),
        ];
        assert!(matches!(
            compiler.compile(&testing::workflow(), &same_name, 1).await,
            Err(JobError::Compile { .. })
        ));

        let same_target = vec![scan(
            "scan",
            serde_json::json!([{ "name": "lint-svc" }, { "name": "lint-svc" }]),
        )];
        assert!(matches!(
            compiler.compile(&testing::workflow(), &same_target, 1).await,
            Err(JobError::Compile { ref message, .. }) if message.contains("scan.lint-svc")
        ));
    }

    #[tokio::test]
    async fn test_prepare_applies_presets_and_overrides() {
        let ci = FakeCiServer::default().with_job(
            "release",
            vec![parameter("ENV", "dev", "ChoiceParameterDefinition")],
        );
        let compiler = compiler(store(), ci);
        let jobs = vec![
            scan("scan", serde_json::json!([{ "name": "lint-svc" }])),
            trigger("deploy", serde_json::json!([{ "job_name": "release" }])),
        ];
        let overrides = RunOverrides {
            jobs: vec![trigger(
                "deploy",
                serde_json::json!([{
                    "job_name": "release",
                    "parameters": [{ "name": "ENV", "value": "prod" }]
                }]),
            )],
            webhook_repo: Some(testing::repo("billing", "feature-x")),
        };

        let prepared = compiler
            .prepare(&testing::workflow(), jobs, &overrides)
            .await
            .unwrap();

        let scan_spec: ScanningJobSpec = serde_json::from_value(prepared[0].spec.clone()).unwrap();
        assert_eq!(scan_spec.scannings[0].repos[0].branch, "feature-x");

        let trigger_spec: JenkinsJobSpec =
            serde_json::from_value(prepared[1].spec.clone()).unwrap();
        let params = &trigger_spec.jobs[0].parameters;
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].value, "prod");
    }

    #[tokio::test]
    async fn test_lint_reports_first_unresolved_reference() {
        let compiler = compiler(store(), FakeCiServer::default());
        let jobs = vec![
            scan("scan", serde_json::json!([{ "name": "lint-svc" }])),
            scan("audit", serde_json::json!([{ "name": "gone" }])),
        ];

        let err = compiler.lint(&testing::workflow(), &jobs).await.unwrap_err();
        assert!(matches!(err, JobError::Validation { ref job, .. } if job == "audit"));
    }

    #[tokio::test]
    async fn test_projections_aggregate_jobs() {
        let compiler = compiler(store(), FakeCiServer::default());
        let jobs = vec![
            scan("scan", serde_json::json!([{ "name": "lint-svc" }, { "name": "gone" }])),
            trigger("deploy", serde_json::json!([{ "job_name": "release" }])),
        ];

        let repos = compiler.repos(&testing::workflow(), &jobs).await.unwrap();
        assert!(repos.value.is_empty());
        assert_eq!(repos.omissions.len(), 1);

        let outputs = compiler.outputs(&testing::workflow(), &jobs).await.unwrap();
        assert_eq!(outputs.omissions[0].target, "scan.gone");
    }
}
