//! Jenkins job
//!
//! Triggers named jobs on an external Jenkins server. Presetting reconciles
//! the declared parameters of every target job with the server's current
//! declarations; compilation emits one task per target job and leaves step
//! execution to the server.

use async_trait::async_trait;
use sluice_client::{CiServerClient, ClientError, JobParameter};
use sluice_core::domain::job::{JenkinsJobSpec, JenkinsParameter, JenkinsTargetJob, Job, ParamType};
use sluice_core::domain::repository::Repository;
use sluice_core::domain::task::{
    JOB_NAME_KEY, JenkinsTaskJob, JenkinsTaskSpec, JobTask, JobTaskSpec,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::render::{task_key, task_name};
use super::{JobVariant, Lookup, decode_spec, encode_spec};
use crate::context::JobContext;
use crate::error::{JobError, Result};
use crate::merge::merge_parameters;

/// Lifecycle of a Jenkins job
pub struct JenkinsJob {
    job: Job,
    ctx: JobContext,
}

impl JenkinsJob {
    /// Decodes the job's spec and writes it back in normalised form
    pub fn new(mut job: Job, ctx: JobContext) -> Result<Self> {
        let spec: JenkinsJobSpec = decode_spec(&job)?;
        encode_spec(&mut job, &spec)?;
        Ok(Self { job, ctx })
    }

    fn spec(&self) -> Result<JenkinsJobSpec> {
        decode_spec(&self.job)
    }
}

#[async_trait]
impl JobVariant for JenkinsJob {
    fn job(&self) -> &Job {
        &self.job
    }

    fn into_job(self: Box<Self>) -> Job {
        self.job
    }

    async fn set_preset(&mut self) -> Result<()> {
        let mut spec = self.spec()?;

        let integration = self
            .ctx
            .services
            .store
            .find_ci_integration(&spec.id)
            .await
            .map_err(|e| {
                JobError::UpstreamLookup(format!("failed to get Jenkins integration: {}", e))
            })?;
        let client = self.ctx.services.ci.connect(&integration).map_err(|e| {
            JobError::UpstreamLookup(format!("failed to connect to Jenkins {}: {}", spec.id, e))
        })?;

        spec.jobs = sync_parameters(client, std::mem::take(&mut spec.jobs)).await?;
        encode_spec(&mut self.job, &spec)?;

        info!(
            job = %self.job.name,
            targets = spec.jobs.len(),
            "Synchronized Jenkins job parameters"
        );
        Ok(())
    }

    fn merge_args(&mut self, args: &Job) -> Result<()> {
        if args.name != self.job.name || args.kind != self.job.kind {
            debug!(job = %self.job.name, args = %args.name, "Ignoring args of another job");
            return Ok(());
        }

        let mut spec = self.spec()?;
        let args_spec: JenkinsJobSpec = decode_spec(args)?;

        for target in &mut spec.jobs {
            if let Some(args_target) = args_spec
                .jobs
                .iter()
                .find(|candidate| candidate.job_name == target.job_name)
            {
                merge_parameters(&mut target.parameters, &args_target.parameters);
            }
        }

        encode_spec(&mut self.job, &spec)
    }

    fn merge_webhook_repo(&mut self, _repo: &Repository) -> Result<()> {
        Ok(())
    }

    async fn repos(&self) -> Result<Lookup<Vec<Repository>>> {
        self.spec()?;
        Ok(Lookup::new(Vec::new()))
    }

    async fn outputs(&self) -> Result<Lookup<Vec<String>>> {
        self.spec()?;
        Ok(Lookup::new(Vec::new()))
    }

    async fn to_jobs(&self, _task_id: u64) -> Result<Vec<JobTask>> {
        let spec = self.spec()?;
        if spec.jobs.is_empty() {
            return Err(JobError::EmptyJob(self.job.name.clone()));
        }

        self.ctx
            .services
            .store
            .find_ci_integration(&spec.id)
            .await
            .map_err(|e| JobError::compile(&self.job.name, e.to_string()))?;

        let tasks = spec
            .jobs
            .into_iter()
            .map(|target| JobTask {
                name: task_name(&target.job_name, &self.job.name),
                key: task_key(&self.job.name, &target.job_name),
                job_info: BTreeMap::from([
                    (JOB_NAME_KEY.to_string(), self.job.name.clone()),
                    ("jenkins_job_name".to_string(), target.job_name.clone()),
                ]),
                job_type: self.job.kind,
                spec: JobTaskSpec::Jenkins(JenkinsTaskSpec {
                    integration_id: spec.id.clone(),
                    job: JenkinsTaskJob {
                        job_name: target.job_name,
                        parameters: target.parameters,
                    },
                }),
                timeout: 0,
                outputs: Vec::new(),
            })
            .collect();

        Ok(tasks)
    }

    async fn lint(&self) -> Result<()> {
        let spec = self.spec()?;
        match self.ctx.services.store.find_ci_integration(&spec.id).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => Err(JobError::validation(
                &self.job.name,
                format!("Jenkins integration {} not found", spec.id),
            )),
            Err(e) => Err(JobError::UpstreamLookup(e.to_string())),
        }
    }
}

/// Fetches every target job's current parameters concurrently
///
/// One task per target job. The first failure is returned as soon as it is
/// observed; lookups still in flight are detached and their results dropped.
async fn sync_parameters(
    client: Arc<dyn CiServerClient>,
    targets: Vec<JenkinsTargetJob>,
) -> Result<Vec<JenkinsTargetJob>> {
    let mut synced: Vec<Option<JenkinsTargetJob>> = (0..targets.len()).map(|_| None).collect();
    let mut lookups = JoinSet::new();

    for (index, target) in targets.into_iter().enumerate() {
        let client = Arc::clone(&client);
        lookups.spawn(async move {
            let current = client
                .get_job_parameters(&target.job_name)
                .await
                .map_err(|e| lookup_error(&target.job_name, &e))?;
            Ok::<_, JobError>((index, rebuild_parameters(target, current)))
        });
    }

    while let Some(joined) = lookups.join_next().await {
        let outcome = joined
            .map_err(|e| JobError::UpstreamLookup(format!("parameter lookup aborted: {}", e)))
            .and_then(|result| result);
        match outcome {
            Ok((index, target)) => synced[index] = Some(target),
            Err(e) => {
                lookups.detach_all();
                return Err(e);
            }
        }
    }

    Ok(synced.into_iter().flatten().collect())
}

/// Rebuilds a target's parameters from the server's current declarations
///
/// Declared parameters keep their value and type; the rest are synthesized
/// from server defaults. Declared parameters the server no longer knows are
/// dropped.
fn rebuild_parameters(
    mut target: JenkinsTargetJob,
    current: Vec<JobParameter>,
) -> JenkinsTargetJob {
    let mut declared: HashMap<String, JenkinsParameter> = target
        .parameters
        .drain(..)
        .map(|param| (param.name.clone(), param))
        .collect();

    target.parameters = current
        .into_iter()
        .map(|current| match declared.remove(&current.name) {
            Some(param) => param,
            None => JenkinsParameter {
                value: render_default(&current.default_value),
                param_type: ParamType::from_jenkins(&current.param_type).unwrap_or_default(),
                choices: current.choices,
                name: current.name,
            },
        })
        .collect();

    if !declared.is_empty() {
        let mut dropped: Vec<String> = declared.into_keys().collect();
        dropped.sort();
        warn!(
            target_job = %target.job_name,
            ?dropped,
            "Dropping parameters the Jenkins job no longer declares"
        );
    }

    target
}

/// Describes a failed parameter lookup by who is at fault
fn lookup_error(job_name: &str, e: &ClientError) -> JobError {
    let cause = if e.is_not_found() {
        "is unknown to the server"
    } else if e.is_client_error() {
        "was rejected by the server"
    } else if e.is_server_error() {
        "failed on the server"
    } else {
        "could not be fetched"
    };
    JobError::UpstreamLookup(format!("Jenkins job {} {}: {}", job_name, cause, e))
}

fn render_default(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
