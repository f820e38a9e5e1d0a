//! Scanning job
//!
//! Runs one or more stored scan definitions. Each sub-target names a
//! definition in the spec store and compiles to one freestyle task.

use async_trait::async_trait;
use sluice_client::project_key_from_config;
use sluice_core::domain::env::KeyVal;
use sluice_core::domain::job::{Job, ScanningJobSpec, ScanningTarget};
use sluice_core::domain::repository::Repository;
use sluice_core::domain::store::{ImageFrom, ScanDefinition, ScannerType};
use sluice_core::domain::task::{
    FreestyleTaskSpec, JOB_NAME_KEY, JobProperties, JobTask, JobTaskSpec, StepSpec, StepTask,
};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::env::{repo_variables, workflow_variables};
use super::render::{
    output_key, output_script, render_repos, script_lines, share_storage_details, task_key,
    task_name,
};
use super::{JobVariant, Lookup, decode_spec, encode_spec};
use crate::context::JobContext;
use crate::error::{JobError, Result};
use crate::merge::merge_repos;
use crate::repository::StoreError;

const SCANNING_NAME_KEY: &str = "scanning_name";

/// Lifecycle of a scanning job
pub struct ScanningJob {
    job: Job,
    ctx: JobContext,
}

impl ScanningJob {
    /// Decodes the job's spec and writes it back in normalised form
    pub fn new(mut job: Job, ctx: JobContext) -> Result<Self> {
        let spec: ScanningJobSpec = decode_spec(&job)?;
        encode_spec(&mut job, &spec)?;
        Ok(Self { job, ctx })
    }

    fn spec(&self) -> Result<ScanningJobSpec> {
        decode_spec(&self.job)
    }

    async fn find_definition(&self, name: &str) -> std::result::Result<ScanDefinition, StoreError> {
        self.ctx
            .services
            .store
            .find_scan_definition(&self.ctx.workflow.project, name)
            .await
    }

    /// Looks up a sub-target's definition for a projection
    ///
    /// A vanished definition is recorded on the lookup and yields `None`.
    async fn definition_for<T>(
        &self,
        scanning: &ScanningTarget,
        lookup: &mut Lookup<T>,
    ) -> Result<Option<ScanDefinition>> {
        match self.find_definition(&scanning.name).await {
            Ok(definition) => Ok(Some(definition)),
            Err(e) if e.is_not_found() => {
                lookup.omit(task_key(&self.job.name, &scanning.name), e.to_string());
                Ok(None)
            }
            Err(e) => Err(JobError::UpstreamLookup(e.to_string())),
        }
    }

    async fn compile_target(&self, scanning: &ScanningTarget, task_id: u64) -> Result<JobTask> {
        let services = &self.ctx.services;
        let workflow = &self.ctx.workflow;
        let compile_err = |what: &str, e: StoreError| {
            JobError::compile(
                &self.job.name,
                format!("{} for scanning {}: {}", what, scanning.name, e),
            )
        };

        let definition = self
            .find_definition(&scanning.name)
            .await
            .map_err(|e| compile_err("failed to find scan definition", e))?;
        let image = services
            .store
            .find_base_image(&definition.image_id)
            .await
            .map_err(|e| compile_err("failed to find base image", e))?;
        let registries = services
            .store
            .list_registries()
            .await
            .map_err(|e| compile_err("failed to list registries", e))?;

        let name = task_name(&scanning.name, &self.job.name);
        let repos = merge_repos(&definition.repos, &scanning.repos);
        let first_repo = repos.first();
        let branch = first_repo.map_or("", |repo| repo.branch.as_str());

        let mut envs = workflow_variables(workflow, task_id, &services.config.portal_url);
        envs.extend(repo_variables(&repos));
        envs.push(KeyVal::new("SCANNING_NAME", &scanning.name));
        envs.extend(definition.envs.iter().cloned());
        if let Some(repo) = first_repo {
            envs.push(KeyVal::new("BRANCH", &repo.branch));
        }

        let mut script = script_lines(&definition.script);
        script.extend(output_script(&definition.outputs, &services.config.output_dir));

        let mut work = Vec::new();
        match definition.scanner_type {
            ScannerType::Other => {
                work.push(step(
                    &name,
                    &scanning.name,
                    "shell",
                    StepSpec::Shell {
                        scripts: script,
                        skip_prepare: false,
                    },
                ));
            }
            ScannerType::Sonar => {
                work.push(step(
                    &name,
                    &scanning.name,
                    "shell",
                    StepSpec::Shell {
                        scripts: script,
                        skip_prepare: true,
                    },
                ));

                let server = services
                    .store
                    .find_quality_integration(&definition.quality_server_id)
                    .await
                    .map_err(|e| compile_err("failed to find quality server", e))?;

                let project_key = project_key_from_config(&definition.parameter);
                let link = services
                    .quality
                    .result_url(&server.server_address, &project_key)
                    .unwrap_or_else(|e| {
                        warn!(
                            scanning = %scanning.name,
                            error = %e,
                            "Failed to resolve quality server result link"
                        );
                        String::new()
                    });
                envs.push(KeyVal::new("SONAR_LINK", link));
                envs.push(KeyVal::credential("SONAR_TOKEN", &server.token));
                envs.push(KeyVal::new("SONAR_URL", &server.server_address));

                let check_dir = first_repo.map_or(".", Repository::checkout_dir).to_string();

                if definition.enable_scanner {
                    let mut scripts = vec![
                        "set -e".to_string(),
                        format!("cd {}", check_dir),
                        "cat > sonar-project.properties << EOF".to_string(),
                        format!("sonar.login={}", server.token),
                        format!("sonar.host.url={}", server.server_address),
                    ];
                    scripts.extend(script_lines(&definition.parameter.replace("$branch", branch)));
                    scripts.push("EOF".to_string());
                    scripts.push("sonar-scanner".to_string());
                    work.push(step(
                        &name,
                        &scanning.name,
                        "scanner",
                        StepSpec::Shell {
                            scripts,
                            skip_prepare: true,
                        },
                    ));
                }

                if definition.check_quality_gate {
                    work.push(step(
                        &name,
                        &scanning.name,
                        "quality-gate",
                        StepSpec::QualityGateCheck {
                            parameter: definition.parameter.clone(),
                            check_dir,
                            token: server.token.clone(),
                            server: server.server_address.clone(),
                        },
                    ));
                }
            }
        }

        let mut steps = vec![
            step(
                &name,
                &scanning.name,
                "tool-install",
                StepSpec::ToolInstall {
                    installs: definition.installs.clone(),
                },
            ),
            step(
                &name,
                &scanning.name,
                "checkout",
                StepSpec::Checkout {
                    repos: render_repos(&repos, &envs),
                },
            ),
            step(&name, &scanning.name, "pre-hook", StepSpec::PreHook),
        ];
        steps.extend(work);
        steps.push(step(&name, &scanning.name, "post-hook", StepSpec::PostHook));

        let build_os = match image.image_from {
            ImageFrom::Builtin => services.config.builder_image(&image.value),
            ImageFrom::Custom => image.value.clone(),
        };
        let setting = definition.advanced_setting.clone().unwrap_or_default();

        debug!(task = %name, steps = steps.len(), "Compiled scanning task");

        Ok(JobTask {
            key: task_key(&self.job.name, &scanning.name),
            job_info: BTreeMap::from([
                (JOB_NAME_KEY.to_string(), self.job.name.clone()),
                (SCANNING_NAME_KEY.to_string(), scanning.name.clone()),
            ]),
            job_type: self.job.kind,
            spec: JobTaskSpec::Freestyle(FreestyleTaskSpec {
                properties: JobProperties {
                    timeout: setting.timeout,
                    resource_request: setting.res_req,
                    res_req_spec: setting.res_req_spec,
                    cluster_id: setting.cluster_id,
                    strategy_id: setting.strategy_id,
                    build_os,
                    image_from: ImageFrom::Custom,
                    envs,
                    registries,
                    share_storage_details: share_storage_details(
                        &workflow.share_storages,
                        scanning.share_storage_info.as_ref(),
                        &workflow.name,
                        task_id,
                    ),
                },
                steps,
            }),
            timeout: setting.timeout,
            outputs: definition.outputs,
            name,
        })
    }
}

fn step(task: &str, scanning: &str, suffix: &str, spec: StepSpec) -> StepTask {
    StepTask {
        name: format!("{}-{}", scanning, suffix),
        job_name: task.to_string(),
        spec,
    }
}

#[async_trait]
impl JobVariant for ScanningJob {
    fn job(&self) -> &Job {
        &self.job
    }

    fn into_job(self: Box<Self>) -> Job {
        self.job
    }

    async fn set_preset(&mut self) -> Result<()> {
        let mut spec = self.spec()?;

        for scanning in &mut spec.scannings {
            let definition = self.find_definition(&scanning.name).await.map_err(|e| {
                JobError::UpstreamLookup(format!(
                    "failed to find scan definition {}: {}",
                    scanning.name, e
                ))
            })?;
            scanning.repos = merge_repos(&definition.repos, &scanning.repos);
        }

        encode_spec(&mut self.job, &spec)
    }

    fn merge_args(&mut self, args: &Job) -> Result<()> {
        if args.name != self.job.name || args.kind != self.job.kind {
            debug!(job = %self.job.name, args = %args.name, "Ignoring args of another job");
            return Ok(());
        }

        let mut spec = self.spec()?;
        let args_spec: ScanningJobSpec = decode_spec(args)?;

        for scanning in &mut spec.scannings {
            if let Some(args_scanning) = args_spec
                .scannings
                .iter()
                .find(|candidate| candidate.name == scanning.name)
            {
                scanning.repos = merge_repos(&scanning.repos, &args_scanning.repos);
            }
        }

        encode_spec(&mut self.job, &spec)
    }

    fn merge_webhook_repo(&mut self, repo: &Repository) -> Result<()> {
        let mut spec = self.spec()?;
        let webhook = std::slice::from_ref(repo);

        for scanning in &mut spec.scannings {
            scanning.repos = merge_repos(&scanning.repos, webhook);
        }

        encode_spec(&mut self.job, &spec)
    }

    async fn repos(&self) -> Result<Lookup<Vec<Repository>>> {
        let spec = self.spec()?;
        let mut lookup = Lookup::new(Vec::new());

        for scanning in &spec.scannings {
            if let Some(definition) = self.definition_for(scanning, &mut lookup).await? {
                lookup
                    .value
                    .extend(merge_repos(&definition.repos, &scanning.repos));
            }
        }

        Ok(lookup)
    }

    async fn outputs(&self) -> Result<Lookup<Vec<String>>> {
        let spec = self.spec()?;
        let mut lookup = Lookup::new(Vec::new());

        for scanning in &spec.scannings {
            if let Some(definition) = self.definition_for(scanning, &mut lookup).await? {
                let key = task_key(&self.job.name, &scanning.name);
                lookup.value.extend(
                    definition
                        .outputs
                        .iter()
                        .map(|output| output_key(&key, &output.name)),
                );
            }
        }

        Ok(lookup)
    }

    async fn to_jobs(&self, task_id: u64) -> Result<Vec<JobTask>> {
        let spec = self.spec()?;
        if spec.scannings.is_empty() {
            return Err(JobError::EmptyJob(self.job.name.clone()));
        }

        let mut tasks = Vec::with_capacity(spec.scannings.len());
        for scanning in &spec.scannings {
            tasks.push(self.compile_target(scanning, task_id).await?);
        }
        Ok(tasks)
    }

    async fn lint(&self) -> Result<()> {
        let spec = self.spec()?;
        let unresolved = |e: StoreError, message: String| {
            if e.is_not_found() {
                JobError::validation(&self.job.name, message)
            } else {
                JobError::UpstreamLookup(e.to_string())
            }
        };

        for scanning in &spec.scannings {
            let definition = self.find_definition(&scanning.name).await.map_err(|e| {
                unresolved(e, format!("scan definition {} not found", scanning.name))
            })?;

            if definition.scanner_type == ScannerType::Sonar {
                self.ctx
                    .services
                    .store
                    .find_quality_integration(&definition.quality_server_id)
                    .await
                    .map_err(|e| {
                        unresolved(
                            e,
                            format!(
                                "quality server {} of scanning {} not found",
                                definition.quality_server_id, scanning.name
                            ),
                        )
                    })?;
            }
        }

        Ok(())
    }
}
