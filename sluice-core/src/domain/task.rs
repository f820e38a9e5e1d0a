//! Compiled task graph
//!
//! The output of compilation: an ordered list of task units, each carrying
//! its own ordered steps. The execution engine consumes this unmodified.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::env::Envs;
use crate::domain::job::{JenkinsParameter, JobKind};
use crate::domain::repository::Repository;
use crate::domain::store::{ImageFrom, Output, Registry, ResourceRequest, ResourceSpec, ToolItem};

/// Job-info key holding the name of the declaring job
pub const JOB_NAME_KEY: &str = "job_name";

/// Ordered list of compiled task units for one workflow run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskGraph {
    pub tasks: Vec<JobTask>,
}

impl TaskGraph {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Finds a task by its composite `job.sub-target` key
    pub fn find(&self, key: &str) -> Option<&JobTask> {
        self.tasks.iter().find(|task| task.key == key)
    }
}

/// One compiled, independently schedulable piece of work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobTask {
    pub name: String,
    /// Composite `job.sub-target` key, unique within one run
    pub key: String,
    /// Correlation metadata for external observers
    pub job_info: BTreeMap<String, String>,
    pub job_type: JobKind,
    pub spec: JobTaskSpec,
    /// Timeout in minutes; zero means no limit
    pub timeout: u64,
    #[serde(default)]
    pub outputs: Vec<Output>,
}

/// Kind-specific execution spec of a task unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobTaskSpec {
    Jenkins(JenkinsTaskSpec),
    Freestyle(FreestyleTaskSpec),
}

impl JobTaskSpec {
    pub fn as_freestyle(&self) -> Option<&FreestyleTaskSpec> {
        match self {
            JobTaskSpec::Freestyle(spec) => Some(spec),
            JobTaskSpec::Jenkins(_) => None,
        }
    }

    pub fn as_jenkins(&self) -> Option<&JenkinsTaskSpec> {
        match self {
            JobTaskSpec::Jenkins(spec) => Some(spec),
            JobTaskSpec::Freestyle(_) => None,
        }
    }
}

/// Trigger of one job on a CI server; the server owns step execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JenkinsTaskSpec {
    pub integration_id: String,
    pub job: JenkinsTaskJob,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JenkinsTaskJob {
    pub job_name: String,
    pub parameters: Vec<JenkinsParameter>,
}

/// A locally executed task: runtime properties plus ordered steps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FreestyleTaskSpec {
    pub properties: JobProperties,
    pub steps: Vec<StepTask>,
}

/// Runtime and scheduling properties of a freestyle task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobProperties {
    pub timeout: u64,
    pub resource_request: ResourceRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub res_req_spec: Option<ResourceSpec>,
    pub cluster_id: String,
    pub strategy_id: String,
    /// Fully rendered image reference
    pub build_os: String,
    pub image_from: ImageFrom,
    pub envs: Envs,
    pub registries: Vec<Registry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub share_storage_details: Vec<ShareStorageDetail>,
}

/// A shared storage mounted into a task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareStorageDetail {
    pub name: String,
    pub mount_path: String,
    pub sub_path: String,
}

/// One ordered action within a task unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepTask {
    pub name: String,
    /// Name of the owning task unit
    pub job_name: String,
    pub spec: StepSpec,
}

impl StepTask {
    pub fn step_type(&self) -> StepType {
        self.spec.step_type()
    }
}

/// Kind-specific step spec, tagged by step type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step_type", rename_all = "snake_case")]
pub enum StepSpec {
    ToolInstall {
        installs: Vec<ToolItem>,
    },
    Checkout {
        repos: Vec<Repository>,
    },
    PreHook,
    Shell {
        scripts: Vec<String>,
        #[serde(default)]
        skip_prepare: bool,
    },
    QualityGateCheck {
        parameter: String,
        check_dir: String,
        token: String,
        server: String,
    },
    PostHook,
}

impl StepSpec {
    pub fn step_type(&self) -> StepType {
        match self {
            StepSpec::ToolInstall { .. } => StepType::ToolInstall,
            StepSpec::Checkout { .. } => StepType::Checkout,
            StepSpec::PreHook => StepType::PreHook,
            StepSpec::Shell { .. } => StepType::Shell,
            StepSpec::QualityGateCheck { .. } => StepType::QualityGateCheck,
            StepSpec::PostHook => StepType::PostHook,
        }
    }
}

/// Step kind without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepType {
    ToolInstall,
    Checkout,
    PreHook,
    Shell,
    QualityGateCheck,
    PostHook,
}
