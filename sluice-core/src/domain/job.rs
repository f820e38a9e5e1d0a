//! Job domain types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::repository::Repository;
use crate::domain::workflow::ShareStorage;

/// A declared unit of work inside a workflow definition
///
/// The spec is kept as an opaque document so storage stays kind-agnostic;
/// each job kind decodes it into its own typed form on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: JobKind,
    #[serde(default)]
    pub spec: serde_json::Value,
}

/// Job kind discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Triggers named jobs on an external Jenkins server
    Jenkins,
    /// Runs one or more static-analysis scans
    Scanning,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Jenkins => "jenkins",
            JobKind::Scanning => "scanning",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Jenkins
// =============================================================================

/// Spec payload of a Jenkins job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JenkinsJobSpec {
    /// Id of the stored CI-server integration
    pub id: String,
    #[serde(default)]
    pub jobs: Vec<JenkinsTargetJob>,
}

/// One job on the CI server this workflow job drives
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JenkinsTargetJob {
    pub job_name: String,
    #[serde(default)]
    pub parameters: Vec<JenkinsParameter>,
}

/// A build parameter passed to a CI-server job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JenkinsParameter {
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "type", default)]
    pub param_type: ParamType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

/// Parameter value type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    #[default]
    String,
    Text,
    Bool,
    Choice,
    Password,
}

impl ParamType {
    /// Maps a Jenkins parameter definition class to a parameter type
    pub fn from_jenkins(definition: &str) -> Option<Self> {
        match definition {
            "StringParameterDefinition" => Some(ParamType::String),
            "TextParameterDefinition" => Some(ParamType::Text),
            "BooleanParameterDefinition" => Some(ParamType::Bool),
            "ChoiceParameterDefinition" => Some(ParamType::Choice),
            "PasswordParameterDefinition" => Some(ParamType::Password),
            _ => None,
        }
    }
}

// =============================================================================
// Scanning
// =============================================================================

/// Spec payload of a scanning job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanningJobSpec {
    #[serde(default)]
    pub scannings: Vec<ScanningTarget>,
}

/// One scan invocation inside a scanning job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanningTarget {
    /// Name of the stored scan definition
    pub name: String,
    #[serde(default)]
    pub repos: Vec<Repository>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_storage_info: Option<ShareStorageInfo>,
}

/// Shared storages a sub-target mounts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShareStorageInfo {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub share_storages: Vec<ShareStorage>,
}
