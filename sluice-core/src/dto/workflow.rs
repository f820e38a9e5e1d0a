//! Workflow definition documents

use serde::{Deserialize, Serialize};

use crate::domain::job::Job;
use crate::domain::repository::Repository;
use crate::domain::workflow::Workflow;

/// A workflow together with its ordered job declarations
///
/// This is the authoring-time document: the workflow fields sit at the top
/// level next to the `jobs` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    #[serde(flatten)]
    pub workflow: Workflow,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

/// User-submitted overrides applied on top of a stored workflow at run time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunOverrides {
    /// Job values whose sub-target fields override the stored jobs
    #[serde(default)]
    pub jobs: Vec<Job>,
    /// Repository supplied by the triggering event, if any
    #[serde(default)]
    pub webhook_repo: Option<Repository>,
}
