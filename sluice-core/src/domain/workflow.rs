//! Workflow domain types

use serde::{Deserialize, Serialize};

/// The parent pipeline definition of a set of jobs
///
/// Passed by reference into compilation and never mutated by it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub project: String,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub share_storages: Vec<ShareStorage>,
}

/// A named shared storage declared by a workflow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareStorage {
    pub name: String,
    /// Mount path inside task containers
    #[serde(default)]
    pub path: String,
}
