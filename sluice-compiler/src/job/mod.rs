//! Job lifecycle
//!
//! Every job kind implements [`JobVariant`]. A variant owns one declared job
//! and operates on its opaque spec payload: each operation decodes the payload
//! into the kind's typed spec, works on that local value, and writes it back
//! only once everything has succeeded. A failed operation therefore leaves the
//! job exactly as it was.

mod env;
mod jenkins;
mod render;
mod scanning;

pub use jenkins::JenkinsJob;
pub use scanning::ScanningJob;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sluice_core::domain::job::{Job, JobKind};
use sluice_core::domain::repository::Repository;
use sluice_core::domain::task::JobTask;
use tracing::warn;

use crate::context::JobContext;
use crate::error::{JobError, Result};

/// The lifecycle contract every job kind honours
///
/// Construction (see [`instantiate`]) is the first lifecycle step; the
/// remaining operations may then be called in order: preset, merge args,
/// merge webhook repo, projections, compilation. Lint may be called on its own.
#[async_trait]
pub trait JobVariant: Send + Sync {
    /// The job in its current state
    fn job(&self) -> &Job;

    /// Consumes the variant, returning the (possibly updated) job
    fn into_job(self: Box<Self>) -> Job;

    /// Populates defaults from the spec store and reconciles the spec with
    /// live external systems
    async fn set_preset(&mut self) -> Result<()>;

    /// Merges a user-submitted override of the same job
    ///
    /// An override with a different name or kind is ignored.
    fn merge_args(&mut self, args: &Job) -> Result<()>;

    /// Merges an event-supplied repository into every sub-target
    fn merge_webhook_repo(&mut self, repo: &Repository) -> Result<()>;

    /// Repositories the job checks out, skipping vanished sub-targets
    async fn repos(&self) -> Result<Lookup<Vec<Repository>>>;

    /// Output keys the job publishes, skipping vanished sub-targets
    async fn outputs(&self) -> Result<Lookup<Vec<String>>>;

    /// Compiles the job into one task per sub-target
    async fn to_jobs(&self, task_id: u64) -> Result<Vec<JobTask>>;

    /// Confirms every external reference resolves, without mutating anything
    async fn lint(&self) -> Result<()>;
}

/// Decodes a job into the variant for its kind
pub fn instantiate(job: Job, ctx: JobContext) -> Result<Box<dyn JobVariant>> {
    match job.kind {
        JobKind::Jenkins => Ok(Box::new(JenkinsJob::new(job, ctx)?)),
        JobKind::Scanning => Ok(Box::new(ScanningJob::new(job, ctx)?)),
    }
}

/// A projection together with the sub-targets it had to leave out
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lookup<T> {
    pub value: T,
    pub omissions: Vec<Omission>,
}

/// A sub-target left out of a projection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Omission {
    /// Composite `job.sub-target` key
    pub target: String,
    pub reason: String,
}

impl<T> Lookup<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            omissions: Vec::new(),
        }
    }

    /// Records (and logs) a sub-target that was skipped
    pub(crate) fn omit(&mut self, target: String, reason: String) {
        warn!(sub_target = %target, reason = %reason, "Skipping sub-target");
        self.omissions.push(Omission { target, reason });
    }
}

impl<T> Lookup<Vec<T>> {
    /// Appends another lookup's values and omissions
    pub fn append(&mut self, other: Lookup<Vec<T>>) {
        self.value.extend(other.value);
        self.omissions.extend(other.omissions);
    }
}

// =============================================================================
// Spec payload codec
// =============================================================================

fn decode_spec<T: DeserializeOwned>(job: &Job) -> Result<T> {
    serde_json::from_value(job.spec.clone()).map_err(|source| JobError::Decode {
        job: job.name.clone(),
        source,
    })
}

fn encode_spec<T: Serialize>(job: &mut Job, spec: &T) -> Result<()> {
    job.spec = serde_json::to_value(spec).map_err(|source| JobError::Encode {
        job: job.name.clone(),
        source,
    })?;
    Ok(())
}
