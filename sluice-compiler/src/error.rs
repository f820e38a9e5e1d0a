//! Error types for job compilation

use thiserror::Error;

/// Result type alias for lifecycle operations
pub type Result<T> = std::result::Result<T, JobError>;

/// Errors raised by the job lifecycle and the compiler
#[derive(Debug, Error)]
pub enum JobError {
    /// The job's spec payload is structurally invalid for its kind
    #[error("failed to decode spec of job {job}: {source}")]
    Decode {
        job: String,
        #[source]
        source: serde_json::Error,
    },

    /// A typed spec could not be written back into the job
    #[error("failed to encode spec of job {job}: {source}")]
    Encode {
        job: String,
        #[source]
        source: serde_json::Error,
    },

    /// The spec store or an external system could not provide what preset resolution needs
    #[error("upstream lookup failed: {0}")]
    UpstreamLookup(String),

    /// A sub-target's dependencies could not be resolved at compile time
    #[error("failed to compile job {job}: {message}")]
    Compile { job: String, message: String },

    /// The job declares no sub-targets
    #[error("job {0} declares no sub-targets")]
    EmptyJob(String),

    /// Lint found an unresolved reference
    #[error("job {job} is invalid: {message}")]
    Validation { job: String, message: String },
}

impl JobError {
    pub fn compile(job: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Compile {
            job: job.into(),
            message: message.into(),
        }
    }

    pub fn validation(job: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            job: job.into(),
            message: message.into(),
        }
    }

    /// Whether the failure comes from the caller's input rather than a dependency
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            Self::Decode { .. } | Self::EmptyJob(_) | Self::Validation { .. }
        )
    }
}

/// Invalid compiler configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
