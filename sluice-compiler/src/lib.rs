//! Sluice Compiler
//!
//! Turns declared workflow jobs into the ordered task graph the execution
//! engine runs.
//!
//! Architecture:
//! - Repository: read-only access to stored job-kind configuration
//! - Job variants: one implementation of the [`job::JobVariant`] lifecycle per job kind
//! - Merge: identity-keyed merging of repositories and parameters
//! - Compiler: drives the variants in declaration order and concatenates their tasks

pub mod compiler;
pub mod config;
pub mod context;
pub mod error;
pub mod job;
pub mod merge;
pub mod repository;

#[cfg(test)]
mod testing;

pub use compiler::JobCompiler;
pub use config::CompilerConfig;
pub use context::{JobContext, Services};
pub use error::{ConfigError, JobError, Result};
pub use job::{JobVariant, Lookup, Omission, instantiate};
pub use repository::{MemoryStore, SpecStore, StoreError, StoreSnapshot};
