//! Spec store repository
//!
//! Read-only access to stored job-kind configuration. The document store that
//! owns these records lives outside the compiler; it is reached through the
//! [`SpecStore`] trait so that any backend (or an in-memory snapshot) can serve it.

mod memory;

pub use memory::{MemoryStore, StoreSnapshot};

use async_trait::async_trait;
use sluice_core::domain::store::{
    BaseImage, CiServerIntegration, QualityServerIntegration, Registry, ScanDefinition,
};
use thiserror::Error;

/// Result type alias for store lookups
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors returned by a spec store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The store could not be reached
    #[error("spec store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Repository trait for stored job-kind configuration
#[async_trait]
pub trait SpecStore: Send + Sync {
    /// Finds a scan definition by project and name
    async fn find_scan_definition(&self, project: &str, name: &str)
    -> StoreResult<ScanDefinition>;

    /// Finds a base image by id
    async fn find_base_image(&self, id: &str) -> StoreResult<BaseImage>;

    /// Lists every image registry available to tasks
    async fn list_registries(&self) -> StoreResult<Vec<Registry>>;

    /// Finds a CI-server integration by id
    async fn find_ci_integration(&self, id: &str) -> StoreResult<CiServerIntegration>;

    /// Finds a quality-server integration by id
    async fn find_quality_integration(&self, id: &str) -> StoreResult<QualityServerIntegration>;
}
