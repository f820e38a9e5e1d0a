//! Sluice external system clients
//!
//! Clients for the live systems the job compiler synchronizes with:
//! - CI server (Jenkins): fetch a job's current parameter declarations
//! - Quality server (SonarQube): resolve the public result URL of a project
//!
//! Each system sits behind a trait so the compiler can be driven by fakes in
//! tests and by the HTTP implementations in production.
//!
//! # Example
//!
//! ```no_run
//! use sluice_client::{CiServerConnector, JenkinsConnector};
//! use sluice_core::domain::store::CiServerIntegration;
//!
//! # async fn example() -> sluice_client::Result<()> {
//! let connector = JenkinsConnector::new();
//! let client = connector.connect(&CiServerIntegration {
//!     id: "ci".to_string(),
//!     url: "https://jenkins.example.com".to_string(),
//!     username: "bot".to_string(),
//!     password: "token".to_string(),
//! })?;
//!
//! for param in client.get_job_parameters("backend/build").await? {
//!     println!("{} = {}", param.name, param.default_value);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
mod jenkins;
mod sonar;

pub use error::{ClientError, Result};
pub use jenkins::{JenkinsClient, JenkinsConnector};
pub use sonar::{SonarAccessor, project_key_from_config};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sluice_core::domain::store::CiServerIntegration;
use std::sync::Arc;

/// A parameter as currently declared by a CI-server job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobParameter {
    pub name: String,
    /// Default value exactly as the server reports it
    pub default_value: serde_json::Value,
    /// Server-side parameter definition type (e.g. "StringParameterDefinition")
    pub param_type: String,
    pub choices: Vec<String>,
}

/// Client for one CI server
#[async_trait]
pub trait CiServerClient: Send + Sync {
    /// Fetches the current parameter declarations of a named job
    ///
    /// # Arguments
    /// * `job_name` - The job name; `/` separates folder levels
    async fn get_job_parameters(&self, job_name: &str) -> Result<Vec<JobParameter>>;
}

/// Builds CI-server clients from stored integrations
pub trait CiServerConnector: Send + Sync {
    fn connect(&self, integration: &CiServerIntegration) -> Result<Arc<dyn CiServerClient>>;
}

/// Accessor for a code-quality server
pub trait QualityServerAccessor: Send + Sync {
    /// Resolves the public result URL of a project on a server
    fn result_url(&self, server_address: &str, project_key: &str) -> Result<String>;
}
