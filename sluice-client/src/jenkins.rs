//! Jenkins CI-server client

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use sluice_core::domain::store::CiServerIntegration;
use std::sync::Arc;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::{CiServerClient, CiServerConnector, JobParameter};

/// Restricts the job document to parameter definitions
const PARAMETERS_TREE: &str =
    "property[parameterDefinitions[name,type,choices,defaultParameterValue[value]]]";

/// HTTP client for one Jenkins server
#[derive(Debug, Clone)]
pub struct JenkinsClient {
    /// Base URL of the server (e.g., "https://jenkins.example.com")
    base_url: String,
    username: String,
    password: String,
    client: Client,
}

impl JenkinsClient {
    /// Create a new client with its own HTTP client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the Jenkins server
    /// * `username` - User for basic auth; empty disables authentication
    /// * `password` - Password or API token
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::with_client(base_url, username, password, Client::new())
    }

    /// Create a new client sharing an existing HTTP client
    pub fn with_client(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
            client,
        }
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the JSON API URL of a job, descending through folders
    fn job_api_url(&self, job_name: &str) -> Result<Url> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?;
            segments.pop_if_empty();
            for part in job_name.split('/').filter(|part| !part.is_empty()) {
                segments.push("job");
                segments.push(part);
            }
            segments.push("api");
            segments.push("json");
        }
        url.query_pairs_mut().append_pair("tree", PARAMETERS_TREE);
        Ok(url)
    }
}

#[async_trait]
impl CiServerClient for JenkinsClient {
    async fn get_job_parameters(&self, job_name: &str) -> Result<Vec<JobParameter>> {
        let url = self.job_api_url(job_name)?;
        debug!(job = job_name, %url, "Fetching Jenkins job parameters");

        let mut request = self.client.get(url);
        if !self.username.is_empty() {
            request = request.basic_auth(&self.username, Some(&self.password));
        }
        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(format!("Jenkins job {}", job_name)));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        let job: JobDocument = response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse job document: {}", e)))?;

        Ok(job.into_parameters())
    }
}

/// Connects to Jenkins servers described by stored integrations
///
/// All clients built by one connector share a single HTTP connection pool.
#[derive(Debug, Clone, Default)]
pub struct JenkinsConnector {
    client: Client,
}

impl JenkinsConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a connector with a configured HTTP client (timeouts, proxies, TLS)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl CiServerConnector for JenkinsConnector {
    fn connect(&self, integration: &CiServerIntegration) -> Result<Arc<dyn CiServerClient>> {
        if integration.url.trim().is_empty() {
            return Err(ClientError::InvalidUrl(format!(
                "integration {} has no server URL",
                integration.id
            )));
        }
        Ok(Arc::new(JenkinsClient::with_client(
            integration.url.clone(),
            integration.username.clone(),
            integration.password.clone(),
            self.client.clone(),
        )))
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct JobDocument {
    #[serde(default)]
    property: Option<Vec<JobPropertyDocument>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobPropertyDocument {
    #[serde(default)]
    parameter_definitions: Option<Vec<ParameterDefinition>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParameterDefinition {
    name: String,
    #[serde(rename = "type", default)]
    param_type: String,
    #[serde(default)]
    choices: Option<Vec<String>>,
    #[serde(default)]
    default_parameter_value: Option<DefaultParameterValue>,
}

#[derive(Debug, Deserialize)]
struct DefaultParameterValue {
    #[serde(default)]
    value: serde_json::Value,
}

impl JobDocument {
    fn into_parameters(self) -> Vec<JobParameter> {
        self.property
            .unwrap_or_default()
            .into_iter()
            .flat_map(|property| property.parameter_definitions.unwrap_or_default())
            .map(|definition| JobParameter {
                name: definition.name,
                default_value: definition
                    .default_parameter_value
                    .map(|default| default.value)
                    .unwrap_or(serde_json::Value::Null),
                param_type: definition.param_type,
                choices: definition.choices.unwrap_or_default(),
            })
            .collect()
    }
}
