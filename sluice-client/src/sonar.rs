//! SonarQube quality-server accessor

use reqwest::Url;

use crate::QualityServerAccessor;
use crate::error::{ClientError, Result};

const PROJECT_KEY_PROPERTY: &str = "sonar.projectKey";

/// Resolves SonarQube dashboard links
#[derive(Debug, Clone, Copy, Default)]
pub struct SonarAccessor;

impl SonarAccessor {
    pub fn new() -> Self {
        Self
    }
}

impl QualityServerAccessor for SonarAccessor {
    fn result_url(&self, server_address: &str, project_key: &str) -> Result<String> {
        let base = server_address.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(ClientError::InvalidUrl("empty server address".to_string()));
        }
        let mut url = Url::parse(&format!("{}/dashboard", base))
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", server_address, e)))?;
        if url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(server_address.to_string()));
        }
        url.query_pairs_mut().append_pair("id", project_key);
        Ok(url.to_string())
    }
}

/// Reads the project key out of scanner properties text
///
/// Returns an empty string when no `sonar.projectKey=` line is present.
pub fn project_key_from_config(parameter: &str) -> String {
    parameter
        .lines()
        .filter_map(|line| line.trim().split_once('='))
        .find(|(key, _)| key.trim() == PROJECT_KEY_PROPERTY)
        .map(|(_, value)| value.trim().to_string())
        .unwrap_or_default()
}
