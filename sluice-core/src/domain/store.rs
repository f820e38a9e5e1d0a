//! Stored job-kind configuration
//!
//! Read-only records held by the spec store: scan definitions, base images,
//! image registries and external-system integrations.

use serde::{Deserialize, Serialize};

use crate::domain::env::Envs;
use crate::domain::repository::Repository;

/// A stored scan definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanDefinition {
    pub name: String,
    pub project: String,
    /// Id of the base image the scan runs in
    pub image_id: String,
    pub scanner_type: ScannerType,
    pub script: String,
    pub repos: Vec<Repository>,
    pub installs: Vec<ToolItem>,
    pub envs: Envs,
    pub outputs: Vec<Output>,
    pub advanced_setting: Option<AdvancedSetting>,
    /// Quality-server integration used by the `sonar` engine
    pub quality_server_id: String,
    /// Scanner properties, one `key=value` per line
    pub parameter: String,
    /// Run the scanner against the quality server after the script
    pub enable_scanner: bool,
    /// Check the quality gate after scanning
    pub check_quality_gate: bool,
}

/// Scan engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScannerType {
    /// Generic scripted scan
    #[default]
    Other,
    /// SonarQube-backed scan
    Sonar,
}

/// A tool installed before the scan runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolItem {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// A declared output variable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Resource-scheduling metadata of a stored definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedSetting {
    /// Timeout in minutes
    pub timeout: u64,
    pub res_req: ResourceRequest,
    pub res_req_spec: Option<ResourceSpec>,
    pub cluster_id: String,
    pub strategy_id: String,
}

/// Resource request class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceRequest {
    #[default]
    Low,
    Medium,
    High,
    Max,
    Define,
}

/// Explicit resource limits, used with [`ResourceRequest::Define`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceSpec {
    /// Millicores
    pub cpu_limit: u64,
    /// MiB
    pub memory_limit: u64,
    pub gpu_limit: String,
}

/// A base image a task can run in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseImage {
    pub id: String,
    pub value: String,
    #[serde(default)]
    pub image_from: ImageFrom,
}

/// Where an image comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFrom {
    /// Built-in builder image, rendered through the builder image template
    Builtin,
    /// Image reference used verbatim
    #[default]
    Custom,
}

/// An image registry available to tasks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Registry {
    pub id: String,
    pub reg_addr: String,
    pub namespace: String,
    pub reg_provider: String,
    pub access_key: String,
    pub secret_key: String,
}

/// Credentials of a stored CI-server (Jenkins) integration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiServerIntegration {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Address and token of a stored quality-server (SonarQube) integration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityServerIntegration {
    pub id: String,
    pub server_address: String,
    #[serde(default)]
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_definition_defaults() {
        let def: ScanDefinition = serde_json::from_value(serde_json::json!({
            "name": "lint-svc",
            "script": "go vet ./..."
        }))
        .unwrap();
        assert_eq!(def.scanner_type, ScannerType::Other);
        assert!(def.advanced_setting.is_none());
        assert!(def.envs.is_empty());
        assert!(!def.check_quality_gate);
    }

    #[test]
    fn test_base_image_defaults_to_custom() {
        let image: BaseImage =
            serde_json::from_value(serde_json::json!({ "id": "img", "value": "golang:1.22" }))
                .unwrap();
        assert_eq!(image.image_from, ImageFrom::Custom);
    }
}
