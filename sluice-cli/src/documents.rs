//! Document loading
//!
//! Workflow definitions, store snapshots and run overrides are read from
//! YAML files. JSON is accepted too, being a subset of YAML.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use sluice_compiler::{MemoryStore, StoreSnapshot};
use sluice_core::dto::workflow::{RunOverrides, WorkflowDefinition};
use std::path::Path;

/// Reads and parses one document
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn load_workflow(path: &Path) -> Result<WorkflowDefinition> {
    load(path)
}

pub fn load_store(path: &Path) -> Result<MemoryStore> {
    let snapshot: StoreSnapshot = load(path)?;
    Ok(MemoryStore::from(snapshot))
}

/// Loads run overrides, or none when no file is given
pub fn load_overrides(path: Option<&Path>) -> Result<RunOverrides> {
    match path {
        Some(path) => load(path),
        None => Ok(RunOverrides::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("sluice-{}-{}", std::process::id(), name));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_workflow_yaml() {
        let path = write_temp(
            "workflow.yaml",
            r#"
project: shop
name: nightly
jobs:
  - name: scan
    type: scanning
    spec:
      scannings:
        - name: lint-svc
"#,
        );

        let definition = load_workflow(&path).unwrap();
        assert_eq!(definition.workflow.project, "shop");
        assert_eq!(definition.jobs.len(), 1);
        assert_eq!(definition.jobs[0].spec["scannings"][0]["name"], "lint-svc");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_overrides_default_to_empty() {
        let overrides = load_overrides(None).unwrap();
        assert!(overrides.jobs.is_empty());
        assert!(overrides.webhook_repo.is_none());
    }

    #[test]
    fn test_load_reports_path() {
        let err = load_store(Path::new("/nonexistent/store.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/store.yaml"));
    }
}
