//! In-memory spec store
//!
//! Serves lookups from a snapshot loaded up front, e.g. from a fixture file.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sluice_core::domain::store::{
    BaseImage, CiServerIntegration, QualityServerIntegration, Registry, ScanDefinition,
};
use std::collections::HashMap;

use super::{SpecStore, StoreError, StoreResult};

/// Serializable contents of a spec store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSnapshot {
    pub scan_definitions: Vec<ScanDefinition>,
    pub base_images: Vec<BaseImage>,
    pub registries: Vec<Registry>,
    pub ci_integrations: Vec<CiServerIntegration>,
    pub quality_integrations: Vec<QualityServerIntegration>,
}

/// Spec store backed by in-memory maps
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Keyed by (project, name)
    scan_definitions: HashMap<(String, String), ScanDefinition>,
    base_images: HashMap<String, BaseImage>,
    registries: Vec<Registry>,
    ci_integrations: HashMap<String, CiServerIntegration>,
    quality_integrations: HashMap<String, QualityServerIntegration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scan_definition(mut self, definition: ScanDefinition) -> Self {
        self.scan_definitions.insert(
            (definition.project.clone(), definition.name.clone()),
            definition,
        );
        self
    }

    pub fn with_base_image(mut self, image: BaseImage) -> Self {
        self.base_images.insert(image.id.clone(), image);
        self
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registries.push(registry);
        self
    }

    pub fn with_ci_integration(mut self, integration: CiServerIntegration) -> Self {
        self.ci_integrations
            .insert(integration.id.clone(), integration);
        self
    }

    pub fn with_quality_integration(mut self, integration: QualityServerIntegration) -> Self {
        self.quality_integrations
            .insert(integration.id.clone(), integration);
        self
    }
}

impl From<StoreSnapshot> for MemoryStore {
    fn from(snapshot: StoreSnapshot) -> Self {
        let mut store = MemoryStore::new();
        for definition in snapshot.scan_definitions {
            store = store.with_scan_definition(definition);
        }
        for image in snapshot.base_images {
            store = store.with_base_image(image);
        }
        for registry in snapshot.registries {
            store = store.with_registry(registry);
        }
        for integration in snapshot.ci_integrations {
            store = store.with_ci_integration(integration);
        }
        for integration in snapshot.quality_integrations {
            store = store.with_quality_integration(integration);
        }
        store
    }
}

#[async_trait]
impl SpecStore for MemoryStore {
    async fn find_scan_definition(
        &self,
        project: &str,
        name: &str,
    ) -> StoreResult<ScanDefinition> {
        self.scan_definitions
            .get(&(project.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| {
                StoreError::not_found("scan definition", format!("{}/{}", project, name))
            })
    }

    async fn find_base_image(&self, id: &str) -> StoreResult<BaseImage> {
        self.base_images
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("base image", id))
    }

    async fn list_registries(&self) -> StoreResult<Vec<Registry>> {
        Ok(self.registries.clone())
    }

    async fn find_ci_integration(&self, id: &str) -> StoreResult<CiServerIntegration> {
        self.ci_integrations
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("jenkins integration", id))
    }

    async fn find_quality_integration(&self, id: &str) -> StoreResult<QualityServerIntegration> {
        self.quality_integrations
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("quality server integration", id))
    }
}
