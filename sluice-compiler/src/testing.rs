//! Fakes for external collaborators used across unit tests

use async_trait::async_trait;
use sluice_client::{
    CiServerClient, CiServerConnector, ClientError, JobParameter, QualityServerAccessor,
    SonarAccessor,
};
use sluice_core::domain::repository::Repository;
use sluice_core::domain::store::{
    BaseImage, CiServerIntegration, QualityServerIntegration, Registry, ScanDefinition,
};
use sluice_core::domain::workflow::Workflow;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::config::CompilerConfig;
use crate::context::{JobContext, Services};
use crate::repository::{MemoryStore, SpecStore, StoreError, StoreResult};

pub(crate) fn workflow() -> Workflow {
    Workflow {
        project: "shop".to_string(),
        name: "nightly".to_string(),
        display_name: "Nightly".to_string(),
        share_storages: vec![],
    }
}

pub(crate) fn services_with(
    store: impl SpecStore + 'static,
    ci: FakeCiServer,
    quality: Arc<dyn QualityServerAccessor>,
) -> Services {
    Services::new(
        Arc::new(store),
        Arc::new(ci),
        quality,
        CompilerConfig::default(),
    )
}

pub(crate) fn context(store: impl SpecStore + 'static) -> JobContext {
    context_with(store, FakeCiServer::default())
}

pub(crate) fn context_with(store: impl SpecStore + 'static, ci: FakeCiServer) -> JobContext {
    JobContext::new(
        workflow(),
        services_with(store, ci, Arc::new(SonarAccessor::new())),
    )
}

pub(crate) fn repo(name: &str, branch: &str) -> Repository {
    Repository {
        source: "gitlab".to_string(),
        repo_owner: "platform".to_string(),
        repo_name: name.to_string(),
        branch: branch.to_string(),
        ..Default::default()
    }
}

pub(crate) fn scan_definition(name: &str, script: &str) -> ScanDefinition {
    ScanDefinition {
        name: name.to_string(),
        project: "shop".to_string(),
        image_id: "go".to_string(),
        script: script.to_string(),
        ..Default::default()
    }
}

/// Store holding one Go base image, one registry and the given definitions
pub(crate) fn store_with(definitions: Vec<ScanDefinition>) -> MemoryStore {
    let mut store = MemoryStore::new()
        .with_base_image(BaseImage {
            id: "go".to_string(),
            value: "golang:1.22".to_string(),
            ..Default::default()
        })
        .with_registry(Registry {
            id: "default".to_string(),
            reg_addr: "registry.example.com".to_string(),
            ..Default::default()
        })
        .with_ci_integration(CiServerIntegration {
            id: "ci".to_string(),
            url: "https://jenkins.example.com".to_string(),
            ..Default::default()
        })
        .with_quality_integration(QualityServerIntegration {
            id: "sonar".to_string(),
            server_address: "https://sonar.example.com".to_string(),
            token: "squ_token".to_string(),
        });
    for definition in definitions {
        store = store.with_scan_definition(definition);
    }
    store
}

pub(crate) fn parameter(name: &str, default: &str, param_type: &str) -> JobParameter {
    JobParameter {
        name: name.to_string(),
        default_value: serde_json::Value::String(default.to_string()),
        param_type: param_type.to_string(),
        choices: vec![],
    }
}

/// Canned reply of the fake CI server for one job
#[derive(Clone)]
struct Reply {
    delay: Duration,
    outcome: Result<Vec<JobParameter>, String>,
}

/// CI server answering from canned replies; doubles as its own connector
#[derive(Clone, Default)]
pub(crate) struct FakeCiServer {
    replies: HashMap<String, Reply>,
    completed: Arc<AtomicUsize>,
}

impl FakeCiServer {
    pub(crate) fn with_job(mut self, name: &str, parameters: Vec<JobParameter>) -> Self {
        self.replies.insert(
            name.to_string(),
            Reply {
                delay: Duration::ZERO,
                outcome: Ok(parameters),
            },
        );
        self
    }

    pub(crate) fn with_slow_job(
        mut self,
        name: &str,
        delay: Duration,
        parameters: Vec<JobParameter>,
    ) -> Self {
        self.replies.insert(
            name.to_string(),
            Reply {
                delay,
                outcome: Ok(parameters),
            },
        );
        self
    }

    pub(crate) fn with_failing_job(mut self, name: &str, message: &str) -> Self {
        self.replies.insert(
            name.to_string(),
            Reply {
                delay: Duration::ZERO,
                outcome: Err(message.to_string()),
            },
        );
        self
    }

    /// Number of lookups that ran to completion
    pub(crate) fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CiServerClient for FakeCiServer {
    async fn get_job_parameters(&self, job_name: &str) -> sluice_client::Result<Vec<JobParameter>> {
        let reply = self
            .replies
            .get(job_name)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("Jenkins job {}", job_name)))?;
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        reply
            .outcome
            .map_err(|message| ClientError::api_error(500, message))
    }
}

impl CiServerConnector for FakeCiServer {
    fn connect(
        &self,
        _integration: &CiServerIntegration,
    ) -> sluice_client::Result<Arc<dyn CiServerClient>> {
        Ok(Arc::new(self.clone()))
    }
}

/// Quality-server accessor that never resolves a link
pub(crate) struct BrokenAccessor;

impl QualityServerAccessor for BrokenAccessor {
    fn result_url(
        &self,
        server_address: &str,
        _project_key: &str,
    ) -> sluice_client::Result<String> {
        Err(ClientError::InvalidUrl(server_address.to_string()))
    }
}

/// Store whose backend is unreachable
pub(crate) struct UnavailableStore;

#[async_trait]
impl SpecStore for UnavailableStore {
    async fn find_scan_definition(
        &self,
        _project: &str,
        _name: &str,
    ) -> StoreResult<ScanDefinition> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn find_base_image(&self, _id: &str) -> StoreResult<BaseImage> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn list_registries(&self) -> StoreResult<Vec<Registry>> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn find_ci_integration(&self, _id: &str) -> StoreResult<CiServerIntegration> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn find_quality_integration(&self, _id: &str) -> StoreResult<QualityServerIntegration> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}
