//! Lifecycle context
//!
//! Everything a job variant consults besides its own spec: the parent
//! workflow and the external collaborators.

use sluice_client::{CiServerConnector, QualityServerAccessor};
use sluice_core::domain::workflow::Workflow;
use std::sync::Arc;

use crate::config::CompilerConfig;
use crate::repository::SpecStore;

/// External collaborators shared by every job of every workflow
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn SpecStore>,
    pub ci: Arc<dyn CiServerConnector>,
    pub quality: Arc<dyn QualityServerAccessor>,
    pub config: Arc<CompilerConfig>,
}

impl Services {
    pub fn new(
        store: Arc<dyn SpecStore>,
        ci: Arc<dyn CiServerConnector>,
        quality: Arc<dyn QualityServerAccessor>,
        config: CompilerConfig,
    ) -> Self {
        Self {
            store,
            ci,
            quality,
            config: Arc::new(config),
        }
    }
}

/// Context one job variant runs its lifecycle in
#[derive(Clone)]
pub struct JobContext {
    pub workflow: Arc<Workflow>,
    pub services: Services,
}

impl JobContext {
    pub fn new(workflow: Workflow, services: Services) -> Self {
        Self {
            workflow: Arc::new(workflow),
            services,
        }
    }
}
