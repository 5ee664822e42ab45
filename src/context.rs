//! Process-wide services, constructed once at startup and passed to the gateway.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::analyzer::{AnalyzerSettings, ComplianceAnalyzer};
use crate::config::Config;
use crate::controls::{ControlRepository, RepositoryError, StaticControlRepository};
use crate::document::{DocumentService, PlainTextDocuments};
use crate::evaluator::{Evaluator, build_evaluator};
use crate::jobs::{FileJobStore, JobError, JobManager, JobStore, StoreError};

#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Jobs(#[from] JobError),

    #[error("failed to create upload directory {path}: {source}")]
    UploadDir {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Repository, evaluator, documents and job table, shared by every request.
#[derive(Clone)]
pub struct ComplianceContext {
    pub config: Config,
    pub repository: Arc<dyn ControlRepository>,
    pub documents: Arc<dyn DocumentService>,
    pub analyzer: Arc<ComplianceAnalyzer>,
    pub jobs: JobManager,
}

impl ComplianceContext {
    /// Loads frameworks, picks the evaluator, opens the job store and restores its jobs.
    pub async fn build(config: Config) -> Result<Self, ContextError> {
        let repository = match StaticControlRepository::load_dir(&config.frameworks_dir).await {
            Ok(repo) => repo,
            Err(RepositoryError::DirectoryNotFound { path }) => {
                warn!(path = %path.display(), "Frameworks directory missing; no frameworks available");
                StaticControlRepository::new()
            }
            Err(e) => return Err(e.into()),
        };
        let repository: Arc<dyn ControlRepository> = Arc::new(repository);
        info!(frameworks = repository.frameworks().len(), "Control repository ready");

        tokio::fs::create_dir_all(&config.upload_dir)
            .await
            .map_err(|source| ContextError::UploadDir {
                path: config.upload_dir.clone(),
                source,
            })?;

        let evaluator = build_evaluator(&config);
        let store: Arc<dyn JobStore> = Arc::new(FileJobStore::open(&config.job_dir).await?);

        let context = Self::from_parts(config, repository, evaluator, store);
        context.jobs.restore().await?;
        Ok(context)
    }

    /// Wires already-built services. Requires a tokio runtime.
    pub fn from_parts(
        config: Config,
        repository: Arc<dyn ControlRepository>,
        evaluator: Arc<dyn Evaluator>,
        store: Arc<dyn JobStore>,
    ) -> Self {
        let documents: Arc<dyn DocumentService> = Arc::new(PlainTextDocuments);
        let analyzer = Arc::new(ComplianceAnalyzer::new(
            Arc::clone(&repository),
            evaluator,
            Arc::clone(&documents),
            AnalyzerSettings::from_config(&config),
        ));
        let jobs = JobManager::new(Arc::clone(&analyzer), store, config.job_retention);

        Self {
            config,
            repository,
            documents,
            analyzer,
            jobs,
        }
    }

    /// Stops background work and flushes pending job writes.
    pub async fn shutdown(&self) {
        self.jobs.shutdown().await;
        info!("Compliance context shut down");
    }
}
