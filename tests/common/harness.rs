use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use gapcheck::{
    CascadeEvaluator, ComplianceContext, Config, ControlRepository, FileJobStore, JobStore,
    RetryPolicy, ScriptedCompletion, StaticControlRepository,
};
use gapcheck::gateway::{HandlerState, create_router_with_state};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::{NCA_JSONL, NIST_JSONL};

#[derive(Default)]
pub struct TestServerConfig {
    /// Staged evaluator backed by a script. `None` runs in mock mode.
    pub completion: Option<Arc<ScriptedCompletion>>,
    /// Reuse an existing data root instead of a fresh temp dir.
    pub data_root: Option<PathBuf>,
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub context: ComplianceContext,
    handle: JoinHandle<()>,
    root: Option<TempDir>,
}

impl TestServer {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn job_dir(&self) -> &Path {
        &self.context.config.job_dir
    }

    pub fn upload_dir(&self) -> &Path {
        &self.context.config.upload_dir
    }

    /// Stops serving, flushes job records and keeps the temp dir alive.
    pub async fn stop(self) -> Option<TempDir> {
        self.handle.abort();
        self.context.shutdown().await;
        self.root
    }
}

/// Creates the frameworks directory under `root` with the fixture frameworks.
pub async fn write_frameworks(root: &Path) -> anyhow::Result<()> {
    let dir = root.join("frameworks");
    tokio::fs::create_dir_all(&dir).await?;
    tokio::fs::write(dir.join("nca_en.jsonl"), NCA_JSONL).await?;
    tokio::fs::write(dir.join("nist_en.jsonl"), NIST_JSONL).await?;
    Ok(())
}

pub fn config_for(root: &Path) -> Config {
    Config {
        port: 0,
        frameworks_dir: root.join("frameworks"),
        upload_dir: root.join("uploads"),
        job_dir: root.join("jobs"),
        control_delay: Duration::ZERO,
        force_mock_evaluator: true,
        ..Config::default()
    }
}

pub async fn spawn_test_server(config: TestServerConfig) -> anyhow::Result<TestServer> {
    let (root, owned) = match config.data_root {
        Some(path) => (path, None),
        None => {
            let dir = TempDir::new()?;
            (dir.path().to_path_buf(), Some(dir))
        }
    };
    if !root.join("frameworks").exists() {
        write_frameworks(&root).await?;
    }
    let app_config = config_for(&root);

    let context = match config.completion {
        None => ComplianceContext::build(app_config).await?,
        Some(completion) => {
            tokio::fs::create_dir_all(&app_config.upload_dir).await?;
            let repository: Arc<dyn ControlRepository> =
                Arc::new(StaticControlRepository::load_dir(&app_config.frameworks_dir).await?);
            let evaluator = Arc::new(CascadeEvaluator::new(
                completion,
                RetryPolicy::no_retry(),
                None,
            ));
            let store: Arc<dyn JobStore> =
                Arc::new(FileJobStore::open(&app_config.job_dir).await?);
            let context = ComplianceContext::from_parts(app_config, repository, evaluator, store);
            context.jobs.restore().await?;
            context
        }
    };

    let app = create_router_with_state(HandlerState::from_context(&context));
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(TestServer {
        addr,
        context,
        handle,
        root: owned,
    })
}
