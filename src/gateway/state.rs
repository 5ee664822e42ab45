use std::path::PathBuf;
use std::sync::Arc;

use crate::analyzer::ComplianceAnalyzer;
use crate::context::ComplianceContext;
use crate::controls::ControlRepository;
use crate::document::DocumentService;
use crate::jobs::JobManager;

#[derive(Clone)]
pub struct HandlerState {
    pub repository: Arc<dyn ControlRepository>,

    pub documents: Arc<dyn DocumentService>,

    pub analyzer: Arc<ComplianceAnalyzer>,

    pub jobs: JobManager,

    /// Uploaded documents are written here.
    pub upload_dir: PathBuf,
}

impl HandlerState {
    pub fn from_context(context: &ComplianceContext) -> Self {
        Self {
            repository: Arc::clone(&context.repository),
            documents: Arc::clone(&context.documents),
            analyzer: Arc::clone(&context.analyzer),
            jobs: context.jobs.clone(),
            upload_dir: context.config.upload_dir.clone(),
        }
    }
}
