use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analyzer::ProgressUpdate;
use crate::document::DocumentStats;
use crate::report::AnalysisResults;

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Uploaded,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One evaluation run over one uploaded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    pub filename: String,
    pub file_path: PathBuf,
    pub char_count: usize,
    pub word_count: usize,
    #[serde(default)]
    pub frameworks: Vec<String>,
    #[serde(default)]
    pub progress: Option<ProgressUpdate>,
    /// Only set once the job is `completed`.
    #[serde(default)]
    pub results: Option<AnalysisResults>,
    #[serde(default)]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub failed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// A freshly uploaded document with a new random id.
    pub fn uploaded(filename: impl Into<String>, file_path: PathBuf, stats: DocumentStats) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            status: JobStatus::Uploaded,
            filename: filename.into(),
            file_path,
            char_count: stats.char_count,
            word_count: stats.word_count,
            frameworks: Vec::new(),
            progress: None,
            results: None,
            error: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            failed_at: None,
        }
    }

    pub fn is_processing(&self) -> bool {
        self.status == JobStatus::Processing
    }

    /// `uploaded` or `failed` to `processing`. Clears the traces of a previous failure.
    pub(crate) fn begin(&mut self, frameworks: Vec<String>) {
        self.status = JobStatus::Processing;
        self.frameworks = frameworks;
        self.progress = None;
        self.results = None;
        self.error = None;
        self.failed_at = None;
        self.started_at = Some(Utc::now());
    }

    pub(crate) fn record_progress(&mut self, update: ProgressUpdate) {
        self.progress = Some(update);
    }

    pub(crate) fn complete(&mut self, results: AnalysisResults) {
        self.results = Some(results);
        self.status = JobStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Keeps the last observed progress.
    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.error = Some(message.into());
        self.failed_at = Some(Utc::now());
    }
}
