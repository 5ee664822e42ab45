//! Request and response bodies of the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analyzer::ProgressUpdate;
use crate::controls::{Control, FrameworkInfo, SearchHit};
use crate::jobs::{Job, JobStatus};
use crate::report::{DocumentInfo, ReportSummary, ScoreDigest};

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub filename: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub job_id: String,
    pub filename: String,
    pub status: JobStatus,
    pub char_count: usize,
    pub word_count: usize,
}

impl From<&Job> for UploadResponse {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id.clone(),
            filename: job.filename.clone(),
            status: job.status,
            char_count: job.char_count,
            word_count: job.word_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub job_id: String,
    /// Empty means every available framework.
    #[serde(default)]
    pub frameworks: Vec<String>,
    /// Caps the controls evaluated per framework.
    #[serde(default)]
    pub max_controls: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub frameworks: Vec<String>,
    pub message: String,
}

/// A job without its results, for polling.
#[derive(Debug, Serialize, Deserialize)]
pub struct JobView {
    pub job_id: String,
    pub status: JobStatus,
    pub filename: String,
    pub frameworks: Vec<String>,
    pub progress: Option<ProgressUpdate>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
}

impl From<Job> for JobView {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.id,
            status: job.status,
            filename: job.filename,
            frameworks: job.frameworks,
            progress: job.progress,
            error: job.error,
            created_at: job.created_at,
            started_at: job.started_at,
            completed_at: job.completed_at,
            failed_at: job.failed_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub job_id: String,
    pub deleted: bool,
}

#[derive(Debug, Serialize)]
pub struct FrameworksResponse {
    pub frameworks: Vec<FrameworkInfo>,
    pub evaluator_available: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ControlsQuery {
    /// Ranks controls by similarity to this text instead of listing them.
    pub q: Option<String>,
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ControlsResponse {
    pub framework: String,
    pub total: usize,
    pub controls: Vec<Control>,
}

#[derive(Debug, Serialize)]
pub struct ControlSearchResponse {
    pub framework: String,
    pub query: String,
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub job_id: String,
    pub document_info: DocumentInfo,
    pub summary: ReportSummary,
}

/// Weakest-first control listing of a completed job.
#[derive(Debug, Serialize, Deserialize)]
pub struct DigestResponse {
    pub job_id: String,
    pub filename: String,
    #[serde(flatten)]
    pub digest: ScoreDigest,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluateSingleRequest {
    pub document_text: String,
    pub framework: String,
    pub control_id: String,
}
