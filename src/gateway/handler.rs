use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::controls::FrameworkOutline;
use crate::document::{ALLOWED_EXTENSIONS, document_stats, is_allowed_upload};
use crate::evaluator::ControlEvaluation;
use crate::gateway::error::GatewayError;
use crate::gateway::payload::{
    ControlSearchResponse, ControlsQuery, ControlsResponse, DeleteResponse, DigestResponse,
    EvaluateRequest,
    EvaluateResponse, EvaluateSingleRequest, FrameworksResponse, JobView, SummaryResponse,
    UploadQuery, UploadResponse,
};
use crate::gateway::state::HandlerState;
use crate::jobs::{EvaluationStart, JobStatus};
use crate::report::{AnalysisResults, FrameworkResult, digest};

/// Search results returned when `top_k` is not given.
const DEFAULT_SEARCH_TOP_K: usize = 5;

#[instrument(skip(state))]
pub async fn frameworks_handler(State(state): State<HandlerState>) -> Json<FrameworksResponse> {
    Json(FrameworksResponse {
        frameworks: state.repository.frameworks(),
        evaluator_available: state.analyzer.evaluator_available(),
    })
}

#[instrument(skip(state))]
pub async fn framework_structure_handler(
    State(state): State<HandlerState>,
    Path(framework): Path<String>,
) -> Result<Json<FrameworkOutline>, GatewayError> {
    Ok(Json(state.repository.framework_structure(&framework).await?))
}

/// Lists a framework's controls, or ranks them against `q`.
#[instrument(skip(state))]
pub async fn controls_handler(
    State(state): State<HandlerState>,
    Path(framework): Path<String>,
    Query(query): Query<ControlsQuery>,
) -> Result<Response, GatewayError> {
    match query.q.filter(|q| !q.trim().is_empty()) {
        Some(q) => {
            let top_k = query.top_k.unwrap_or(DEFAULT_SEARCH_TOP_K);
            let results = state.repository.search(&q, &framework, top_k).await?;
            Ok(Json(ControlSearchResponse {
                framework,
                query: q,
                results,
            })
            .into_response())
        }
        None => {
            let controls = state.repository.list_controls(&framework).await?;
            Ok(Json(ControlsResponse {
                framework,
                total: controls.len(),
                controls,
            })
            .into_response())
        }
    }
}

/// Stores the raw body as a document and registers a job for it.
#[instrument(skip(state, body), fields(bytes = body.len()))]
pub async fn upload_handler(
    State(state): State<HandlerState>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<UploadResponse>, GatewayError> {
    let filename = base_filename(&query.filename)
        .ok_or_else(|| GatewayError::InvalidRequest("filename is required".to_string()))?;
    if !is_allowed_upload(&filename) {
        return Err(GatewayError::InvalidRequest(format!(
            "unsupported file type '{filename}', allowed: {}",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    if body.is_empty() {
        return Err(GatewayError::InvalidRequest("empty upload".to_string()));
    }

    let stored = state
        .upload_dir
        .join(format!("{}_{}", Uuid::new_v4(), filename));
    tokio::fs::write(&stored, &body)
        .await
        .map_err(|e| GatewayError::InternalError(format!("failed to store upload: {e}")))?;

    let text = match state.documents.extract_text(&stored).await {
        Ok(text) => text,
        Err(e) => {
            if let Err(remove_err) = tokio::fs::remove_file(&stored).await {
                warn!(path = %stored.display(), error = %remove_err, "Failed to remove rejected upload");
            }
            return Err(GatewayError::InvalidRequest(format!(
                "failed to extract text: {e}"
            )));
        }
    };

    let job = state
        .jobs
        .register_upload(filename, stored, document_stats(&text));
    Ok(Json(UploadResponse::from(&job)))
}

/// Keeps only the final path component of a client-supplied name.
fn base_filename(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    (!base.is_empty() && base != "." && base != "..").then(|| base.to_string())
}

#[instrument(skip(state, request), fields(job_id = %request.job_id))]
pub async fn evaluate_handler(
    State(state): State<HandlerState>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>, GatewayError> {
    let start = state
        .jobs
        .start_evaluation(&request.job_id, &request.frameworks, request.max_controls)
        .await?;

    let response = match start {
        EvaluationStart::Started { frameworks } => EvaluateResponse {
            job_id: request.job_id,
            status: JobStatus::Processing,
            frameworks,
            message: "Evaluation started".to_string(),
        },
        EvaluationStart::AlreadyCompleted => EvaluateResponse {
            job_id: request.job_id,
            status: JobStatus::Completed,
            frameworks: Vec::new(),
            message: "Evaluation already completed".to_string(),
        },
    };
    Ok(Json(response))
}

#[instrument(skip(state))]
pub async fn job_status_handler(
    State(state): State<HandlerState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobView>, GatewayError> {
    Ok(Json(state.jobs.get_job(&job_id).await?.into()))
}

#[instrument(skip(state))]
pub async fn delete_job_handler(
    State(state): State<HandlerState>,
    Path(job_id): Path<String>,
) -> Result<Json<DeleteResponse>, GatewayError> {
    state.jobs.delete_job(&job_id).await?;
    Ok(Json(DeleteResponse {
        job_id,
        deleted: true,
    }))
}

/// Results of a completed job. Anything else is not ready.
async fn completed_results(
    state: &HandlerState,
    job_id: &str,
) -> Result<AnalysisResults, GatewayError> {
    let job = state.jobs.get_job(job_id).await?;
    if job.status != JobStatus::Completed {
        return Err(GatewayError::ResultsNotReady(format!(
            "job '{job_id}' is {}",
            job.status
        )));
    }
    job.results.ok_or_else(|| {
        GatewayError::InternalError(format!("completed job '{job_id}' has no results"))
    })
}

#[instrument(skip(state))]
pub async fn results_handler(
    State(state): State<HandlerState>,
    Path(job_id): Path<String>,
) -> Result<Json<AnalysisResults>, GatewayError> {
    Ok(Json(completed_results(&state, &job_id).await?))
}

#[instrument(skip(state))]
pub async fn summary_handler(
    State(state): State<HandlerState>,
    Path(job_id): Path<String>,
) -> Result<Json<SummaryResponse>, GatewayError> {
    let results = completed_results(&state, &job_id).await?;
    Ok(Json(SummaryResponse {
        job_id,
        document_info: results.document_info,
        summary: results.summary,
    }))
}

#[instrument(skip(state))]
pub async fn digest_handler(
    State(state): State<HandlerState>,
    Path(job_id): Path<String>,
) -> Result<Json<DigestResponse>, GatewayError> {
    let results = completed_results(&state, &job_id).await?;
    Ok(Json(DigestResponse {
        digest: digest(&results),
        filename: results.document_info.filename,
        job_id,
    }))
}

#[instrument(skip(state))]
pub async fn framework_results_handler(
    State(state): State<HandlerState>,
    Path((job_id, framework)): Path<(String, String)>,
) -> Result<Json<FrameworkResult>, GatewayError> {
    let results = completed_results(&state, &job_id).await?;
    results
        .frameworks
        .into_iter()
        .find(|f| f.framework == framework)
        .map(Json)
        .ok_or_else(|| {
            GatewayError::NotFound(format!("framework '{framework}' not in job '{job_id}'"))
        })
}

#[instrument(skip(state))]
pub async fn control_result_handler(
    State(state): State<HandlerState>,
    Path((job_id, framework, control_id)): Path<(String, String, String)>,
) -> Result<Json<ControlEvaluation>, GatewayError> {
    let results = completed_results(&state, &job_id).await?;
    let framework_result = results
        .frameworks
        .into_iter()
        .find(|f| f.framework == framework)
        .ok_or_else(|| {
            GatewayError::NotFound(format!("framework '{framework}' not in job '{job_id}'"))
        })?;
    framework_result
        .controls
        .into_iter()
        .find(|c| c.control_id == control_id)
        .map(Json)
        .ok_or_else(|| {
            GatewayError::NotFound(format!("control '{control_id}' not in {framework}"))
        })
}

/// Scores one control synchronously. Needs a real evaluator.
#[instrument(skip(state, request), fields(framework = %request.framework, control_id = %request.control_id))]
pub async fn evaluate_single_handler(
    State(state): State<HandlerState>,
    Json(request): Json<EvaluateSingleRequest>,
) -> Result<Json<ControlEvaluation>, GatewayError> {
    if !state.analyzer.evaluator_available() {
        return Err(GatewayError::EvaluatorUnavailable(
            "set GROQ_API_KEY to enable single-control evaluation".to_string(),
        ));
    }
    if request.document_text.trim().is_empty() {
        return Err(GatewayError::InvalidRequest(
            "document_text must not be empty".to_string(),
        ));
    }

    let evaluation = state
        .analyzer
        .analyze_single_control(&request.document_text, &request.framework, &request.control_id)
        .await?;
    info!(score = evaluation.final_score, "Single control evaluated");
    Ok(Json(evaluation))
}
