use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::analyzer::AnalysisError;
use crate::controls::RepositoryError;
use crate::document::DocumentError;
use crate::jobs::JobError;

/// Response header naming the error kind.
pub const ERROR_KIND_HEADER: &str = "x-gapcheck-error";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("results not ready: {0}")]
    ResultsNotReady(String),

    #[error("evaluator unavailable: {0}")]
    EvaluatorUnavailable(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            GatewayError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            GatewayError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            GatewayError::ResultsNotReady(_) => (StatusCode::BAD_REQUEST, "results_not_ready"),
            GatewayError::EvaluatorUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "evaluator_unavailable")
            }
            GatewayError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert(ERROR_KIND_HEADER, HeaderValue::from_static(kind));

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}

impl From<RepositoryError> for GatewayError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::FrameworkNotIndexed { .. } => GatewayError::NotFound(err.to_string()),
            other => GatewayError::InternalError(other.to_string()),
        }
    }
}

impl From<AnalysisError> for GatewayError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::FrameworkUnavailable { .. } | AnalysisError::ControlNotFound { .. } => {
                GatewayError::NotFound(err.to_string())
            }
            AnalysisError::Document(DocumentError::UnsupportedFormat { .. }) => {
                GatewayError::InvalidRequest(err.to_string())
            }
            AnalysisError::Document(other) => GatewayError::InternalError(other.to_string()),
            AnalysisError::Repository(other) => other.into(),
        }
    }
}

impl From<JobError> for GatewayError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::NotFound { .. } => GatewayError::NotFound(err.to_string()),
            JobError::AlreadyProcessing { .. } => GatewayError::Conflict(err.to_string()),
            JobError::Analysis(inner) => inner.into(),
            JobError::Store(inner) => GatewayError::InternalError(inner.to_string()),
        }
    }
}
