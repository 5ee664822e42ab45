//! HTTP gateway (Axum) over the job lifecycle and report lookups.
//!
//! This module is primarily used by the `gapcheck` server binary.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;


use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::{ERROR_KIND_HEADER, ErrorResponse, GatewayError};
pub use handler::{
    control_result_handler, controls_handler, delete_job_handler, digest_handler,
    evaluate_handler, evaluate_single_handler, framework_results_handler,
    framework_structure_handler, frameworks_handler, job_status_handler, results_handler,
    summary_handler, upload_handler,
};
pub use state::HandlerState;

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub fn create_router_with_state(state: HandlerState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/api/frameworks", get(frameworks_handler))
        .route("/api/frameworks/{framework}", get(framework_structure_handler))
        .route("/api/controls/{framework}", get(controls_handler))
        .route(
            "/api/upload",
            post(upload_handler).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/evaluate", post(evaluate_handler))
        .route("/api/evaluate-single", post(evaluate_single_handler))
        .route(
            "/api/jobs/{job_id}",
            get(job_status_handler).delete(delete_job_handler),
        )
        .route("/api/results/{job_id}", get(results_handler))
        .route("/api/results/{job_id}/summary", get(summary_handler))
        .route("/api/results/{job_id}/digest", get(digest_handler))
        .route(
            "/api/results/{job_id}/framework/{framework}",
            get(framework_results_handler),
        )
        .route(
            "/api/results/{job_id}/control/{framework}/{control_id}",
            get(control_result_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// `llm` or `mock`.
    pub evaluator: String,
    pub frameworks: usize,
}

#[tracing::instrument(skip(state))]
pub async fn health_handler(State(state): State<HandlerState>) -> Json<HealthResponse> {
    let evaluator = if state.analyzer.evaluator_available() {
        "llm"
    } else {
        "mock"
    };
    Json(HealthResponse {
        status: "ok".to_string(),
        evaluator: evaluator.to_string(),
        frameworks: state.repository.frameworks().len(),
    })
}
