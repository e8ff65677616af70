pub mod model;

use axum::{
    Json, Router,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};

use crate::model::AnalyzerLimits;

#[derive(Clone)]
pub struct AppState {
    pub limits: AnalyzerLimits,
}

/// API routes, without the outer middleware stack.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/analyze", post(model::analyze_stream))
        .route("/analyze/buffered", post(model::analyze_buffered))
        .with_state(state)
}

pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(serde_json::json!
        ({
            "status": "ok"
        })),
    )
}
