//! Operational endpoints under `/management`.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use carehub_core::core_version;
use log::warn;
use serde_json::json;

use crate::{headers::APPLICATION_NAME, state::AppState};

pub fn management_routes() -> Router<AppState> {
    Router::new()
        .route("/management/health", get(health_handler))
        .route("/management/info", get(info_handler))
}

pub async fn health_handler(State(state): State<AppState>) -> Response {
    match state.check().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "UP" }))).into_response(),
        Err(err) => {
            warn!("event=health_check module=api status=down error={err}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "DOWN" })),
            )
                .into_response()
        }
    }
}

pub async fn info_handler() -> impl IntoResponse {
    Json(json!({
        "name": APPLICATION_NAME,
        "version": core_version(),
    }))
}
