//! Liveness banner and model health endpoints

use axum::{extract::State, response::IntoResponse};

use super::state::AppState;
use super::types::{HealthResponse, Json, RootResponse};

pub const BANNER: &str = "House Price Predictor API is running";

pub async fn root() -> impl IntoResponse {
    Json(RootResponse {
        message: BANNER.to_string(),
    })
}

/// Model status; always 200 once the server is up
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let health = state.prediction_service.health().await;

    Json(HealthResponse {
        ok: true,
        model_loaded: health.model_loaded,
        has_prep: health.has_preprocessing,
        n_raw_columns_expected: health.expected_column_count,
    })
}
