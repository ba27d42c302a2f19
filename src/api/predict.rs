//! Schema introspection and prediction endpoints

use axum::extract::State;
use tracing::debug;

use super::state::AppState;
use super::types::{ApiError, ColumnsResponse, Json, PredictRequest, PredictResponse};

/// Raw column names the model expects, in training order
pub async fn columns(State(state): State<AppState>) -> Result<Json<ColumnsResponse>, ApiError> {
    let columns = state.prediction_service.describe_schema().await?;
    Ok(Json(ColumnsResponse::from(columns)))
}

pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    let features = request.into_features();
    debug!(supplied = features.len(), "Predict request");

    let prediction = state.prediction_service.predict(&features).await?;
    Ok(Json(PredictResponse { prediction }))
}
