use axum::extract::State;
use axum::Json;
use campus_allocation_engine::{seed_sample_data, Outcome};

use crate::error::AppError;
use crate::response::ApiResponse;
use crate::AppState;

pub async fn initialize_data(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Outcome>>>, AppError> {
    let outcomes = state.with_engine(seed_sample_data)??;
    Ok(Json(
        ApiResponse::data(outcomes).with_message("Sample data initialized successfully"),
    ))
}

/// Starts over with empty pools and the sample requests.
pub async fn reset_data(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Outcome>>>, AppError> {
    let outcomes = state.with_engine(|engine| {
        engine.reset();
        seed_sample_data(engine)
    })??;
    Ok(Json(
        ApiResponse::data(outcomes).with_message("Data reset successfully"),
    ))
}
