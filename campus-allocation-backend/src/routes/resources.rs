use axum::extract::State;
use axum::Json;
use campus_allocation_engine::ResourceView;

use crate::error::AppError;
use crate::response::ApiResponse;
use crate::AppState;

pub async fn resources(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ResourceView>>>, AppError> {
    let resources = state.with_engine(|engine| engine.resources())?;
    Ok(Json(ApiResponse::data(resources)))
}
