use axum::extract::{Path, State};
use axum::Json;
use campus_allocation_engine::AllocationRow;

use crate::error::AppError;
use crate::response::ApiResponse;
use crate::AppState;

pub async fn allocations(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<AllocationRow>>>, AppError> {
    let rows = state.with_engine(|engine| engine.allocation_listing())?;
    Ok(Json(ApiResponse::data(rows)))
}

pub async fn deallocate(
    State(state): State<AppState>,
    Path(resource_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    if state.with_engine(|engine| engine.release_resource(&resource_id))? {
        Ok(Json(ApiResponse::message(
            "Resource deallocated successfully",
        )))
    } else {
        Err(AppError::ResourceNotAllocated(resource_id))
    }
}
