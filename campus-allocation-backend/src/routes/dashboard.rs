use axum::extract::State;
use axum::Json;
use campus_allocation_engine::DashboardSnapshot;

use crate::error::AppError;
use crate::response::ApiResponse;
use crate::AppState;

pub async fn dashboard(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardSnapshot>>, AppError> {
    let snapshot = state.with_engine(|engine| engine.dashboard_snapshot())?;
    Ok(Json(ApiResponse::data(snapshot)))
}
