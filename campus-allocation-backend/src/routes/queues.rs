use alloc::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use campus_allocation_engine::{Grant, QueueListing, ResourceKind};
use serde::Deserialize;

use crate::error::AppError;
use crate::response::ApiResponse;
use crate::AppState;

pub async fn queues(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<BTreeMap<ResourceKind, QueueListing>>>, AppError> {
    let listing = state.with_engine(|engine| engine.queue_listing())?;
    let by_type = listing
        .into_iter()
        .map(|queue| (queue.queue_type, queue))
        .collect();
    Ok(Json(ApiResponse::data(by_type)))
}

#[derive(Deserialize, Debug)]
pub struct AllocateNextPayload {
    pub resource_type: Option<String>,
}

pub async fn allocate_next(
    State(state): State<AppState>,
    payload: Result<Json<AllocateNextPayload>, JsonRejection>,
) -> Result<Json<ApiResponse<Option<Grant>>>, AppError> {
    let Json(payload) = payload?;
    let kind = payload
        .resource_type
        .filter(|value| !value.trim().is_empty())
        .ok_or(AppError::MissingResourceType)?
        .parse::<ResourceKind>()?;
    let grant = state.with_engine(|engine| engine.drain_queue(kind))?;
    Ok(Json(
        ApiResponse::data(grant).with_message("Allocation process triggered"),
    ))
}
