use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use campus_allocation_config::ConfigError;
use campus_allocation_engine::AllocationError;
use campus_allocation_telemetry::TelemetryError;
use tracing::{error, warn};

use crate::response::ApiResponse;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Allocation(#[from] AllocationError),
    #[error("json error: {0}")]
    Json(#[from] JsonRejection),
    #[error("Missing required fields")]
    MissingFields,
    #[error("Resource type required")]
    MissingResourceType,
    #[error("Resource {0} not found or not allocated")]
    ResourceNotAllocated(String),
    #[error("the allocation engine lock was poisoned by a panicking request")]
    Poison,
    #[error("IO error: {0}")]
    File(#[from] std::io::Error),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
}

impl AppError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Json(rejection) => rejection.status(),
            Self::Allocation(_) | Self::MissingFields | Self::MissingResourceType => {
                StatusCode::BAD_REQUEST
            }
            Self::ResourceNotAllocated(_) => StatusCode::NOT_FOUND,
            Self::Poison | Self::File(_) | Self::Config(_) | Self::Telemetry(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{self}");
        } else {
            warn!(%status, "{self}");
        }
        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}
