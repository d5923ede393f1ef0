use axum::Json;
use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct Status {
    message: &'static str,
    status: &'static str,
}

pub async fn index() -> Json<Status> {
    Json(Status {
        message: "Campus Resource Allocation API",
        status: "running",
    })
}
