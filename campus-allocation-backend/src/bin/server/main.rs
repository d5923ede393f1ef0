use campus_allocation_backend::error::AppError;
use campus_allocation_backend::{run_server, shutdown_signal};
use campus_allocation_config::get_config;
use campus_allocation_telemetry::setup_telemetry;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // avoid putting more code here as this is outside of all spans so doesn't get traced
    let _guard = setup_telemetry()?;
    let config = get_config()?;
    let (_address, server) = run_server(config, shutdown_signal()).await?;
    server.await
}
