use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::{SubscriberInitExt as _, TryInitError};
use tracing_subscriber::{EnvFilter, Layer as _};

const DEFAULT_LOG_LEVEL: &str =
    "info,campus_allocation_engine=debug,campus_allocation_backend=debug,hyper=info,tower_http=debug";

#[derive(thiserror::Error, Debug)]
pub enum TelemetryError {
    #[error("a global tracing subscriber is already installed: {0}")]
    TryInit(#[from] TryInitError),
    #[cfg(feature = "otlp")]
    #[error("trace exporter error: {0}")]
    Trace(#[from] opentelemetry::trace::TraceError),
}

/// Keeps exporters alive. Dropping it flushes pending spans.
#[must_use]
#[derive(Debug)]
pub struct TelemetryGuard {
    _private: (),
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        #[cfg(feature = "otlp")]
        opentelemetry::global::shutdown_tracer_provider();
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_LEVEL.into())
}

/// Installs the global subscriber: human readable logs on stdout filtered by
/// `RUST_LOG`, plus span export over OTLP when built with the `otlp`
/// feature.
pub fn setup_telemetry() -> Result<TelemetryGuard, TelemetryError> {
    let stdout_log = tracing_subscriber::fmt::layer().with_filter(env_filter());
    let registry = tracing_subscriber::registry().with(stdout_log);

    #[cfg(feature = "otlp")]
    let registry = registry.with(otlp::layer()?.with_filter(env_filter()));

    registry.try_init()?;
    Ok(TelemetryGuard { _private: () })
}

#[cfg(feature = "otlp")]
mod otlp {
    use opentelemetry::trace::TraceError;
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::WithExportConfig as _;
    use opentelemetry_sdk::trace::Tracer;
    use opentelemetry_sdk::Resource;
    use tracing::Subscriber;
    use tracing_opentelemetry::OpenTelemetryLayer;
    use tracing_subscriber::registry::LookupSpan;

    const DEFAULT_ENDPOINT: &str = "http://localhost:4317";

    pub fn layer<S>() -> Result<OpenTelemetryLayer<S, Tracer>, TraceError>
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_owned());
        let resource = Resource::new(vec![KeyValue::new(
            opentelemetry_semantic_conventions::resource::SERVICE_NAME,
            "campus-allocation",
        )]);

        let tracer = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(
                opentelemetry_otlp::new_exporter()
                    .tonic()
                    .with_endpoint(endpoint),
            )
            .with_trace_config(opentelemetry_sdk::trace::config().with_resource(resource))
            .install_batch(opentelemetry_sdk::runtime::Tokio)?;

        Ok(tracing_opentelemetry::layer().with_tracer(tracer))
    }
}
