extern crate alloc;

pub mod error;
pub mod response;
pub mod routes;

use core::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::handler::Handler;
use axum::Router;
use campus_allocation_config::Config;
use campus_allocation_engine::{seed_sample_data, AllocationEngine, PoolSizes};
use error::AppError;
use routes::allocations::{allocations, deallocate};
use routes::dashboard::dashboard;
use routes::index::index;
use routes::queues::{allocate_next, queues};
use routes::resources::resources;
use routes::sample_data::{initialize_data, reset_data};
use routes::students::add_student;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// One engine per process. Every handler takes the lock once, so each
/// engine operation is atomic with respect to the others.
#[derive(Clone, Debug)]
pub struct AppState {
    engine: Arc<Mutex<AllocationEngine>>,
}

impl AppState {
    #[must_use]
    pub fn new(engine: AllocationEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn with_engine<T>(
        &self,
        operation: impl FnOnce(&mut AllocationEngine) -> T,
    ) -> Result<T, AppError> {
        let mut engine = self.engine.lock().map_err(|_| AppError::Poison)?;
        Ok(operation(&mut *engine))
    }
}

#[derive(Clone, Copy, Debug)]
enum Method {
    Get,
    Post,
}

#[derive(Default)]
struct ApiRouter {
    router: Router<AppState>,
}

impl ApiRouter {
    #[must_use]
    fn route<T: 'static, H: Handler<T, AppState>>(
        self,
        method: Method,
        path: &'static str,
        handler: H,
    ) -> Self {
        Self {
            router: self.router.route(
                path,
                match method {
                    Method::Get => axum::routing::get(handler),
                    Method::Post => axum::routing::post(handler),
                },
            ),
        }
    }

    fn finish(self) -> Router<AppState> {
        self.router
    }
}

pub fn app(state: AppState) -> Router {
    ApiRouter::default()
        .route(Method::Get, "/", index)
        .route(Method::Get, "/api/dashboard", dashboard)
        .route(Method::Post, "/api/add-student", add_student)
        .route(Method::Get, "/api/allocations", allocations)
        .route(Method::Get, "/api/queues", queues)
        .route(Method::Get, "/api/resources", resources)
        .route(Method::Post, "/api/deallocate/:resource_id", deallocate)
        .route(Method::Post, "/api/allocate-next", allocate_next)
        .route(Method::Post, "/api/initialize-data", initialize_data)
        .route(Method::Post, "/api/reset-data", reset_data)
        .finish()
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors())
                .layer(CatchPanicLayer::new()),
        )
}

/// The dashboard frontend is served from a different origin and posts json,
/// so every origin, method and header is allowed and preflights are answered
/// here.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn build_state(config: &Config) -> Result<AppState, AppError> {
    let mut engine = AllocationEngine::new(PoolSizes {
        pc: config.pools.pc,
        book: config.pools.book,
        seat: config.pools.seat,
    });
    if config.seed_sample_data {
        let outcomes = seed_sample_data(&mut engine)?;
        info!(requests = outcomes.len(), "seeded sample data");
    }
    Ok(AppState::new(engine))
}

/// Binds the listener and returns the bound address together with the
/// server future, which completes once `shutdown` resolves and in-flight
/// requests have finished.
pub async fn run_server(
    config: Config,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(SocketAddr, impl Future<Output = Result<(), AppError>>), AppError> {
    info!("starting up server...");
    let state = build_state(&config)?;
    let listener = TcpListener::bind(config.listen_address).await?;
    let address = listener.local_addr()?;
    info!(%address, "listening");

    let server = axum::serve(listener, app(state)).with_graceful_shutdown(shutdown);
    Ok((address, async move {
        server.await?;
        info!("server stopped");
        Ok(())
    }))
}

/// Resolves on ctrl-c or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            error!(%error, "failed to listen for ctrl-c");
            core::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                error!(%error, "failed to listen for SIGTERM");
                core::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = core::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}
