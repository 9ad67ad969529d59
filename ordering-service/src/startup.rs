use crate::config::OrderingConfig;
use crate::handlers;
use crate::services::{
    ClientLookup, InMemoryDirectory, InMemoryOrderStore, OrderLifecycleService, OrderStore,
    ProductLookup, RestaurantLookup,
};
use axum::{
    extract::Request,
    middleware::from_fn,
    routing::{get, patch, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::tracing::{request_id_middleware, REQUEST_ID_HEADER};
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub lifecycle: OrderLifecycleService,
}

impl AppState {
    /// State over a single directory that answers every existence lookup.
    pub fn new<D>(orders: Arc<dyn OrderStore>, directory: Arc<D>) -> Self
    where
        D: RestaurantLookup + ClientLookup + ProductLookup + 'static,
    {
        Self {
            lifecycle: OrderLifecycleService::new(
                orders,
                directory.clone(),
                directory.clone(),
                directory,
            ),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/orders", post(handlers::create_order))
        .route(
            "/orders/:order_id",
            get(handlers::get_order).delete(handlers::delete_order),
        )
        .route(
            "/orders/:order_id/status",
            patch(handlers::update_order_status),
        )
        .route(
            "/orders/client/:client_id",
            get(handlers::list_client_orders),
        )
        .route(
            "/orders/restaurant/:restaurant_id",
            get(handlers::list_restaurant_orders),
        )
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default();
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id,
                    user_id = tracing::field::Empty,
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

pub struct Application {
    port: u16,
    server: Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>>,
}

impl Application {
    pub async fn build(config: OrderingConfig) -> Result<Self, AppError> {
        let directory = match &config.seed_path {
            Some(path) => InMemoryDirectory::from_file(path).map_err(|e| {
                tracing::error!("Failed to load seed data from {}: {}", path, e);
                AppError::ConfigError(e)
            })?,
            None => {
                tracing::warn!("No SEED_PATH configured, starting with an empty directory");
                InMemoryDirectory::new()
            }
        };

        let state = AppState::new(Arc::new(InMemoryOrderStore::new()), Arc::new(directory));
        let app = build_router(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            service = %config.service_name,
            version = %config.service_version,
            environment = %config.environment,
            "Listening on {}",
            port
        );

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

        Ok(Self {
            port,
            server: Box::pin(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
