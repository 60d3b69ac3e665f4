//! HTTP/WebSocket server setup and routing

use crate::registry::SessionRegistry;
use crate::store::MitplanStore;
use crate::{api, gateway};
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use mitplan_common::Result;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared application context passed to all handlers
///
/// Both members are injected, explicitly owned objects whose lifecycle is
/// tied to server start/stop; there are no process-wide singletons.
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<MitplanStore>,
    pub registry: Arc<SessionRegistry>,
}

impl AppContext {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            store: Arc::new(MitplanStore::new(db)),
            registry: Arc::new(SessionRegistry::new()),
        }
    }
}

/// Build the application router
pub fn create_router(ctx: AppContext, frontend_origin: Option<&str>) -> Router {
    Router::new()
        .route("/health", get(api::health_check))
        .route("/status", get(api::status))
        .route("/api/mitplans", post(api::create_mitplan))
        .route("/api/mitplans/:id/save", post(api::save_mitplan))
        .route("/ws", get(gateway::ws_handler))
        .layer(cors_layer(frontend_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// CORS policy: locked to the configured frontend origin with credentials,
/// permissive when no origin is configured (development)
fn cors_layer(frontend_origin: Option<&str>) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::DELETE];
    match frontend_origin.and_then(|origin| match origin.parse::<HeaderValue>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("invalid frontend origin {origin:?}, falling back to permissive CORS");
            None
        }
    }) {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any),
    }
}

/// Start the server and serve until shutdown
pub async fn run(
    bind_addr: &str,
    db: SqlitePool,
    frontend_origin: Option<&str>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let ctx = AppContext::new(db);
    let app = create_router(ctx, frontend_origin);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("mitplan server listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
