pub mod health;
pub mod openapi;
pub mod schemas;
pub mod send_email;
pub mod verify;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::RelayConfig;
use crate::dispatch::Dispatcher;

use self::openapi::ApiDoc;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Provider selection and delivery.
    pub dispatcher: Arc<Dispatcher>,
    /// Configured listen port, reported by health.
    pub port: u16,
    /// Static asset directory (None when no site is served).
    pub static_dir: Option<PathBuf>,
    /// File under `static_dir` answered for `/`.
    pub index_file: String,
    /// Maximum accepted request body in bytes.
    pub body_limit_bytes: usize,
}

impl AppState {
    /// State for the given dispatcher with the server settings from `config`.
    pub fn new(dispatcher: Arc<Dispatcher>, config: &RelayConfig) -> Self {
        Self {
            dispatcher,
            port: config.server.port,
            static_dir: config.server.static_dir.clone(),
            index_file: config.server.index_file.clone(),
            body_limit_bytes: config.server.body_limit_bytes,
        }
    }

    /// State with default server settings, for tests and embedding.
    pub fn from_dispatcher(dispatcher: Dispatcher) -> Self {
        Self::new(Arc::new(dispatcher), &RelayConfig::default())
    }
}

/// Build the Axum router with the API routes, the OpenAPI document and the
/// optional static site.
pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/api/health", get(health::health))
        .route("/api/verifySMTP", get(verify::verify_smtp))
        .route(
            "/api/sendEmail",
            post(send_email::send_email).fallback(send_email::method_not_allowed),
        )
        .route(
            "/api/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        );

    if let Some(dir) = state.static_dir.as_ref() {
        if dir.is_dir() {
            let index = dir.join(&state.index_file);
            router = router
                .route_service("/", ServeFile::new(&index))
                .fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
        } else {
            tracing::warn!(
                path = %dir.display(),
                "static directory not found, site will not be served"
            );
        }
    }

    let body_limit = state.body_limit_bytes;
    router
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
