use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub mod client;
pub mod config;
pub mod domain;
pub mod errors;
pub mod http;
pub mod logging;
pub mod mcp;
pub mod store;

use mcp::session::SessionRegistry;
use store::RecordStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self {
            store,
            sessions: Arc::new(SessionRegistry::default()),
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(http::handlers::health))
        .route("/.well-known/mcp", get(http::handlers::discovery))
        .route(
            http::MCP_PATH,
            post(http::handlers::mcp_endpoint)
                .get(http::handlers::event_stream)
                .delete(http::handlers::close_session),
        )
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}
