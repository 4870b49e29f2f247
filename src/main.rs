use std::sync::Arc;

use cupcake_mcp::{build_app, config::Config, logging, store::RecordStore, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let config = Config::new()?;
    let store = RecordStore::load(&config.records_path)?;

    let bind_socket = config.bind_socket()?;
    let state = AppState::new(Arc::new(store));
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(bind_socket).await?;

    info!(
        bind_addr = %config.bind_addr,
        bind_port = config.bind_port,
        endpoint = %config.endpoint_url(),
        "server starting"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
