mod config;

mod app;
mod db;
mod errors;
mod notes;
mod shared;
mod state;

use std::{net::SocketAddr, sync::Arc};

use app::AppParams;
pub use config::config;
pub use db::{init_db, DB};
pub use errors::{Error, Result};
use notes::SqliteNoteStore;
use shared::tracing::{add_tracing_layer, setup_tracing};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> errors::Result<()> {
    let config = config::init()?;

    setup_tracing(config.log_json);

    let conn = init_db().await?;

    let app = app::create(AppParams {
        store: Arc::new(SqliteNoteStore::new(conn)),
        router: notes::router,
    });
    let app = add_tracing_layer(app);

    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|e| Error::Unexpected(format!("bind {}:{}: {e}", config.host, config.port)))?;

    if let Ok(addr) = listener.local_addr() {
        tracing::info!("listening on http://{addr}");
    }

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Unexpected(e.to_string()))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        return;
    }
    tracing::info!("shutting down");
}
