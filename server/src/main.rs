use std::sync::Arc;

use anyhow::Context;
use todo_core::{MemoryStore, TodoStore};
use todo_server::{config::Config, telemetry, SqliteStore};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    telemetry::init(config.log_format);

    let store: Arc<dyn TodoStore> = match &config.database_url {
        Some(url) => Arc::new(
            SqliteStore::connect(url)
                .await
                .with_context(|| format!("failed to open database {url}"))?,
        ),
        None => {
            warn!("DATABASE_URL not set, todos will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");

    todo_server::run(listener, todo_server::router(store), shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
