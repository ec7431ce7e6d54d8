//! Admin HTTP listener
//!
//! Exposes `/healthz` and `/metrics` on a separate address so scrapers do
//! not go through the authenticated public router.

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::metrics::encode_metrics;

async fn healthz() -> &'static str { "OK" }

pub fn admin_router() -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(|| async { encode_metrics() }))
}

/// Bind the admin listener and serve it on a background task.
pub async fn spawn_admin_server(addr: &str) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    info!(addr = %local, "admin server listening");
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, admin_router()).await {
            error!(err = %e, "admin server stopped");
        }
    });
    Ok(())
}
