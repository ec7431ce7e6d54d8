use std::net::SocketAddr;

use axum::Router;
use common::admin_http::spawn_admin_server;
use common::utils::logging::init_logging;
use configs::AppConfig;
use dotenvy::dotenv;
use migration::{Migrator, MigratorTrait};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, auth::ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// File config when present, otherwise environment only.
fn load_config() -> Result<AppConfig, StartupError> {
    match AppConfig::load_and_validate() {
        Ok(cfg) => Ok(cfg),
        Err(file_err) => {
            let cfg = AppConfig::from_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
            warn!(err = %file_err, "config file unusable, using environment");
            Ok(cfg)
        }
    }
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

/// Public entry: connect, migrate, bootstrap the admin and serve HTTP.
pub async fn run() -> Result<(), StartupError> {
    dotenv().ok();
    let cfg = load_config()?;
    init_logging(cfg.logging.json);

    let db = models::db::connect_with_config(&cfg.database).await?;
    Migrator::up(&db, None).await.map_err(anyhow::Error::from)?;
    info!("migrations applied");

    let state = ServerState::new(db, &cfg)?;

    if let (Some(email), Some(password)) = (&cfg.auth.admin_email, &cfg.auth.admin_password) {
        state
            .auth
            .ensure_admin(email, password)
            .await
            .map_err(|e| StartupError::InvalidConfig(format!("admin bootstrap: {e}")))?;
    }

    if let Some(addr) = &cfg.server.admin_addr {
        spawn_admin_server(addr).await?;
    }

    let app: Router = routes::build_router(state, build_cors());

    let addr = bind_addr(&cfg)?;
    info!(%addr, payment_provider = ?cfg.payment.provider, "starting shiteni server");
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(anyhow::Error::from)?;
    axum::serve(listener, app).await.map_err(anyhow::Error::from)?;
    Ok(())
}
