use std::process::ExitCode;

use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn main() -> ExitCode {
    // .env first so RUST_LOG and DATABASE_URL are visible to everything below
    dotenv().ok();
    let cfg = configs::AppConfig::load_and_validate().ok();
    common::utils::logging::init_logging(cfg.as_ref().is_some_and(|c| c.logging.json));
    info!(service = "shiteni", event = "logger_init", "tracing subscriber initialized");

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(service = "shiteni", event = "panic", %service_id, pid, message = %info, "unhandled panic occurred");
    }));

    // config.toml first, then TOKIO_WORKER_THREADS
    let worker_threads = match &cfg {
        Some(c) => c.server.worker_threads,
        None => std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()),
    };

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads {
        builder.worker_threads(w);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "shiteni", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "shiteni",
        event = "start",
        %service_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        "shiteni starting"
    );

    rt.block_on(async move {
        let server_task = tokio::spawn(server::run());
        tokio::select! {
            res = server_task => match res {
                Ok(Ok(())) => {
                    info!(service = "shiteni", event = "stop", %service_id, pid, "server stopped normally");
                    ExitCode::SUCCESS
                }
                Ok(Err(e)) => {
                    error!(service = "shiteni", event = "run_failed", error = %e, "server::run returned error");
                    ExitCode::FAILURE
                }
                Err(e) => {
                    error!(service = "shiteni", event = "task_join_error", error = %e, "server task join error");
                    ExitCode::FAILURE
                }
            },
            _ = tokio::signal::ctrl_c() => {
                // in-flight requests are dropped with the runtime
                info!(service = "shiteni", event = "shutdown_signal", %service_id, pid, "received Ctrl+C, shutting down");
                ExitCode::SUCCESS
            }
        }
    })
}
