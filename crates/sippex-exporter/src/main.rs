//! sippex exporter
//!
//! - Tails SIPp `-trace_stat` files (one task per file)
//! - Serves `GET /metrics`: type declarations, then every queued sample
//! - Ctrl-C: stop accepting scrapes, stop readers, exit

use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use sippex_core::error::{Result, SippexError};
use sippex_exporter::{app_state::AppState, config, router};

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.code().as_str(), error = %e, "sippex-exporter failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cfg_path = std::env::var(config::CONFIG_PATH_ENV)
        .unwrap_or_else(|_| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::load(&cfg_path, |k| std::env::var(k).ok())?;
    let listen = cfg.exporter.listen_addr()?;

    // Every source must open before the listener binds.
    let (state, readers) = AppState::from_config(&cfg).await?;
    let handles: Vec<_> = readers.into_iter().map(|r| r.spawn()).collect();

    let app = router::build_router(state);

    tracing::info!(%listen, readers = handles.len(), "sippex-exporter starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| SippexError::io(listen.to_string(), e))?;

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| SippexError::Internal(format!("server failed: {e}")));

    for h in handles {
        h.stop().await;
    }
    tracing::info!("sippex-exporter stopped");

    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "ctrl-c handler failed");
        // run until killed
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
