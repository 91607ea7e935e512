//! BatchLedger HTTP server entry point.
//!
//! # Responsibility
//! - Load configuration and start logging before anything else runs.
//! - Open the batch store once, serve requests, close the store on shutdown.

use batchledger_api::{construct_router, AppState};
use batchledger_core::db::open_db;
use batchledger_core::{core_version, init_logging, EchoMode};
use dotenv::dotenv;
use log::{info, warn};

mod config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    let config = config::Config::from_env()?;

    let log_dir = config.log_dir.to_string_lossy().into_owned();
    init_logging(&config.log_level, &log_dir, EchoMode::Stderr)?;

    let conn = open_db(&config.db_path)?;
    let state = AppState::new(conn);
    let app = construct_router(state.clone());

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        "event=server_start module=server status=ok addr={} db_path={} version={}",
        addr,
        config.db_path.display(),
        core_version()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    match state.into_connection() {
        Some(conn) => match conn.close() {
            Ok(()) => info!("event=server_stop module=server status=ok store=closed"),
            Err((_, err)) => warn!(
                "event=server_stop module=server status=error store=close_failed error={err}"
            ),
        },
        None => warn!("event=server_stop module=server status=ok store=still_shared"),
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("event=server_stop module=server status=error signal_error={err}");
        std::future::pending::<()>().await;
    }
    info!("event=server_stop module=server status=start reason=ctrl_c");
}
