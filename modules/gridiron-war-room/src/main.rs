use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gridiron_common::Config;
use gridiron_war_room::routes::{self, AppState};
use gridiron_war_room::{WarRoom, WarRoomDeps};

const DEFAULT_LOG_FILTER: &str = "gridiron=info,war_room=info";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    config.log_redacted();

    let deps = WarRoomDeps::from_config(&config)?;
    let state = Arc::new(AppState {
        war_room: WarRoom::new(deps),
    });

    let app = routes::router(state.clone());

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("Gridiron War Room starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await?;

    info!("Gridiron War Room stopped");
    Ok(())
}

/// Resolve on Ctrl-C and stop in-flight batches at the next record.
async fn shutdown_signal(state: Arc<AppState>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
    state.war_room.cancel();
}
