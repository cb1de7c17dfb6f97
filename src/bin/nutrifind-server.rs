// ABOUTME: Server binary wiring configuration, logging, storage and the vision client into axum
// ABOUTME: Serves the NutriFind routes until Ctrl+C or SIGTERM, purging expired sessions in the background
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFind

//! # `NutriFind` Server Binary
//!
//! Loads configuration from the environment, opens the credential store and
//! serves the application until a shutdown signal arrives.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use nutrifind::{
    config::ServerConfig,
    database::{Database, DatabaseProvider},
    llm::{GeminiVisionClient, VisionAnalyzer},
    logging,
    resources::ServerResources,
    routes::build_router,
    session::SessionStore,
};
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// How often expired sessions are swept
const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Parser)]
#[command(name = "nutrifind-server")]
#[command(about = "NutriFind - food photo nutrition analysis")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    logging::init_from_env()?;
    info!("Starting NutriFind server");
    info!("{}", config.summary());

    let database = Database::new(&config.database.url).await?;
    info!(
        "Database initialized: {}",
        config.database.url.to_connection_string()
    );

    let analyzer = GeminiVisionClient::new(&config.gemini);
    info!("Vision client ready (model {})", analyzer.model());

    let config = Arc::new(config);
    let database: Arc<dyn DatabaseProvider> = Arc::new(database);
    let analyzer: Arc<dyn VisionAnalyzer> = Arc::new(analyzer);
    let resources = Arc::new(ServerResources::new(
        database,
        analyzer,
        Arc::clone(&config),
    ));

    spawn_session_purge(Arc::clone(&resources.sessions));

    let app = build_router(&resources);
    let addr: SocketAddr = format!("{}:{}", config.host, config.http_port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.host, config.http_port))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

fn spawn_session_purge(sessions: Arc<SessionStore>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let purged = sessions.purge_expired().await;
            if purged > 0 {
                debug!(purged, "Purged expired sessions");
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
