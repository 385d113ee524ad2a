// API server entry point
// Binds the HTTP listener and serves the search/favorites/download API until
// ctrl-c or SIGTERM.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tubeplayer::server::{build_router, AppState};
use tubeplayer::server::favorites::FavoritesStore;
use tubeplayer::youtube::service::YouTubeService;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let favorites_path = env::var("TUBEPLAYER_FAVORITES")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/favorites.json"));

    let state = AppState {
        youtube: Arc::new(YouTubeService::new()),
        favorites: Arc::new(FavoritesStore::new(favorites_path)),
    };
    let router = build_router(state);

    let bind = env::var("TUBEPLAYER_BIND").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!("listening on http://{bind}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install ctrl-c handler: {err}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => tracing::error!("failed to install SIGTERM handler: {err}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received ctrl-c"),
        _ = terminate => info!("received SIGTERM"),
    }
}
