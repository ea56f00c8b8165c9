use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use syncup_store::Workspace;
use syncup_upstream::{ChannelPoller, MessageSource};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use syncup_api::config::ServerConfig;
use syncup_api::router::build_app_router;
use syncup_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    "syncup_api=debug,syncup_store=debug,syncup_upstream=debug,tower_http=debug".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Workspace ---
    let workspace = Workspace::from_config(&config.store).expect("Failed to open data directory");
    tracing::info!(
        projects = workspace.projects().list().len(),
        tasks = workspace.tasks().len(),
        persistent = config.store.data_dir.is_some(),
        "Workspace loaded"
    );

    // --- App state ---
    let state = AppState::new(config.clone(), workspace).expect("Failed to build HTTP client");

    // --- Channel pollers ---
    let poll_cancel = CancellationToken::new();
    let source: Arc<dyn MessageSource> = Arc::new(state.mattermost.clone());
    let mut feeds = HashMap::new();
    let mut poller_handles = Vec::new();

    for channel_id in &config.mattermost.watch_channels {
        let (poller, rx) = ChannelPoller::new(Arc::clone(&source), channel_id.clone());
        let poller = poller.with_interval(config.poll_interval());
        feeds.insert(channel_id.clone(), rx);
        poller_handles.push(tokio::spawn(poller.run(poll_cancel.clone())));
    }
    if !poller_handles.is_empty() {
        tracing::info!(channels = poller_handles.len(), "Channel pollers started");
    }

    let state = state.with_chat_feeds(feeds);

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    poll_cancel.cancel();
    for handle in poller_handles {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }
    tracing::info!("Channel pollers stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
