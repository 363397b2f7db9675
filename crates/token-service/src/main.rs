//! Huddle Token Service
//!
//! Entry point for the token service binary.

use std::net::SocketAddr;
use std::sync::Arc;
use token_service::config::{Config, RoomBackendKind};
use token_service::observability::metrics::init_metrics_recorder;
use token_service::routes::{self, AppState};
use token_service::services::{
    CreatorRegistry, InMemoryRoomBackend, LiveKitRoomBackend, RoomBackend,
};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "token_service=debug,ts=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(target: "ts.main", version = env!("CARGO_PKG_VERSION"), "Starting token service");

    let config = Config::from_env().map_err(|e| {
        error!(target: "ts.main", error = %e, "Refusing to start without valid configuration");
        e
    })?;

    info!(
        target: "ts.main",
        livekit_host = %config.livekit_host,
        bind_address = %config.bind_address,
        room_backend = ?config.room_backend,
        token_ttl_seconds = config.token_ttl_seconds,
        "Loaded configuration"
    );

    // Must happen before any metric is recorded.
    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!(target: "ts.main", error = %e, "Cannot install Prometheus recorder");
        e
    })?;

    let room_backend: Arc<dyn RoomBackend> = match config.room_backend {
        RoomBackendKind::LiveKit => Arc::new(LiveKitRoomBackend::new(config.clone())?),
        RoomBackendKind::Memory => {
            warn!(target: "ts.main", "Rooms are kept in process memory and never reach the media server");
            Arc::new(InMemoryRoomBackend::new())
        }
    };

    let bind_address = config.bind_address.clone();

    let state = Arc::new(AppState {
        config,
        room_backend,
        creators: Arc::new(CreatorRegistry::new()),
    });

    let app = routes::build_routes(state, metrics_handle);

    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!(target: "ts.main", bind_address = %bind_address, error = %e, "Unparseable bind address");
        e
    })?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(target: "ts.main", %addr, "Accepting requests");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!(target: "ts.main", "Token service stopped");

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM. In-flight requests finish before exit.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(target: "ts.main", error = %e, "Cannot install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
        "SIGINT"
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(target: "ts.main", error = %e, "Cannot install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
        "SIGTERM"
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    let received = tokio::select! {
        name = interrupt => name,
        name = terminate => name,
    };
    info!(target: "ts.main", signal = received, "Shutting down token service");
}
