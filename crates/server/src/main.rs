use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ticketgate_core::{
    load_config, validate_config, BackendClient, CameraDevice, CredentialStore,
    HttpTicketVerifier, QrDecoder, RqrrDecoder, SnapshotCamera, StationSettings, TicketVerifier,
    VerificationStation,
};
use ticketgate_server::api::create_router;
use ticketgate_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("ticketgate {}", VERSION);

    // Determine config path
    let config_path = std::env::var("TICKETGATE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Backend: {}", config.backend.base_url);
    info!(
        "Bearer token: {}",
        if config.backend.token.is_some() {
            "configured"
        } else {
            "not set"
        }
    );

    let credentials = CredentialStore::from_config(config.backend.token.as_deref());
    let backend = BackendClient::new(&config.backend, credentials.clone())
        .context("Failed to create backend client")?;

    let verifier: Arc<dyn TicketVerifier> = Arc::new(HttpTicketVerifier::new(backend.clone()));
    let decoder: Arc<dyn QrDecoder> = Arc::new(RqrrDecoder::new());

    let camera: Option<Arc<dyn CameraDevice>> = match &config.scanner.camera {
        Some(camera_config) => {
            info!(
                "Using snapshot camera at {:?}",
                camera_config.snapshot_path
            );
            Some(Arc::new(SnapshotCamera::new(
                camera_config.snapshot_path.clone(),
            )))
        }
        None => {
            info!("No camera configured, camera mode will report unavailable");
            None
        }
    };

    let station = Arc::new(VerificationStation::new(
        verifier,
        decoder,
        camera,
        StationSettings::from_config(&config),
    ));
    let status = station.start().await;
    info!(
        "Verification station started (mode: {}, camera active: {})",
        status.mode, status.camera_active
    );

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::clone(&station),
        credentials,
        backend,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    station.shutdown().await;
    info!("Verification station stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
