use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use strmkit_core::{
    load_config, validate_config, DrainTask, ExtractMode, ExtractionService, FfmpegExtractor,
    QueueKind, SidecarInspector, TaskScheduler,
};
use strmkit_server::api::create_router;
use strmkit_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

/// Zero means on demand only.
fn interval(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
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

    // Determine config path
    let config_path = std::env::var("STRMKIT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!(
        "Max concurrent extractions: {}",
        config.general.max_concurrent_count
    );

    // Create extraction service (shared gate, both queues, ingestion rules)
    let inspector = Arc::new(SidecarInspector::new(config.intro_skip.library_paths.clone()));
    let service = Arc::new(
        ExtractionService::from_config(&config, inspector)
            .context("Failed to create extraction service")?,
    );

    // Create scheduler and register one drain task per queue
    let scheduler = TaskScheduler::new();

    let probe = Arc::new(FfmpegExtractor::new(ExtractMode::Probe, &config.extractor));
    let media_info = service.drain_runner(QueueKind::MediaInfo, probe);
    scheduler.register(
        Arc::new(DrainTask::new(media_info)),
        interval(config.scheduler.media_info_interval_secs),
    );

    let fingerprint = Arc::new(FfmpegExtractor::new(
        ExtractMode::Fingerprint {
            minutes: config.intro_skip.fingerprint_minutes,
        },
        &config.extractor,
    ));
    let intro = service
        .drain_runner(QueueKind::IntroFingerprint, fingerprint)
        .with_follow_up(scheduler.trigger(), &config.scheduler.follow_up_task);
    scheduler.register(
        Arc::new(DrainTask::new(intro)),
        interval(config.scheduler.intro_fingerprint_interval_secs),
    );

    scheduler.start();
    info!("Task scheduler started");

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::clone(&service),
        scheduler.clone(),
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

    // Running drains finish their admitted items; nothing new is admitted.
    info!("Server shutting down...");
    scheduler.shutdown().await;
    info!("Task scheduler stopped");
    service.shutdown();

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

    info!("Shutdown signal received");
}
