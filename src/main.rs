use maintenance_predictor::{
    api::{build_router, handlers, AppState},
    artifacts::ArtifactStore,
    config::Config,
    inference::InferencePipeline,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "maintenance_predictor=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    tracing::info!(
        "Starting Machine Maintenance Predictor v{}",
        env!("CARGO_PKG_VERSION")
    );

    handlers::init_start_time();

    // Load model artifacts; a missing or corrupt file is fatal
    let store = Arc::new(ArtifactStore::load(&config.artifacts)?);
    tracing::info!("✅ Model artifacts loaded");

    let pipeline = Arc::new(InferencePipeline::new(store));
    let config = Arc::new(config);

    // Create application state and build the router
    let app_state = AppState::new(pipeline, config.clone());
    let app = build_router(app_state);

    // Start HTTP server
    let http_addr = format!("{}:{}", config.server.host, config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("🚀 HTTP server listening on http://{}", http_addr);
    tracing::info!("   Prediction form: http://{}/", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let http_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(http_listener, app).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    tokio::select! {
        _ = http_handle => {
            tracing::warn!("HTTP server stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    tracing::info!("Shutting down gracefully...");
    Ok(())
}
