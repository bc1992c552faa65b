//! Serve command implementation

use crate::api::{create_router, AppState};
use crate::cli::ServeArgs;
use crate::config::{LogFormat, MonitorConfig};
use crate::runtime::{ContainerRuntime, DockerRuntime};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(
    args: &ServeArgs,
) -> Result<MonitorConfig, Box<dyn std::error::Error>> {
    // Load from file if it exists, otherwise use defaults
    let mut config = if args.config.exists() {
        MonitorConfig::load(Some(&args.config))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        MonitorConfig::default()
    };

    // Apply environment variable overrides
    config = config.with_env_overrides();

    // Apply CLI overrides (highest priority)
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }
    if args.no_poll {
        config.health_check.enabled = false;
    }
    if args.read_only {
        config.control.enabled = false;
    }

    Ok(config)
}

/// Initialize tracing based on configuration
pub fn init_tracing(
    config: &crate::config::LoggingConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter_str = crate::logging::build_filter_directives(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    match config.format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        }
    }

    Ok(())
}

/// Build API router with all endpoints
fn build_api_router(
    config: Arc<MonitorConfig>,
    runtime: Arc<dyn ContainerRuntime>,
) -> (axum::Router, Arc<AppState>) {
    let app_state = Arc::new(AppState::new(config, runtime));
    let router = create_router(Arc::clone(&app_state));
    (router, app_state)
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C handler");
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
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }

    cancel_token.cancel();
}

/// Main serve command handler
pub async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load, merge and validate configuration
    let config = load_config_with_overrides(&args)?;
    config.validate()?;

    // 2. Initialize tracing
    init_tracing(&config.logging)?;

    tracing::info!(services = config.services.len(), "Starting Paladium monitor");
    tracing::debug!(?config, "Loaded configuration");

    // 3. Connect to the container runtime (lazily; the daemon may be down)
    let runtime: Arc<dyn ContainerRuntime> = Arc::new(DockerRuntime::connect(&config.runtime)?);

    // 4. Build API router and shared state
    let config = Arc::new(config);
    let (app, app_state) = build_api_router(Arc::clone(&config), runtime);

    // 5. Start the poll scheduler (if enabled)
    let cancel_token = CancellationToken::new();
    let poll_handle = if config.health_check.enabled {
        tracing::info!(
            interval_seconds = config.health_check.interval_seconds,
            "Starting poll scheduler"
        );
        Some(app_state.poll_scheduler().start(cancel_token.clone()))
    } else {
        tracing::info!("Status polling disabled");
        None
    };

    // 6. Bind and serve
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(addr = %addr, "Paladium monitor listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token.clone()))
        .await?;

    // 7. Cleanup
    if let Some(handle) = poll_handle {
        tracing::info!("Waiting for poll scheduler to stop");
        handle.await?;
    }

    tracing::info!("Paladium monitor stopped");
    Ok(())
}
