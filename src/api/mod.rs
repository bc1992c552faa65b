//! # HTTP API
//!
//! Pull endpoints, remote control and the push channel of the monitor.
//!
//! ## Endpoints
//!
//! - `GET /api/status` - Fresh status snapshot for every service
//! - `GET /api/services` - Configured service descriptors
//! - `GET /api/logs/:service?lines=N` - Sanitized container log tail
//! - `POST /api/control/:service/:action` - Start or stop a service container
//! - `GET /health` - Liveness of the monitor itself
//! - `GET /metrics` - Prometheus metrics (see [`crate::metrics`])
//! - `GET /ws` - WebSocket push channel (see [`crate::dashboard`])
//!
//! ## Example
//!
//! ```no_run
//! use paladium::api::{create_router, AppState};
//! use paladium::config::MonitorConfig;
//! use paladium::runtime::DockerRuntime;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(MonitorConfig::default());
//! let runtime = Arc::new(DockerRuntime::connect(&config.runtime)?);
//!
//! let state = Arc::new(AppState::new(config, runtime));
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

mod control;
mod error;
mod health;
mod logs;
mod services;
mod status;

pub use control::ControlAccepted;
pub use error::ApiError;
pub use health::{HealthResponse, ServiceCounts};
pub use logs::LogsResponse;

use crate::config::{MonitorConfig, ServiceDescriptor};
use crate::control::ControlDispatcher;
use crate::dashboard::Broadcaster;
use crate::health::{PollScheduler, PollTrigger, ReachabilityProbe, StatusAggregator};
use crate::metrics::MetricsCollector;
use crate::runtime::{ContainerRuntime, LogFetcher, RuntimeStatusProbe};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub config: Arc<MonitorConfig>,
    pub aggregator: Arc<StatusAggregator>,
    pub broadcaster: Arc<Broadcaster>,
    pub log_fetcher: LogFetcher,
    pub control: ControlDispatcher,
    pub poll_trigger: PollTrigger,
    /// Server startup time for uptime tracking
    pub start_time: Instant,
    pub metrics_collector: Arc<MetricsCollector>,
}

impl AppState {
    /// Wire every component to one runtime and one service map.
    pub fn new(config: Arc<MonitorConfig>, runtime: Arc<dyn ContainerRuntime>) -> Self {
        let services: Arc<[ServiceDescriptor]> = config.services.clone().into();

        let aggregator = Arc::new(StatusAggregator::new(
            Arc::clone(&services),
            RuntimeStatusProbe::new(
                Arc::clone(&runtime),
                Duration::from_secs(config.runtime.timeout_seconds),
            ),
            ReachabilityProbe::new(
                config.health_check.probe_host.clone(),
                config.health_check.probe_timeout(),
            ),
        ));

        let broadcaster = Arc::new(Broadcaster::new(
            config.server.observer_queue_capacity,
            config.server.max_message_bytes,
        ));

        let poll_trigger = PollTrigger::new();
        let log_fetcher = LogFetcher::new(
            Arc::clone(&runtime),
            Arc::clone(&services),
            config.runtime.max_log_lines,
        );
        let control = ControlDispatcher::new(
            runtime,
            services,
            poll_trigger.clone(),
            &config.control,
        );

        // Only the first state in a process owns the global recorder
        let prometheus_handle = crate::metrics::setup_metrics().unwrap_or_else(|e| {
            tracing::debug!("Metrics recorder already installed, using a detached handle: {}", e);
            crate::metrics::PrometheusBuilder::new()
                .build_recorder()
                .handle()
        });
        let start_time = Instant::now();
        let metrics_collector = Arc::new(MetricsCollector::new(
            Arc::clone(&aggregator),
            Arc::clone(&broadcaster),
            start_time,
            prometheus_handle,
        ));

        Self {
            config,
            aggregator,
            broadcaster,
            log_fetcher,
            control,
            poll_trigger,
            start_time,
            metrics_collector,
        }
    }

    /// The scheduler that keeps this state's snapshot current.
    pub fn poll_scheduler(&self) -> PollScheduler {
        PollScheduler::new(
            Arc::clone(&self.aggregator),
            Arc::clone(&self.broadcaster),
            self.config.health_check.interval(),
        )
        .with_trigger(self.poll_trigger.clone())
    }
}

/// Create the main API router with all endpoints configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/status", get(status::handle))
        .route("/api/services", get(services::handle))
        .route("/api/logs/:service", get(logs::handle))
        .route("/api/control/:service/:action", post(control::handle))
        .route("/health", get(health::handle))
        .route("/metrics", get(crate::metrics::handler::metrics_handler))
        .route("/ws", get(crate::dashboard::websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
