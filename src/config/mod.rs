//! Configuration module for the Paladium monitor
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`PALADIUM_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use paladium::config::MonitorConfig;
//!
//! let config = MonitorConfig::default();
//! assert_eq!(config.server.port, 3000);
//!
//! let toml = r#"
//! [server]
//! port = 9000
//!
//! [[services]]
//! id = "mediamtx"
//! name = "Media Server"
//! port = 8888
//! container_name = "mediamtx"
//! "#;
//! let config: MonitorConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.server.port, 9000);
//! assert_eq!(config.services.len(), 1);
//! ```

pub mod control;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod server;
pub mod service;

pub use control::ControlConfig;
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use runtime::RuntimeConfig;
pub use server::ServerConfig;
pub use service::{default_services, ServiceDescriptor};

// Re-export HealthCheckConfig from health module
pub use crate::health::HealthCheckConfig;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Unified configuration for the monitor.
///
/// The `services` list is the static service map: it is read once at startup
/// and shared immutably (`Arc`) with every component afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// HTTP and WebSocket server settings
    pub server: ServerConfig,
    /// Poll cycle and probe settings
    pub health_check: HealthCheckConfig,
    /// Docker daemon connection
    pub runtime: RuntimeConfig,
    /// Start/stop command handling
    pub control: ControlConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Monitored services
    pub services: Vec<ServiceDescriptor>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            health_check: HealthCheckConfig::default(),
            runtime: RuntimeConfig::default(),
            control: ControlConfig::default(),
            logging: LoggingConfig::default(),
            services: default_services(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply `PALADIUM_*` environment variable overrides.
    ///
    /// Invalid values are ignored and the previous value is kept.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("PALADIUM_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(host) = std::env::var("PALADIUM_HOST") {
            self.server.host = host;
        }

        if let Ok(level) = std::env::var("PALADIUM_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("PALADIUM_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Ok(interval) = std::env::var("PALADIUM_POLL_INTERVAL") {
            if let Ok(secs) = interval.parse() {
                self.health_check.interval_seconds = secs;
            }
        }
        if let Ok(host) = std::env::var("PALADIUM_PROBE_HOST") {
            self.health_check.probe_host = host;
        }
        if let Ok(docker_host) = std::env::var("PALADIUM_DOCKER_HOST") {
            self.runtime.docker_host = Some(docker_host);
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation {
                field: "server.port".to_string(),
                message: "port must be non-zero".to_string(),
            });
        }
        if self.health_check.interval_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "health_check.interval_seconds".to_string(),
                message: "poll interval must be at least 1 second".to_string(),
            });
        }
        if self.health_check.probe_timeout_ms == 0 {
            return Err(ConfigError::Validation {
                field: "health_check.probe_timeout_ms".to_string(),
                message: "probe timeout must be non-zero".to_string(),
            });
        }

        if self.runtime.max_log_lines == 0 {
            return Err(ConfigError::Validation {
                field: "runtime.max_log_lines".to_string(),
                message: "log line cap must be at least 1".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for (i, service) in self.services.iter().enumerate() {
            if service.id.is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("services[{}].id", i),
                    message: "id cannot be empty".to_string(),
                });
            }
            if service.container_name.is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("services[{}].container_name", i),
                    message: "container name cannot be empty".to_string(),
                });
            }
            if service.port == 0 {
                return Err(ConfigError::Validation {
                    field: format!("services[{}].port", i),
                    message: "port must be non-zero".to_string(),
                });
            }
            if !seen.insert(service.id.as_str()) {
                return Err(ConfigError::DuplicateService(service.id.clone()));
            }
        }

        Ok(())
    }

    /// Look up a configured service by id.
    pub fn service(&self, id: &str) -> Option<&ServiceDescriptor> {
        self.services.iter().find(|s| s.id == id)
    }
}
