//! Container runtime access.
//!
//! The monitor talks to the container runtime only through the
//! [`ContainerRuntime`] trait. [`DockerRuntime`] implements it on top of
//! `bollard`; tests substitute an in-memory runtime.
//!
//! On top of the trait sit the two runtime-backed probes:
//! - [`RuntimeStatusProbe`] resolves a logical container name to a
//!   [`ContainerState`](crate::health::ContainerState)
//! - [`LogFetcher`] returns a sanitized log tail for a configured service

mod docker;
mod error;
mod logs;
mod matching;

#[cfg(test)]
pub(crate) mod testing;

pub use docker::DockerRuntime;
pub use error::RuntimeError;
pub use logs::{sanitize_log_output, LogError, LogFetcher, DEFAULT_LOG_LINES};
pub use matching::{container_name_matches, find_container};

use crate::health::{ContainerState, ProbeError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// A port published by a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortBinding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    pub private_port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

/// One entry from a runtime container listing.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeContainer {
    /// Runtime-assigned container id
    pub id: String,
    /// All names the runtime reports for the container
    pub names: Vec<String>,
    /// Raw runtime state (`running`, `exited`, `created`, ...)
    pub state: String,
    pub created: Option<DateTime<Utc>>,
    pub ports: Vec<PortBinding>,
}

impl RuntimeContainer {
    pub fn is_running(&self) -> bool {
        self.state == "running"
    }
}

/// Control and query interface of the container runtime.
///
/// Implementations must be cheap to share (`Arc<dyn ContainerRuntime>`) and
/// safe to call concurrently from many probes.
#[async_trait]
pub trait ContainerRuntime: Send + Sync + 'static {
    /// List containers. Stopped containers are included only when
    /// `include_stopped` is set.
    async fn list_containers(
        &self,
        include_stopped: bool,
    ) -> Result<Vec<RuntimeContainer>, RuntimeError>;

    /// When the container last started, from an inspect call.
    async fn started_at(&self, container_id: &str)
        -> Result<Option<DateTime<Utc>>, RuntimeError>;

    /// Raw combined stdout/stderr tail.
    async fn logs(&self, container_id: &str, tail: usize) -> Result<Vec<u8>, RuntimeError>;

    async fn start_container(&self, container_id: &str) -> Result<(), RuntimeError>;

    async fn stop_container(&self, container_id: &str) -> Result<(), RuntimeError>;
}

/// Resolve the container for a logical name: running containers first,
/// then a second listing that includes stopped ones.
pub async fn locate_container(
    runtime: &dyn ContainerRuntime,
    container_name: &str,
) -> Result<Option<RuntimeContainer>, RuntimeError> {
    let running = runtime.list_containers(false).await?;
    if let Some(found) = find_container(&running, container_name) {
        return Ok(Some(found.clone()));
    }

    let all = runtime.list_containers(true).await?;
    Ok(find_container(&all, container_name).cloned())
}

/// Reports the runtime state of one logical container.
#[derive(Clone)]
pub struct RuntimeStatusProbe {
    runtime: Arc<dyn ContainerRuntime>,
    timeout: Duration,
}

impl RuntimeStatusProbe {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, timeout: Duration) -> Self {
        Self { runtime, timeout }
    }

    /// Probe the runtime for `container_name`.
    ///
    /// Returns `not_found` as a state, not an error. Errors are only
    /// returned when the runtime itself could not be queried in time.
    pub async fn probe(&self, container_name: &str) -> Result<ContainerState, ProbeError> {
        match tokio::time::timeout(self.timeout, self.probe_inner(container_name)).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout(self.timeout.as_millis() as u64)),
        }
    }

    async fn probe_inner(&self, container_name: &str) -> Result<ContainerState, ProbeError> {
        let running = self.runtime.list_containers(false).await?;
        if let Some(container) = find_container(&running, container_name) {
            // Fall back to the creation time if inspect is unavailable
            let started_at = match self.runtime.started_at(&container.id).await {
                Ok(Some(started)) => Some(started),
                Ok(None) => container.created,
                Err(e) => {
                    tracing::debug!(
                        container = %container.id,
                        error = %e,
                        "Inspect failed, using creation time as start time"
                    );
                    container.created
                }
            };
            return Ok(ContainerState::running(started_at, container.ports.clone()));
        }

        let all = self.runtime.list_containers(true).await?;
        match find_container(&all, container_name) {
            Some(container) if container.is_running() => Ok(ContainerState::running(
                container.created,
                container.ports.clone(),
            )),
            Some(container) => Ok(ContainerState::stopped(
                container.state.clone(),
                container.created,
                container.ports.clone(),
            )),
            None => Ok(ContainerState::not_found()),
        }
    }
}
