//! Docker implementation of [`ContainerRuntime`] backed by `bollard`.

use super::{ContainerRuntime, PortBinding, RuntimeContainer, RuntimeError};
use crate::config::RuntimeConfig;
use async_trait::async_trait;
use bollard::container::{
    InspectContainerOptions, ListContainersOptions, LogOutput, LogsOptions,
    StartContainerOptions, StopContainerOptions,
};
use bollard::Docker;
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use std::time::Duration;

/// Docker Engine API client.
#[derive(Clone)]
pub struct DockerRuntime {
    docker: Docker,
    timeout_seconds: u64,
}

impl DockerRuntime {
    /// Connect to the daemon named in `config`, or the platform default.
    ///
    /// Only client construction can fail here (e.g. a missing socket path);
    /// an unreachable daemon surfaces on the first request.
    pub fn connect(config: &RuntimeConfig) -> Result<Self, RuntimeError> {
        let timeout = config.timeout_seconds;
        let docker = match config.docker_host.as_deref() {
            Some(host) if host.starts_with("tcp://") || host.starts_with("http://") => {
                Docker::connect_with_http(host, timeout, bollard::API_DEFAULT_VERSION)
            }
            Some(path) => Docker::connect_with_socket(path, timeout, bollard::API_DEFAULT_VERSION),
            None => Docker::connect_with_local_defaults()
                .map(|docker| docker.with_timeout(Duration::from_secs(timeout))),
        }
        .map_err(|e| RuntimeError::Unavailable(e.to_string()))?;

        tracing::debug!(
            docker_host = config.docker_host.as_deref().unwrap_or("<default>"),
            timeout_seconds = timeout,
            "Docker runtime client configured"
        );

        Ok(Self {
            docker,
            timeout_seconds: timeout,
        })
    }

    fn classify(&self, e: bollard::errors::Error) -> RuntimeError {
        match e {
            bollard::errors::Error::RequestTimeoutError => {
                RuntimeError::Timeout(self.timeout_seconds)
            }
            other => other.into(),
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn to_runtime_container(summary: bollard::models::ContainerSummary) -> RuntimeContainer {
    RuntimeContainer {
        id: summary.id.unwrap_or_default(),
        names: summary.names.unwrap_or_default(),
        state: summary.state.unwrap_or_default(),
        created: summary
            .created
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
        ports: summary
            .ports
            .unwrap_or_default()
            .into_iter()
            .map(|p| PortBinding {
                ip: p.ip,
                private_port: p.private_port,
                public_port: p.public_port,
                protocol: p.typ.map(|t| t.to_string()),
            })
            .collect(),
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn list_containers(
        &self,
        include_stopped: bool,
    ) -> Result<Vec<RuntimeContainer>, RuntimeError> {
        let options = ListContainersOptions::<String> {
            all: include_stopped,
            ..Default::default()
        };

        let summaries = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(|e| self.classify(e))?;

        Ok(summaries.into_iter().map(to_runtime_container).collect())
    }

    async fn started_at(
        &self,
        container_id: &str,
    ) -> Result<Option<DateTime<Utc>>, RuntimeError> {
        let inspect = self
            .docker
            .inspect_container(container_id, None::<InspectContainerOptions>)
            .await
            .map_err(|e| self.classify(e))?;

        Ok(inspect
            .state
            .and_then(|state| state.started_at)
            .as_deref()
            .and_then(parse_timestamp))
    }

    async fn logs(&self, container_id: &str, tail: usize) -> Result<Vec<u8>, RuntimeError> {
        let options = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            follow: false,
            timestamps: false,
            tail: tail.to_string(),
            ..Default::default()
        };

        let mut stream = self.docker.logs(container_id, Some(options));
        let mut output = Vec::new();

        while let Some(frame) = stream.next().await {
            match frame.map_err(|e| self.classify(e))? {
                LogOutput::StdOut { message }
                | LogOutput::StdErr { message }
                | LogOutput::Console { message }
                | LogOutput::StdIn { message } => output.extend_from_slice(&message),
            }
        }

        Ok(output)
    }

    async fn start_container(&self, container_id: &str) -> Result<(), RuntimeError> {
        self.docker
            .start_container(container_id, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| self.classify(e))
    }

    async fn stop_container(&self, container_id: &str) -> Result<(), RuntimeError> {
        self.docker
            .stop_container(container_id, None::<StopContainerOptions>)
            .await
            .map_err(|e| self.classify(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_docker_format() {
        let ts = parse_timestamp("2026-10-17T08:30:00.123456789Z").unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-10-17T08:30:00.123456789+00:00");
    }

    #[test]
    fn test_parse_timestamp_invalid() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_to_runtime_container_maps_fields() {
        let summary = bollard::models::ContainerSummary {
            id: Some("abc123".to_string()),
            names: Some(vec!["/paladium-rtsp-server-1".to_string()]),
            state: Some("running".to_string()),
            created: Some(1_700_000_000),
            ports: Some(vec![bollard::models::Port {
                ip: Some("0.0.0.0".to_string()),
                private_port: 8554,
                public_port: Some(8554),
                typ: None,
            }]),
            ..Default::default()
        };

        let container = to_runtime_container(summary);
        assert_eq!(container.id, "abc123");
        assert!(container.is_running());
        assert_eq!(container.created.unwrap().timestamp(), 1_700_000_000);
        assert_eq!(container.ports[0].public_port, Some(8554));
        assert!(container.ports[0].protocol.is_none());
    }
}
