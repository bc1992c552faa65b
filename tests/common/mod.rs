//! Shared test utilities for Paladium integration tests.
//!
//! Provides an in-memory container runtime, a test configuration that never
//! touches well-known ports, and helpers for driving the router.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Response;
use chrono::{DateTime, Utc};
use paladium::api::{create_router, AppState};
use paladium::config::{MonitorConfig, ServiceDescriptor};
use paladium::runtime::{ContainerRuntime, RuntimeContainer, RuntimeError};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

// =============================================================================
// Stub Runtime
// =============================================================================

/// In-memory [`ContainerRuntime`] with canned containers and logs.
#[derive(Default)]
pub struct StubRuntime {
    containers: Mutex<Vec<RuntimeContainer>>,
    started: HashMap<String, DateTime<Utc>>,
    logs: HashMap<String, Vec<u8>>,
    failure: Option<String>,
    commands: Mutex<Vec<(String, String)>>,
}

impl StubRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(self, id: &str, name: &str, state: &str) -> Self {
        self.containers.lock().unwrap().push(RuntimeContainer {
            id: id.to_string(),
            names: vec![format!("/{}", name)],
            state: state.to_string(),
            created: None,
            ports: vec![],
        });
        self
    }

    pub fn with_started_at(mut self, id: &str, at: DateTime<Utc>) -> Self {
        self.started.insert(id.to_string(), at);
        self
    }

    pub fn with_logs(mut self, id: &str, raw: &[u8]) -> Self {
        self.logs.insert(id.to_string(), raw.to_vec());
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// `(container_id, action)` pairs in the order they were issued.
    pub fn commands(&self) -> Vec<(String, String)> {
        self.commands.lock().unwrap().clone()
    }

    fn check_failure(&self) -> Result<(), RuntimeError> {
        match &self.failure {
            Some(message) => Err(RuntimeError::Unavailable(message.clone())),
            None => Ok(()),
        }
    }

    fn set_state(&self, id: &str, action: &str, state: &str) -> Result<(), RuntimeError> {
        self.check_failure()?;
        let mut containers = self.containers.lock().unwrap();
        let container = containers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| RuntimeError::NoSuchContainer(id.to_string()))?;
        container.state = state.to_string();
        self.commands
            .lock()
            .unwrap()
            .push((id.to_string(), action.to_string()));
        Ok(())
    }
}

#[async_trait]
impl ContainerRuntime for StubRuntime {
    async fn list_containers(
        &self,
        include_stopped: bool,
    ) -> Result<Vec<RuntimeContainer>, RuntimeError> {
        self.check_failure()?;
        Ok(self
            .containers
            .lock()
            .unwrap()
            .iter()
            .filter(|c| include_stopped || c.is_running())
            .cloned()
            .collect())
    }

    async fn started_at(
        &self,
        container_id: &str,
    ) -> Result<Option<DateTime<Utc>>, RuntimeError> {
        self.check_failure()?;
        Ok(self.started.get(container_id).copied())
    }

    async fn logs(&self, container_id: &str, _tail: usize) -> Result<Vec<u8>, RuntimeError> {
        self.check_failure()?;
        self.logs
            .get(container_id)
            .cloned()
            .ok_or_else(|| RuntimeError::NoSuchContainer(container_id.to_string()))
    }

    async fn start_container(&self, container_id: &str) -> Result<(), RuntimeError> {
        self.set_state(container_id, "start", "running")
    }

    async fn stop_container(&self, container_id: &str) -> Result<(), RuntimeError> {
        self.set_state(container_id, "stop", "exited")
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// A localhost port nothing listens on.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// The two stock pipeline services, moved onto closed local ports.
pub fn test_services() -> Vec<ServiceDescriptor> {
    vec![
        ServiceDescriptor::new("rtsp-server", "Pipeline RTSP", closed_port(), "rtsp-server"),
        ServiceDescriptor::new("rtsp-to-srt", "Pipeline RTSP-to-SRT", closed_port(), "rtsp-to-srt"),
    ]
}

/// Config with fast probes, no re-poll delay and no background poll.
pub fn test_config(services: Vec<ServiceDescriptor>) -> MonitorConfig {
    let mut config = MonitorConfig::default();
    config.services = services;
    config.health_check.enabled = false;
    config.health_check.probe_host = "127.0.0.1".to_string();
    config.health_check.probe_timeout_ms = 200;
    config.runtime.timeout_seconds = 2;
    config.control.repoll_delay_seconds = 0;
    config
}

// =============================================================================
// App Builders
// =============================================================================

pub fn make_state(config: MonitorConfig, runtime: Arc<StubRuntime>) -> Arc<AppState> {
    Arc::new(AppState::new(Arc::new(config), runtime))
}

pub fn make_app(state: Arc<AppState>) -> axum::Router {
    create_router(state)
}

/// Serve the router on an ephemeral local port.
pub async fn spawn_server(state: Arc<AppState>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
