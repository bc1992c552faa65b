//! In-memory runtime used by unit tests.

use super::{ContainerRuntime, RuntimeContainer, RuntimeError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
pub(crate) struct FakeRuntime {
    containers: Vec<RuntimeContainer>,
    started: HashMap<String, DateTime<Utc>>,
    logs: HashMap<String, Vec<u8>>,
    failure: Option<String>,
    delay: Option<Duration>,
    inspect_delays: HashMap<String, Duration>,
    inspect_panics: HashSet<String>,
    list_calls: Arc<AtomicUsize>,
    commands: Arc<Mutex<Vec<(String, String)>>>,
}

impl FakeRuntime {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_container(mut self, id: &str, name: &str, state: &str) -> Self {
        self.containers.push(RuntimeContainer {
            id: id.to_string(),
            names: vec![format!("/{}", name)],
            state: state.to_string(),
            created: None,
            ports: vec![],
        });
        self
    }

    pub(crate) fn with_started_at(mut self, id: &str, at: DateTime<Utc>) -> Self {
        self.started.insert(id.to_string(), at);
        self
    }

    pub(crate) fn with_logs(mut self, id: &str, raw: &[u8]) -> Self {
        self.logs.insert(id.to_string(), raw.to_vec());
        self
    }

    /// Every runtime call fails with `message`.
    pub(crate) fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Every listing sleeps for `delay` first.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Inspecting container `id` sleeps for `delay`.
    pub(crate) fn with_inspect_delay(mut self, id: &str, delay: Duration) -> Self {
        self.inspect_delays.insert(id.to_string(), delay);
        self
    }

    /// Inspecting container `id` panics.
    pub(crate) fn with_inspect_panic(mut self, id: &str) -> Self {
        self.inspect_panics.insert(id.to_string());
        self
    }

    pub(crate) fn list_calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.list_calls)
    }

    pub(crate) fn commands(&self) -> Arc<Mutex<Vec<(String, String)>>> {
        Arc::clone(&self.commands)
    }

    fn check_failure(&self) -> Result<(), RuntimeError> {
        match &self.failure {
            Some(message) => Err(RuntimeError::Unavailable(message.clone())),
            None => Ok(()),
        }
    }

    fn record(&self, id: &str, action: &str) -> Result<(), RuntimeError> {
        self.check_failure()?;
        if !self.containers.iter().any(|c| c.id == id) {
            return Err(RuntimeError::NoSuchContainer(id.to_string()));
        }
        self.commands
            .lock()
            .unwrap()
            .push((id.to_string(), action.to_string()));
        Ok(())
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn list_containers(
        &self,
        include_stopped: bool,
    ) -> Result<Vec<RuntimeContainer>, RuntimeError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.check_failure()?;
        Ok(self
            .containers
            .iter()
            .filter(|c| include_stopped || c.is_running())
            .cloned()
            .collect())
    }

    async fn started_at(
        &self,
        container_id: &str,
    ) -> Result<Option<DateTime<Utc>>, RuntimeError> {
        if self.inspect_panics.contains(container_id) {
            panic!("inspect exploded for {}", container_id);
        }
        if let Some(delay) = self.inspect_delays.get(container_id) {
            tokio::time::sleep(*delay).await;
        }
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
        self.record(container_id, "start")
    }

    async fn stop_container(&self, container_id: &str) -> Result<(), RuntimeError> {
        self.record(container_id, "stop")
    }
}
