//! Per-service health records and the snapshot that groups them.

use crate::config::ServiceDescriptor;
use crate::runtime::PortBinding;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normalized runtime state of a service's container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerStatus {
    Running,
    Stopped,
    NotFound,
    /// The runtime probe itself failed
    Error,
}

/// Container state as observed by one poll. Replaced wholesale every cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerState {
    pub status: ContainerStatus,
    /// Raw runtime state string (`exited`, `created`, ...), when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_state: Option<String>,
    /// Start time for running containers, creation time otherwise
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ports: Vec<PortBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ContainerState {
    pub fn running(started_at: Option<DateTime<Utc>>, ports: Vec<PortBinding>) -> Self {
        Self {
            status: ContainerStatus::Running,
            runtime_state: Some("running".to_string()),
            started_at,
            ports,
            error: None,
        }
    }

    pub fn stopped(
        runtime_state: String,
        created: Option<DateTime<Utc>>,
        ports: Vec<PortBinding>,
    ) -> Self {
        Self {
            status: ContainerStatus::Stopped,
            runtime_state: Some(runtime_state),
            started_at: created,
            ports,
            error: None,
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: ContainerStatus::NotFound,
            runtime_state: None,
            started_at: None,
            ports: Vec::new(),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ContainerStatus::Error,
            runtime_state: None,
            started_at: None,
            ports: Vec::new(),
            error: Some(message.into()),
        }
    }
}

/// Overall verdict shown on a dashboard tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Healthy,
    Unhealthy,
    NotFound,
    Error,
}

impl OverallStatus {
    /// Container state alone decides the verdict; reachability is reported
    /// alongside but never overrides it.
    pub fn from_container(status: ContainerStatus) -> Self {
        match status {
            ContainerStatus::Running => OverallStatus::Healthy,
            ContainerStatus::NotFound => OverallStatus::NotFound,
            ContainerStatus::Error => OverallStatus::Error,
            ContainerStatus::Stopped => OverallStatus::Unhealthy,
        }
    }
}

/// Health of one service at one poll.
///
/// On the wire the descriptor fields sit next to `containerState`,
/// `reachable`, `lastCheckedAt` and `overall`; `container` carries the
/// probe details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    #[serde(flatten)]
    pub descriptor: ServiceDescriptor,
    pub container_state: ContainerStatus,
    pub container: ContainerState,
    pub reachable: bool,
    pub last_checked_at: DateTime<Utc>,
    pub overall: OverallStatus,
}

impl HealthRecord {
    pub fn new(
        descriptor: ServiceDescriptor,
        container: ContainerState,
        reachable: bool,
        last_checked_at: DateTime<Utc>,
    ) -> Self {
        let overall = OverallStatus::from_container(container.status);
        Self {
            descriptor,
            container_state: container.status,
            container,
            reachable,
            last_checked_at,
            overall,
        }
    }
}

/// Every configured service's [`HealthRecord`] from one aggregation cycle.
///
/// Serializes as a plain `{service_id: record}` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusSnapshot {
    records: BTreeMap<String, HealthRecord>,
}

impl StatusSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: HealthRecord) {
        self.records.insert(record.descriptor.id.clone(), record);
    }

    pub fn get(&self, service_id: &str) -> Option<&HealthRecord> {
        self.records.get(service_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &HealthRecord> {
        self.records.values()
    }

    /// Most recent `last_checked_at` across all records.
    pub fn checked_at(&self) -> Option<DateTime<Utc>> {
        self.records.values().map(|r| r.last_checked_at).max()
    }

    /// Number of records whose overall status is `status`.
    pub fn count(&self, status: OverallStatus) -> usize {
        self.records.values().filter(|r| r.overall == status).count()
    }
}

impl FromIterator<HealthRecord> for StatusSnapshot {
    fn from_iter<I: IntoIterator<Item = HealthRecord>>(iter: I) -> Self {
        let mut snapshot = StatusSnapshot::new();
        for record in iter {
            snapshot.insert(record);
        }
        snapshot
    }
}
