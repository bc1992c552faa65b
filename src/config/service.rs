//! Monitored service definitions

use serde::{Deserialize, Serialize};

/// A media-pipeline service watched by the monitor.
///
/// Loaded once from `[[services]]` and never mutated afterwards.
/// Serialized in camelCase; the snake_case keys used in TOML are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDescriptor {
    /// Unique service id, used as the snapshot key and in API paths
    pub id: String,
    /// Display name shown on dashboard cards
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Port the service is expected to listen on
    pub port: u16,
    /// Stream URL shown to operators (e.g. `rtsp://localhost:8554/cam1`)
    #[serde(default, alias = "health_endpoint")]
    pub health_endpoint: String,
    /// Logical container name, matched against runtime names by
    /// [`crate::runtime::container_name_matches`]
    #[serde(alias = "container_name")]
    pub container_name: String,
}

impl ServiceDescriptor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        port: u16,
        container_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            port,
            health_endpoint: String::new(),
            container_name: container_name.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_health_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.health_endpoint = endpoint.into();
        self
    }
}

/// The two pipeline services shipped with the stock compose project.
pub fn default_services() -> Vec<ServiceDescriptor> {
    vec![
        ServiceDescriptor::new("rtsp-server", "Pipeline RTSP", 8554, "rtsp-server")
            .with_description("Loops an MP4 file as an RTSP stream")
            .with_health_endpoint("rtsp://localhost:8554/cam1"),
        ServiceDescriptor::new("rtsp-to-srt", "Pipeline RTSP-to-SRT", 9999, "rtsp-to-srt")
            .with_description("Bridges the RTSP stream to SRT")
            .with_health_endpoint("srt://localhost:9999"),
    ]
}
