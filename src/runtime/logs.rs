//! Container log tail retrieval.

use super::{locate_container, ContainerRuntime, RuntimeError};
use crate::config::ServiceDescriptor;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Lines returned when the caller does not ask for a specific count.
pub const DEFAULT_LOG_LINES: usize = 100;

/// Errors from [`LogFetcher::fetch`].
#[derive(Debug, Clone, Error)]
pub enum LogError {
    /// The service id is not in the configuration
    #[error("service not configured: {0}")]
    ServiceNotConfigured(String),

    /// No runtime container matches the service's container name
    #[error("no container found for service '{0}'")]
    NotFound(String),

    #[error("failed to fetch logs: {0}")]
    Fetch(#[from] RuntimeError),
}

fn ansi_color_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid regex"))
}

/// Multiplexed stream headers and other control bytes below tab.
fn is_framing_char(c: char) -> bool {
    c <= '\x08'
}

/// Clean raw container output into display lines.
///
/// Strips stream framing bytes (`\x00`..=`\x08`) and ANSI color escapes,
/// drops blank lines and keeps the most recent `max_lines`.
pub fn sanitize_log_output(raw: &[u8], max_lines: usize) -> Vec<String> {
    let text = String::from_utf8_lossy(raw);
    let without_framing: String = text.chars().filter(|c| !is_framing_char(*c)).collect();
    let cleaned = ansi_color_pattern().replace_all(&without_framing, "");

    let lines: Vec<String> = cleaned
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect();

    let skip = lines.len().saturating_sub(max_lines);
    lines.into_iter().skip(skip).collect()
}

/// Fetches sanitized log tails for configured services.
#[derive(Clone)]
pub struct LogFetcher {
    runtime: Arc<dyn ContainerRuntime>,
    services: Arc<[ServiceDescriptor]>,
    max_lines: usize,
}

impl LogFetcher {
    pub fn new(
        runtime: Arc<dyn ContainerRuntime>,
        services: Arc<[ServiceDescriptor]>,
        max_lines: usize,
    ) -> Self {
        Self {
            runtime,
            services,
            max_lines: max_lines.max(1),
        }
    }

    /// Clamp a requested line count to `[1, max_lines]`.
    pub fn clamp_lines(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(DEFAULT_LOG_LINES)
            .clamp(1, self.max_lines)
    }

    /// Return the last `lines` non-blank log lines of `service_id`'s container.
    pub async fn fetch(
        &self,
        service_id: &str,
        lines: Option<usize>,
    ) -> Result<Vec<String>, LogError> {
        let service = self
            .services
            .iter()
            .find(|s| s.id == service_id)
            .ok_or_else(|| LogError::ServiceNotConfigured(service_id.to_string()))?;

        let lines = self.clamp_lines(lines);
        let container = locate_container(self.runtime.as_ref(), &service.container_name)
            .await?
            .ok_or_else(|| LogError::NotFound(service_id.to_string()))?;

        let raw = self.runtime.logs(&container.id, lines).await?;
        let logs = sanitize_log_output(&raw, lines);

        tracing::debug!(
            service_id = service_id,
            container = %container.id,
            lines = logs.len(),
            "Fetched container logs"
        );

        Ok(logs)
    }
}
