//! Output formatting helpers for CLI commands

use crate::health::{OverallStatus, StatusSnapshot};
use chrono::{DateTime, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};

/// Colored label for an overall status
pub fn overall_label(status: OverallStatus) -> String {
    match status {
        OverallStatus::Healthy => "Healthy".green().to_string(),
        OverallStatus::Unhealthy => "Unhealthy".red().to_string(),
        OverallStatus::NotFound => "Not found".yellow().to_string(),
        OverallStatus::Error => "Error".magenta().to_string(),
    }
}

/// Format duration in a human-readable way
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

fn uptime(started_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match started_at {
        Some(started) => {
            let seconds = (now - started).num_seconds().max(0) as u64;
            format_duration(seconds)
        }
        None => "-".to_string(),
    }
}

/// Format a status snapshot as a table
pub fn format_status_table(snapshot: &StatusSnapshot) -> String {
    let now = Utc::now();
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Service", "Name", "Port", "Status", "Container", "Reachable", "Up"]);

    for record in snapshot.records() {
        let container = match (&record.container.error, &record.container.runtime_state) {
            (Some(error), _) => error.clone(),
            (None, Some(state)) => state.clone(),
            (None, None) => "-".to_string(),
        };
        let reachable = if record.reachable { "✓".green() } else { "✗".red() };
        let up = match record.overall {
            OverallStatus::Healthy => uptime(record.container.started_at, now),
            _ => "-".to_string(),
        };

        table.add_row(vec![
            Cell::new(&record.descriptor.id),
            Cell::new(&record.descriptor.name),
            Cell::new(record.descriptor.port),
            Cell::new(overall_label(record.overall)),
            Cell::new(container),
            Cell::new(reachable.to_string()),
            Cell::new(up),
        ]);
    }

    table.to_string()
}

/// Format a status snapshot as pretty JSON
pub fn format_status_json(snapshot: &StatusSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(snapshot)
}

/// One-line summary such as `2/3 healthy`
pub fn format_summary(snapshot: &StatusSnapshot) -> String {
    let healthy = snapshot.count(OverallStatus::Healthy);
    let total = snapshot.len();
    let summary = format!("{}/{} healthy", healthy, total);
    if healthy == total && total > 0 {
        summary.green().to_string()
    } else {
        summary.yellow().to_string()
    }
}
