//! Status command implementation

use crate::cli::output::{format_status_json, format_status_table, format_summary};
use crate::cli::StatusArgs;
use crate::health::StatusSnapshot;
use serde::Deserialize;
use std::time::Duration;

/// Body of an API error response.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

pub(crate) fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
}

/// Turn a non-success response into an error carrying the API's message.
pub(crate) async fn error_from_response(response: reqwest::Response) -> Box<dyn std::error::Error> {
    let status = response.status();
    match response.json::<ErrorBody>().await {
        Ok(body) => format!("{} ({})", body.error, status).into(),
        Err(_) => format!("monitor returned {}", status).into(),
    }
}

/// Fetch a fresh snapshot from a running monitor.
pub async fn fetch_status(base_url: &str) -> Result<StatusSnapshot, Box<dyn std::error::Error>> {
    let url = format!("{}/api/status", base_url.trim_end_matches('/'));
    let response = http_client()?.get(&url).send().await?;

    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    Ok(response.json().await?)
}

/// Handle `paladium status` command
pub async fn handle_status(args: &StatusArgs) -> Result<String, Box<dyn std::error::Error>> {
    let snapshot = fetch_status(&args.url).await?;

    if args.json {
        return Ok(format_status_json(&snapshot)?);
    }

    Ok(format!(
        "{}\n{}",
        format_status_table(&snapshot),
        format_summary(&snapshot)
    ))
}
