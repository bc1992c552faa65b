//! Logs command implementation

use crate::api::LogsResponse;
use crate::cli::status::{error_from_response, http_client};
use crate::cli::LogsArgs;

/// Fetch a service's log tail from a running monitor.
pub async fn fetch_logs(
    base_url: &str,
    service: &str,
    lines: Option<usize>,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let url = format!("{}/api/logs/{}", base_url.trim_end_matches('/'), service);
    let mut request = http_client()?.get(&url);
    if let Some(lines) = lines {
        request = request.query(&[("lines", lines)]);
    }

    let response = request.send().await?;
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    let body: LogsResponse = response.json().await?;
    Ok(body.logs)
}

/// Handle `paladium logs` command
pub async fn handle_logs(args: &LogsArgs) -> Result<String, Box<dyn std::error::Error>> {
    let logs = fetch_logs(&args.url, &args.service, args.lines).await?;
    Ok(logs.join("\n"))
}
