//! Health check command - checks a running docstash server.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::HealthArgs;

/// Route served by [`serve`](super::serve) for health checks.
pub const HEALTH_PATH: &str = "/_health";

/// Body of a `GET /_health` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    /// Top-level keys in the served document
    pub keys: usize,
}

impl HealthReport {
    pub fn healthy(keys: usize) -> Self {
        Self {
            status: "healthy".to_string(),
            keys,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Fetches the health report from the server at `base`.
///
/// # Errors
/// Fails if the server cannot be reached within `timeout`, answers with a
/// non-success status, or sends a body that is not a health report.
pub async fn check(base: &str, timeout: Duration) -> Result<HealthReport, String> {
    let url = format!("{}{HEALTH_PATH}", base.trim_end_matches('/'));
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| format!("failed to build HTTP client: {e}"))?;

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| format!("failed to connect to {url}: {e}"))?;
    if !response.status().is_success() {
        return Err(format!("server returned HTTP status {}", response.status()));
    }

    response
        .json()
        .await
        .map_err(|e| format!("unexpected response from {url}: {e}"))
}

/// Run the health check command
pub async fn run(args: &HealthArgs) -> Result<(), Box<dyn std::error::Error>> {
    let base = format!("http://{}:{}", args.host, args.port);
    match check(&base, Duration::from_secs(args.timeout)).await {
        Ok(report) if report.is_healthy() => {
            println!("healthy: {} top-level keys", report.keys);
            Ok(())
        }
        Ok(report) => {
            eprintln!("unhealthy: server returned status {}", report.status);
            std::process::exit(1);
        }
        Err(reason) => {
            eprintln!("unhealthy: {reason}");
            std::process::exit(1);
        }
    }
}
