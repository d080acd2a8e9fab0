//! Health check command - asks a running Feline server for `/health`.

use std::{process::ExitCode, time::Duration};

use serde::Deserialize;

use crate::cli::HealthArgs;

/// Body of the server's `/health` reply
#[derive(Debug, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub sessions: usize,
    pub logins: usize,
}

fn health_url(base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.ends_with("/health") {
        base.to_string()
    } else {
        format!("{base}/health")
    }
}

/// Run the health check command
///
/// Exit code 0 when the server reports `healthy`, 1 otherwise.
pub async fn run(args: &HealthArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let url = health_url(&args.url);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()?;

    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(e) => {
            eprintln!("unhealthy: failed to connect to {url}: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    if !response.status().is_success() {
        eprintln!("unhealthy: server returned HTTP status {}", response.status());
        return Ok(ExitCode::FAILURE);
    }

    let report: HealthReport = response.json().await?;
    if report.status != "healthy" {
        eprintln!("unhealthy: server reported status {}", report.status);
        return Ok(ExitCode::FAILURE);
    }

    println!(
        "healthy: {} sessions, {} active logins",
        report.sessions, report.logins
    );
    Ok(ExitCode::SUCCESS)
}
