use clap::Args;
use serde_json::Value;

use crate::cli::utils::{base_url, output_body, report_failure};
use crate::cli::OutputFormat;

#[derive(Args, Debug)]
pub struct HealthArgs {
    #[arg(long, help = "Server base URL (defaults to http://localhost:<API_PORT>)")]
    pub url: Option<String>,
}

pub async fn handle(args: HealthArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let url = format!("{}/health", base_url(args.url));
    let response = reqwest::get(&url).await?;
    let status = response.status();
    let body: Value = response.json().await?;

    if status.is_success() {
        output_body(output_format, &body)
    } else {
        Err(report_failure(output_format, "Server is degraded", Some(status.as_u16())))
    }
}
