use clap::{Args, Subcommand};
use reqwest::Method;
use serde_json::Value;

use crate::cli::utils::{base_url, output_body, report_failure};
use crate::cli::OutputFormat;

#[derive(Args, Debug)]
pub struct Target {
    #[arg(help = "Customer id")]
    pub id: String,

    #[arg(long, help = "Server base URL (defaults to http://localhost:<API_PORT>)")]
    pub url: Option<String>,

    #[arg(long, env = "BIZDESK_TOKEN", help = "Access token")]
    pub token: String,
}

#[derive(Subcommand)]
pub enum CustomerCommands {
    #[command(about = "Show a customer with order statistics")]
    Get(Target),

    #[command(about = "Delete a customer with no orders")]
    Delete(Target),
}

pub async fn handle(cmd: CustomerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        CustomerCommands::Get(target) => call(Method::GET, target, output_format).await,
        CustomerCommands::Delete(target) => call(Method::DELETE, target, output_format).await,
    }
}

async fn call(method: Method, target: Target, output_format: OutputFormat) -> anyhow::Result<()> {
    let url = format!("{}/api/customers/{}", base_url(target.url), target.id);

    let response = reqwest::Client::new()
        .request(method, &url)
        .bearer_auth(&target.token)
        .send()
        .await?;
    let status = response.status();
    let body: Value = response.json().await?;

    if status.is_success() {
        return output_body(output_format, &body);
    }

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("Request failed");
    Err(report_failure(output_format, message, Some(status.as_u16())))
}
