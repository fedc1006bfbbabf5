use clap::Args;
use serde_json::json;
use uuid::Uuid;

use crate::auth::TokenIssuer;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "Account id the token is issued for")]
    pub user_id: Uuid,

    #[arg(long, help = "Account email")]
    pub email: String,

    #[arg(long, help = "Lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
    pub hours: Option<u64>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config().security;
    let hours = args.hours.unwrap_or(security.jwt_expiry_hours);

    let issuer = TokenIssuer::new(&security.jwt_secret, hours)?;
    let token = issuer.issue(args.user_id, &args.email)?;

    match output_format {
        OutputFormat::Json => output_success(
            output_format,
            "Token issued",
            Some(json!({ "token": token, "expiresInHours": hours })),
        ),
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
