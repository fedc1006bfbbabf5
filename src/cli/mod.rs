pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "bizdesk")]
#[command(about = "BizDesk CLI - operator tooling for the customer API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Mint a signed access token with the configured secret")]
    Token(commands::token::TokenArgs),

    #[command(about = "Query the server health endpoint")]
    Health(commands::health::HealthArgs),

    #[command(about = "Customer record operations")]
    Customer {
        #[command(subcommand)]
        cmd: commands::customer::CustomerCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Token(args) => commands::token::handle(args, output_format),
        Commands::Health(args) => commands::health::handle(args, output_format).await,
        Commands::Customer { cmd } => commands::customer::handle(cmd, output_format).await,
    }
}
