pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "qrverify")]
#[command(about = "QR Verify CLI - administer certificates and verifications")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create or update the database schema")]
    Migrate,

    #[command(about = "Account management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },

    #[command(about = "Show dashboard statistics")]
    Stats,

    #[command(about = "Export every verification as CSV")]
    Export {
        #[arg(long, short, help = "Write to FILE instead of stdout")]
        output: Option<std::path::PathBuf>,
    },

    #[command(about = "Certificate QR code operations")]
    Qr {
        #[command(subcommand)]
        cmd: commands::qr::QrCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, output_format).await,
        Commands::Stats => commands::stats::handle(output_format).await,
        Commands::Export { output } => commands::export::handle(output, output_format).await,
        Commands::Qr { cmd } => commands::qr::handle(cmd, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_qr_render() {
        let cli = Cli::try_parse_from([
            "qrverify",
            "--json",
            "qr",
            "render",
            "0b6f6d0e-1c7a-4d7e-9a51-3f1f0b7f2c11",
            "--output",
            "out.png",
        ])
        .unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        assert!(matches!(cli.command, Commands::Qr { .. }));
    }

    #[test]
    fn user_create_requires_credentials() {
        assert!(Cli::try_parse_from(["qrverify", "user", "create", "--email", "a@b.co"]).is_err());
    }
}
