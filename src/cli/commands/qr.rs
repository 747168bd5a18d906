use clap::Subcommand;
use serde_json::json;
use std::path::PathBuf;
use uuid::Uuid;

use crate::cli::utils::{open_store, output_success};
use crate::cli::OutputFormat;
use crate::services::{CertificateService, DashboardService};

#[derive(Subcommand)]
pub enum QrCommands {
    #[command(about = "Write a certificate's QR image as PNG")]
    Render {
        #[arg(help = "Certificate id")]
        id: Uuid,
        #[arg(long, short, help = "PNG file to write")]
        output: PathBuf,
        #[arg(long, help = "Origin for codes without a stored image, e.g. https://verify.example.com")]
        origin: Option<String>,
    },

    #[command(about = "Activate or deactivate a certificate")]
    Toggle {
        #[arg(help = "Certificate id")]
        id: Uuid,
    },
}

pub async fn handle(cmd: QrCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let (config, store) = open_store().await?;

    match cmd {
        QrCommands::Render { id, output, origin } => {
            let origin = origin
                .or_else(|| config.server.public_origin.clone())
                .unwrap_or_else(|| format!("http://localhost:{}", config.server.port));
            let service = CertificateService::new(store, std::sync::Arc::new(config));
            let (qr_code, png) = service.image_png(id, &origin).await?;
            tokio::fs::write(&output, &png).await?;

            output_success(
                &output_format,
                &format!("Wrote QR for '{}' to {}", qr_code.title, output.display()),
                Some(json!({ "id": id, "path": output.display().to_string(), "bytes": png.len() })),
            )
        }
        QrCommands::Toggle { id } => {
            let result = DashboardService::new(store, config.dashboard).toggle(id).await?;
            let state = if result.is_active { "active" } else { "inactive" };

            output_success(
                &output_format,
                &format!("QR code {} is now {}", id, state),
                Some(json!({ "id": result.id, "is_active": result.is_active })),
            )
        }
    }
}
