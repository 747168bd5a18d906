use serde_json::json;
use std::path::PathBuf;

use crate::cli::utils::{open_store, output_success};
use crate::cli::OutputFormat;
use crate::services::DashboardService;

pub async fn handle(output: Option<PathBuf>, output_format: OutputFormat) -> anyhow::Result<()> {
    let (config, store) = open_store().await?;
    let export = DashboardService::new(store, config.dashboard).export_csv().await?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, export.body.as_bytes()).await?;
            output_success(
                &output_format,
                &format!("Wrote {} verifications to {}", export.rows, path.display()),
                Some(json!({ "rows": export.rows, "path": path.display().to_string() })),
            )
        }
        None => {
            print!("{}", export.body);
            Ok(())
        }
    }
}
