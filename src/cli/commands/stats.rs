use serde_json::json;

use crate::cli::utils::{open_store, output_fields};
use crate::cli::OutputFormat;
use crate::services::DashboardService;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let (config, store) = open_store().await?;
    let stats = DashboardService::new(store, config.dashboard).stats().await?;

    output_fields(
        &output_format,
        &[
            ("total_qr_codes", json!(stats.total_qr_codes)),
            ("active_qr_codes", json!(stats.active_qr_codes)),
            ("total_verifications", json!(stats.total_verifications)),
            ("today_verifications", json!(stats.today_verifications)),
        ],
    )
}
