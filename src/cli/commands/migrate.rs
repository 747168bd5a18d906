use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::{self, StoreBackend};
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();
    if config.database.backend != StoreBackend::Postgres {
        anyhow::bail!("migrate requires DATABASE_BACKEND=postgres");
    }

    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::migrate(&pool).await?;

    output_success(&output_format, "Database schema is up to date", None)
}
