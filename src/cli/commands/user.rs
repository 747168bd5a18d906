use clap::Subcommand;
use serde_json::json;
use std::sync::Arc;

use crate::auth::AuthService;
use crate::cli::utils::{open_store, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create an account")]
    Create {
        #[arg(long, help = "Account email")]
        email: String,
        #[arg(long, help = "Account password")]
        password: String,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Create { email, password } => {
            let (config, store) = open_store().await?;
            let auth = AuthService::new(store, Arc::new(config));
            let user = auth.register(&email, &password).await?;

            output_success(
                &output_format,
                &format!("Created user {}", user.email),
                Some(json!({ "user": user })),
            )
        }
    }
}
