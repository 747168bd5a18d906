use serde_json::{json, Value};
use std::sync::Arc;

use crate::cli::OutputFormat;
use crate::config::{self, AppConfig};
use crate::store::{self, Store};

/// Environment-driven configuration plus the store it selects
pub async fn open_store() -> anyhow::Result<(AppConfig, Arc<dyn Store>)> {
    let config = config::config().clone();
    let store = store::connect(&config).await?;
    Ok((config, store))
}

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(object)) = (data, response.as_object_mut()) {
                object.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print `pairs` as aligned `key: value` lines or as one JSON object
pub fn output_fields(output_format: &OutputFormat, pairs: &[(&str, Value)]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let object: serde_json::Map<String, Value> = pairs
                .iter()
                .map(|(key, value)| (key.to_string(), value.clone()))
                .collect();
            println!("{}", serde_json::to_string_pretty(&Value::Object(object))?);
        }
        OutputFormat::Text => {
            let width = pairs.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
            for (key, value) in pairs {
                let shown = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                println!("{:<width$}  {}", key, shown, width = width);
            }
        }
    }
    Ok(())
}
