use serde_json::json;
use tracing::info;

use crate::cli::commands::ReportArgs;
use crate::client::CacheClient;
use crate::config::{self, types::ClientConfig};
use crate::errors::CacheError;
use crate::models::{EvilInput, Language, Verdict};

pub async fn handle_report(args: ReportArgs) -> Result<(), CacheError> {
    let language = Language::parse(&args.language)
        .ok_or_else(|| CacheError::InvalidQuery(format!("Unknown language '{}'", args.language)))?;

    let result: Verdict = serde_json::from_str(&format!("\"{}\"", args.result.to_uppercase()))
        .map_err(|_| CacheError::InvalidQuery(format!("Unknown verdict '{}'", args.result)))?;

    let evil_input: Option<EvilInput> = match &args.evil_input {
        Some(path) => {
            let content = tokio::fs::read_to_string(path).await?;
            Some(serde_json::from_str(&content).map_err(|e| {
                CacheError::InvalidQuery(format!("Bad evilInput file {}: {}", path.display(), e))
            })?)
        }
        None => None,
    };

    let file_config = config::load_config(args.config.as_deref())
        .await?
        .client_config
        .unwrap_or_default();
    let client_config = ClientConfig {
        hostname: args.hostname.or_else(|| file_config.hostname.clone()),
        port: args.port.or(file_config.port),
        ..file_config
    };

    let client = CacheClient::new(&client_config);
    info!(pattern = %args.pattern, language = %language, result = %result, "Submitting verdict");
    let ack = client.submit(&args.pattern, language, result, evil_input).await?;

    println!("{}", json!({ "result": ack }));
    Ok(())
}
