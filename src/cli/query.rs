use serde_json::json;
use tracing::info;

use crate::cli::commands::QueryArgs;
use crate::client::CacheClient;
use crate::config::{self, types::CacheBackend, types::ClientConfig};
use crate::errors::CacheError;
use crate::models::{Language, Verdict};

pub async fn handle_query(args: QueryArgs) -> Result<(), CacheError> {
    let language = Language::parse(&args.language)
        .ok_or_else(|| CacheError::InvalidQuery(format!("Unknown language '{}'", args.language)))?;

    let file_config = config::load_config(args.config.as_deref())
        .await?
        .client_config
        .unwrap_or_default();

    let cache_type: Option<CacheBackend> = args
        .cache_type
        .as_deref()
        .map(|s| s.parse().map_err(CacheError::Config))
        .transpose()?;

    // Flags override the file; anything still unset falls to defaults.
    let client_config = ClientConfig {
        hostname: args.hostname.or(file_config.hostname),
        port: args.port.or(file_config.port),
        cache_type: cache_type.or(file_config.cache_type),
        persistent_dir: args.cache_dir.or(file_config.persistent_dir),
        expiration_secs: args.expiration.or(file_config.expiration_secs),
    };

    let client = CacheClient::new(&client_config);
    info!(pattern = %args.pattern, language = %language, "Querying verdict cache");
    let verdict = client.check(&args.pattern, language).await;

    println!(
        "{}",
        json!({
            "pattern": args.pattern,
            "language": language.as_str(),
            "result": verdict.as_str(),
        })
    );

    if verdict == Verdict::Invalid {
        return Err(CacheError::InvalidQuery(
            "Query could not be resolved".into(),
        ));
    }
    Ok(())
}
