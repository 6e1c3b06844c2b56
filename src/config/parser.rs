use std::path::{Path, PathBuf};
use crate::errors::CacheError;
use super::types::Config;

/// Overrides the config file location, mirroring the original deployment's
/// environment-variable convention.
pub const CONFIG_ENV_VAR: &str = "VULN_REGEX_CACHE_CONFIG";

/// Pick the config file: explicit flag wins, then the env var, else none
/// (all defaults).
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.to_path_buf());
    }
    std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from)
}

pub async fn load_config(path: Option<&Path>) -> Result<Config, CacheError> {
    let Some(path) = resolve_config_path(path) else {
        return Ok(Config::default());
    };

    if !path.exists() {
        return Err(CacheError::Config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    let metadata = tokio::fs::metadata(&path).await?;
    if metadata.len() > 1_048_576 {
        return Err(CacheError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(&path).await?;
    let config: Config = serde_json::from_str(&content)
        .map_err(|e| CacheError::Config(format!("{}: {}", path.display(), e)))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_missing_path_yields_defaults() {
        // No env var set in tests, no explicit path: all-default config.
        let cfg = load_config(None).await.unwrap();
        assert!(cfg.client_config.is_none());
        assert!(cfg.server_config.is_none());
    }

    #[tokio::test]
    async fn test_explicit_path_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"clientConfig": {{"port": 8123}}}}"#).unwrap();
        let cfg = load_config(Some(file.path())).await.unwrap();
        assert_eq!(cfg.client_config.unwrap().port, Some(8123));
    }

    #[tokio::test]
    async fn test_nonexistent_explicit_path_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/config.json")))
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Config(_)));
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = load_config(Some(file.path())).await.unwrap_err();
        assert!(matches!(err, CacheError::Config(_)));
    }
}
