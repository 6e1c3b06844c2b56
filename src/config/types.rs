use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_HOSTNAME: &str = "toybox.cs.vt.edu";
pub const DEFAULT_PORT: u16 = 8000;
/// Seven days.
pub const DEFAULT_EXPIRATION_SECS: i64 = 7 * 24 * 60 * 60;
pub const DEFAULT_N_PUMPS: u64 = 250_000;
pub const DEFAULT_TIME_LIMIT_SECS: u64 = 1;

/// Top-level config file: `{"clientConfig": {...}, "serverConfig": {...}}`.
/// Every field is optional; missing fields are repaired from defaults rather
/// than rejected.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub client_config: Option<ClientConfig>,
    pub server_config: Option<ServerConfig>,
    pub checker_config: Option<CheckerConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Persistent,
    Memory,
    None,
}

impl CacheBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Persistent => "persistent",
            Self::Memory => "memory",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "persistent" => Ok(Self::Persistent),
            "memory" => Ok(Self::Memory),
            "none" => Ok(Self::None),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub hostname: Option<String>,
    pub port: Option<u16>,
    pub cache_type: Option<CacheBackend>,
    pub persistent_dir: Option<PathBuf>,
    /// Accepts the legacy `expirationTime` spelling on the wire.
    #[serde(alias = "expirationTime")]
    pub expiration_secs: Option<i64>,
}

/// Fully-defaulted view of a client config. Produced by
/// [`ClientConfig::resolved`]; the rest of the client only ever sees this.
#[derive(Debug, Clone)]
pub struct ResolvedClientConfig {
    pub hostname: String,
    pub port: u16,
    pub cache_type: CacheBackend,
    pub persistent_dir: PathBuf,
    pub expiration_secs: i64,
}

impl ClientConfig {
    /// Repair a partial config field-by-field from defaults.
    pub fn resolved(&self) -> ResolvedClientConfig {
        ResolvedClientConfig {
            hostname: self
                .hostname
                .clone()
                .filter(|h| !h.is_empty())
                .unwrap_or_else(|| DEFAULT_HOSTNAME.to_string()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            cache_type: self.cache_type.unwrap_or_default(),
            persistent_dir: self
                .persistent_dir
                .clone()
                .unwrap_or_else(|| std::env::temp_dir().join("vuln-regex-cache")),
            expiration_secs: self.expiration_secs.unwrap_or(DEFAULT_EXPIRATION_SECS),
        }
    }
}

impl ResolvedClientConfig {
    pub fn lookup_url(&self) -> String {
        format!("http://{}:{}/api/lookup", self.hostname, self.port)
    }

    pub fn update_url(&self) -> String {
        format!("http://{}:{}/api/update", self.hostname, self.port)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    pub port: Option<u16>,
    /// Recorded for the fronting proxy; the binary itself serves plain HTTP.
    pub tls_key_path: Option<PathBuf>,
    pub tls_cert_path: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub trusted_collection: Option<String>,
    pub untrusted_collection: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: Some(DEFAULT_PORT),
            tls_key_path: None,
            tls_cert_path: None,
            db_path: Some(PathBuf::from("./vuln-regex-cache.db")),
            trusted_collection: Some("lookup".to_string()),
            untrusted_collection: Some("upload".to_string()),
        }
    }
}

impl ServerConfig {
    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn db_path_or_default(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("./vuln-regex-cache.db"))
    }

    pub fn trusted_collection_or_default(&self) -> String {
        self.trusted_collection
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "lookup".to_string())
    }

    pub fn untrusted_collection_or_default(&self) -> String {
        self.untrusted_collection
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "upload".to_string())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckerConfig {
    /// Argv prefix for the detector driver; the query file path is appended.
    pub check_cmd: Option<Vec<String>>,
    /// Argv prefix for the evidence-replay driver.
    pub validate_cmd: Option<Vec<String>>,
    pub n_pumps: Option<u64>,
    pub time_limit_secs: Option<u64>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            check_cmd: None,
            validate_cmd: None,
            n_pumps: Some(DEFAULT_N_PUMPS),
            time_limit_secs: Some(DEFAULT_TIME_LIMIT_SECS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_client_config_resolves_to_defaults() {
        let resolved = ClientConfig::default().resolved();
        assert_eq!(resolved.hostname, DEFAULT_HOSTNAME);
        assert_eq!(resolved.port, DEFAULT_PORT);
        assert_eq!(resolved.cache_type, CacheBackend::Persistent);
        assert_eq!(resolved.expiration_secs, DEFAULT_EXPIRATION_SECS);
    }

    #[test]
    fn test_partial_config_repaired_field_by_field() {
        let partial = ClientConfig {
            port: Some(9000),
            cache_type: Some(CacheBackend::Memory),
            ..Default::default()
        };
        let resolved = partial.resolved();
        assert_eq!(resolved.port, 9000);
        assert_eq!(resolved.cache_type, CacheBackend::Memory);
        assert_eq!(resolved.hostname, DEFAULT_HOSTNAME);
    }

    #[test]
    fn test_negative_expiration_is_preserved() {
        // An already-expired TTL is a valid setting; it forces misses.
        let partial = ClientConfig { expiration_secs: Some(-1), ..Default::default() };
        assert_eq!(partial.resolved().expiration_secs, -1);
    }

    #[test]
    fn test_lookup_url() {
        let partial = ClientConfig {
            hostname: Some("localhost".into()),
            port: Some(8123),
            ..Default::default()
        };
        assert_eq!(partial.resolved().lookup_url(), "http://localhost:8123/api/lookup");
    }

    #[test]
    fn test_cache_backend_from_str() {
        assert_eq!("memory".parse::<CacheBackend>().unwrap(), CacheBackend::Memory);
        assert_eq!("NONE".parse::<CacheBackend>().unwrap(), CacheBackend::None);
        assert!("disk".parse::<CacheBackend>().is_err());
    }

    #[test]
    fn test_server_config_collection_defaults() {
        let cfg = ServerConfig { trusted_collection: None, ..Default::default() };
        assert_eq!(cfg.trusted_collection_or_default(), "lookup");
        assert_eq!(cfg.untrusted_collection_or_default(), "upload");
    }

    #[test]
    fn test_config_file_wire_form() {
        let raw = r#"{"clientConfig": {"hostname": "h", "cacheType": "memory"}}"#;
        let cfg: Config = serde_json::from_str(raw).unwrap();
        let client = cfg.client_config.unwrap();
        assert_eq!(client.hostname.as_deref(), Some("h"));
        assert_eq!(client.cache_type, Some(CacheBackend::Memory));
    }

    #[test]
    fn test_expiration_accepts_legacy_wire_name() {
        let raw = r#"{"clientConfig": {"expirationTime": 60}}"#;
        let cfg: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.client_config.unwrap().expiration_secs, Some(60));

        let raw = r#"{"clientConfig": {"expirationSecs": 90}}"#;
        let cfg: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.client_config.unwrap().expiration_secs, Some(90));
    }
}
