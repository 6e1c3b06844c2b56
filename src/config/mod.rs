pub mod types;
pub mod parser;

pub use types::{CacheBackend, CheckerConfig, ClientConfig, Config, ServerConfig};
pub use parser::{load_config, resolve_config_path};
