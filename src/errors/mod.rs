pub mod types;

pub use types::CacheError;
