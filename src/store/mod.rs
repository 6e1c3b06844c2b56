pub mod entry;
pub mod memory;
pub mod none;
pub mod persistent;

pub use entry::{CacheEntry, CachedResponse};
pub use memory::MemoryStore;
pub use none::NoneStore;
pub use persistent::PersistentStore;

use crate::config::types::{CacheBackend, ResolvedClientConfig};
use crate::errors::CacheError;
use crate::models::CacheKey;

/// Client-side verdict store. Implementations are synchronous: a store
/// operation never suspends, only the network round trip does.
pub trait Store: Send + Sync {
    /// Non-expired entry for `key`, or miss. Expired entries behave exactly
    /// like misses; implementations need not delete them.
    fn get(&self, key: &CacheKey) -> Option<CacheEntry>;

    /// Write `entry` under `key`. Callers treat failures as best-effort:
    /// a store write error never fails the surrounding query.
    fn put(&self, key: &CacheKey, entry: CacheEntry) -> Result<(), CacheError>;
}

/// Select the store backend for a resolved client config.
pub fn for_config(config: &ResolvedClientConfig) -> Box<dyn Store> {
    match config.cache_type {
        CacheBackend::Persistent => Box::new(PersistentStore::new(config.persistent_dir.clone())),
        CacheBackend::Memory => Box::new(MemoryStore::new()),
        CacheBackend::None => Box::new(NoneStore),
    }
}
