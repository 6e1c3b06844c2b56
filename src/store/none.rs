use super::{CacheEntry, Store};
use crate::errors::CacheError;
use crate::models::CacheKey;

/// No-op backend for `cacheType: none`. Every lookup misses, every write
/// succeeds and discards.
pub struct NoneStore;

impl Store for NoneStore {
    fn get(&self, _key: &CacheKey) -> Option<CacheEntry> {
        None
    }

    fn put(&self, _key: &CacheKey, _entry: CacheEntry) -> Result<(), CacheError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Language, Verdict};

    #[test]
    fn test_always_misses() {
        let store = NoneStore;
        let key = CacheKey::new("abc", Language::Javascript);
        store.put(&key, CacheEntry::with_ttl(Verdict::Safe, None, 60)).unwrap();
        assert!(store.get(&key).is_none());
    }
}
