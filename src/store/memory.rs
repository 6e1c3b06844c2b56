use dashmap::DashMap;
use super::{CacheEntry, Store};
use crate::errors::CacheError;
use crate::models::CacheKey;

/// Process-local volatile store. Same TTL contract as the persistent store:
/// expired entries read as misses and are left in place.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let entry = self.entries.get(&key.canonical())?;
        if entry.is_expired_now() {
            return None;
        }
        Some(entry.clone())
    }

    fn put(&self, key: &CacheKey, entry: CacheEntry) -> Result<(), CacheError> {
        self.entries.insert(key.canonical(), entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Language, Verdict};

    #[test]
    fn test_put_then_get() {
        let store = MemoryStore::new();
        let key = CacheKey::new("abc", Language::Javascript);
        store.put(&key, CacheEntry::with_ttl(Verdict::Safe, None, 60)).unwrap();
        let hit = store.get(&key).unwrap();
        assert_eq!(hit.response.result, Verdict::Safe);
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let store = MemoryStore::new();
        let key = CacheKey::new("abc", Language::Javascript);
        store.put(&key, CacheEntry::with_ttl(Verdict::Safe, None, -1)).unwrap();
        assert!(store.get(&key).is_none());
    }

    #[test]
    fn test_distinct_languages_do_not_collide() {
        let store = MemoryStore::new();
        let js = CacheKey::new("abc", Language::Javascript);
        let py = CacheKey::new("abc", Language::Python);
        store.put(&js, CacheEntry::with_ttl(Verdict::Vulnerable, None, 60)).unwrap();
        assert!(store.get(&py).is_none());
    }

    #[test]
    fn test_overwrite_replaces_entry() {
        let store = MemoryStore::new();
        let key = CacheKey::new("abc", Language::Javascript);
        store.put(&key, CacheEntry::with_ttl(Verdict::Safe, None, 60)).unwrap();
        store.put(&key, CacheEntry::with_ttl(Verdict::Vulnerable, None, 60)).unwrap();
        assert_eq!(store.get(&key).unwrap().response.result, Verdict::Vulnerable);
    }
}
