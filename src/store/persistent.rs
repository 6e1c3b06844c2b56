use std::fs;
use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use tracing::debug;
use super::{CacheEntry, Store};
use crate::errors::CacheError;
use crate::models::CacheKey;

/// On-disk file shape: the canonical key is stored alongside the entry so a
/// hash collision surfaces as a key mismatch instead of a wrong verdict.
#[derive(Debug, Serialize, Deserialize)]
struct FileEntry {
    key: String,
    value: CacheEntry,
}

/// Single-key-per-file store shared between processes. Writes are atomic
/// (unique temp file + rename); reads treat any IO or parse failure as a
/// miss. Expired files are left on disk and simply never match.
pub struct PersistentStore {
    dir: PathBuf,
}

impl PersistentStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }
}

impl Store for PersistentStore {
    fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let path = self.path_for(key);
        let content = fs::read_to_string(&path).ok()?;
        let file_entry: FileEntry = match serde_json::from_str(&content) {
            Ok(e) => e,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Unreadable cache file, treating as miss");
                return None;
            }
        };
        if file_entry.key != key.canonical() {
            // Hash collision with another key's file.
            debug!(path = %path.display(), "Cache file key mismatch, treating as miss");
            return None;
        }
        if file_entry.value.is_expired_now() {
            return None;
        }
        Some(file_entry.value)
    }

    fn put(&self, key: &CacheKey, entry: CacheEntry) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;

        let file_entry = FileEntry { key: key.canonical(), value: entry };
        let content = serde_json::to_string(&file_entry)?;

        // Concurrent writers each get their own temp file; the rename is the
        // only point where the entry becomes visible, so readers see either
        // the old or the new complete value.
        let tmp = self.dir.join(format!(
            ".tmp-{}-{}",
            std::process::id(),
            uuid::Uuid::new_v4()
        ));
        fs::write(&tmp, &content)?;
        if let Err(e) = fs::rename(&tmp, self.path_for(key)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Language, Verdict};

    fn store() -> (tempfile::TempDir, PersistentStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = PersistentStore::new(dir.path().to_path_buf());
        (dir, store)
    }

    #[test]
    fn test_put_then_get() {
        let (_dir, store) = store();
        let key = CacheKey::new("(a+)+$", Language::Javascript);
        store.put(&key, CacheEntry::with_ttl(Verdict::Vulnerable, None, 60)).unwrap();
        assert_eq!(store.get(&key).unwrap().response.result, Verdict::Vulnerable);
    }

    #[test]
    fn test_missing_file_is_a_miss() {
        let (_dir, store) = store();
        assert!(store.get(&CacheKey::new("never", Language::Go)).is_none());
    }

    #[test]
    fn test_unparseable_file_is_a_miss() {
        let (dir, store) = store();
        let key = CacheKey::new("abc", Language::Javascript);
        fs::write(dir.path().join(key.file_name()), "{ truncated").unwrap();
        assert!(store.get(&key).is_none());
    }

    #[test]
    fn test_expired_file_is_a_miss_and_stays_on_disk() {
        let (dir, store) = store();
        let key = CacheKey::new("abc", Language::Javascript);
        store.put(&key, CacheEntry::with_ttl(Verdict::Safe, None, -1)).unwrap();
        assert!(store.get(&key).is_none());
        assert!(dir.path().join(key.file_name()).exists());
    }

    #[test]
    fn test_directory_created_on_first_put() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = PersistentStore::new(nested.clone());
        let key = CacheKey::new("abc", Language::Javascript);
        store.put(&key, CacheEntry::with_ttl(Verdict::Safe, None, 60)).unwrap();
        assert!(nested.exists());
        assert!(store.get(&key).is_some());
    }

    #[test]
    fn test_file_payload_records_canonical_key() {
        let (dir, store) = store();
        let key = CacheKey::new("abc", Language::Javascript);
        store.put(&key, CacheEntry::with_ttl(Verdict::Safe, None, 60)).unwrap();
        let raw = fs::read_to_string(dir.path().join(key.file_name())).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["key"], "/abc/:javascript");
        assert_eq!(json["value"]["response"]["result"], "SAFE");
        assert!(json["value"]["validUntil"].is_i64());
    }

    #[test]
    fn test_concurrent_writers_never_leave_a_torn_file() {
        let (dir, _) = store();
        let dir_path = dir.path().to_path_buf();
        let key = CacheKey::new("contended", Language::Javascript);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let dir_path = dir_path.clone();
                let key = key.clone();
                std::thread::spawn(move || {
                    let store = PersistentStore::new(dir_path);
                    for _ in 0..50 {
                        let verdict = if i % 2 == 0 { Verdict::Safe } else { Verdict::Vulnerable };
                        store.put(&key, CacheEntry::with_ttl(verdict, None, 60)).unwrap();
                    }
                })
            })
            .collect();

        let reader_store = PersistentStore::new(dir_path.clone());
        for _ in 0..200 {
            if let Some(entry) = reader_store.get(&key) {
                assert!(entry.response.result.is_cacheable());
            }
        }
        for h in handles {
            h.join().unwrap();
        }

        // After the dust settles the file parses as a complete entry.
        let raw = fs::read_to_string(dir_path.join(key.file_name())).unwrap();
        let parsed: FileEntry = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.key, key.canonical());
    }
}
