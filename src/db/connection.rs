use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use crate::errors::CacheError;

/// Names of the trusted and untrusted tables. Configurable so several
/// deployments can share one database file.
#[derive(Debug, Clone)]
pub struct Collections {
    pub trusted: String,
    pub untrusted: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self { trusted: "lookup".to_string(), untrusted: "upload".to_string() }
    }
}

impl Collections {
    fn validate(&self) -> Result<(), CacheError> {
        for name in [&self.trusted, &self.untrusted] {
            let mut chars = name.chars();
            let head_ok = chars
                .next()
                .map(|c| c.is_ascii_alphabetic() || c == '_')
                .unwrap_or(false);
            if !head_ok || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(CacheError::Config(format!(
                    "Invalid collection name '{}'",
                    name
                )));
            }
        }
        if self.trusted == self.untrusted {
            return Err(CacheError::Config(
                "Trusted and untrusted collections must differ".into(),
            ));
        }
        Ok(())
    }
}

/// Two-tier verdict storage: the authoritative trusted table and the
/// quarantine untrusted table, both in one SQLite database.
pub struct Database {
    pub(crate) conn: Arc<Mutex<Connection>>,
    pub(crate) collections: Collections,
}

impl Database {
    pub fn new(path: &Path, collections: Collections) -> Result<Self, CacheError> {
        collections.validate()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| CacheError::BackendUnavailable(format!("Failed to open database: {}", e)))?;

        // WAL mode for better concurrency
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .map_err(|e| CacheError::Database(format!("Failed to set pragmas: {}", e)))?;

        let db = Self { conn: Arc::new(Mutex::new(conn)), collections };
        db.initialize()?;
        Ok(db)
    }

    pub fn in_memory(collections: Collections) -> Result<Self, CacheError> {
        collections.validate()?;
        let conn = Connection::open_in_memory()
            .map_err(|e| CacheError::Database(format!("Failed to open in-memory db: {}", e)))?;
        let db = Self { conn: Arc::new(Mutex::new(conn)), collections };
        db.initialize()?;
        Ok(db)
    }

    fn initialize(&self) -> Result<(), CacheError> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(&super::schema::create_tables(&self.collections))
            .map_err(|e| CacheError::Database(format!("Failed to create tables: {}", e)))?;
        Ok(())
    }

    pub fn conn(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }

    pub fn collections(&self) -> &Collections {
        &self.collections
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self { conn: self.conn.clone(), collections: self.collections.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_creates_tables() {
        let db = Database::in_memory(Collections::default()).unwrap();
        assert_eq!(db.claim_count().unwrap(), 0);
        assert_eq!(db.trusted_count().unwrap(), 0);
    }

    #[test]
    fn test_rejects_hostile_collection_name() {
        let collections = Collections {
            trusted: "lookup; DROP TABLE x".into(),
            untrusted: "upload".into(),
        };
        assert!(matches!(
            Database::in_memory(collections),
            Err(CacheError::Config(_))
        ));
    }

    #[test]
    fn test_rejects_identical_collection_names() {
        let collections = Collections { trusted: "same".into(), untrusted: "same".into() };
        assert!(Database::in_memory(collections).is_err());
    }
}
