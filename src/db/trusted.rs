use chrono::Utc;
use crate::errors::CacheError;
use crate::models::{CacheKey, EvilInput, Language, TrustedRecord, Verdict};
use super::Database;

/// Outcome of an attempted write to the trusted table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Promotion {
    Inserted,
    Replaced,
    /// A `SAFE` determination arrived for a key already trusted as
    /// `VULNERABLE`. Vulnerable records are sticky: only another vulnerable
    /// determination (e.g. refreshed evidence) may replace them.
    KeptExistingVulnerable,
}

impl Database {
    pub fn get_trusted(&self, key: &CacheKey) -> Result<Option<TrustedRecord>, CacheError> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "SELECT pattern, language, result, evil_input FROM {} WHERE key = ?1",
            self.collections.trusted
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| CacheError::Database(format!("Query failed: {}", e)))?;

        let row = stmt.query_row(rusqlite::params![key.canonical()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        });

        match row {
            Ok((pattern, language, result, evil_input)) => {
                Ok(Some(decode_record(pattern, &language, &result, evil_input)?))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(CacheError::Database(format!("Query error: {}", e))),
        }
    }

    /// Insert-or-replace `record`, keyed by its composite key, applying the
    /// monotonic merge rule: `SAFE` never overwrites an existing
    /// `VULNERABLE` row. The read-then-write runs under the connection lock,
    /// so concurrent promoters in this process serialize here.
    pub fn promote(&self, record: &TrustedRecord) -> Result<Promotion, CacheError> {
        debug_assert!(record.result.is_cacheable());
        let key = record.key().canonical();
        let conn = self.conn.lock().unwrap();

        let existing_sql = format!(
            "SELECT result FROM {} WHERE key = ?1",
            self.collections.trusted
        );
        let existing: Option<String> = match conn.query_row(
            &existing_sql,
            rusqlite::params![key],
            |row| row.get(0),
        ) {
            Ok(r) => Some(r),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(CacheError::Database(format!("Query error: {}", e))),
        };

        if existing.as_deref() == Some(Verdict::Vulnerable.as_str())
            && record.result == Verdict::Safe
        {
            return Ok(Promotion::KeptExistingVulnerable);
        }

        let evil_input = record
            .evil_input
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let upsert_sql = format!(
            "INSERT INTO {} (key, pattern, language, result, evil_input, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(key) DO UPDATE SET
                 result = excluded.result,
                 evil_input = excluded.evil_input,
                 updated_at = excluded.updated_at",
            self.collections.trusted
        );
        conn.execute(
            &upsert_sql,
            rusqlite::params![
                key,
                record.pattern,
                record.language.as_str(),
                record.result.as_str(),
                evil_input,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| CacheError::Database(format!("Upsert failed: {}", e)))?;

        Ok(if existing.is_some() { Promotion::Replaced } else { Promotion::Inserted })
    }

    pub fn trusted_count(&self) -> Result<usize, CacheError> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("SELECT COUNT(*) FROM {}", self.collections.trusted);
        let count: i64 = conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|e| CacheError::Database(format!("Count failed: {}", e)))?;
        Ok(count as usize)
    }
}

fn decode_record(
    pattern: String,
    language: &str,
    result: &str,
    evil_input: Option<String>,
) -> Result<TrustedRecord, CacheError> {
    let language = Language::parse(language)
        .ok_or_else(|| CacheError::Database(format!("Corrupt language tag '{}'", language)))?;
    let result: Verdict = serde_json::from_str(&format!("\"{}\"", result))
        .map_err(|_| CacheError::Database(format!("Corrupt verdict '{}'", result)))?;
    let evil_input: Option<EvilInput> =
        evil_input.as_deref().map(serde_json::from_str).transpose()?;
    Ok(TrustedRecord { pattern, language, result, evil_input })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Collections;
    use crate::models::{EvilInput, PumpPair};

    fn db() -> Database {
        Database::in_memory(Collections::default()).unwrap()
    }

    fn evidence() -> EvilInput {
        EvilInput {
            pump_pairs: vec![PumpPair { prefix: "".into(), pump: "a".into() }],
            suffix: "!".into(),
        }
    }

    fn safe_record(pattern: &str) -> TrustedRecord {
        TrustedRecord {
            pattern: pattern.into(),
            language: Language::Javascript,
            result: Verdict::Safe,
            evil_input: None,
        }
    }

    fn vuln_record(pattern: &str) -> TrustedRecord {
        TrustedRecord {
            pattern: pattern.into(),
            language: Language::Javascript,
            result: Verdict::Vulnerable,
            evil_input: Some(evidence()),
        }
    }

    #[test]
    fn test_promote_then_get_roundtrips() {
        let db = db();
        assert_eq!(db.promote(&vuln_record("(a+)+$")).unwrap(), Promotion::Inserted);
        let rec = db
            .get_trusted(&CacheKey::new("(a+)+$", Language::Javascript))
            .unwrap()
            .unwrap();
        assert_eq!(rec.result, Verdict::Vulnerable);
        assert_eq!(rec.evil_input, Some(evidence()));
    }

    #[test]
    fn test_get_missing_key_is_none() {
        let db = db();
        assert!(db.get_trusted(&CacheKey::new("nope", Language::Go)).unwrap().is_none());
    }

    #[test]
    fn test_safe_does_not_overwrite_vulnerable() {
        let db = db();
        db.promote(&vuln_record("(a+)+$")).unwrap();
        assert_eq!(
            db.promote(&safe_record("(a+)+$")).unwrap(),
            Promotion::KeptExistingVulnerable
        );
        let rec = db
            .get_trusted(&CacheKey::new("(a+)+$", Language::Javascript))
            .unwrap()
            .unwrap();
        assert_eq!(rec.result, Verdict::Vulnerable);
        assert!(rec.evil_input.is_some());
    }

    #[test]
    fn test_vulnerable_overwrites_safe() {
        let db = db();
        db.promote(&safe_record("(a+)+$")).unwrap();
        assert_eq!(db.promote(&vuln_record("(a+)+$")).unwrap(), Promotion::Replaced);
        let rec = db
            .get_trusted(&CacheKey::new("(a+)+$", Language::Javascript))
            .unwrap()
            .unwrap();
        assert_eq!(rec.result, Verdict::Vulnerable);
    }

    #[test]
    fn test_safe_replaces_safe() {
        let db = db();
        db.promote(&safe_record("abc")).unwrap();
        assert_eq!(db.promote(&safe_record("abc")).unwrap(), Promotion::Replaced);
        assert_eq!(db.trusted_count().unwrap(), 1);
    }
}
