use chrono::Utc;
use tracing::warn;
use crate::errors::CacheError;
use crate::models::{EvilInput, Language, UntrustedClaim, Verdict};
use super::Database;

impl Database {
    /// Quarantine a client claim for the reconciliation job. Claims are
    /// row-per-submission: racing submitters both land and the job
    /// adjudicates each independently.
    pub fn stage_claim(&self, claim: &UntrustedClaim) -> Result<(), CacheError> {
        let evil_input = claim
            .evil_input
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "INSERT INTO {} (id, pattern, language, result, evil_input, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            self.collections.untrusted
        );
        conn.execute(
            &sql,
            rusqlite::params![
                claim.id,
                claim.pattern,
                claim.language.as_str(),
                claim.result.as_str(),
                evil_input,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| CacheError::Database(format!("Stage failed: {}", e)))?;
        Ok(())
    }

    /// All pending claims, oldest first. Rows that no longer decode (schema
    /// drift, manual edits) are returned with result `INVALID` so the job
    /// deletes them as malformed instead of skipping them forever.
    pub fn list_claims(&self) -> Result<Vec<UntrustedClaim>, CacheError> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "SELECT id, pattern, language, result, evil_input FROM {} ORDER BY created_at ASC",
            self.collections.untrusted
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| CacheError::Database(format!("Query failed: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            })
            .map_err(|e| CacheError::Database(format!("Query failed: {}", e)))?;

        let mut claims = Vec::new();
        for row in rows {
            let (id, pattern, language, result, evil_input) =
                row.map_err(|e| CacheError::Database(format!("Row error: {}", e)))?;
            claims.push(decode_claim(id, pattern, &language, &result, evil_input));
        }
        Ok(claims)
    }

    /// Returns whether a row was actually removed.
    pub fn delete_claim(&self, id: &str) -> Result<bool, CacheError> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("DELETE FROM {} WHERE id = ?1", self.collections.untrusted);
        let n = conn
            .execute(&sql, rusqlite::params![id])
            .map_err(|e| CacheError::Database(format!("Delete failed: {}", e)))?;
        Ok(n > 0)
    }

    pub fn claim_count(&self) -> Result<usize, CacheError> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("SELECT COUNT(*) FROM {}", self.collections.untrusted);
        let count: i64 = conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|e| CacheError::Database(format!("Count failed: {}", e)))?;
        Ok(count as usize)
    }
}

fn decode_claim(
    id: String,
    pattern: String,
    language: &str,
    result: &str,
    evil_input: Option<String>,
) -> UntrustedClaim {
    let decoded_language = Language::parse(language);
    let decoded_result: Option<Verdict> =
        serde_json::from_str(&format!("\"{}\"", result)).ok();
    let decoded_evil: Option<EvilInput> = evil_input
        .as_deref()
        .and_then(|raw| serde_json::from_str(raw).ok());

    match (decoded_language, decoded_result) {
        (Some(language), Some(result)) => UntrustedClaim {
            id,
            pattern,
            language,
            result,
            evil_input: decoded_evil,
        },
        _ => {
            warn!(id = %id, language, result, "Undecodable claim row, marking invalid");
            UntrustedClaim {
                id,
                pattern,
                language: Language::Javascript,
                result: Verdict::Invalid,
                evil_input: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Collections;

    fn db() -> Database {
        Database::in_memory(Collections::default()).unwrap()
    }

    #[test]
    fn test_stage_list_delete_cycle() {
        let db = db();
        let claim = UntrustedClaim::new("abc", Language::Javascript, Verdict::Unknown, None);
        db.stage_claim(&claim).unwrap();

        let listed = db.list_claims().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].pattern, "abc");
        assert_eq!(listed[0].result, Verdict::Unknown);

        assert!(db.delete_claim(&claim.id).unwrap());
        assert_eq!(db.claim_count().unwrap(), 0);
    }

    #[test]
    fn test_delete_missing_claim_is_false() {
        let db = db();
        assert!(!db.delete_claim("no-such-id").unwrap());
    }

    #[test]
    fn test_duplicate_submissions_both_staged() {
        let db = db();
        db.stage_claim(&UntrustedClaim::new("x", Language::Javascript, Verdict::Safe, None))
            .unwrap();
        db.stage_claim(&UntrustedClaim::new("x", Language::Javascript, Verdict::Safe, None))
            .unwrap();
        assert_eq!(db.claim_count().unwrap(), 2);
    }

    #[test]
    fn test_corrupt_row_decodes_as_invalid() {
        let db = db();
        {
            let conn = db.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO upload (id, pattern, language, result, evil_input, created_at)
                 VALUES ('bad', 'p', 'cobol', 'MAYBE', NULL, '2024-01-01T00:00:00Z')",
                [],
            )
            .unwrap();
        }
        let listed = db.list_claims().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].result, Verdict::Invalid);
    }
}
