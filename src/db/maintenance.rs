use chrono::Utc;
use uuid::Uuid;
use crate::errors::CacheError;
use crate::models::Verdict;
use super::Database;

impl Database {
    /// Demote every trusted `SAFE` record into the quarantine so the next
    /// reconciliation pass re-derives it. `VULNERABLE` records carry replayed
    /// evidence and stay put; `SAFE` ones are only as good as the checker
    /// that produced them, so a detector upgrade warrants a rescan.
    ///
    /// Returns the number of records moved. Not transactional: a failure
    /// mid-move can leave a record in both tables, which the job resolves on
    /// its next visit.
    pub fn rescan_safe(&self) -> Result<usize, CacheError> {
        let conn = self.conn.lock().unwrap();

        let select_sql = format!(
            "SELECT pattern, language FROM {} WHERE result = ?1",
            self.collections.trusted
        );
        let mut stmt = conn
            .prepare(&select_sql)
            .map_err(|e| CacheError::Database(format!("Query failed: {}", e)))?;
        let rows = stmt
            .query_map(rusqlite::params![Verdict::Safe.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| CacheError::Database(format!("Query failed: {}", e)))?;

        let mut moved = Vec::new();
        for row in rows {
            moved.push(row.map_err(|e| CacheError::Database(format!("Row error: {}", e)))?);
        }
        drop(stmt);

        let insert_sql = format!(
            "INSERT INTO {} (id, pattern, language, result, evil_input, created_at)
             VALUES (?1, ?2, ?3, ?4, NULL, ?5)",
            self.collections.untrusted
        );
        for (pattern, language) in &moved {
            conn.execute(
                &insert_sql,
                rusqlite::params![
                    Uuid::new_v4().to_string(),
                    pattern,
                    language,
                    Verdict::Safe.as_str(),
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| CacheError::Database(format!("Stage failed: {}", e)))?;
        }

        let delete_sql = format!(
            "DELETE FROM {} WHERE result = ?1",
            self.collections.trusted
        );
        conn.execute(&delete_sql, rusqlite::params![Verdict::Safe.as_str()])
            .map_err(|e| CacheError::Database(format!("Delete failed: {}", e)))?;

        Ok(moved.len())
    }

    /// Drop and recreate both verdict tables. Recovers from rows corrupted by
    /// a faulty server or job build; in production this throws away a lot of
    /// computed verdicts.
    pub fn erase_all(&self) -> Result<(), CacheError> {
        let conn = self.conn.lock().unwrap();
        let drop_sql = format!(
            "DROP TABLE IF EXISTS {}; DROP TABLE IF EXISTS {};",
            self.collections.untrusted, self.collections.trusted
        );
        conn.execute_batch(&drop_sql)
            .map_err(|e| CacheError::Database(format!("Drop failed: {}", e)))?;
        conn.execute_batch(&super::schema::create_tables(&self.collections))
            .map_err(|e| CacheError::Database(format!("Failed to create tables: {}", e)))?;
        Ok(())
    }
}
