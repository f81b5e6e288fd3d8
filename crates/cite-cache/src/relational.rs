//! Embedded libSQL cache: one `citation_cache` table indexed on `expires_at`.

use chrono::{TimeDelta, Utc};
use cite_core::ValidationResult;
use libsql::Builder;

use crate::entry::CacheEntry;
use crate::error::CacheError;

const MIGRATION_001: &str = include_str!("../migrations/001_cache.sql");

pub struct RelationalCache {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    ttl: TimeDelta,
}

impl std::fmt::Debug for RelationalCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationalCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl RelationalCache {
    /// Open (or create) the database at `path` and run migrations.
    ///
    /// `":memory:"` gives a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the database cannot be opened or the
    /// migration fails.
    pub async fn open(path: &str, ttl: TimeDelta) -> Result<Self, CacheError> {
        let parent = std::path::Path::new(path)
            .parent()
            .filter(|p| path != ":memory:" && !p.as_os_str().is_empty());
        if let Some(parent) = parent {
            std::fs::create_dir_all(parent)?;
        }
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        conn.execute_batch(MIGRATION_001)
            .await
            .map_err(|e| CacheError::Migration(format!("001_cache: {e}")))?;
        Ok(Self { db, conn, ttl })
    }

    pub(crate) async fn get(&self, key: &str) -> Result<Option<ValidationResult>, CacheError> {
        let mut rows = self
            .conn
            .query(
                "SELECT result, expires_at FROM citation_cache WHERE key = ?1",
                libsql::params![key],
            )
            .await?;
        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        let result = row.get::<String>(0)?;
        let expires_at = row.get::<i64>(1)?;
        if Utc::now().timestamp_millis() >= expires_at {
            self.conn
                .execute("DELETE FROM citation_cache WHERE key = ?1", libsql::params![key])
                .await?;
            return Ok(None);
        }
        let result: ValidationResult = serde_json::from_str(&result)?;
        Ok(Some(result.with_cache_hit(true)))
    }

    pub(crate) async fn set(&self, key: &str, result: &ValidationResult) -> Result<(), CacheError> {
        let entry = CacheEntry::new(result, self.ttl, Utc::now());
        let json = serde_json::to_string(&entry.result)?;
        self.conn
            .execute(
                "INSERT OR REPLACE INTO citation_cache (key, result, created_at, expires_at)
                 VALUES (?1, ?2, ?3, ?4)",
                libsql::params![
                    key,
                    json,
                    entry.created_at.timestamp_millis(),
                    entry.expires_at.timestamp_millis()
                ],
            )
            .await?;
        Ok(())
    }

    pub(crate) async fn clear(&self) -> Result<(), CacheError> {
        self.conn.execute("DELETE FROM citation_cache", ()).await?;
        Ok(())
    }

    pub(crate) async fn size(&self) -> Result<usize, CacheError> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM citation_cache", ())
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| CacheError::InvalidState("COUNT(*) returned no rows".into()))?;
        let count = row.get::<i64>(0)?;
        usize::try_from(count).map_err(|_| CacheError::InvalidState(format!("negative count {count}")))
    }

    pub(crate) async fn cleanup_expired(&self) -> Result<usize, CacheError> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM citation_cache WHERE expires_at <= ?1",
                libsql::params![Utc::now().timestamp_millis()],
            )
            .await?;
        usize::try_from(removed).map_err(|_| CacheError::InvalidState(format!("row count {removed}")))
    }
}
