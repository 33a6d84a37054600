//! Local Cache Store
//!
//! Key-value `settings` table holding the last-known-good site content and
//! the admin-entered remote credentials. Each logical group is written
//! atomically: content as one JSON value, credentials as a pair inside one
//! transaction. Writes complete before the call returns, so a read that
//! follows a write always sees the new value.

use ggbs_common::{ConnectionCredentials, PartialSiteConfiguration, Result, SiteConfiguration};
use sqlx::SqlitePool;
use tracing::warn;

/// Cached site content (JSON)
pub const CONTENT_KEY: &str = "ggbs_local_content";
/// Cached remote endpoint
pub const REMOTE_URL_KEY: &str = "ggbs_supabase_url";
/// Cached remote access token
pub const REMOTE_TOKEN_KEY: &str = "ggbs_supabase_key";

/// Handle to the local cache
#[derive(Clone)]
pub struct LocalCache {
    db: SqlitePool,
}

impl LocalCache {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Last persisted content, if any
    ///
    /// Unreadable or corrupt entries are treated as absent.
    pub async fn load_content(&self) -> Option<PartialSiteConfiguration> {
        let raw = match get_setting(&self.db, CONTENT_KEY).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Failed to read cached content: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(content) => Some(content),
            Err(e) => {
                warn!("Ignoring corrupt cached content: {}", e);
                None
            }
        }
    }

    /// Replace the cached content with `content`
    pub async fn store_content(&self, content: &SiteConfiguration) -> Result<()> {
        let json = serde_json::to_string(content)?;
        set_setting(&self.db, CONTENT_KEY, &json).await
    }

    /// Stored credential pair (possibly unusable), `None` when never set
    ///
    /// Both halves are read in one statement so a concurrent
    /// [`store_credentials`](Self::store_credentials) is seen whole or not at all.
    pub async fn load_credentials(&self) -> Option<ConnectionCredentials> {
        let rows: Vec<(String, String)> =
            match sqlx::query_as("SELECT key, value FROM settings WHERE key IN (?, ?)")
                .bind(REMOTE_URL_KEY)
                .bind(REMOTE_TOKEN_KEY)
                .fetch_all(&self.db)
                .await
            {
                Ok(rows) => rows,
                Err(e) => {
                    warn!("Failed to read cached credentials: {}", e);
                    return None;
                }
            };

        if rows.is_empty() {
            return None;
        }

        let mut endpoint = String::new();
        let mut token = String::new();
        for (key, value) in rows {
            match key.as_str() {
                REMOTE_URL_KEY => endpoint = value,
                REMOTE_TOKEN_KEY => token = value,
                _ => {}
            }
        }

        Some(ConnectionCredentials::new(endpoint, token))
    }

    /// Overwrite both credential halves in one transaction
    pub async fn store_credentials(&self, credentials: &ConnectionCredentials) -> Result<()> {
        let mut tx = self.db.begin().await?;

        for (key, value) in [
            (REMOTE_URL_KEY, credentials.endpoint.as_str()),
            (REMOTE_TOKEN_KEY, credentials.token.as_str()),
        ] {
            sqlx::query(UPSERT_SQL)
                .bind(key)
                .bind(value)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

const UPSERT_SQL: &str = "INSERT INTO settings (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at";

async fn get_setting(db: &SqlitePool, key: &str) -> Result<Option<String>> {
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await?;

    Ok(row.map(|(value,)| value))
}

async fn set_setting(db: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(UPSERT_SQL)
        .bind(key)
        .bind(value)
        .execute(db)
        .await?;

    Ok(())
}
