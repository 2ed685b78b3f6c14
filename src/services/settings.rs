// src/services/settings.rs
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
struct CachedSetting {
    value: String,
    expires_at: DateTime<Utc>,
}

/// DB-backed runtime settings with a short-lived in-memory cache
///
/// Lookup order: cache, then the `system_settings` table, then the
/// corresponding uppercased environment variable.
#[derive(Debug)]
pub struct SettingsService {
    db_pool: SqlitePool,
    cache: Arc<RwLock<HashMap<String, CachedSetting>>>,
    cache_ttl: Duration,
}

impl SettingsService {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self {
            db_pool,
            cache: Arc::new(RwLock::new(HashMap::new())),
            cache_ttl: Duration::minutes(5),
        }
    }

    /// Get a setting value by key
    /// Falls back to environment variable if not found in database
    pub async fn get_setting(&self, key: &str) -> Result<Option<String>, SettingsError> {
        // Check cache first
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(key) {
                if cached.expires_at > Utc::now() {
                    debug!(key = %key, "Setting retrieved from cache");
                    return Ok(Some(cached.value.clone()));
                }
            }
        }

        // Query database
        let result = sqlx::query_as::<_, (String, String)>(
            "SELECT key, value FROM system_settings WHERE key = ?",
        )
        .bind(key)
        .fetch_optional(&self.db_pool)
        .await?;

        if let Some((_, value)) = result {
            // Update cache
            {
                let mut cache = self.cache.write().await;
                cache.insert(
                    key.to_string(),
                    CachedSetting {
                        value: value.clone(),
                        expires_at: Utc::now() + self.cache_ttl,
                    },
                );
            }

            debug!(key = %key, "Setting retrieved from database");
            Ok(Some(value))
        } else {
            // Fallback to environment variable
            if let Ok(env_value) = env::var(key.to_uppercase()) {
                debug!(key = %key, "Setting retrieved from environment variable");
                return Ok(Some(env_value));
            }

            debug!(key = %key, "Setting not found");
            Ok(None)
        }
    }

    /// Set a setting value, replacing any existing one
    pub async fn set_setting(
        &self,
        key: &str,
        value: &str,
        updated_by: Option<&str>,
    ) -> Result<(), SettingsError> {
        sqlx::query(
            r#"
            INSERT INTO system_settings (key, value, updated_at, updated_by)
            VALUES (?, ?, datetime('now'), ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at,
                updated_by = excluded.updated_by
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(updated_by.unwrap_or("system"))
        .execute(&self.db_pool)
        .await?;

        // Invalidate cache entry so the next read sees the new value
        {
            let mut cache = self.cache.write().await;
            cache.remove(key);
        }

        debug!(key = %key, "Setting updated");
        Ok(())
    }
}
