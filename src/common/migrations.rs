// src/common/migrations.rs
//! Database migration and schema management

use sqlx::SqlitePool;
use std::env;
use tracing::{info, warn};

/// Run all database migrations
///
/// Tables are created if missing. Set RESET_DB=true to drop and recreate the
/// schema from scratch; the default preserves data across restarts.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let should_reset_db = env::var("RESET_DB").unwrap_or_else(|_| "false".to_string()) == "true";

    if should_reset_db {
        warn!("RESET_DB=true - Dropping all tables and recreating schema...");
        drop_all_tables(pool).await?;
        info!("Dropped old tables");
    } else {
        info!("Skipping table drop (RESET_DB not set). Tables will be created if they don't exist.");
    }

    create_cv_tables(pool).await?;
    create_system_tables(pool).await?;
    create_indexes(pool).await?;

    // Initialize default settings from environment variables
    init_default_settings(pool).await?;

    info!("Database migration completed successfully");

    Ok(())
}

async fn drop_all_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("DROP TABLE IF EXISTS processed_cvs")
        .execute(pool)
        .await?;
    sqlx::query("DROP TABLE IF EXISTS internal_cvs")
        .execute(pool)
        .await?;
    sqlx::query("DROP TABLE IF EXISTS system_settings")
        .execute(pool)
        .await?;
    Ok(())
}

/// Core CV record tables: the processed upload (identifying data included)
/// and its anonymous counterpart for the internal recruiter tool
async fn create_cv_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS processed_cvs (
            id TEXT PRIMARY KEY,
            original_file_name TEXT NOT NULL,
            original_content TEXT NOT NULL,
            extracted_data TEXT NOT NULL,
            personal_info_removed TEXT NOT NULL,
            quality_report TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS internal_cvs (
            id TEXT PRIMARY KEY,
            candidate_id TEXT NOT NULL,
            original_file_name TEXT NOT NULL,
            anonymous_data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_system_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS system_settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            updated_by TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_processed_cvs_created_at ON processed_cvs(created_at)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_internal_cvs_candidate_id ON internal_cvs(candidate_id)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_internal_cvs_created_at ON internal_cvs(created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Initialize default system settings from environment variables
/// Only sets values if they don't already exist in the database
async fn init_default_settings(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let settings = vec![
        ("openai_api_key", "OPENAI_API_KEY"),
        ("openai_base_url", "OPENAI_BASE_URL"),
        ("openai_model", "OPENAI_MODEL"),
        ("max_upload_bytes", "MAX_UPLOAD_BYTES"),
    ];

    for (db_key, env_key) in settings {
        if let Ok(value) = env::var(env_key) {
            if !value.is_empty() {
                let existing: Option<(String,)> =
                    sqlx::query_as("SELECT value FROM system_settings WHERE key = ?")
                        .bind(db_key)
                        .fetch_optional(pool)
                        .await?;

                if existing.is_none() {
                    sqlx::query(
                        r#"
                        INSERT INTO system_settings (key, value, updated_at, updated_by)
                        VALUES (?, ?, datetime('now'), 'system')
                        "#,
                    )
                    .bind(db_key)
                    .bind(&value)
                    .execute(pool)
                    .await?;

                    info!(key = %db_key, "Initialized setting from environment variable");
                }
            }
        }
    }

    Ok(())
}
