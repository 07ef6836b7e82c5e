//! Settings persistence
//!
//! A single SQLite key-value table backs everything the game remembers
//! across sessions; today that is one entry, the album filter, stored as a
//! JSON object of group name to enabled flag. Read at startup with
//! all-enabled as the missing-key default, written on every toggle or bulk
//! action.

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite, SqlitePool};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::album::AlbumFilter;
use crate::error::{Error, Result};

/// Settings key holding the album filter JSON
pub const ALBUM_FILTER_KEY: &str = "album_filter";

/// Default database location under the platform data directory
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("snipguess"))
        .unwrap_or_else(|| PathBuf::from("./snipguess_data"))
        .join("settings.db")
}

/// Open (creating if needed) the settings database.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new().connect(&db_url).await?;

    if newly_created {
        info!("Initialized new settings database: {}", db_path.display());
    } else {
        info!("Opened settings database: {}", db_path.display());
    }

    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_settings_table(&pool).await?;
    Ok(pool)
}

/// Create the settings table (idempotent).
pub async fn create_settings_table(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Load the album filter, defaulting to all groups enabled when unset.
pub async fn load_album_filter(db: &Pool<Sqlite>) -> Result<AlbumFilter> {
    match get_setting(db, ALBUM_FILTER_KEY).await? {
        Some(json) => serde_json::from_str(&json).map_err(|e| {
            Error::Config(format!("Invalid stored album filter: {}", e))
        }),
        None => Ok(AlbumFilter::all_enabled()),
    }
}

/// Persist the album filter. Called on every toggle and bulk action.
pub async fn save_album_filter(db: &Pool<Sqlite>, filter: &AlbumFilter) -> Result<()> {
    let json = serde_json::to_string(filter)
        .map_err(|e| Error::Internal(format!("Failed to serialize album filter: {}", e)))?;
    set_setting(db, ALBUM_FILTER_KEY, &json).await
}

/// Generic setting getter; `None` when the key does not exist.
pub async fn get_setting(db: &Pool<Sqlite>, key: &str) -> Result<Option<String>> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await?;
    Ok(value)
}

/// Generic setting setter; inserts or updates.
pub async fn set_setting(db: &Pool<Sqlite>, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value)
        VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(db)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_db() -> Pool<Sqlite> {
        // one connection: every pool checkout must see the same in-memory db
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        create_settings_table(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn missing_filter_defaults_to_all_enabled() {
        let db = setup_test_db().await;
        let filter = load_album_filter(&db).await.unwrap();
        assert!(filter.any_enabled());
        assert!(filter.is_enabled("Fighting Demons"));
    }

    #[tokio::test]
    async fn filter_roundtrip() {
        let db = setup_test_db().await;

        let mut filter = AlbumFilter::all_enabled();
        filter.set_enabled("Fighting Demons", false);
        filter.set_enabled("Smule", false);
        save_album_filter(&db, &filter).await.unwrap();

        let loaded = load_album_filter(&db).await.unwrap();
        assert!(!loaded.is_enabled("Fighting Demons"));
        assert!(!loaded.is_enabled("Smule"));
        assert!(loaded.is_enabled("Legends Never Die"));
    }

    #[tokio::test]
    async fn filter_overwrites_previous_value() {
        let db = setup_test_db().await;

        let mut filter = AlbumFilter::all_enabled();
        filter.set_all(false);
        save_album_filter(&db, &filter).await.unwrap();

        filter.set_all(true);
        save_album_filter(&db, &filter).await.unwrap();

        let loaded = load_album_filter(&db).await.unwrap();
        assert!(loaded.any_enabled());
    }

    #[tokio::test]
    async fn corrupt_filter_is_a_config_error() {
        let db = setup_test_db().await;
        set_setting(&db, ALBUM_FILTER_KEY, "not json").await.unwrap();

        let err = load_album_filter(&db).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn init_database_creates_file_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.db");

        let pool = init_database(&path).await.unwrap();
        assert!(path.exists());
        set_setting(&pool, "k", "v").await.unwrap();
        pool.close().await;

        // reopening sees the persisted value
        let pool = init_database(&path).await.unwrap();
        assert_eq!(get_setting(&pool, "k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn generic_setting_get_set() {
        let db = setup_test_db().await;

        assert_eq!(get_setting(&db, "missing").await.unwrap(), None);

        set_setting(&db, "test_key", "value1").await.unwrap();
        assert_eq!(
            get_setting(&db, "test_key").await.unwrap().as_deref(),
            Some("value1")
        );

        set_setting(&db, "test_key", "value2").await.unwrap();
        assert_eq!(
            get_setting(&db, "test_key").await.unwrap().as_deref(),
            Some("value2")
        );
    }
}
