use std::time::Duration;

use anyhow::{Context, Result};
use sea_orm::{DatabaseConnection, SqlxSqliteConnector};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::info;

pub mod translation;
pub mod user;

pub use translation::{sqlite::SqliteTranslationStorage, TranslationStorage};
pub use user::{sqlite::SqliteUserStorage, UserConflict, UserStorage};

/// Opens the SQLite database, creates the tables and hands the pool to
/// sea-orm.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    info!("Opening SQLite database at {}", database_url);

    // every connection to `:memory:` is its own database, so keep exactly one alive
    let options = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .max_connections(8)
            .acquire_timeout(Duration::from_secs(10))
    };

    let pool = options
        .connect(database_url)
        .await
        .with_context(|| format!("failed to open database {}", database_url))?;
    migrate(&pool).await?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS translations (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id),
            original_file TEXT NOT NULL,
            translated_file TEXT NOT NULL,
            media_type TEXT,
            original_language TEXT,
            target_language TEXT NOT NULL,
            original_transcript TEXT,
            english_translation TEXT,
            final_translation TEXT,
            translation_time REAL,
            accuracy REAL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_translations_user ON translations (user_id, created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
