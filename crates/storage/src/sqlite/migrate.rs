use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;
use crate::repository::QUIZ_COLLECTION;

/// Runs a single, consolidated migration for the current schema.
///
/// Creates the quiz response table (quiz fields plus the nullable survey
/// section) and its email lookup index.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(&format!(
            r"
                CREATE TABLE IF NOT EXISTS {QUIZ_COLLECTION} (
                    id TEXT PRIMARY KEY,
                    email TEXT NOT NULL,
                    twitter TEXT NOT NULL,
                    whatsapp TEXT NOT NULL,
                    responses TEXT NOT NULL,
                    score INTEGER NOT NULL CHECK (score >= 0),
                    submitted_at TEXT NOT NULL,
                    recommendation TEXT,
                    time_in_community TEXT,
                    earnings TEXT,
                    passion_rating INTEGER CHECK (passion_rating BETWEEN 1 AND 10),
                    recommend_rating INTEGER CHECK (recommend_rating BETWEEN 1 AND 10)
                );
            ",
        ))
        .execute(&mut *tx)
        .await?;

        sqlx::query(&format!(
            r"
                CREATE INDEX IF NOT EXISTS idx_{QUIZ_COLLECTION}_email
                    ON {QUIZ_COLLECTION} (email, submitted_at);
            ",
        ))
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
