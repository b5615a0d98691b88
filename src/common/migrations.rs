// src/common/migrations.rs
//! Database schema management

use sqlx::SqlitePool;
use tracing::info;

/// Create all tables and indexes if they do not already exist.
///
/// Deletion cascades hang off `users`: removing a user removes their
/// interests and newsletters, and removing a newsletter removes its content
/// items. Requires `foreign_keys` to be ON for the pool.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    create_user_tables(pool).await?;
    create_newsletter_tables(pool).await?;
    create_indexes(pool).await?;

    info!("Database migration completed");
    Ok(())
}

async fn create_user_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            hashed_password TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS interests (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 1,
            UNIQUE(user_id, name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_newsletter_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS newsletters (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS content_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            newsletter_id INTEGER NOT NULL REFERENCES newsletters(id) ON DELETE CASCADE,
            interest TEXT NOT NULL,
            source_url TEXT NOT NULL UNIQUE,
            summary TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS ix_users_email ON users(email)",
        "CREATE INDEX IF NOT EXISTS ix_interests_user_id ON interests(user_id)",
        "CREATE INDEX IF NOT EXISTS ix_interests_name ON interests(name)",
        "CREATE INDEX IF NOT EXISTS ix_newsletters_user_id ON newsletters(user_id)",
        "CREATE INDEX IF NOT EXISTS ix_content_items_newsletter_id ON content_items(newsletter_id)",
        "CREATE INDEX IF NOT EXISTS ix_content_items_interest ON content_items(interest)",
    ];

    for statement in indexes {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}
