//! Relational rows owned by users: interests, newsletters, content items.
//!
//! Extraction results are currently returned to the caller rather than
//! written back to `interests`; these rows are the cascade targets of
//! account deletion and the destination a future write-back would use.

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

#[derive(FromRow, Debug, Clone, Serialize)]
pub struct Interest {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub active: bool,
}

impl Interest {
    /// Insert an interest for a user. Name is unique within the user; a
    /// duplicate surfaces as the storage layer's uniqueness violation.
    pub async fn create(db: &SqlitePool, user_id: i64, name: &str) -> Result<Interest, sqlx::Error> {
        sqlx::query_as::<_, Interest>(
            r#"
            INSERT INTO interests (user_id, name)
            VALUES (?, ?)
            RETURNING id, user_id, name, active
            "#,
        )
        .bind(user_id)
        .bind(name)
        .fetch_one(db)
        .await
    }

    pub async fn list_by_user(db: &SqlitePool, user_id: i64) -> Result<Vec<Interest>, sqlx::Error> {
        sqlx::query_as::<_, Interest>(
            "SELECT id, user_id, name, active FROM interests WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }
}

#[derive(FromRow, Debug, Clone, Serialize)]
pub struct Newsletter {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub created_at: String,
}

impl Newsletter {
    pub async fn create(
        db: &SqlitePool,
        user_id: i64,
        title: &str,
    ) -> Result<Newsletter, sqlx::Error> {
        sqlx::query_as::<_, Newsletter>(
            r#"
            INSERT INTO newsletters (user_id, title)
            VALUES (?, ?)
            RETURNING id, user_id, title, created_at
            "#,
        )
        .bind(user_id)
        .bind(title)
        .fetch_one(db)
        .await
    }

    pub async fn list_by_user(
        db: &SqlitePool,
        user_id: i64,
    ) -> Result<Vec<Newsletter>, sqlx::Error> {
        sqlx::query_as::<_, Newsletter>(
            "SELECT id, user_id, title, created_at FROM newsletters WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }
}

#[derive(FromRow, Debug, Clone, Serialize)]
pub struct ContentItem {
    pub id: i64,
    pub newsletter_id: i64,
    pub interest: String,
    pub source_url: String,
    pub summary: String,
}

impl ContentItem {
    /// Insert a content item. `source_url` is globally unique so the same
    /// source is never attached twice.
    pub async fn create(
        db: &SqlitePool,
        newsletter_id: i64,
        interest: &str,
        source_url: &str,
        summary: &str,
    ) -> Result<ContentItem, sqlx::Error> {
        sqlx::query_as::<_, ContentItem>(
            r#"
            INSERT INTO content_items (newsletter_id, interest, source_url, summary)
            VALUES (?, ?, ?, ?)
            RETURNING id, newsletter_id, interest, source_url, summary
            "#,
        )
        .bind(newsletter_id)
        .bind(interest)
        .bind(source_url)
        .bind(summary)
        .fetch_one(db)
        .await
    }

    pub async fn list_by_newsletter(
        db: &SqlitePool,
        newsletter_id: i64,
    ) -> Result<Vec<ContentItem>, sqlx::Error> {
        sqlx::query_as::<_, ContentItem>(
            "SELECT id, newsletter_id, interest, source_url, summary FROM content_items WHERE newsletter_id = ? ORDER BY id",
        )
        .bind(newsletter_id)
        .fetch_all(db)
        .await
    }
}
