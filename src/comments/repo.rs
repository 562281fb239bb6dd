use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Comment record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub article_id: String, // opaque external article identifier
    pub user_id: Uuid,      // owner; the sole basis for delete authorization
    pub content: String,
    pub likes: i32,
    pub created_at: OffsetDateTime,
}

/// Comment joined with the owner's public identity fields.
#[derive(Debug, Clone, FromRow)]
pub struct CommentWithAuthor {
    pub id: Uuid,
    pub article_id: String,
    pub user_id: Uuid,
    pub content: String,
    pub likes: i32,
    pub created_at: OffsetDateTime,
    pub author_name: String,
    pub author_email: String,
}

impl Comment {
    /// All comments for an article, newest first, with owner identity joined.
    pub async fn list_for_article(
        db: &PgPool,
        article_id: &str,
    ) -> anyhow::Result<Vec<CommentWithAuthor>> {
        let rows = sqlx::query_as::<_, CommentWithAuthor>(
            r#"
            SELECT c.id, c.article_id, c.user_id, c.content, c.likes, c.created_at,
                   u.name AS author_name, u.email AS author_email
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.article_id = $1
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(article_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Persist a comment owned by `user_id`. Content arrives already trimmed.
    pub async fn create(
        db: &PgPool,
        article_id: &str,
        user_id: Uuid,
        content: &str,
    ) -> anyhow::Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (article_id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, article_id, user_id, content, likes, created_at
            "#,
        )
        .bind(article_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(db)
        .await?;
        Ok(comment)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, article_id, user_id, content, likes, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(comment)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Atomic like increment, applied in the store so concurrent callers never
    /// lose updates. Returns the new counter, or None when the row is absent.
    pub async fn like(db: &PgPool, id: Uuid) -> anyhow::Result<Option<i32>> {
        let likes = sqlx::query_scalar::<_, i32>(
            "UPDATE comments SET likes = likes + 1 WHERE id = $1 RETURNING likes",
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(likes)
    }
}
