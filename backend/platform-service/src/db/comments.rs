/// Comment database operations
use crate::error::Result;
use crate::models::Comment;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn insert_comment(
    pool: &PgPool,
    video_id: Uuid,
    owner_id: Uuid,
    content: &str,
) -> Result<Comment> {
    let now = Utc::now();

    let comment = sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (id, video_id, owner_id, content, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(video_id)
    .bind(owner_id)
    .bind(content)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(comment)
}

pub async fn find_by_id(pool: &PgPool, comment_id: Uuid) -> Result<Option<Comment>> {
    let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
        .bind(comment_id)
        .fetch_optional(pool)
        .await?;

    Ok(comment)
}

pub async fn list_by_video(
    pool: &PgPool,
    video_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Comment>> {
    let comments = sqlx::query_as::<_, Comment>(
        r#"
        SELECT * FROM comments
        WHERE video_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(video_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(comments)
}

pub async fn update_content(
    pool: &PgPool,
    comment_id: Uuid,
    content: &str,
) -> Result<Option<Comment>> {
    let comment = sqlx::query_as::<_, Comment>(
        r#"
        UPDATE comments
        SET content = $1, updated_at = $2
        WHERE id = $3
        RETURNING *
        "#,
    )
    .bind(content)
    .bind(Utc::now())
    .bind(comment_id)
    .fetch_optional(pool)
    .await?;

    Ok(comment)
}

pub async fn delete_comment(pool: &PgPool, comment_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}
