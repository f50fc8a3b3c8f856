/// Video database operations
use crate::error::Result;
use crate::models::Video;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewVideo {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_key: String,
    pub video_url: String,
    pub thumbnail_key: String,
    pub thumbnail_url: String,
    pub duration_seconds: i32,
}

pub async fn insert_video(pool: &PgPool, new_video: NewVideo) -> Result<Video> {
    let now = Utc::now();

    let video = sqlx::query_as::<_, Video>(
        r#"
        INSERT INTO videos (
            id, owner_id, title, description,
            video_key, video_url, thumbnail_key, thumbnail_url,
            duration_seconds, is_published, view_count, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE, 0, $10, $10)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new_video.owner_id)
    .bind(&new_video.title)
    .bind(&new_video.description)
    .bind(&new_video.video_key)
    .bind(&new_video.video_url)
    .bind(&new_video.thumbnail_key)
    .bind(&new_video.thumbnail_url)
    .bind(new_video.duration_seconds)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(video)
}

pub async fn find_by_id(pool: &PgPool, video_id: Uuid) -> Result<Option<Video>> {
    let video = sqlx::query_as::<_, Video>("SELECT * FROM videos WHERE id = $1")
        .bind(video_id)
        .fetch_optional(pool)
        .await?;

    Ok(video)
}

pub async fn list_published(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Video>> {
    let videos = sqlx::query_as::<_, Video>(
        r#"
        SELECT * FROM videos
        WHERE is_published = TRUE
        ORDER BY created_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(videos)
}

pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Video>> {
    let videos = sqlx::query_as::<_, Video>(
        "SELECT * FROM videos WHERE owner_id = $1 ORDER BY created_at DESC",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(videos)
}

pub async fn update_metadata(
    pool: &PgPool,
    video_id: Uuid,
    title: Option<&str>,
    description: Option<&str>,
) -> Result<Option<Video>> {
    let video = sqlx::query_as::<_, Video>(
        r#"
        UPDATE videos
        SET title = COALESCE($1, title),
            description = COALESCE($2, description),
            updated_at = $3
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(title)
    .bind(description)
    .bind(Utc::now())
    .bind(video_id)
    .fetch_optional(pool)
    .await?;

    Ok(video)
}

/// Single-statement swap of the thumbnail reference
pub async fn set_thumbnail(
    pool: &PgPool,
    video_id: Uuid,
    key: &str,
    url: &str,
) -> Result<Option<Video>> {
    let video = sqlx::query_as::<_, Video>(
        r#"
        UPDATE videos
        SET thumbnail_key = $1, thumbnail_url = $2, updated_at = $3
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(key)
    .bind(url)
    .bind(Utc::now())
    .bind(video_id)
    .fetch_optional(pool)
    .await?;

    Ok(video)
}

pub async fn set_published(pool: &PgPool, video_id: Uuid, is_published: bool) -> Result<Option<Video>> {
    let video = sqlx::query_as::<_, Video>(
        r#"
        UPDATE videos
        SET is_published = $1, updated_at = $2
        WHERE id = $3
        RETURNING *
        "#,
    )
    .bind(is_published)
    .bind(Utc::now())
    .bind(video_id)
    .fetch_optional(pool)
    .await?;

    Ok(video)
}

/// Delete the record; true when a row was removed
pub async fn delete_video(pool: &PgPool, video_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM videos WHERE id = $1")
        .bind(video_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}
