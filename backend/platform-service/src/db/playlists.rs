/// Playlist database operations
use crate::error::Result;
use crate::models::{Playlist, Video};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn insert_playlist(
    pool: &PgPool,
    owner_id: Uuid,
    name: &str,
    description: Option<&str>,
) -> Result<Playlist> {
    let now = Utc::now();

    let playlist = sqlx::query_as::<_, Playlist>(
        r#"
        INSERT INTO playlists (id, owner_id, name, description, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(owner_id)
    .bind(name)
    .bind(description)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(playlist)
}

pub async fn find_by_id(pool: &PgPool, playlist_id: Uuid) -> Result<Option<Playlist>> {
    let playlist = sqlx::query_as::<_, Playlist>("SELECT * FROM playlists WHERE id = $1")
        .bind(playlist_id)
        .fetch_optional(pool)
        .await?;

    Ok(playlist)
}

pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Playlist>> {
    let playlists = sqlx::query_as::<_, Playlist>(
        "SELECT * FROM playlists WHERE owner_id = $1 ORDER BY created_at DESC",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(playlists)
}

pub async fn update_playlist(
    pool: &PgPool,
    playlist_id: Uuid,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<Option<Playlist>> {
    let playlist = sqlx::query_as::<_, Playlist>(
        r#"
        UPDATE playlists
        SET name = COALESCE($1, name),
            description = COALESCE($2, description),
            updated_at = $3
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(name)
    .bind(description)
    .bind(Utc::now())
    .bind(playlist_id)
    .fetch_optional(pool)
    .await?;

    Ok(playlist)
}

pub async fn delete_playlist(pool: &PgPool, playlist_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM playlists WHERE id = $1")
        .bind(playlist_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Add a video to a playlist; a duplicate add is a no-op
pub async fn add_video(pool: &PgPool, playlist_id: Uuid, video_id: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO playlist_videos (playlist_id, video_id, added_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (playlist_id, video_id) DO NOTHING
        "#,
    )
    .bind(playlist_id)
    .bind(video_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn remove_video(pool: &PgPool, playlist_id: Uuid, video_id: Uuid) -> Result<bool> {
    let result =
        sqlx::query("DELETE FROM playlist_videos WHERE playlist_id = $1 AND video_id = $2")
            .bind(playlist_id)
            .bind(video_id)
            .execute(pool)
            .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn list_videos(pool: &PgPool, playlist_id: Uuid) -> Result<Vec<Video>> {
    let videos = sqlx::query_as::<_, Video>(
        r#"
        SELECT v.* FROM videos v
        JOIN playlist_videos pv ON pv.video_id = v.id
        WHERE pv.playlist_id = $1
        ORDER BY pv.added_at
        "#,
    )
    .bind(playlist_id)
    .fetch_all(pool)
    .await?;

    Ok(videos)
}
