/// Like database operations
///
/// A like targets exactly one of a video, a comment, or a tweet. Toggling is
/// delete-first: when no row was removed the like is created instead.
use crate::error::Result;
use crate::models::Video;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
enum LikeTarget {
    Video,
    Comment,
    Tweet,
}

impl LikeTarget {
    fn column(&self) -> &'static str {
        match self {
            Self::Video => "video_id",
            Self::Comment => "comment_id",
            Self::Tweet => "tweet_id",
        }
    }
}

async fn toggle(pool: &PgPool, user_id: Uuid, target: LikeTarget, target_id: Uuid) -> Result<bool> {
    let column = target.column();

    let deleted = sqlx::query(&format!(
        "DELETE FROM likes WHERE user_id = $1 AND {column} = $2"
    ))
    .bind(user_id)
    .bind(target_id)
    .execute(pool)
    .await?;

    if deleted.rows_affected() > 0 {
        return Ok(false);
    }

    sqlx::query(&format!(
        "INSERT INTO likes (id, user_id, {column}, created_at) VALUES ($1, $2, $3, $4)"
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(target_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(true)
}

/// Toggle a like on a video; true when the video is now liked
pub async fn toggle_video_like(pool: &PgPool, user_id: Uuid, video_id: Uuid) -> Result<bool> {
    toggle(pool, user_id, LikeTarget::Video, video_id).await
}

/// Toggle a like on a comment; true when the comment is now liked
pub async fn toggle_comment_like(pool: &PgPool, user_id: Uuid, comment_id: Uuid) -> Result<bool> {
    toggle(pool, user_id, LikeTarget::Comment, comment_id).await
}

/// Toggle a like on a tweet; true when the tweet is now liked
pub async fn toggle_tweet_like(pool: &PgPool, user_id: Uuid, tweet_id: Uuid) -> Result<bool> {
    toggle(pool, user_id, LikeTarget::Tweet, tweet_id).await
}

/// Videos the user has liked, newest like first
pub async fn list_liked_videos(pool: &PgPool, user_id: Uuid) -> Result<Vec<Video>> {
    let videos = sqlx::query_as::<_, Video>(
        r#"
        SELECT v.* FROM videos v
        JOIN likes l ON l.video_id = v.id
        WHERE l.user_id = $1
        ORDER BY l.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(videos)
}
