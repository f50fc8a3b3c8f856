/// Like handlers
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::{LikeToggleResponse, VideoResponse};

fn parse_id(raw: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("invalid {what} ID")))
}

pub async fn toggle_video_like(
    pool: web::Data<PgPool>,
    user: UserId,
    video_id: web::Path<String>,
) -> Result<HttpResponse> {
    let video_id = parse_id(&video_id, "video")?;

    if db::videos::find_by_id(pool.get_ref(), video_id).await?.is_none() {
        return Err(AppError::NotFound("video".to_string()));
    }

    let liked = db::likes::toggle_video_like(pool.get_ref(), user.0, video_id).await?;
    Ok(HttpResponse::Ok().json(LikeToggleResponse { liked }))
}

pub async fn toggle_comment_like(
    pool: web::Data<PgPool>,
    user: UserId,
    comment_id: web::Path<String>,
) -> Result<HttpResponse> {
    let comment_id = parse_id(&comment_id, "comment")?;

    if db::comments::find_by_id(pool.get_ref(), comment_id).await?.is_none() {
        return Err(AppError::NotFound("comment".to_string()));
    }

    let liked = db::likes::toggle_comment_like(pool.get_ref(), user.0, comment_id).await?;
    Ok(HttpResponse::Ok().json(LikeToggleResponse { liked }))
}

pub async fn toggle_tweet_like(
    pool: web::Data<PgPool>,
    user: UserId,
    tweet_id: web::Path<String>,
) -> Result<HttpResponse> {
    let tweet_id = parse_id(&tweet_id, "tweet")?;

    if db::tweets::find_by_id(pool.get_ref(), tweet_id).await?.is_none() {
        return Err(AppError::NotFound("tweet".to_string()));
    }

    let liked = db::likes::toggle_tweet_like(pool.get_ref(), user.0, tweet_id).await?;
    Ok(HttpResponse::Ok().json(LikeToggleResponse { liked }))
}

pub async fn list_liked_videos(pool: web::Data<PgPool>, user: UserId) -> Result<HttpResponse> {
    let videos = db::likes::list_liked_videos(pool.get_ref(), user.0).await?;
    let responses: Vec<VideoResponse> = videos.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(responses))
}
