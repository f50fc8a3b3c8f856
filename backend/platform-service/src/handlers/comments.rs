/// Comment handlers
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::{CommentContentRequest, PageQuery};
use crate::services::authz;

fn parse_id(raw: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("invalid {what} ID")))
}

fn require_content(content: &str) -> Result<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::Validation(
            "comment content cannot be empty".to_string(),
        ));
    }
    Ok(content.to_string())
}

pub async fn create_comment(
    pool: web::Data<PgPool>,
    user: UserId,
    video_id: web::Path<String>,
    payload: web::Json<CommentContentRequest>,
) -> Result<HttpResponse> {
    let video_id = parse_id(&video_id, "video")?;
    let content = require_content(&payload.content)?;

    if db::videos::find_by_id(pool.get_ref(), video_id).await?.is_none() {
        return Err(AppError::NotFound("video".to_string()));
    }

    let comment = db::comments::insert_comment(pool.get_ref(), video_id, user.0, &content).await?;
    Ok(HttpResponse::Created().json(comment))
}

pub async fn list_comments(
    pool: web::Data<PgPool>,
    video_id: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let video_id = parse_id(&video_id, "video")?;
    let comments =
        db::comments::list_by_video(pool.get_ref(), video_id, query.limit(), query.offset())
            .await?;
    Ok(HttpResponse::Ok().json(comments))
}

pub async fn update_comment(
    pool: web::Data<PgPool>,
    user: UserId,
    comment_id: web::Path<String>,
    payload: web::Json<CommentContentRequest>,
) -> Result<HttpResponse> {
    let comment_id = parse_id(&comment_id, "comment")?;
    let content = require_content(&payload.content)?;

    let comment = db::comments::find_by_id(pool.get_ref(), comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("comment".to_string()))?;
    authz::assert_owner(comment.owner_id, user.0)?;

    let updated = db::comments::update_content(pool.get_ref(), comment_id, &content)
        .await?
        .ok_or_else(|| AppError::NotFound("comment".to_string()))?;
    Ok(HttpResponse::Ok().json(updated))
}

pub async fn delete_comment(
    pool: web::Data<PgPool>,
    user: UserId,
    comment_id: web::Path<String>,
) -> Result<HttpResponse> {
    let comment_id = parse_id(&comment_id, "comment")?;

    let comment = db::comments::find_by_id(pool.get_ref(), comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("comment".to_string()))?;
    authz::assert_owner(comment.owner_id, user.0)?;

    db::comments::delete_comment(pool.get_ref(), comment_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
