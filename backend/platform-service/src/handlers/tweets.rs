/// Tweet handlers
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::{PageQuery, TweetContentRequest};
use crate::services::authz;

fn parse_id(raw: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("invalid {what} ID")))
}

fn require_content(content: &str) -> Result<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::Validation(
            "tweet content cannot be empty".to_string(),
        ));
    }
    Ok(content.to_string())
}

pub async fn create_tweet(
    pool: web::Data<PgPool>,
    user: UserId,
    payload: web::Json<TweetContentRequest>,
) -> Result<HttpResponse> {
    let content = require_content(&payload.content)?;
    let tweet = db::tweets::insert_tweet(pool.get_ref(), user.0, &content).await?;
    Ok(HttpResponse::Created().json(tweet))
}

pub async fn list_user_tweets(
    pool: web::Data<PgPool>,
    user_id: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let owner_id = parse_id(&user_id, "user")?;
    let tweets =
        db::tweets::list_by_owner(pool.get_ref(), owner_id, query.limit(), query.offset()).await?;
    Ok(HttpResponse::Ok().json(tweets))
}

pub async fn update_tweet(
    pool: web::Data<PgPool>,
    user: UserId,
    tweet_id: web::Path<String>,
    payload: web::Json<TweetContentRequest>,
) -> Result<HttpResponse> {
    let tweet_id = parse_id(&tweet_id, "tweet")?;
    let content = require_content(&payload.content)?;

    let tweet = db::tweets::find_by_id(pool.get_ref(), tweet_id)
        .await?
        .ok_or_else(|| AppError::NotFound("tweet".to_string()))?;
    authz::assert_owner(tweet.owner_id, user.0)?;

    let updated = db::tweets::update_content(pool.get_ref(), tweet_id, &content)
        .await?
        .ok_or_else(|| AppError::NotFound("tweet".to_string()))?;
    Ok(HttpResponse::Ok().json(updated))
}

pub async fn delete_tweet(
    pool: web::Data<PgPool>,
    user: UserId,
    tweet_id: web::Path<String>,
) -> Result<HttpResponse> {
    let tweet_id = parse_id(&tweet_id, "tweet")?;

    let tweet = db::tweets::find_by_id(pool.get_ref(), tweet_id)
        .await?
        .ok_or_else(|| AppError::NotFound("tweet".to_string()))?;
    authz::assert_owner(tweet.owner_id, user.0)?;

    db::tweets::delete_tweet(pool.get_ref(), tweet_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
