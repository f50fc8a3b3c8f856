/// Subscription handlers
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::{SubscriptionToggleResponse, UserResponse};

fn parse_id(raw: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("invalid {what} ID")))
}

pub async fn toggle_subscription(
    pool: web::Data<PgPool>,
    user: UserId,
    channel_id: web::Path<String>,
) -> Result<HttpResponse> {
    let channel_id = parse_id(&channel_id, "channel")?;

    if channel_id == user.0 {
        return Err(AppError::Validation(
            "you cannot subscribe to your own channel".to_string(),
        ));
    }

    if db::users::find_by_id(pool.get_ref(), channel_id).await?.is_none() {
        return Err(AppError::NotFound("channel".to_string()));
    }

    let subscribed =
        db::subscriptions::toggle_subscription(pool.get_ref(), user.0, channel_id).await?;
    Ok(HttpResponse::Ok().json(SubscriptionToggleResponse { subscribed }))
}

pub async fn list_subscribed_channels(
    pool: web::Data<PgPool>,
    user: UserId,
) -> Result<HttpResponse> {
    let channels = db::subscriptions::list_subscribed_channels(pool.get_ref(), user.0).await?;
    let responses: Vec<UserResponse> = channels.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(responses))
}

pub async fn list_subscribers(
    pool: web::Data<PgPool>,
    channel_id: web::Path<String>,
) -> Result<HttpResponse> {
    let channel_id = parse_id(&channel_id, "channel")?;
    let subscribers = db::subscriptions::list_subscribers(pool.get_ref(), channel_id).await?;
    let responses: Vec<UserResponse> = subscribers.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(responses))
}
