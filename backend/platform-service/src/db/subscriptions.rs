/// Subscription database operations
use crate::error::Result;
use crate::models::User;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

/// Toggle a subscription; true when the subscriber now follows the channel
pub async fn toggle_subscription(
    pool: &PgPool,
    subscriber_id: Uuid,
    channel_id: Uuid,
) -> Result<bool> {
    let deleted = sqlx::query(
        "DELETE FROM subscriptions WHERE subscriber_id = $1 AND channel_id = $2",
    )
    .bind(subscriber_id)
    .bind(channel_id)
    .execute(pool)
    .await?;

    if deleted.rows_affected() > 0 {
        return Ok(false);
    }

    sqlx::query(
        "INSERT INTO subscriptions (subscriber_id, channel_id, created_at) VALUES ($1, $2, $3)",
    )
    .bind(subscriber_id)
    .bind(channel_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(true)
}

/// Channels the user is subscribed to
pub async fn list_subscribed_channels(pool: &PgPool, subscriber_id: Uuid) -> Result<Vec<User>> {
    let channels = sqlx::query_as::<_, User>(
        r#"
        SELECT u.* FROM users u
        JOIN subscriptions s ON s.channel_id = u.id
        WHERE s.subscriber_id = $1
        ORDER BY s.created_at DESC
        "#,
    )
    .bind(subscriber_id)
    .fetch_all(pool)
    .await?;

    Ok(channels)
}

/// Accounts subscribed to the channel
pub async fn list_subscribers(pool: &PgPool, channel_id: Uuid) -> Result<Vec<User>> {
    let subscribers = sqlx::query_as::<_, User>(
        r#"
        SELECT u.* FROM users u
        JOIN subscriptions s ON s.subscriber_id = u.id
        WHERE s.channel_id = $1
        ORDER BY s.created_at DESC
        "#,
    )
    .bind(channel_id)
    .fetch_all(pool)
    .await?;

    Ok(subscribers)
}
