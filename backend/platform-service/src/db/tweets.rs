/// Tweet database operations
use crate::error::Result;
use crate::models::Tweet;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn insert_tweet(pool: &PgPool, owner_id: Uuid, content: &str) -> Result<Tweet> {
    let now = Utc::now();

    let tweet = sqlx::query_as::<_, Tweet>(
        r#"
        INSERT INTO tweets (id, owner_id, content, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(owner_id)
    .bind(content)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(tweet)
}

pub async fn find_by_id(pool: &PgPool, tweet_id: Uuid) -> Result<Option<Tweet>> {
    let tweet = sqlx::query_as::<_, Tweet>("SELECT * FROM tweets WHERE id = $1")
        .bind(tweet_id)
        .fetch_optional(pool)
        .await?;

    Ok(tweet)
}

pub async fn list_by_owner(
    pool: &PgPool,
    owner_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Tweet>> {
    let tweets = sqlx::query_as::<_, Tweet>(
        r#"
        SELECT * FROM tweets
        WHERE owner_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(owner_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(tweets)
}

pub async fn update_content(pool: &PgPool, tweet_id: Uuid, content: &str) -> Result<Option<Tweet>> {
    let tweet = sqlx::query_as::<_, Tweet>(
        r#"
        UPDATE tweets
        SET content = $1, updated_at = $2
        WHERE id = $3
        RETURNING *
        "#,
    )
    .bind(content)
    .bind(Utc::now())
    .bind(tweet_id)
    .fetch_optional(pool)
    .await?;

    Ok(tweet)
}

pub async fn delete_tweet(pool: &PgPool, tweet_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM tweets WHERE id = $1")
        .bind(tweet_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}
