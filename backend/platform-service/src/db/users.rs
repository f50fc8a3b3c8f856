/// Account database operations
use crate::error::Result;
use crate::models::User;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

/// Fields required to create an account. Asset references come from the
/// write coordinator after the uploads succeed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub avatar_key: String,
    pub avatar_url: String,
    pub cover_image_key: Option<String>,
    pub cover_image_url: Option<String>,
}

/// Find an account by username or email; supports login with either
pub async fn find_by_identifier(pool: &PgPool, identifier: &str) -> Result<Option<User>> {
    let user =
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1 OR username = $1")
            .bind(identifier)
            .fetch_optional(pool)
            .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// Conflict check for registration
pub async fn find_by_username_or_email(
    pool: &PgPool,
    username: &str,
    email: &str,
) -> Result<Option<User>> {
    let user =
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1 OR email = $2")
            .bind(username)
            .bind(email)
            .fetch_optional(pool)
            .await?;

    Ok(user)
}

pub async fn insert_user(pool: &PgPool, new_user: NewUser) -> Result<User> {
    let now = Utc::now();

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (
            id, username, email, full_name, password_hash,
            avatar_key, avatar_url, cover_image_key, cover_image_url,
            refresh_token, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NULL, $10, $10)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new_user.username)
    .bind(&new_user.email)
    .bind(&new_user.full_name)
    .bind(&new_user.password_hash)
    .bind(&new_user.avatar_key)
    .bind(&new_user.avatar_url)
    .bind(&new_user.cover_image_key)
    .bind(&new_user.cover_image_url)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    full_name: Option<&str>,
    email: Option<&str>,
) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET full_name = COALESCE($1, full_name),
            email = COALESCE($2, email),
            updated_at = $3
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(full_name)
    .bind(email)
    .bind(Utc::now())
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn set_avatar(pool: &PgPool, user_id: Uuid, key: &str, url: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET avatar_key = $1, avatar_url = $2, updated_at = $3
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(key)
    .bind(url)
    .bind(Utc::now())
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn set_cover_image(
    pool: &PgPool,
    user_id: Uuid,
    key: &str,
    url: &str,
) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET cover_image_key = $1, cover_image_url = $2, updated_at = $3
        WHERE id = $4
        RETURNING *
        "#,
    )
    .bind(key)
    .bind(url)
    .bind(Utc::now())
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Unconditionally overwrite the stored refresh token (login).
///
/// Any previously issued refresh token stops working from this point on.
pub async fn replace_refresh_token(pool: &PgPool, user_id: Uuid, token: &str) -> Result<()> {
    sqlx::query("UPDATE users SET refresh_token = $1, updated_at = $2 WHERE id = $3")
        .bind(token)
        .bind(Utc::now())
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Compare-and-swap rotation for the refresh slot.
///
/// The UPDATE only applies while the stored token still equals `presented`,
/// so concurrent refreshes serialize in the database and exactly one wins.
/// Returns false when the slot held a different value (or the account is
/// gone), which the caller reports as a stale token.
pub async fn rotate_refresh_token(
    pool: &PgPool,
    user_id: Uuid,
    presented: &str,
    replacement: &str,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET refresh_token = $1, updated_at = $2
        WHERE id = $3 AND refresh_token = $4
        "#,
    )
    .bind(replacement)
    .bind(Utc::now())
    .bind(user_id)
    .bind(presented)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Clear the refresh slot (logout). Idempotent.
pub async fn clear_refresh_token(pool: &PgPool, user_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE users SET refresh_token = NULL, updated_at = $1 WHERE id = $2")
        .bind(Utc::now())
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}
