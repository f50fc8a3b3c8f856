/// Authentication handlers
///
/// Tokens are delivered twice on every success: as HTTP-only cookies for
/// browser clients and mirrored in the response body for everything else.
/// Both carry the same values.
use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse};
use sqlx::PgPool;

use crate::db;
use crate::error::{AppError, Result};
use crate::handlers::UploadForm;
use crate::middleware::UserId;
use crate::models::{
    AuthResponse, LoginRequest, RefreshResponse, RefreshTokenRequest, UserResponse,
};
use crate::services::profiles::RegisterInput;
use crate::services::{ProfileService, SessionService};

fn token_cookie(name: &'static str, value: &str) -> Cookie<'static> {
    Cookie::build(name, value.to_string())
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .finish()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build(name, "")
        .path("/")
        .http_only(true)
        .secure(true)
        .finish();
    cookie.make_removal();
    cookie
}

/// Register an account. Multipart: full_name, email, username, password,
/// avatar (file, required), cover_image (file, optional).
pub async fn register(
    profiles: web::Data<Arc<ProfileService>>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let mut form = UploadForm::read(payload).await?;
    let avatar = form.require_file("avatar")?;
    let cover_image = form.take_file("cover_image");

    let user = profiles
        .register(RegisterInput {
            full_name: form.text("full_name"),
            email: form.text("email"),
            username: form.text("username"),
            password: form.text("password"),
            avatar,
            cover_image,
        })
        .await?;

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Log in with username or email. Overwrites the account's refresh slot, so
/// any other session stops being able to refresh.
pub async fn login(
    pool: web::Data<PgPool>,
    sessions: web::Data<Arc<SessionService>>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let (account_id, pair) = sessions
        .login(&payload.identifier, &payload.password)
        .await?;

    let user = db::users::find_by_id(pool.get_ref(), account_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string()))?;

    Ok(HttpResponse::Ok()
        .cookie(token_cookie("access_token", &pair.access_token))
        .cookie(token_cookie("refresh_token", &pair.refresh_token))
        .json(AuthResponse {
            user: user.into(),
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }))
}

/// Exchange a refresh token for a rotated pair. The token comes from the
/// cookie or, for non-cookie clients, the request body.
pub async fn refresh(
    req: HttpRequest,
    sessions: web::Data<Arc<SessionService>>,
    payload: Option<web::Json<RefreshTokenRequest>>,
) -> Result<HttpResponse> {
    let presented = req
        .cookie("refresh_token")
        .map(|cookie| cookie.value().to_string())
        .or_else(|| payload.as_ref().and_then(|p| p.refresh_token.clone()));

    let (_account_id, pair) = sessions.refresh(presented.as_deref()).await?;

    Ok(HttpResponse::Ok()
        .cookie(token_cookie("access_token", &pair.access_token))
        .cookie(token_cookie("refresh_token", &pair.refresh_token))
        .json(RefreshResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }))
}

/// Clear the refresh slot and drop both cookies. Idempotent. Outstanding
/// access tokens stay valid until their own expiry.
pub async fn logout(
    sessions: web::Data<Arc<SessionService>>,
    user: UserId,
) -> Result<HttpResponse> {
    sessions.logout(user.0).await?;

    Ok(HttpResponse::Ok()
        .cookie(removal_cookie("access_token"))
        .cookie(removal_cookie("refresh_token"))
        .json(serde_json::json!({ "message": "logged out" })))
}
