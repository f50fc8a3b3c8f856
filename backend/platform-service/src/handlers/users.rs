/// Account profile handlers
use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::handlers::UploadForm;
use crate::middleware::UserId;
use crate::models::{UpdateProfileRequest, UserResponse};
use crate::services::ProfileService;

pub async fn current_user(
    profiles: web::Data<Arc<ProfileService>>,
    user: UserId,
) -> Result<HttpResponse> {
    let account = profiles.find_account(user.0).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(account)))
}

pub async fn update_profile(
    profiles: web::Data<Arc<ProfileService>>,
    user: UserId,
    payload: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    let account = profiles.update_profile(user.0, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(account)))
}

/// Replace the avatar. Multipart: avatar (file).
pub async fn update_avatar(
    profiles: web::Data<Arc<ProfileService>>,
    user: UserId,
    payload: Multipart,
) -> Result<HttpResponse> {
    let mut form = UploadForm::read(payload).await?;
    let avatar = form.require_file("avatar")?;

    let account = profiles.update_avatar(user.0, avatar).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(account)))
}

/// Replace or set the cover image. Multipart: cover_image (file).
pub async fn update_cover_image(
    profiles: web::Data<Arc<ProfileService>>,
    user: UserId,
    payload: Multipart,
) -> Result<HttpResponse> {
    let mut form = UploadForm::read(payload).await?;
    let cover_image = form.require_file("cover_image")?;

    let account = profiles.update_cover_image(user.0, cover_image).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(account)))
}

/// Public channel profile by username
pub async fn get_channel(
    profiles: web::Data<Arc<ProfileService>>,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let channel = profiles.find_channel(&username).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(channel)))
}
