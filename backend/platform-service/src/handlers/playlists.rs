/// Playlist handlers
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::{CreatePlaylistRequest, PlaylistResponse, UpdatePlaylistRequest};
use crate::services::authz;

fn parse_id(raw: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("invalid {what} ID")))
}

pub async fn create_playlist(
    pool: web::Data<PgPool>,
    user: UserId,
    payload: web::Json<CreatePlaylistRequest>,
) -> Result<HttpResponse> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("playlist name is required".to_string()));
    }

    let playlist =
        db::playlists::insert_playlist(pool.get_ref(), user.0, name, payload.description.as_deref())
            .await?;
    Ok(HttpResponse::Created().json(PlaylistResponse::from_entities(playlist, Vec::new())))
}

pub async fn get_playlist(
    pool: web::Data<PgPool>,
    playlist_id: web::Path<String>,
) -> Result<HttpResponse> {
    let playlist_id = parse_id(&playlist_id, "playlist")?;

    let playlist = db::playlists::find_by_id(pool.get_ref(), playlist_id)
        .await?
        .ok_or_else(|| AppError::NotFound("playlist".to_string()))?;
    let videos = db::playlists::list_videos(pool.get_ref(), playlist_id).await?;

    Ok(HttpResponse::Ok().json(PlaylistResponse::from_entities(playlist, videos)))
}

pub async fn list_user_playlists(
    pool: web::Data<PgPool>,
    user_id: web::Path<String>,
) -> Result<HttpResponse> {
    let owner_id = parse_id(&user_id, "user")?;
    let playlists = db::playlists::list_by_owner(pool.get_ref(), owner_id).await?;
    Ok(HttpResponse::Ok().json(playlists))
}

pub async fn update_playlist(
    pool: web::Data<PgPool>,
    user: UserId,
    playlist_id: web::Path<String>,
    payload: web::Json<UpdatePlaylistRequest>,
) -> Result<HttpResponse> {
    let playlist_id = parse_id(&playlist_id, "playlist")?;
    if payload.name.is_none() && payload.description.is_none() {
        return Err(AppError::Validation(
            "at least one field is required".to_string(),
        ));
    }

    let playlist = db::playlists::find_by_id(pool.get_ref(), playlist_id)
        .await?
        .ok_or_else(|| AppError::NotFound("playlist".to_string()))?;
    authz::assert_owner(playlist.owner_id, user.0)?;

    let updated = db::playlists::update_playlist(
        pool.get_ref(),
        playlist_id,
        payload.name.as_deref(),
        payload.description.as_deref(),
    )
    .await?
    .ok_or_else(|| AppError::NotFound("playlist".to_string()))?;
    Ok(HttpResponse::Ok().json(updated))
}

pub async fn delete_playlist(
    pool: web::Data<PgPool>,
    user: UserId,
    playlist_id: web::Path<String>,
) -> Result<HttpResponse> {
    let playlist_id = parse_id(&playlist_id, "playlist")?;

    let playlist = db::playlists::find_by_id(pool.get_ref(), playlist_id)
        .await?
        .ok_or_else(|| AppError::NotFound("playlist".to_string()))?;
    authz::assert_owner(playlist.owner_id, user.0)?;

    db::playlists::delete_playlist(pool.get_ref(), playlist_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn add_video(
    pool: web::Data<PgPool>,
    user: UserId,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (playlist_id, video_id) = path.into_inner();
    let playlist_id = parse_id(&playlist_id, "playlist")?;
    let video_id = parse_id(&video_id, "video")?;

    let playlist = db::playlists::find_by_id(pool.get_ref(), playlist_id)
        .await?
        .ok_or_else(|| AppError::NotFound("playlist".to_string()))?;
    authz::assert_owner(playlist.owner_id, user.0)?;

    if db::videos::find_by_id(pool.get_ref(), video_id).await?.is_none() {
        return Err(AppError::NotFound("video".to_string()));
    }

    db::playlists::add_video(pool.get_ref(), playlist_id, video_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "added": true })))
}

pub async fn remove_video(
    pool: web::Data<PgPool>,
    user: UserId,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (playlist_id, video_id) = path.into_inner();
    let playlist_id = parse_id(&playlist_id, "playlist")?;
    let video_id = parse_id(&video_id, "video")?;

    let playlist = db::playlists::find_by_id(pool.get_ref(), playlist_id)
        .await?
        .ok_or_else(|| AppError::NotFound("playlist".to_string()))?;
    authz::assert_owner(playlist.owner_id, user.0)?;

    if !db::playlists::remove_video(pool.get_ref(), playlist_id, video_id).await? {
        return Err(AppError::NotFound("video in playlist".to_string()));
    }

    Ok(HttpResponse::NoContent().finish())
}
