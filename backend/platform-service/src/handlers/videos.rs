/// Video handlers
use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::handlers::UploadForm;
use crate::middleware::UserId;
use crate::models::{PageQuery, UpdateVideoRequest, VideoResponse};
use crate::services::videos::PublishVideoInput;
use crate::services::VideoService;

fn parse_id(raw: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("invalid {what} ID")))
}

/// Publish a video. Multipart: title, description, duration_seconds
/// (optional), video_file (file), thumbnail (file).
pub async fn publish_video(
    videos: web::Data<Arc<VideoService>>,
    user: UserId,
    payload: Multipart,
) -> Result<HttpResponse> {
    let mut form = UploadForm::read(payload).await?;
    let video_file = form.require_file("video_file")?;
    let thumbnail = form.require_file("thumbnail")?;

    let duration_seconds = match form.text("duration_seconds").as_str() {
        "" => None,
        raw => Some(raw.parse::<i32>().map_err(|_| {
            AppError::Validation("duration_seconds must be an integer".to_string())
        })?),
    };

    let video = videos
        .publish(
            user.0,
            PublishVideoInput {
                title: form.text("title"),
                description: form.text("description"),
                duration_seconds,
                video_file,
                thumbnail,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(VideoResponse::from(video)))
}

pub async fn list_videos(
    videos: web::Data<Arc<VideoService>>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let listed = videos.list_published(query.limit(), query.offset()).await?;
    let responses: Vec<VideoResponse> = listed.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(responses))
}

pub async fn get_video(
    videos: web::Data<Arc<VideoService>>,
    video_id: web::Path<String>,
) -> Result<HttpResponse> {
    let video = videos.find_video(parse_id(&video_id, "video")?).await?;
    Ok(HttpResponse::Ok().json(VideoResponse::from(video)))
}

pub async fn update_video(
    videos: web::Data<Arc<VideoService>>,
    user: UserId,
    video_id: web::Path<String>,
    payload: web::Json<UpdateVideoRequest>,
) -> Result<HttpResponse> {
    let video = videos
        .update_metadata(user.0, parse_id(&video_id, "video")?, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(VideoResponse::from(video)))
}

/// Replace the thumbnail. Multipart: thumbnail (file).
pub async fn update_thumbnail(
    videos: web::Data<Arc<VideoService>>,
    user: UserId,
    video_id: web::Path<String>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let mut form = UploadForm::read(payload).await?;
    let thumbnail = form.require_file("thumbnail")?;

    let video = videos
        .replace_thumbnail(user.0, parse_id(&video_id, "video")?, thumbnail)
        .await?;
    Ok(HttpResponse::Ok().json(VideoResponse::from(video)))
}

pub async fn delete_video(
    videos: web::Data<Arc<VideoService>>,
    user: UserId,
    video_id: web::Path<String>,
) -> Result<HttpResponse> {
    videos.delete(user.0, parse_id(&video_id, "video")?).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn toggle_publish(
    videos: web::Data<Arc<VideoService>>,
    user: UserId,
    video_id: web::Path<String>,
) -> Result<HttpResponse> {
    let video = videos
        .toggle_publish(user.0, parse_id(&video_id, "video")?)
        .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "is_published": video.is_published })))
}
