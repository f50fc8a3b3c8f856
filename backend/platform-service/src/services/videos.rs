/// Video lifecycle operations
///
/// Publishing and thumbnail replacement persist blobs plus a record, so they
/// run through the write coordinator. Every mutation is owner-gated before
/// any upload is attempted.
use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::db::videos::NewVideo;
use crate::error::{AppError, Result};
use crate::models::{FileUpload, UpdateVideoRequest, Video};
use crate::services::authz;
use crate::services::coordinator::{AssetSource, WriteCoordinator};
use crate::services::storage::AssetKind;

pub struct VideoService {
    pool: PgPool,
    coordinator: Arc<WriteCoordinator>,
}

/// Publish input; both files are required
pub struct PublishVideoInput {
    pub title: String,
    pub description: String,
    pub duration_seconds: Option<i32>,
    pub video_file: FileUpload,
    pub thumbnail: FileUpload,
}

impl VideoService {
    pub fn new(pool: PgPool, coordinator: Arc<WriteCoordinator>) -> Self {
        Self { pool, coordinator }
    }

    /// Publish a video: stage the video file and thumbnail, then persist the
    /// record referencing both.
    ///
    /// If the thumbnail upload fails the already-staged video blob is
    /// removed; if the record insert fails both blobs are removed. Either
    /// way no record exists and no blob survives.
    pub async fn publish(&self, owner_id: Uuid, input: PublishVideoInput) -> Result<Video> {
        let title = input.title.trim().to_string();
        let description = input.description.trim().to_string();

        if title.is_empty() || description.is_empty() {
            return Err(AppError::Validation(
                "title and description are required".to_string(),
            ));
        }

        if input.video_file.data.is_empty() {
            return Err(AppError::Validation("video file is required".to_string()));
        }
        if !input.video_file.content_type.starts_with("video/") {
            return Err(AppError::Validation(
                "video file must be a video".to_string(),
            ));
        }
        if input.thumbnail.data.is_empty() {
            return Err(AppError::Validation("thumbnail is required".to_string()));
        }
        if !input.thumbnail.content_type.starts_with("image/") {
            return Err(AppError::Validation(
                "thumbnail must be an image".to_string(),
            ));
        }

        let sources = vec![
            AssetSource::new(
                "video file",
                input.video_file.data,
                AssetKind::Video,
                input.video_file.content_type,
            ),
            AssetSource::new(
                "thumbnail",
                input.thumbnail.data,
                AssetKind::Image,
                input.thumbnail.content_type,
            ),
        ];

        let pool = self.pool.clone();
        let duration_seconds = input.duration_seconds.unwrap_or(0).max(0);
        let video = self
            .coordinator
            .create_with_assets(sources, move |assets| async move {
                let (video_asset, thumbnail_asset) = match assets.as_slice() {
                    [video_asset, thumbnail_asset] => (video_asset, thumbnail_asset),
                    _ => {
                        return Err(AppError::Internal(
                            "staged assets missing for video publish".to_string(),
                        ))
                    }
                };

                db::videos::insert_video(
                    &pool,
                    NewVideo {
                        owner_id,
                        title,
                        description,
                        video_key: video_asset.key.clone(),
                        video_url: video_asset.url.clone(),
                        thumbnail_key: thumbnail_asset.key.clone(),
                        thumbnail_url: thumbnail_asset.url.clone(),
                        duration_seconds,
                    },
                )
                .await
            })
            .await?;

        tracing::info!(video_id = %video.id, %owner_id, "video published");
        Ok(video)
    }

    /// Replace a video's thumbnail; the previous blob is removed only after
    /// the new reference commits.
    pub async fn replace_thumbnail(
        &self,
        requester_id: Uuid,
        video_id: Uuid,
        thumbnail: FileUpload,
    ) -> Result<Video> {
        if !thumbnail.content_type.starts_with("image/") {
            return Err(AppError::Validation(
                "thumbnail must be an image".to_string(),
            ));
        }

        let video = self.find_video(video_id).await?;
        authz::assert_owner(video.owner_id, requester_id)?;

        let source = AssetSource::new(
            "thumbnail",
            thumbnail.data,
            AssetKind::Image,
            thumbnail.content_type,
        );

        let pool = self.pool.clone();
        self.coordinator
            .replace_asset(source, Some(video.thumbnail_key), move |asset| async move {
                db::videos::set_thumbnail(&pool, video_id, &asset.key, &asset.url)
                    .await?
                    .ok_or_else(|| AppError::NotFound("video".to_string()))
            })
            .await
    }

    /// Update title/description
    pub async fn update_metadata(
        &self,
        requester_id: Uuid,
        video_id: Uuid,
        request: UpdateVideoRequest,
    ) -> Result<Video> {
        if request.title.is_none() && request.description.is_none() {
            return Err(AppError::Validation(
                "at least one field is required".to_string(),
            ));
        }

        let video = self.find_video(video_id).await?;
        authz::assert_owner(video.owner_id, requester_id)?;

        db::videos::update_metadata(
            &self.pool,
            video_id,
            request.title.as_deref(),
            request.description.as_deref(),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("video".to_string()))
    }

    /// Delete the record, then remove its blobs best-effort.
    ///
    /// The record goes first: once it is gone nothing references the blobs,
    /// so a failed blob delete leaks storage but never breaks a reader.
    pub async fn delete(&self, requester_id: Uuid, video_id: Uuid) -> Result<()> {
        let video = self.find_video(video_id).await?;
        authz::assert_owner(video.owner_id, requester_id)?;

        if !db::videos::delete_video(&self.pool, video_id).await? {
            return Err(AppError::NotFound("video".to_string()));
        }

        self.coordinator
            .discard(vec![video.video_key, video.thumbnail_key])
            .await;

        tracing::info!(%video_id, "video deleted");
        Ok(())
    }

    pub async fn toggle_publish(&self, requester_id: Uuid, video_id: Uuid) -> Result<Video> {
        let video = self.find_video(video_id).await?;
        authz::assert_owner(video.owner_id, requester_id)?;

        db::videos::set_published(&self.pool, video_id, !video.is_published)
            .await?
            .ok_or_else(|| AppError::NotFound("video".to_string()))
    }

    pub async fn find_video(&self, video_id: Uuid) -> Result<Video> {
        db::videos::find_by_id(&self.pool, video_id)
            .await?
            .ok_or_else(|| AppError::NotFound("video".to_string()))
    }

    pub async fn list_published(&self, limit: i64, offset: i64) -> Result<Vec<Video>> {
        db::videos::list_published(&self.pool, limit, offset).await
    }

    pub async fn list_by_channel(&self, owner_id: Uuid) -> Result<Vec<Video>> {
        db::videos::list_by_owner(&self.pool, owner_id).await
    }
}
