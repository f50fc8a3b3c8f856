/// Account profile operations
///
/// Registration and image replacement both persist a blob and a record, so
/// they run through the write coordinator. Profile text updates go straight
/// to the repository.
use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::db::users::NewUser;
use crate::error::{AppError, Result};
use crate::models::{FileUpload, UpdateProfileRequest, User};
use crate::security::password;
use crate::services::coordinator::{AssetSource, WriteCoordinator};
use crate::services::storage::AssetKind;

pub struct ProfileService {
    pool: PgPool,
    coordinator: Arc<WriteCoordinator>,
}

/// Registration input; the avatar is required, the cover image is optional
pub struct RegisterInput {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub avatar: FileUpload,
    pub cover_image: Option<FileUpload>,
}

impl ProfileService {
    pub fn new(pool: PgPool, coordinator: Arc<WriteCoordinator>) -> Self {
        Self { pool, coordinator }
    }

    /// Create an account with its profile images.
    ///
    /// Preconditions run before any upload: required fields present, no
    /// conflicting account. The avatar (and cover image when given) are then
    /// staged and the account row is persisted referencing them; any failure
    /// along the way removes whatever was staged.
    pub async fn register(&self, input: RegisterInput) -> Result<User> {
        let full_name = input.full_name.trim().to_string();
        let email = input.email.trim().to_lowercase();
        let username = input.username.trim().to_lowercase();

        if full_name.is_empty() || email.is_empty() || username.is_empty() || input.password.is_empty()
        {
            return Err(AppError::Validation("all fields are required".to_string()));
        }

        require_image(&input.avatar, "avatar")?;
        if let Some(cover) = &input.cover_image {
            require_image(cover, "cover image")?;
        }

        if db::users::find_by_username_or_email(&self.pool, &username, &email)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "username or email already registered".to_string(),
            ));
        }

        let password_hash = password::hash_password(&input.password)?;

        let mut sources = vec![AssetSource::new(
            "avatar",
            input.avatar.data,
            AssetKind::Image,
            input.avatar.content_type,
        )];
        if let Some(cover) = input.cover_image {
            sources.push(AssetSource::new(
                "cover image",
                cover.data,
                AssetKind::Image,
                cover.content_type,
            ));
        }

        let pool = self.pool.clone();
        let user = self
            .coordinator
            .create_with_assets(sources, move |assets| async move {
                let avatar = assets
                    .first()
                    .ok_or_else(|| AppError::Internal("staged avatar missing".to_string()))?;
                let cover = assets.get(1);

                db::users::insert_user(
                    &pool,
                    NewUser {
                        username,
                        email,
                        full_name,
                        password_hash,
                        avatar_key: avatar.key.clone(),
                        avatar_url: avatar.url.clone(),
                        cover_image_key: cover.map(|c| c.key.clone()),
                        cover_image_url: cover.map(|c| c.url.clone()),
                    },
                )
                .await
            })
            .await?;

        tracing::info!(account_id = %user.id, "account registered");
        Ok(user)
    }

    /// Replace the account's avatar.
    ///
    /// The old blob is deleted only after the new reference has committed.
    pub async fn update_avatar(&self, account_id: Uuid, avatar: FileUpload) -> Result<User> {
        require_image(&avatar, "avatar")?;

        let current = self.find_account(account_id).await?;
        let source = AssetSource::new("avatar", avatar.data, AssetKind::Image, avatar.content_type);

        let pool = self.pool.clone();
        self.coordinator
            .replace_asset(source, Some(current.avatar_key), move |asset| async move {
                db::users::set_avatar(&pool, account_id, &asset.key, &asset.url)
                    .await?
                    .ok_or_else(|| AppError::NotFound("user".to_string()))
            })
            .await
    }

    /// Replace (or set) the account's cover image
    pub async fn update_cover_image(&self, account_id: Uuid, cover: FileUpload) -> Result<User> {
        require_image(&cover, "cover image")?;

        let current = self.find_account(account_id).await?;
        let source = AssetSource::new("cover image", cover.data, AssetKind::Image, cover.content_type);

        let pool = self.pool.clone();
        self.coordinator
            .replace_asset(source, current.cover_image_key, move |asset| async move {
                db::users::set_cover_image(&pool, account_id, &asset.key, &asset.url)
                    .await?
                    .ok_or_else(|| AppError::NotFound("user".to_string()))
            })
            .await
    }

    /// Update profile text fields
    pub async fn update_profile(
        &self,
        account_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<User> {
        if request.full_name.is_none() && request.email.is_none() {
            return Err(AppError::Validation(
                "at least one field is required".to_string(),
            ));
        }

        db::users::update_profile(
            &self.pool,
            account_id,
            request.full_name.as_deref(),
            request.email.as_deref(),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("user".to_string()))
    }

    pub async fn find_account(&self, account_id: Uuid) -> Result<User> {
        db::users::find_by_id(&self.pool, account_id)
            .await?
            .ok_or_else(|| AppError::NotFound("user".to_string()))
    }

    pub async fn find_channel(&self, username: &str) -> Result<User> {
        db::users::find_by_username(&self.pool, &username.to_lowercase())
            .await?
            .ok_or_else(|| AppError::NotFound("channel".to_string()))
    }
}

fn require_image(file: &FileUpload, label: &str) -> Result<()> {
    if file.data.is_empty() {
        return Err(AppError::Validation(format!("{label} file is missing")));
    }
    if !file.content_type.starts_with("image/") {
        return Err(AppError::Validation(format!("{label} must be an image")));
    }
    Ok(())
}
