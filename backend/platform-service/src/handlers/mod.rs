/// HTTP handlers
///
/// Handlers stay thin: they parse the request, call a service or repository,
/// and shape the response. Consistency logic lives in `services/`.
///
/// The whole API scope is wrapped with `JwtAuth`; handlers that require an
/// authenticated caller take the `UserId` extractor, public reads do not.
use std::collections::HashMap;
use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::web::{self, BytesMut};
use futures_util::StreamExt;

use crate::error::{AppError, Result};
use crate::middleware::JwtAuth;
use crate::models::FileUpload;
use crate::security::tokens::TokenIssuer;

pub mod auth;
pub mod comments;
pub mod likes;
pub mod playlists;
pub mod subscriptions;
pub mod tweets;
pub mod users;
pub mod videos;

/// Register all routes under /api/v1
pub fn configure(issuer: Arc<TokenIssuer>) -> impl Fn(&mut web::ServiceConfig) + Clone {
    move |cfg: &mut web::ServiceConfig| {
        cfg.service(
            web::scope("/api/v1")
                .wrap(JwtAuth::new(Arc::clone(&issuer)))
                .service(
                    web::scope("/auth")
                        .service(web::resource("/register").route(web::post().to(auth::register)))
                        .service(web::resource("/login").route(web::post().to(auth::login)))
                        .service(web::resource("/refresh").route(web::post().to(auth::refresh)))
                        .service(web::resource("/logout").route(web::post().to(auth::logout))),
                )
                .service(
                    web::scope("/users")
                        .service(
                            web::resource("/me")
                                .route(web::get().to(users::current_user))
                                .route(web::patch().to(users::update_profile)),
                        )
                        .service(
                            web::resource("/me/avatar")
                                .route(web::patch().to(users::update_avatar)),
                        )
                        .service(
                            web::resource("/me/cover-image")
                                .route(web::patch().to(users::update_cover_image)),
                        )
                        .service(
                            web::resource("/c/{username}")
                                .route(web::get().to(users::get_channel)),
                        ),
                )
                .service(
                    web::scope("/videos")
                        .service(
                            web::resource("")
                                .route(web::get().to(videos::list_videos))
                                .route(web::post().to(videos::publish_video)),
                        )
                        .service(
                            web::resource("/{video_id}")
                                .route(web::get().to(videos::get_video))
                                .route(web::patch().to(videos::update_video))
                                .route(web::delete().to(videos::delete_video)),
                        )
                        .service(
                            web::resource("/{video_id}/thumbnail")
                                .route(web::patch().to(videos::update_thumbnail)),
                        )
                        .service(
                            web::resource("/{video_id}/publish")
                                .route(web::post().to(videos::toggle_publish)),
                        )
                        .service(
                            web::resource("/{video_id}/comments")
                                .route(web::get().to(comments::list_comments))
                                .route(web::post().to(comments::create_comment)),
                        )
                        .service(
                            web::resource("/{video_id}/like")
                                .route(web::post().to(likes::toggle_video_like)),
                        ),
                )
                .service(
                    web::scope("/tweets")
                        .service(web::resource("").route(web::post().to(tweets::create_tweet)))
                        .service(
                            web::resource("/user/{user_id}")
                                .route(web::get().to(tweets::list_user_tweets)),
                        )
                        .service(
                            web::resource("/{tweet_id}")
                                .route(web::patch().to(tweets::update_tweet))
                                .route(web::delete().to(tweets::delete_tweet)),
                        )
                        .service(
                            web::resource("/{tweet_id}/like")
                                .route(web::post().to(likes::toggle_tweet_like)),
                        ),
                )
                .service(
                    web::scope("/comments")
                        .service(
                            web::resource("/{comment_id}")
                                .route(web::patch().to(comments::update_comment))
                                .route(web::delete().to(comments::delete_comment)),
                        )
                        .service(
                            web::resource("/{comment_id}/like")
                                .route(web::post().to(likes::toggle_comment_like)),
                        ),
                )
                .service(
                    web::scope("/likes").service(
                        web::resource("/videos").route(web::get().to(likes::list_liked_videos)),
                    ),
                )
                .service(
                    web::scope("/subscriptions")
                        .service(
                            web::resource("/channel/{channel_id}")
                                .route(web::post().to(subscriptions::toggle_subscription)),
                        )
                        .service(
                            web::resource("/channel/{channel_id}/subscribers")
                                .route(web::get().to(subscriptions::list_subscribers)),
                        )
                        .service(
                            web::resource("/channels")
                                .route(web::get().to(subscriptions::list_subscribed_channels)),
                        ),
                )
                .service(
                    web::scope("/playlists")
                        .service(web::resource("").route(web::post().to(playlists::create_playlist)))
                        .service(
                            web::resource("/user/{user_id}")
                                .route(web::get().to(playlists::list_user_playlists)),
                        )
                        .service(
                            web::resource("/{playlist_id}")
                                .route(web::get().to(playlists::get_playlist))
                                .route(web::patch().to(playlists::update_playlist))
                                .route(web::delete().to(playlists::delete_playlist)),
                        )
                        .service(
                            web::resource("/{playlist_id}/videos/{video_id}")
                                .route(web::post().to(playlists::add_video))
                                .route(web::delete().to(playlists::remove_video)),
                        ),
                ),
        );
    }
}

/// Multipart form collected into memory: named text fields plus named files
pub(crate) struct UploadForm {
    texts: HashMap<String, String>,
    files: HashMap<String, FileUpload>,
}

impl UploadForm {
    pub(crate) async fn read(mut payload: Multipart) -> Result<Self> {
        let mut texts = HashMap::new();
        let mut files = HashMap::new();

        while let Some(item) = payload.next().await {
            let mut field = item
                .map_err(|e| AppError::Validation(format!("invalid multipart payload: {e}")))?;

            let cd = field.content_disposition();
            let name = cd.and_then(|cd| cd.get_name()).unwrap_or_default().to_string();
            let is_file = cd.and_then(|cd| cd.get_filename()).is_some();
            let content_type = field
                .content_type()
                .map(|mime| mime.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());

            let mut data = BytesMut::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|e| {
                    AppError::Validation(format!("failed to read field {name}: {e}"))
                })?;
                data.extend_from_slice(&chunk);
            }

            if is_file {
                files.insert(
                    name,
                    FileUpload {
                        data: data.freeze(),
                        content_type,
                    },
                );
            } else {
                let value = String::from_utf8(data.to_vec())
                    .map_err(|_| AppError::Validation(format!("field {name} must be UTF-8 text")))?;
                texts.insert(name, value);
            }
        }

        Ok(Self { texts, files })
    }

    pub(crate) fn text(&self, name: &str) -> String {
        self.texts.get(name).cloned().unwrap_or_default()
    }

    pub(crate) fn take_file(&mut self, name: &str) -> Option<FileUpload> {
        self.files.remove(name)
    }

    pub(crate) fn require_file(&mut self, name: &str) -> Result<FileUpload> {
        self.take_file(name)
            .ok_or_else(|| AppError::Validation(format!("{name} file is missing")))
    }
}
