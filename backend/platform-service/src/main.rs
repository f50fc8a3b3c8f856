/// Platform Service - HTTP server
///
/// Bootstraps configuration, the database pool, the object store client, and
/// the service layer, then serves the API.
use actix_web::{web, App, HttpResponse, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;

use platform_service::handlers;
use platform_service::security::tokens::TokenIssuer;
use platform_service::services::sessions::PgCredentialStore;
use platform_service::services::storage::{self, ObjectStore};
use platform_service::services::{ProfileService, SessionService, VideoService, WriteCoordinator};
use platform_service::Config;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env().expect("Failed to load configuration");

    // Signer misconfiguration is fatal at startup, never a request-time error
    let issuer =
        Arc::new(TokenIssuer::from_config(&config.auth).expect("Failed to initialize token issuer"));

    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");

    let s3_store = storage::get_object_store(&config.storage)
        .await
        .expect("Failed to initialize object store client");
    if let Err(err) = s3_store.health_check().await {
        tracing::warn!("object store health check failed: {}", err);
    }
    let object_store: Arc<dyn ObjectStore> = Arc::new(s3_store);

    let coordinator = Arc::new(WriteCoordinator::new(Arc::clone(&object_store)));
    let sessions = Arc::new(SessionService::new(
        Arc::new(PgCredentialStore::new(db_pool.clone())),
        (*issuer).clone(),
    ));
    let profiles = Arc::new(ProfileService::new(db_pool.clone(), Arc::clone(&coordinator)));
    let videos = Arc::new(VideoService::new(db_pool.clone(), Arc::clone(&coordinator)));

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!(%bind_address, env = %config.app.env, "platform-service starting");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(Arc::clone(&sessions)))
            .app_data(web::Data::new(Arc::clone(&profiles)))
            .app_data(web::Data::new(Arc::clone(&videos)))
            .route(
                "/health",
                web::get().to(|| async { HttpResponse::Ok().json(serde_json::json!({ "status": "ok" })) }),
            )
            .configure(handlers::configure(Arc::clone(&issuer)))
    })
    .bind(&bind_address)?
    .run()
    .await
}
