pub mod client;
pub mod config;
pub mod database;
pub mod dtos;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use std::sync::Arc;

use axum::{http::Method, routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::{
    connection::get_db_client,
    memory::{MemoryOtpStore, MemoryProductStore, MemoryUserStore},
    migrate::ensure_indexes,
    mongo_store::{MongoOtpStore, MongoProductStore, MongoUserStore},
    OtpStore, ProductStore, UserStore,
};
use crate::errors::Result;
use crate::handlers::health;
use crate::services::cloudinary::CloudinaryService;
use crate::services::email_service::{ConsoleMailer, Mailer, SendGridMailer};
use crate::services::otp_service::OtpService;
use crate::state::AppState;

/// Wire stores, mailer and uploader from configuration.
pub async fn initialize_app_state(config: &AppConfig) -> Result<AppState> {
    let (otps, users, products, label): (
        Arc<dyn OtpStore>,
        Arc<dyn UserStore>,
        Arc<dyn ProductStore>,
        &'static str,
    ) = match config.database_url.as_deref() {
        Some(url) => {
            let db = get_db_client(url, &config.database_name).await?;
            ensure_indexes(&db).await?;
            (
                Arc::new(MongoOtpStore::new(&db)),
                Arc::new(MongoUserStore::new(&db)),
                Arc::new(MongoProductStore::new(&db)),
                "mongodb",
            )
        }
        None => {
            tracing::warn!("⚠️ DATABASE_URL not set, using in-memory stores");
            (
                Arc::new(MemoryOtpStore::new()),
                Arc::new(MemoryUserStore::new()),
                Arc::new(MemoryProductStore::new()),
                "memory",
            )
        }
    };

    let mailer: Arc<dyn Mailer> = match config.mail.sendgrid_api_key.clone() {
        Some(key) => {
            tracing::info!("✅ SendGrid mailer configured");
            Arc::new(SendGridMailer::new(key))
        }
        None => {
            tracing::warn!("⚠️ SENDGRID_API_KEY not set, OTP emails will only be logged");
            Arc::new(ConsoleMailer::new())
        }
    };

    let otp_service = OtpService::new(
        otps,
        users.clone(),
        mailer,
        config.mail.clone(),
        config.otp.clone(),
    )?;

    let mut state = AppState::new(otp_service, users, products, config.jwt_secret.as_str())
        .with_database_label(label);

    match &config.cloudinary {
        Some(cloudinary) => {
            tracing::info!("✅ Cloudinary uploads enabled for {}", cloudinary.cloud_name);
            state = state.with_uploader(Arc::new(CloudinaryService::new(cloudinary)));
        }
        None => tracing::warn!("⚠️ CLOUDINARY_CLOUD_NAME not set, uploads are disabled"),
    }

    Ok(state)
}

pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .allow_credentials(false);

    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_check))
        .route("/api/health", get(health::api_health_check))
        .nest("/api", routes::auth_otp_routes::auth_otp_routes())
        .nest("/api", routes::user_profile::user_profile_routes(app_state.clone()))
        .nest("/api", routes::products::product_routes(app_state.clone()))
        .nest("/api", routes::upload::upload_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(app_state)
}
