// src/errors.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("MongoDB error: {0}")]
    MongoDB(#[from] mongodb::error::Error),

    #[error("Multipart error: {0}")]
    Multipart(String),

    #[error("Unsupported media format")]
    InvalidMediaFormat,

    #[error("File too large")]
    FileTooLarge,

    #[error("No file provided")]
    NoFileProvided,

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid or expired OTP")]
    InvalidOtp,

    #[error("Authentication error")]
    AuthError,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("Too many OTP requests. Try again in {retry_after_secs} seconds.")]
    RateLimitExceeded { retry_after_secs: u64 },

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Cloudinary error: {0}")]
    CloudinaryError(String),

    #[error("Email delivery failed: {0}")]
    EmailError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Service error: {0}")]
    ServiceError(String),
}

impl AppError {
    fn status_and_label(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::MongoDB(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
            AppError::Multipart(_) => (StatusCode::BAD_REQUEST, "Invalid multipart data"),
            AppError::InvalidMediaFormat => (StatusCode::BAD_REQUEST, "Invalid media format"),
            AppError::FileTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "File too large"),
            AppError::NoFileProvided => (StatusCode::BAD_REQUEST, "No file provided"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Not found"),
            AppError::InvalidOtp => (StatusCode::BAD_REQUEST, "Invalid OTP"),
            AppError::AuthError => (StatusCode::UNAUTHORIZED, "Authentication failed"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "Forbidden"),
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "Validation failed"),
            AppError::RateLimitExceeded { .. } => (StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded"),
            AppError::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "Service unavailable"),
            AppError::CloudinaryError(_) => (StatusCode::BAD_GATEWAY, "Upload failed"),
            AppError::EmailError(_) => (StatusCode::BAD_GATEWAY, "Email error"),
            AppError::ConfigurationError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error"),
            AppError::ServiceError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Service error"),
        }
    }

    /// Text shown to the caller. Business errors are surfaced verbatim,
    /// infrastructure errors get a generic line so internals don't leak.
    pub fn public_message(&self) -> String {
        match self {
            AppError::MongoDB(_)
            | AppError::ConfigurationError(_)
            | AppError::ServiceError(_) => "Something went wrong. Please try again later.".to_string(),
            AppError::CloudinaryError(_) => "Upload failed. Try again.".to_string(),
            AppError::EmailError(_) => "Failed to send OTP email. Try again.".to_string(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status_and_label().0
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, label) = self.status_and_label();

        if status.is_server_error() {
            tracing::error!("❌ {}", self);
        }

        let message = self.public_message();
        let body = Json(json!({
            "error": label,
            "message": message,
            "msg": message,
            "success": false,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        let mut response = (status, body).into_response();
        if let AppError::RateLimitExceeded { retry_after_secs } = self {
            if let Ok(value) = retry_after_secs.to_string().parse() {
                response.headers_mut().insert(axum::http::header::RETRY_AFTER, value);
            }
        }
        response
    }
}

impl From<axum_extra::extract::multipart::MultipartError> for AppError {
    fn from(err: axum_extra::extract::multipart::MultipartError) -> Self {
        AppError::Multipart(err.to_string())
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {}", field))
                })
            })
            .collect();
        messages.sort();
        AppError::ValidationError(messages.join(", "))
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::ServiceError(format!("Password hashing failed: {}", err))
    }
}

// Helper conversion functions
impl AppError {
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn cloudinary(msg: impl Into<String>) -> Self {
        AppError::CloudinaryError(msg.into())
    }

    pub fn email(msg: impl Into<String>) -> Self {
        AppError::EmailError(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::ConfigurationError(msg.into())
    }

    pub fn service(msg: impl Into<String>) -> Self {
        AppError::ServiceError(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
