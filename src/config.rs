// config.rs
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::{AppError, Result};

const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub upload_preset: String,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub sendgrid_api_key: Option<String>,
    pub from_email: String,
    pub from_name: String,
}

/// Tunables for the password reset protocol.
#[derive(Debug, Clone)]
pub struct OtpConfig {
    pub ttl: Duration,
    pub max_attempts: u32,
    pub requests_per_window: u32,
    pub request_window: Duration,
    pub bcrypt_cost: u32,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(120),
            max_attempts: 5,
            requests_per_window: 3,
            request_window: Duration::from_secs(600),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub database_name: String,
    pub jwt_secret: String,
    pub mail: MailConfig,
    pub cloudinary: Option<CloudinaryConfig>,
    pub otp: OtpConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("⚠️ JWT_SECRET not set, using the development default");
                DEFAULT_JWT_SECRET.to_string()
            }
        };

        let defaults = OtpConfig::default();
        let otp = OtpConfig {
            ttl: Duration::from_secs(parse_var("OTP_TTL_SECONDS", defaults.ttl.as_secs())?),
            max_attempts: parse_var("OTP_MAX_ATTEMPTS", defaults.max_attempts)?,
            requests_per_window: parse_var("OTP_REQUESTS_PER_WINDOW", defaults.requests_per_window)?,
            request_window: Duration::from_secs(parse_var(
                "OTP_REQUEST_WINDOW_SECONDS",
                defaults.request_window.as_secs(),
            )?),
            bcrypt_cost: parse_var("BCRYPT_COST", defaults.bcrypt_cost)?,
        };

        if otp.max_attempts == 0 || otp.requests_per_window == 0 || otp.request_window.is_zero() {
            return Err(AppError::configuration(
                "OTP_MAX_ATTEMPTS, OTP_REQUESTS_PER_WINDOW and OTP_REQUEST_WINDOW_SECONDS must be positive",
            ));
        }

        Ok(AppConfig {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 3000)?,
            database_url: non_empty_var("DATABASE_URL"),
            database_name: env::var("DATABASE_NAME").unwrap_or_else(|_| "urbantales".to_string()),
            jwt_secret,
            mail: MailConfig {
                sendgrid_api_key: non_empty_var("SENDGRID_API_KEY"),
                from_email: env::var("MAIL_FROM")
                    .unwrap_or_else(|_| "urbantales4@gmail.com".to_string()),
                from_name: env::var("MAIL_FROM_NAME")
                    .unwrap_or_else(|_| "UrbanTales Seller".to_string()),
            },
            cloudinary: cloudinary_from_env(),
            otp,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn cloudinary_from_env() -> Option<CloudinaryConfig> {
    let cloud_name = non_empty_var("CLOUDINARY_CLOUD_NAME")?;

    Some(CloudinaryConfig {
        cloud_name,
        upload_preset: env::var("CLOUDINARY_UPLOAD_PRESET")
            .unwrap_or_else(|_| "ml_default".to_string()),
    })
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::configuration(format!("{} must be a number, got {:?}", key, raw))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_defaults_match_the_protocol() {
        let otp = OtpConfig::default();
        assert_eq!(otp.ttl, Duration::from_secs(120));
        assert_eq!(otp.max_attempts, 5);
        assert_eq!(otp.requests_per_window, 3);
    }

    #[test]
    fn parse_var_falls_back_to_default() {
        let value: u16 = parse_var("URBANTALES_TEST_UNSET_PORT", 3000).unwrap();
        assert_eq!(value, 3000);
    }
}
