use async_trait::async_trait;
use serde_json::json;

use crate::client::{body_message, read_json, ClientConfig, ClientError};

/// The three reset endpoints. Each call resolves to the server's success
/// message.
#[async_trait]
pub trait ResetApi: Send + Sync {
    async fn request_otp(&self, email: &str) -> Result<String, ClientError>;

    async fn verify_otp(&self, email: &str, otp: &str) -> Result<String, ClientError>;

    async fn confirm_reset(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> Result<String, ClientError>;
}

#[derive(Clone)]
pub struct HttpResetApi {
    http: reqwest::Client,
    config: ClientConfig,
}

impl HttpResetApi {
    pub fn new(config: ClientConfig) -> Self {
        Self { http: reqwest::Client::new(), config }
    }

    pub fn with_client(config: ClientConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
        fallback: &str,
    ) -> Result<String, ClientError> {
        let url = self.config.endpoint(path)?;
        let response = self.http.post(url).json(&body).send().await?;
        let body = read_json(response, fallback).await?;
        Ok(body_message(&body).unwrap_or_default())
    }
}

#[async_trait]
impl ResetApi for HttpResetApi {
    async fn request_otp(&self, email: &str) -> Result<String, ClientError> {
        self.post(
            "/api/auth/reset-password/request",
            json!({ "email": email }),
            "Failed to send OTP.",
        )
        .await
    }

    async fn verify_otp(&self, email: &str, otp: &str) -> Result<String, ClientError> {
        self.post(
            "/api/auth/reset-password/verify",
            json!({ "email": email, "otp": otp }),
            "Invalid or expired OTP.",
        )
        .await
    }

    async fn confirm_reset(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> Result<String, ClientError> {
        self.post(
            "/api/auth/reset-password/confirm",
            json!({ "email": email, "otp": otp, "newPassword": new_password }),
            "Reset failed.",
        )
        .await
    }
}
