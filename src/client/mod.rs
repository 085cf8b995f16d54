//! Typed client for the storefront's account and seller flows.
//!
//! Browser storage is replaced by [`session::SessionCache`], which the
//! profile and product clients share.

pub mod api;
pub mod product_form;
pub mod profile;
pub mod reset_flow;
pub mod session;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Shown for anything that never produced an HTTP response.
pub const SERVER_ERROR: &str = "Server error. Try again later.";

#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected locally, no request was made.
    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Server error. Try again later.")]
    Transport(#[from] reqwest::Error),

    #[error("Please wait {0}s before requesting another code")]
    Cooldown(u64),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Unexpected response from server: {0}")]
    Decode(String),

    #[error("Session storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl ClientError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ClientError::Validation(msg.into())
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Rejected { status, .. } => Some(*status),
            ClientError::Transport(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Url,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url.trim())?;
        // Url::join replaces the last segment unless the path ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url })
    }

    /// Reads `VITE_BACKEND_API_URL`, falling back to the local dev server.
    pub fn from_env() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();
        let base = std::env::var("VITE_BACKEND_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self::new(&base)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an API path such as `/api/upload` against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

/// Pick the human-readable message out of an error body. The endpoints
/// disagree on the field name, so try each in turn.
pub(crate) fn body_message(body: &Value) -> Option<String> {
    ["msg", "message", "error"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|msg| !msg.is_empty())
        .map(str::to_string)
}

/// Turn a response into its JSON body, or a `Rejected` error carrying the
/// server's message (or `fallback` when it sent none).
pub(crate) async fn read_json(
    response: reqwest::Response,
    fallback: &str,
) -> Result<Value, ClientError> {
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if status.is_success() {
        Ok(body)
    } else {
        Err(ClientError::Rejected {
            status,
            message: body_message(&body).unwrap_or_else(|| fallback.to_string()),
        })
    }
}

/// Deserialize one field of a success body.
pub(crate) fn decode_field<T: DeserializeOwned>(body: &Value, field: &str) -> Result<T, ClientError> {
    let value = body
        .get(field)
        .cloned()
        .ok_or_else(|| ClientError::Decode(format!("missing `{}`", field)))?;
    serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))
}
