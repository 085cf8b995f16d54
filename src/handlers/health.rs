use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn root_handler() -> &'static str {
    "🛍️ UrbanTales Seller API"
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn api_health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "database": state.database,
        "uploads": state.uploader.is_some(),
        "otp": true,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
