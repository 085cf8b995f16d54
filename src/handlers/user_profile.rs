use axum::{extract::State, Extension, Json};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use validator::Validate;

use crate::errors::{AppError, Result};
use crate::models::user::Claims;
use crate::models::user_profile::{ProfileUpdate, UserProfile};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub message: String,
    pub user: UserProfile,
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ProfileResponse>> {
    let user = state
        .users
        .find_by_id(&claims.sub)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(ProfileResponse {
        success: true,
        message: "Profile loaded".to_string(),
        user: user.profile(),
    }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(update), _): WithRejection<Json<ProfileUpdate>, AppError>,
) -> Result<Json<ProfileResponse>> {
    update.validate()?;

    let user = state
        .users
        .update_profile(&claims.sub, &update)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    tracing::info!("✅ Profile updated for {}", user.email);

    Ok(Json(ProfileResponse {
        success: true,
        message: "Profile updated successfully".to_string(),
        user: user.profile(),
    }))
}
