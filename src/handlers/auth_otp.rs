use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;
use validator::Validate;

use crate::dtos::auth_dtos::{
    is_otp_code, ConfirmResetRequest, MessageResponse, RequestOtpRequest, VerifyOtpRequest,
};
use crate::errors::{AppError, Result};
use crate::state::AppState;

// 1. Request OTP
pub async fn request_otp(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<RequestOtpRequest>, AppError>,
) -> Result<Json<MessageResponse>> {
    req.validate()?;

    state.otp_service.request_otp(&req.email).await?;

    Ok(Json(MessageResponse::ok(
        "OTP sent! Please check your inbox and, if necessary, your Spam/Junk folder.",
    )))
}

// 2. Verify OTP
pub async fn verify_otp(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<VerifyOtpRequest>, AppError>,
) -> Result<Json<MessageResponse>> {
    req.validate()?;
    if !is_otp_code(&req.otp) {
        return Err(AppError::invalid_data("OTP must be 6 digits"));
    }

    state.otp_service.verify_otp(&req.email, &req.otp).await?;

    Ok(Json(MessageResponse::ok("OTP verified successfully")))
}

// 3. Confirm new password with the verified OTP
pub async fn confirm_reset(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<ConfirmResetRequest>, AppError>,
) -> Result<Json<MessageResponse>> {
    req.validate()?;
    if !is_otp_code(&req.otp) {
        return Err(AppError::InvalidOtp);
    }

    state
        .otp_service
        .confirm_reset(&req.email, &req.otp, &req.new_password)
        .await?;

    Ok(Json(MessageResponse::ok("Password reset successful")))
}
