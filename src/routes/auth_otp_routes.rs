use axum::{routing::post, Router};

use crate::{handlers::auth_otp, state::AppState};

pub fn auth_otp_routes() -> Router<AppState> {
    Router::new()
        // Email a fresh code
        .route("/auth/reset-password/request", post(auth_otp::request_otp))

        // Check the code without spending it
        .route("/auth/reset-password/verify", post(auth_otp::verify_otp))

        // Spend the code and set the new password
        .route("/auth/reset-password/confirm", post(auth_otp::confirm_reset))
}
