pub mod auth_otp_routes;
pub mod products;
pub mod upload;
pub mod user_profile;
