pub mod auth_otp;
pub mod health;
pub mod products;
pub mod upload;
pub mod user_profile;
