pub mod cloudinary;
pub mod email_service;
pub mod otp_service;
pub mod password_policy;
pub mod rate_limiter;
