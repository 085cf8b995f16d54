pub mod media;
pub mod otp;
pub mod product;
pub mod user;
pub mod user_profile;
