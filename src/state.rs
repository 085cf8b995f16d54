use std::sync::Arc;

use crate::database::{ProductStore, UserStore};
use crate::services::cloudinary::MediaUploader;
use crate::services::otp_service::OtpService;

#[derive(Clone)]
pub struct AppState {
    pub otp_service: Arc<OtpService>,
    pub users: Arc<dyn UserStore>,
    pub products: Arc<dyn ProductStore>,
    pub uploader: Option<Arc<dyn MediaUploader>>,
    pub jwt_secret: Arc<str>,
    pub database: &'static str,
}

impl AppState {
    pub fn new(
        otp_service: OtpService,
        users: Arc<dyn UserStore>,
        products: Arc<dyn ProductStore>,
        jwt_secret: impl Into<Arc<str>>,
    ) -> Self {
        AppState {
            otp_service: Arc::new(otp_service),
            users,
            products,
            uploader: None,
            jwt_secret: jwt_secret.into(),
            database: "memory",
        }
    }

    pub fn with_uploader(mut self, uploader: Arc<dyn MediaUploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    pub fn with_database_label(mut self, label: &'static str) -> Self {
        self.database = label;
        self
    }
}
