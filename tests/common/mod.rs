#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use chrono::Utc;

use urbantales_api::build_router;
use urbantales_api::config::{MailConfig, OtpConfig};
use urbantales_api::database::memory::{MemoryOtpStore, MemoryProductStore, MemoryUserStore};
use urbantales_api::middleware::auth::issue_token;
use urbantales_api::models::user::{Claims, User};
use urbantales_api::services::email_service::{extract_otp, ConsoleMailer};
use urbantales_api::services::otp_service::OtpService;
use urbantales_api::state::AppState;

pub const SECRET: &str = "integration-secret";
pub const SELLER_EMAIL: &str = "seller@urbantales.test";
pub const BUYER_EMAIL: &str = "buyer@urbantales.test";
pub const OLD_PASSWORD: &str = "Old#Pass1";

pub struct TestApp {
    pub router: Router,
    pub users: Arc<MemoryUserStore>,
    pub mailer: ConsoleMailer,
    pub seller: User,
    pub buyer: User,
}

impl TestApp {
    pub fn new() -> Self {
        let otps = Arc::new(MemoryOtpStore::new());
        let users = Arc::new(MemoryUserStore::new());
        let products = Arc::new(MemoryProductStore::new());
        let mailer = ConsoleMailer::new();

        let hash = bcrypt::hash(OLD_PASSWORD, 4).unwrap();
        let mut seller = User::new(SELLER_EMAIL, hash.clone(), "seller");
        seller.full_name = "Asha Rao".into();
        let buyer = User::new(BUYER_EMAIL, hash, "user");
        users.insert(seller.clone()).unwrap();
        users.insert(buyer.clone()).unwrap();

        let mail = MailConfig {
            sendgrid_api_key: None,
            from_email: "noreply@urbantales.test".into(),
            from_name: "UrbanTales Seller".into(),
        };
        let otp = OtpConfig { bcrypt_cost: 4, ..OtpConfig::default() };
        let service = OtpService::new(otps, users.clone(), Arc::new(mailer.clone()), mail, otp).unwrap();

        let state = AppState::new(service, users.clone(), products, SECRET);
        TestApp { router: build_router(state), users, mailer, seller, buyer }
    }

    pub fn last_code(&self, email: &str) -> String {
        extract_otp(&self.mailer.last_to(email).expect("no mail sent")).expect("no code in mail")
    }

    /// Bind on an ephemeral port and return the base URL.
    pub async fn serve(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }
}

pub fn token_for(user: &User) -> String {
    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        role: user.role.clone(),
        exp: (Utc::now().timestamp() + 3600) as usize,
    };
    issue_token(&claims, SECRET).unwrap()
}
