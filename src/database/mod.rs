//! Persistence seams. Handlers and services only see these traits; MongoDB
//! backs them in production and the in-memory stores back tests and local runs
//! without a `DATABASE_URL`.

pub mod connection;
pub mod memory;
pub mod migrate;
pub mod mongo_store;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::models::otp::OtpRecord;
use crate::models::product::Product;
use crate::models::user::User;
use crate::models::user_profile::ProfileUpdate;

#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Insert or replace the record for `record.email`.
    async fn upsert(&self, record: OtpRecord) -> Result<()>;

    async fn find(&self, email: &str) -> Result<Option<OtpRecord>>;

    async fn record_failed_attempt(&self, email: &str) -> Result<()>;

    async fn mark_verified(&self, email: &str, code: &str) -> Result<()>;

    /// Atomically flip a verified, unconsumed, unexpired record matching
    /// `code` to consumed. Returns the record as it was before consumption.
    async fn consume(
        &self,
        email: &str,
        code: &str,
        max_attempts: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<OtpRecord>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;

    /// Returns false when no account has that email.
    async fn update_password(&self, email: &str, password_hash: &str) -> Result<bool>;

    async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> Result<Option<User>>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert(&self, product: Product) -> Result<Product>;

    /// Newest first.
    async fn list_by_seller(&self, seller_id: &str) -> Result<Vec<Product>>;
}
