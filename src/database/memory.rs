use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::{OtpStore, ProductStore, UserStore};
use crate::errors::{AppError, Result};
use crate::models::otp::OtpRecord;
use crate::models::product::Product;
use crate::models::user::User;
use crate::models::user_profile::ProfileUpdate;

fn poisoned() -> AppError {
    AppError::service("in-memory store lock poisoned")
}

#[derive(Default)]
pub struct MemoryOtpStore {
    records: RwLock<HashMap<String, OtpRecord>>,
}

impl MemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OtpStore for MemoryOtpStore {
    async fn upsert(&self, record: OtpRecord) -> Result<()> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        records.insert(record.email.clone(), record);
        Ok(())
    }

    async fn find(&self, email: &str) -> Result<Option<OtpRecord>> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records.get(email).cloned())
    }

    async fn record_failed_attempt(&self, email: &str) -> Result<()> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        if let Some(record) = records.get_mut(email) {
            record.attempts += 1;
        }
        Ok(())
    }

    async fn mark_verified(&self, email: &str, code: &str) -> Result<()> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        if let Some(record) = records.get_mut(email).filter(|r| r.code == code) {
            record.verified = true;
        }
        Ok(())
    }

    async fn consume(
        &self,
        email: &str,
        code: &str,
        max_attempts: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<OtpRecord>> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        match records.get_mut(email) {
            Some(record)
                if record.code == code && record.verified && record.is_live(now, max_attempts) =>
            {
                let before = record.clone();
                record.consumed = true;
                Ok(Some(before))
            }
            _ => Ok(None),
        }
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: User) -> Result<()> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        users.insert(user.id.clone(), user);
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.values().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.get(id).cloned())
    }

    async fn update_password(&self, email: &str, password_hash: &str) -> Result<bool> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        match users.values_mut().find(|u| u.email.eq_ignore_ascii_case(email)) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> Result<Option<User>> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        Ok(users.get_mut(id).map(|user| {
            user.apply(update);
            user.clone()
        }))
    }
}

#[derive(Default)]
pub struct MemoryProductStore {
    products: RwLock<Vec<Product>>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn insert(&self, product: Product) -> Result<Product> {
        let mut products = self.products.write().map_err(|_| poisoned())?;
        products.push(product.clone());
        Ok(product)
    }

    async fn list_by_seller(&self, seller_id: &str) -> Result<Vec<Product>> {
        let products = self.products.read().map_err(|_| poisoned())?;
        let mut mine: Vec<Product> = products
            .iter()
            .filter(|p| p.seller_id == seller_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mine)
    }
}
