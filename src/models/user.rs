use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::user_profile::{ProfileUpdate, UserProfile};

pub const ROLE_SELLER: &str = "seller";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub profile_image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>, role: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            email: email.into(),
            password_hash: password_hash.into(),
            role: role.into(),
            full_name: String::new(),
            phone: String::new(),
            address: String::new(),
            dob: String::new(),
            gender: String::new(),
            bio: String::new(),
            profile_image: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            dob: self.dob.clone(),
            gender: self.gender.clone(),
            role: self.role.clone(),
            bio: self.bio.clone(),
            profile_image: self.profile_image.clone(),
        }
    }

    /// Email and role are owned by the account, not the profile form.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(v) = &update.full_name {
            self.full_name = v.trim().to_string();
        }
        if let Some(v) = &update.phone {
            self.phone = v.trim().to_string();
        }
        if let Some(v) = &update.address {
            self.address = v.clone();
        }
        if let Some(v) = &update.dob {
            self.dob = v.clone();
        }
        if let Some(v) = &update.gender {
            self.gender = v.clone();
        }
        if let Some(v) = &update.bio {
            self.bio = v.clone();
        }
        if let Some(v) = &update.profile_image {
            self.profile_image = v.clone();
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
    pub exp: usize,
}

impl Claims {
    pub fn is_seller(&self) -> bool {
        self.role.eq_ignore_ascii_case(ROLE_SELLER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_ignores_email_and_role() {
        let mut user = User::new("a@b.com", "hash", "user");
        let update = ProfileUpdate {
            full_name: Some("  Asha Rao ".into()),
            email: Some("evil@b.com".into()),
            role: Some("admin".into()),
            bio: Some("hello".into()),
            ..Default::default()
        };
        user.apply(&update);

        assert_eq!(user.full_name, "Asha Rao");
        assert_eq!(user.bio, "hello");
        assert_eq!(user.email, "a@b.com");
        assert_eq!(user.role, "user");
    }
}
