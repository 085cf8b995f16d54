use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document},
    options::{Collation, CollationStrength, ReturnDocument},
    Collection, Database,
};
use serde::{Deserialize, Serialize};

use crate::database::{OtpStore, ProductStore, UserStore};
use crate::errors::Result;
use crate::models::media::MediaItem;
use crate::models::otp::OtpRecord;
use crate::models::product::Product;
use crate::models::user::User;
use crate::models::user_profile::ProfileUpdate;

pub const USERS: &str = "users";
pub const OTP_RECORDS: &str = "password_reset_otps";
pub const PRODUCTS: &str = "products";

/// Case-insensitive match for account emails, which are stored as registered.
pub(crate) fn email_collation() -> Collation {
    Collation::builder()
        .locale("en")
        .strength(CollationStrength::Secondary)
        .build()
}

fn to_bson(dt: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(dt.timestamp_millis())
}

fn from_bson(dt: BsonDateTime) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(dt.timestamp_millis())
        .single()
        .unwrap_or_else(Utc::now)
}

// ========== OTP RECORDS ==========

#[derive(Debug, Serialize, Deserialize)]
struct OtpDocument {
    email: String,
    code: String,
    attempts: i32,
    verified: bool,
    consumed: bool,
    issued_at: BsonDateTime,
    expires_at: BsonDateTime,
}

impl From<OtpRecord> for OtpDocument {
    fn from(r: OtpRecord) -> Self {
        Self {
            email: r.email,
            code: r.code,
            attempts: r.attempts as i32,
            verified: r.verified,
            consumed: r.consumed,
            issued_at: to_bson(r.issued_at),
            expires_at: to_bson(r.expires_at),
        }
    }
}

impl From<OtpDocument> for OtpRecord {
    fn from(d: OtpDocument) -> Self {
        Self {
            email: d.email,
            code: d.code,
            attempts: d.attempts.max(0) as u32,
            verified: d.verified,
            consumed: d.consumed,
            issued_at: from_bson(d.issued_at),
            expires_at: from_bson(d.expires_at),
        }
    }
}

#[derive(Clone)]
pub struct MongoOtpStore {
    collection: Collection<OtpDocument>,
}

impl MongoOtpStore {
    pub fn new(db: &Database) -> Self {
        Self { collection: db.collection(OTP_RECORDS) }
    }
}

#[async_trait]
impl OtpStore for MongoOtpStore {
    async fn upsert(&self, record: OtpRecord) -> Result<()> {
        let filter = doc! { "email": &record.email };
        self.collection
            .replace_one(filter, OtpDocument::from(record))
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn find(&self, email: &str) -> Result<Option<OtpRecord>> {
        let found = self.collection.find_one(doc! { "email": email }).await?;
        Ok(found.map(OtpRecord::from))
    }

    async fn record_failed_attempt(&self, email: &str) -> Result<()> {
        self.collection
            .update_one(doc! { "email": email }, doc! { "$inc": { "attempts": 1 } })
            .await?;
        Ok(())
    }

    async fn mark_verified(&self, email: &str, code: &str) -> Result<()> {
        self.collection
            .update_one(
                doc! { "email": email, "code": code },
                doc! { "$set": { "verified": true } },
            )
            .await?;
        Ok(())
    }

    async fn consume(
        &self,
        email: &str,
        code: &str,
        max_attempts: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<OtpRecord>> {
        let before = self
            .collection
            .find_one_and_update(
                consume_filter(email, code, max_attempts, now),
                doc! { "$set": { "consumed": true } },
            )
            .return_document(ReturnDocument::Before)
            .await?;
        Ok(before.map(OtpRecord::from))
    }
}

/// Only a verified, unspent, unexpired code under the attempt limit matches.
fn consume_filter(email: &str, code: &str, max_attempts: u32, now: DateTime<Utc>) -> Document {
    doc! {
        "email": email,
        "code": code,
        "verified": true,
        "consumed": false,
        "attempts": { "$lt": max_attempts as i64 },
        "expires_at": { "$gt": to_bson(now) },
    }
}

// ========== USERS ==========

#[derive(Debug, Serialize, Deserialize)]
struct UserDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    email: String,
    password_hash: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    dob: String,
    #[serde(default)]
    gender: String,
    #[serde(default)]
    bio: String,
    #[serde(default)]
    profile_image: String,
    created_at: BsonDateTime,
    updated_at: BsonDateTime,
}

impl From<UserDocument> for User {
    fn from(d: UserDocument) -> Self {
        Self {
            id: d.id.to_hex(),
            email: d.email,
            password_hash: d.password_hash,
            role: d.role,
            full_name: d.full_name,
            phone: d.phone,
            address: d.address,
            dob: d.dob,
            gender: d.gender,
            bio: d.bio,
            profile_image: d.profile_image,
            created_at: from_bson(d.created_at),
            updated_at: from_bson(d.updated_at),
        }
    }
}

fn profile_set(update: &ProfileUpdate) -> Document {
    let mut set = Document::new();
    let fields = [
        ("full_name", update.full_name.as_ref().map(|v| v.trim().to_string())),
        ("phone", update.phone.as_ref().map(|v| v.trim().to_string())),
        ("address", update.address.clone()),
        ("dob", update.dob.clone()),
        ("gender", update.gender.clone()),
        ("bio", update.bio.clone()),
        ("profile_image", update.profile_image.clone()),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            set.insert(key, value);
        }
    }
    set.insert("updated_at", to_bson(Utc::now()));
    set
}

#[derive(Clone)]
pub struct MongoUserStore {
    collection: Collection<UserDocument>,
}

impl MongoUserStore {
    pub fn new(db: &Database) -> Self {
        Self { collection: db.collection(USERS) }
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let found = self
            .collection
            .find_one(doc! { "email": email })
            .collation(email_collation())
            .await?;
        Ok(found.map(User::from))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let Ok(object_id) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let found = self.collection.find_one(doc! { "_id": object_id }).await?;
        Ok(found.map(User::from))
    }

    async fn update_password(&self, email: &str, password_hash: &str) -> Result<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "email": email },
                doc! { "$set": {
                    "password_hash": password_hash,
                    "updated_at": to_bson(Utc::now()),
                } },
            )
            .collation(email_collation())
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn update_profile(&self, id: &str, update: &ProfileUpdate) -> Result<Option<User>> {
        let Ok(object_id) = ObjectId::parse_str(id) else {
            return Ok(None);
        };
        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": object_id }, doc! { "$set": profile_set(update) })
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated.map(User::from))
    }
}

// ========== PRODUCTS ==========

#[derive(Debug, Serialize, Deserialize)]
struct ProductDocument {
    #[serde(rename = "_id")]
    id: String,
    seller_id: String,
    name: String,
    category: String,
    description: String,
    stock: i64,
    price: f64,
    image: String,
    images: Vec<String>,
    videos: Vec<String>,
    delivery: String,
    media_order: Vec<MediaItem>,
    created_at: BsonDateTime,
}

impl From<Product> for ProductDocument {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            seller_id: p.seller_id,
            name: p.name,
            category: p.category,
            description: p.description,
            stock: p.stock as i64,
            price: p.price,
            image: p.image,
            images: p.images,
            videos: p.videos,
            delivery: p.delivery,
            media_order: p.media_order,
            created_at: to_bson(p.created_at),
        }
    }
}

impl From<ProductDocument> for Product {
    fn from(d: ProductDocument) -> Self {
        Self {
            id: d.id,
            seller_id: d.seller_id,
            name: d.name,
            category: d.category,
            description: d.description,
            stock: d.stock.clamp(0, u32::MAX as i64) as u32,
            price: d.price,
            image: d.image,
            images: d.images,
            videos: d.videos,
            delivery: d.delivery,
            media_order: d.media_order,
            created_at: from_bson(d.created_at),
        }
    }
}

#[derive(Clone)]
pub struct MongoProductStore {
    collection: Collection<ProductDocument>,
}

impl MongoProductStore {
    pub fn new(db: &Database) -> Self {
        Self { collection: db.collection(PRODUCTS) }
    }
}

#[async_trait]
impl ProductStore for MongoProductStore {
    async fn insert(&self, product: Product) -> Result<Product> {
        self.collection
            .insert_one(ProductDocument::from(product.clone()))
            .await?;
        Ok(product)
    }

    async fn list_by_seller(&self, seller_id: &str) -> Result<Vec<Product>> {
        let cursor = self
            .collection
            .find(doc! { "seller_id": seller_id })
            .sort(doc! { "created_at": -1 })
            .await?;
        let docs: Vec<ProductDocument> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(Product::from).collect())
    }
}
