use std::time::Duration;

use mongodb::{bson::doc, options::IndexOptions, Database, IndexModel};

use crate::database::mongo_store::{email_collation, OTP_RECORDS, PRODUCTS, USERS};
use crate::errors::Result;

/// Create the indexes the stores rely on. Idempotent, run at startup.
pub async fn ensure_indexes(db: &Database) -> Result<()> {
    tracing::info!("🔧 Ensuring MongoDB indexes...");

    let unique = |keys| {
        IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().unique(true).build())
            .build()
    };

    // Must share the collation the user lookups use
    db.collection::<mongodb::bson::Document>(USERS)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .collation(email_collation())
                        .build(),
                )
                .build(),
        )
        .await?;

    // One live code per email
    let otps = db.collection::<mongodb::bson::Document>(OTP_RECORDS);
    otps.create_index(unique(doc! { "email": 1 })).await?;

    // Let MongoDB drop expired codes
    otps.create_index(
        IndexModel::builder()
            .keys(doc! { "expires_at": 1 })
            .options(IndexOptions::builder().expire_after(Duration::from_secs(0)).build())
            .build(),
    )
    .await?;

    db.collection::<mongodb::bson::Document>(PRODUCTS)
        .create_index(IndexModel::builder().keys(doc! { "seller_id": 1, "created_at": -1 }).build())
        .await?;

    tracing::info!("✅ MongoDB indexes ready");
    Ok(())
}
