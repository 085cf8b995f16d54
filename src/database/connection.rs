use mongodb::{bson::doc, Client, Database};

use crate::errors::Result;

pub async fn get_db_client(database_url: &str, db_name: &str) -> Result<Database> {
    let client = Client::with_uri_str(database_url).await?;
    let db = client.database(db_name);

    // Fail fast if the server is unreachable
    db.run_command(doc! { "ping": 1 }).await?;

    match db.list_collection_names().await {
        Ok(collections) => {
            tracing::info!("✅ Connected to database: {}", db_name);
            tracing::info!("📂 Collections found: {:?}", collections);
        }
        Err(e) => {
            tracing::warn!("⚠️ Database '{}' may be inaccessible: {}", db_name, e);
        }
    }

    Ok(db)
}
