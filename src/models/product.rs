use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::media::MediaItem;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub seller_id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub stock: u32,
    pub price: f64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub videos: Vec<String>,
    #[serde(default)]
    pub delivery: String,
    #[serde(default)]
    pub media_order: Vec<MediaItem>,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/sellers/products/with-stock`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub stock: i64,
    pub price: f64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub videos: Vec<String>,
    #[serde(default)]
    pub delivery: String,
    #[serde(default)]
    pub seller_id: Option<String>,
    #[serde(default)]
    pub media_order: Vec<MediaItem>,
}

impl CreateProductRequest {
    /// Field checks shared by the seller form and the endpoint.
    pub fn check(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("Product name required.");
        }
        if self.category.trim().is_empty() {
            return Err("Category required.");
        }
        if self.stock <= 0 {
            return Err("Stock must be positive.");
        }
        if !(self.price > 0.0) || !self.price.is_finite() {
            return Err("Price must be positive.");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub success: bool,
    pub product: Product,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> CreateProductRequest {
        CreateProductRequest {
            name: "Lamp".into(),
            category: "Decor".into(),
            stock: 3,
            price: 499.0,
            ..Default::default()
        }
    }

    #[test]
    fn check_reports_first_problem() {
        assert!(valid().check().is_ok());

        let mut req = valid();
        req.name = "   ".into();
        assert_eq!(req.check(), Err("Product name required."));

        let mut req = valid();
        req.stock = 0;
        assert_eq!(req.check(), Err("Stock must be positive."));

        let mut req = valid();
        req.price = f64::NAN;
        assert_eq!(req.check(), Err("Price must be positive."));
    }
}
