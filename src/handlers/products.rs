use axum::{extract::State, Extension, Json};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use serde::Serialize;

use crate::errors::{AppError, Result};
use crate::models::media::{auto_arrange, MediaKind, MediaOrder};
use crate::models::product::{CreateProductRequest, Product, ProductResponse};
use crate::models::user::Claims;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub success: bool,
    pub count: usize,
    pub products: Vec<Product>,
}

fn require_seller(claims: &Claims) -> Result<()> {
    if claims.is_seller() {
        Ok(())
    } else {
        Err(AppError::forbidden("Only sellers can manage products"))
    }
}

/// Build the stored product from a validated request.
pub fn build_product(req: CreateProductRequest, seller_id: &str) -> Product {
    let images: Vec<String> = req.images.into_iter().filter(|u| !u.trim().is_empty()).collect();
    let videos: Vec<String> = req.videos.into_iter().filter(|u| !u.trim().is_empty()).collect();

    let media_order = if req.media_order.is_empty() {
        auto_arrange(&images, &videos)
    } else {
        let mut order = MediaOrder::manual(req.media_order);
        order.sync(&images, &videos);
        order.into_items()
    };

    let image = images
        .first()
        .cloned()
        .or_else(|| {
            media_order
                .iter()
                .find(|item| item.kind == MediaKind::Image)
                .map(|item| item.url.clone())
        })
        .unwrap_or_else(|| req.image.trim().to_string());

    Product {
        id: uuid::Uuid::new_v4().simple().to_string(),
        seller_id: seller_id.to_string(),
        name: req.name.trim().to_string(),
        category: req.category.trim().to_string(),
        description: req.description,
        stock: u32::try_from(req.stock).unwrap_or(u32::MAX),
        price: req.price,
        image,
        images,
        videos,
        delivery: req.delivery,
        media_order,
        created_at: Utc::now(),
    }
}

pub async fn create_product_with_stock(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): WithRejection<Json<CreateProductRequest>, AppError>,
) -> Result<Json<ProductResponse>> {
    require_seller(&claims)?;
    req.check().map_err(AppError::invalid_data)?;

    if let Some(seller_id) = req.seller_id.as_deref() {
        if !seller_id.is_empty() && seller_id != claims.sub {
            tracing::warn!("🚫 Seller {} tried to create a product for {}", claims.sub, seller_id);
            return Err(AppError::forbidden("Seller mismatch"));
        }
    }

    let product = state.products.insert(build_product(req, &claims.sub)).await?;

    tracing::info!("✅ Product {} created by seller {}", product.id, product.seller_id);

    Ok(Json(ProductResponse { success: true, product }))
}

pub async fn list_seller_products(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ProductListResponse>> {
    require_seller(&claims)?;

    let products = state.products.list_by_seller(&claims.sub).await?;

    Ok(Json(ProductListResponse {
        success: true,
        count: products.len(),
        products,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::media::MediaItem;

    fn request() -> CreateProductRequest {
        CreateProductRequest {
            name: "  Brass Lamp ".into(),
            category: "Decor".into(),
            stock: 4,
            price: 1299.0,
            images: vec!["i1".into(), "i2".into()],
            videos: vec!["v1".into()],
            ..Default::default()
        }
    }

    #[test]
    fn missing_order_is_auto_arranged() {
        let product = build_product(request(), "seller-1");
        let urls: Vec<_> = product.media_order.iter().map(|m| m.url.as_str()).collect();
        assert_eq!(urls, ["i1", "v1", "i2"]);
        assert_eq!(product.image, "i1");
        assert_eq!(product.name, "Brass Lamp");
        assert_eq!(product.seller_id, "seller-1");
    }

    #[test]
    fn submitted_order_is_kept_and_reconciled() {
        let mut req = request();
        req.media_order = vec![
            MediaItem::video("v1"),
            MediaItem::image("gone"),
            MediaItem::image("i2"),
        ];
        let product = build_product(req, "seller-1");
        let urls: Vec<_> = product.media_order.iter().map(|m| m.url.as_str()).collect();
        assert_eq!(urls, ["v1", "i2", "i1"]);
    }

    #[test]
    fn buyers_cannot_manage_products() {
        let claims = Claims {
            sub: "u1".into(),
            email: "buyer@example.com".into(),
            role: "user".into(),
            exp: 0,
        };
        assert!(matches!(require_seller(&claims), Err(AppError::Forbidden(_))));
    }
}
