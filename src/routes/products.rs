use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::handlers::products;
use crate::middleware::auth::auth_middleware;
use crate::state::AppState;

pub fn product_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/sellers/products", get(products::list_seller_products))
        .route("/sellers/products/with-stock", post(products::create_product_with_stock))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
