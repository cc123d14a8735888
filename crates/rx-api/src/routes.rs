//! # Routes
//!
//! Axum router configuration for the storefront API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Body limit headroom above `max_upload_bytes`; oversized files are
/// rejected by the upload validation.
const UPLOAD_BODY_HEADROOM: usize = 64 * 1024;

/// Create the main application router
///
/// Routes:
/// - Catalog:
///   - GET  /api/v1/products?category=&q= - Search products
///   - GET  /api/v1/products/{product_id} - Get product by ID
///
/// - Cart:
///   - GET    /api/v1/cart - Entries, totals, pending-approval flag
///   - DELETE /api/v1/cart - Clear cart
///   - POST   /api/v1/cart/items - Add product
///   - PUT    /api/v1/cart/items/{product_id} - Set quantity
///   - DELETE /api/v1/cart/items/{product_id} - Remove entry
///
/// - Prescriptions:
///   - GET  /api/v1/prescriptions - Submitted prescriptions
///   - POST /api/v1/prescriptions/{product_id} - Upload (raw body)
///
/// - Orders:
///   - POST /api/v1/checkout - Place order
///   - GET  /api/v1/orders - Order history
///   - GET  /api/v1/orders/{order_id} - Get order
pub fn create_router(state: AppState) -> Router {
    // The storefront UI may be served from another origin during development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let upload_limit = state.settings.max_upload_bytes + UPLOAD_BODY_HEADROOM;

    let catalog_routes = Router::new()
        .route("/products", get(handlers::list_products))
        .route("/products/{product_id}", get(handlers::get_product));

    let cart_routes = Router::new()
        .route("/cart", get(handlers::get_cart).delete(handlers::clear_cart))
        .route("/cart/items", post(handlers::add_to_cart))
        .route(
            "/cart/items/{product_id}",
            put(handlers::set_quantity).delete(handlers::remove_from_cart),
        );

    let prescription_routes = Router::new()
        .route("/prescriptions", get(handlers::list_prescriptions))
        .route(
            "/prescriptions/{product_id}",
            post(handlers::upload_prescription).layer(DefaultBodyLimit::max(upload_limit)),
        );

    let order_routes = Router::new()
        .route("/checkout", post(handlers::checkout))
        .route("/orders", get(handlers::list_orders))
        .route("/orders/{order_id}", get(handlers::get_order));

    let api_routes = Router::new()
        .merge(catalog_routes)
        .merge(cart_routes)
        .merge(prescription_routes)
        .merge(order_routes);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
