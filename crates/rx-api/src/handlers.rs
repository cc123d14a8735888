//! # Request Handlers
//!
//! Axum request handlers for the storefront API.
//! Cart mutations never fail on unknown ids but are refused (409) while an
//! order is being placed; catalog lookups, checkout and prescription uploads
//! surface `StoreError`s as JSON.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use rx_core::{
    lock_cart, CartSummary, Category, CheckoutRequest, Order, Prescription, PrescriptionUpload,
    Product, ProductQuery, StoreError,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Catalog search parameters
#[derive(Debug, Default, Deserialize)]
pub struct ProductListParams {
    /// Category id, or "all"
    #[serde(default)]
    pub category: Option<String>,
    /// Text search over name and generic name
    #[serde(default)]
    pub q: Option<String>,
}

impl ProductListParams {
    fn to_query(&self) -> Result<ProductQuery, StoreError> {
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(raw) => Some(raw.parse::<Category>()?),
        };
        Ok(ProductQuery {
            category,
            text: self.q.clone().filter(|q| !q.trim().is_empty()),
        })
    }
}

/// Add-to-cart request
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: String,
}

/// Set-quantity request
#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: i64,
}

/// Cart with checkout pricing
#[derive(Debug, Serialize, Deserialize)]
pub struct CartResponse {
    #[serde(flatten)]
    pub cart: CartSummary,
    pub delivery_fee: i64,
    pub grand_total: i64,
    /// Formatted grand total (e.g., "₹249")
    pub display_total: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn store_error_to_response(err: StoreError) -> ApiError {
    let code = err.status_code();
    let mut response = ErrorResponse::new(err.to_string(), code);
    if let StoreError::PrescriptionApprovalRequired { .. } = err {
        response = response.with_details(
            "Please get prescription approval for all items before checkout.",
        );
    }
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

/// Cart edits wait until an order being placed has finished
fn ensure_cart_editable(state: &AppState) -> Result<(), ApiError> {
    if state.checkout.is_busy() {
        warn!("cart edit refused while an order is being placed");
        return Err(store_error_to_response(StoreError::OrderInProgress));
    }
    Ok(())
}

fn cart_response(state: &AppState) -> Result<Json<CartResponse>, ApiError> {
    let cart = lock_cart(&state.cart)
        .map_err(store_error_to_response)?
        .summary();
    let delivery_fee = if cart.entries.is_empty() {
        0
    } else {
        state.settings.delivery_fee_for(cart.total_price)
    };
    let grand_total = cart.total_price.saturating_add(delivery_fee);
    Ok(Json(CartResponse {
        display_total: state.settings.format_price(grand_total),
        cart,
        delivery_fee,
        grand_total,
    }))
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "pharma-cart",
        "store": state.settings.name,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Search the catalog
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let query = params.to_query().map_err(store_error_to_response)?;
    let products: Vec<&Product> = state.catalog.search(&query).collect();
    Ok(Json(serde_json::json!({
        "products": products,
        "count": products.len()
    })))
}

/// Get single product
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = state.catalog.get(&product_id).ok_or_else(|| {
        store_error_to_response(StoreError::ProductNotFound {
            product_id: product_id.clone(),
        })
    })?;

    Ok(Json(product.clone()))
}

/// Current cart with totals
pub async fn get_cart(State(state): State<AppState>) -> Result<Json<CartResponse>, ApiError> {
    cart_response(&state)
}

/// Add one unit of a product
#[instrument(skip(state, request), fields(product_id = %request.product_id))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    ensure_cart_editable(&state)?;
    let product = state
        .catalog
        .require_in_stock(&request.product_id)
        .map_err(store_error_to_response)?;

    lock_cart(&state.cart)
        .map_err(store_error_to_response)?
        .add(product);

    cart_response(&state)
}

/// Set an entry's quantity (below one removes it)
pub async fn set_quantity(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(request): Json<SetQuantityRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    ensure_cart_editable(&state)?;
    lock_cart(&state.cart)
        .map_err(store_error_to_response)?
        .set_quantity(&product_id, request.quantity);

    cart_response(&state)
}

/// Remove an entry
pub async fn remove_from_cart(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    ensure_cart_editable(&state)?;
    lock_cart(&state.cart)
        .map_err(store_error_to_response)?
        .remove(&product_id);

    cart_response(&state)
}

/// Empty the cart
pub async fn clear_cart(State(state): State<AppState>) -> Result<Json<CartResponse>, ApiError> {
    ensure_cart_editable(&state)?;
    lock_cart(&state.cart)
        .map_err(store_error_to_response)?
        .clear();

    cart_response(&state)
}

/// Upload a prescription for a product.
///
/// The body is the raw file; `Content-Type` gives its type and `X-File-Name`
/// its original name. Responds once the (simulated) review has finished.
#[instrument(skip(state, headers, body), fields(size = body.len()))]
pub async fn upload_prescription(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Prescription>), ApiError> {
    let product = state.catalog.get(&product_id).cloned().ok_or_else(|| {
        store_error_to_response(StoreError::ProductNotFound {
            product_id: product_id.clone(),
        })
    })?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");
    let file_name = headers
        .get("x-file-name")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("prescription");

    let upload = PrescriptionUpload::new(&product_id, file_name, content_type, body.to_vec());

    let prescription = state
        .prescriptions
        .submit(&state.cart, &product, upload)
        .await
        .map_err(|e| {
            warn!("Prescription upload refused: {}", e);
            store_error_to_response(e)
        })?;

    Ok((StatusCode::CREATED, Json(prescription)))
}

/// Prescriptions submitted this session
pub async fn list_prescriptions(State(state): State<AppState>) -> impl IntoResponse {
    let prescriptions = state.prescriptions.prescriptions();
    Json(serde_json::json!({
        "prescriptions": prescriptions,
        "count": prescriptions.len()
    }))
}

/// Place an order for the cart
#[instrument(skip(state, request))]
pub async fn checkout(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order = state
        .checkout
        .place_order(&state.cart, request)
        .await
        .map_err(|e| {
            match &e {
                StoreError::PrescriptionApprovalRequired { .. }
                | StoreError::OrderInProgress
                | StoreError::EmptyCart
                | StoreError::InvalidAddress { .. } => warn!("Checkout refused: {}", e),
                _ => error!("Checkout failed: {}", e),
            }
            store_error_to_response(e)
        })?;

    info!("Order {} placed, total {}", order.id, state.settings.format_price(order.total));
    Ok((StatusCode::CREATED, Json(order)))
}

/// Order history, newest first
pub async fn list_orders(State(state): State<AppState>) -> impl IntoResponse {
    let orders = state.checkout.orders();
    Json(serde_json::json!({
        "orders": orders,
        "count": orders.len()
    }))
}

/// Get single order
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    state.checkout.order(&order_id).map(Json).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(format!("Order not found: {}", order_id), 404)),
        )
    })
}
