//! # rx-core
//!
//! Core types and traits for the pharmacy storefront.
//!
//! This crate provides:
//! - `CartStore`, the session cart with prescription gating and derived totals
//! - `Product` and `ProductCatalog` for the static medicine catalog
//! - `CheckoutFlow`, `Order` and `ShippingAddress` for order placement
//! - `PrescriptionDesk` and `PrescriptionUpload` for prescription intake
//! - `PaymentStrategy` / `PrescriptionReviewer` traits for the simulated collaborators
//! - `StoreSettings` for delivery pricing and upload limits
//! - `StoreError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use rx_core::{CartStore, PrescriptionStatus, ProductCatalog};
//!
//! let catalog = ProductCatalog::from_toml(&std::fs::read_to_string("config/products.toml")?)?;
//! let mut cart = CartStore::new();
//!
//! cart.add(catalog.get("dolo-650").unwrap());
//! cart.add(catalog.get("azee-500").unwrap());
//! assert!(cart.has_pending_approval());
//!
//! cart.set_prescription_status("azee-500", PrescriptionStatus::Approved, Some("RX-1".into()));
//! assert!(!cart.has_pending_approval());
//! ```

pub mod cart;
pub mod checkout;
pub mod error;
pub mod order;
pub mod prescription;
pub mod product;
pub mod settings;
pub mod strategy;

// Re-exports for convenience
pub use cart::{
    lock_cart, CartEntry, CartEvent, CartListener, CartStore, CartSummary, LoggingCartListener,
    PrescriptionStatus, SharedCart,
};
pub use checkout::{CheckoutFlow, CheckoutRequest};
pub use error::{StoreError, StoreResult};
pub use order::{
    Order, OrderHistory, OrderLine, OrderStatus, PaymentMethod, PaymentReceipt, PaymentStatus,
    ShippingAddress,
};
pub use prescription::{Prescription, PrescriptionDesk, PrescriptionUpload, ReviewDecision};
pub use product::{Category, Product, ProductCatalog, ProductQuery};
pub use settings::{format_amount, StoreSettings, DEFAULT_MAX_UPLOAD_BYTES};
pub use strategy::{
    BoxedPaymentStrategy, BoxedPrescriptionReviewer, PaymentStrategy, PaymentStrategySelector,
    PrescriptionReviewer,
};
