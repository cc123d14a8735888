//! # Store Error Types
//!
//! Typed error handling for the pharmacy storefront.
//! Cart mutations never fail; these errors belong to the collaborators
//! around the cart (catalog loading, checkout, prescription intake).

use thiserror::Error;

/// Core error type for storefront operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Configuration errors (unreadable or invalid config files, bad env)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Product not found in catalog
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: String },

    /// Product exists but is out of stock
    #[error("Product is out of stock: {product_id}")]
    ProductUnavailable { product_id: String },

    /// Checkout attempted with nothing in the cart
    #[error("Cart is empty")]
    EmptyCart,

    /// At least one cart entry still needs an approved prescription
    #[error("Prescription approval required for: {}", product_ids.join(", "))]
    PrescriptionApprovalRequired { product_ids: Vec<String> },

    /// A previous order is still being processed
    #[error("An order is already being placed")]
    OrderInProgress,

    /// Shipping address failed validation
    #[error("Invalid address: {field}: {message}")]
    InvalidAddress { field: String, message: String },

    /// Prescription upload rejected before review
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// Prescription file exceeds the configured size limit
    #[error("File too large: {size} bytes (max {max} bytes)")]
    UploadTooLarge { size: usize, max: usize },

    /// Prescription file type not accepted
    #[error("Unsupported file type: {content_type}")]
    UnsupportedFileType { content_type: String },

    /// Payment was declined
    #[error("Payment declined: {reason}")]
    PaymentDeclined { reason: String },

    /// Simulated provider failure (payment or review)
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Returns true if retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::ProviderError { .. } | StoreError::OrderInProgress
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::Configuration(_) => 500,
            StoreError::InvalidRequest(_) => 400,
            StoreError::ProductNotFound { .. } => 404,
            StoreError::ProductUnavailable { .. } => 409,
            StoreError::EmptyCart => 400,
            StoreError::PrescriptionApprovalRequired { .. } => 403,
            StoreError::OrderInProgress => 409,
            StoreError::InvalidAddress { .. } => 422,
            StoreError::InvalidUpload(_) => 400,
            StoreError::UploadTooLarge { .. } => 413,
            StoreError::UnsupportedFileType { .. } => 415,
            StoreError::PaymentDeclined { .. } => 402,
            StoreError::ProviderError { .. } => 502,
            StoreError::Serialization(_) => 500,
            StoreError::Internal(_) => 500,
        }
    }

    pub(crate) fn address(field: &str, message: impl Into<String>) -> Self {
        StoreError::InvalidAddress {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(err: toml::de::Error) -> Self {
        StoreError::Configuration(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type alias for storefront operations
pub type StoreResult<T> = Result<T, StoreError>;
