//! # Store Settings
//!
//! Storefront configuration loaded from `config/store.toml`: branding,
//! delivery pricing and prescription upload limits.

use crate::error::StoreResult;
use serde::{Deserialize, Serialize};

/// Default maximum prescription upload size (5 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Storefront settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Display name (e.g., "MediCare Pharmacy")
    #[serde(default = "default_name")]
    pub name: String,

    /// Currency symbol used when formatting prices
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Orders with a subtotal strictly above this ship free
    #[serde(default = "default_free_delivery_threshold")]
    pub free_delivery_threshold: i64,

    /// Flat delivery fee below the threshold
    #[serde(default = "default_delivery_fee")]
    pub delivery_fee: i64,

    /// Days between order placement and estimated delivery
    #[serde(default = "default_delivery_days")]
    pub delivery_days: i64,

    /// Maximum prescription file size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Accepted prescription MIME types
    #[serde(default = "default_upload_types")]
    pub accepted_upload_types: Vec<String>,

    #[serde(default)]
    pub support_email: Option<String>,
}

fn default_name() -> String {
    "MediCare Pharmacy".to_string()
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

fn default_free_delivery_threshold() -> i64 {
    500
}

fn default_delivery_fee() -> i64 {
    49
}

fn default_delivery_days() -> i64 {
    3
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

fn default_upload_types() -> Vec<String> {
    vec![
        "image/jpeg".to_string(),
        "image/png".to_string(),
        "application/pdf".to_string(),
    ]
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            name: default_name(),
            currency_symbol: default_currency_symbol(),
            free_delivery_threshold: default_free_delivery_threshold(),
            delivery_fee: default_delivery_fee(),
            delivery_days: default_delivery_days(),
            max_upload_bytes: default_max_upload_bytes(),
            accepted_upload_types: default_upload_types(),
            support_email: None,
        }
    }
}

impl StoreSettings {
    /// Load settings from a TOML string; missing keys take defaults
    pub fn from_toml(toml_str: &str) -> StoreResult<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Delivery fee charged for a given subtotal
    pub fn delivery_fee_for(&self, subtotal: i64) -> i64 {
        if subtotal > self.free_delivery_threshold {
            0
        } else {
            self.delivery_fee
        }
    }

    /// Format an amount for display (e.g., "₹1,299")
    pub fn format_price(&self, amount: i64) -> String {
        format_amount(&self.currency_symbol, amount)
    }

    /// Whether a MIME type is accepted for prescription uploads
    pub fn accepts_upload_type(&self, content_type: &str) -> bool {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        self.accepted_upload_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&essence))
    }

    /// Builder: set support email
    pub fn with_support_email(mut self, email: impl Into<String>) -> Self {
        self.support_email = Some(email.into());
        self
    }
}

/// Format an amount with a currency symbol and thousands separators
pub fn format_amount(symbol: &str, amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{}{}{}", sign, symbol, grouped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_fee_threshold() {
        let settings = StoreSettings::default();
        assert_eq!(settings.delivery_fee_for(120), 49);
        assert_eq!(settings.delivery_fee_for(500), 49);
        assert_eq!(settings.delivery_fee_for(501), 0);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount("₹", 49), "₹49");
        assert_eq!(format_amount("₹", 1299), "₹1,299");
        assert_eq!(format_amount("$", 1234567), "$1,234,567");
        assert_eq!(format_amount("₹", -500), "-₹500");
        assert_eq!(StoreSettings::default().format_price(0), "₹0");
    }

    #[test]
    fn test_upload_types() {
        let settings = StoreSettings::default();
        assert!(settings.accepts_upload_type("image/png"));
        assert!(settings.accepts_upload_type("Application/PDF; charset=binary"));
        assert!(!settings.accepts_upload_type("image/gif"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings = StoreSettings::from_toml(
            r#"
            name = "Corner Chemist"
            delivery_fee = 30
            support_email = "help@corner.example"
            "#,
        )
        .unwrap();

        assert_eq!(settings.name, "Corner Chemist");
        assert_eq!(settings.delivery_fee, 30);
        assert_eq!(settings.free_delivery_threshold, 500);
        assert_eq!(settings.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(settings.support_email.as_deref(), Some("help@corner.example"));
    }
}
