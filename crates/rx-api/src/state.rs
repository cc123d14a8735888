//! # Application State
//!
//! Shared state for the Axum application: the static catalog, the session
//! cart, and the checkout and prescription collaborators wired to it.

use rx_core::{
    CartStore, CheckoutFlow, LoggingCartListener, PrescriptionDesk, ProductCatalog, SharedCart,
    StoreSettings,
};
use rx_sim::{payment_strategies, SimConfig, SimulatedReviewer};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            base_url: "http://localhost:8080".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Static product catalog
    pub catalog: Arc<ProductCatalog>,
    /// Delivery pricing and upload limits
    pub settings: StoreSettings,
    /// The session cart (single shopper)
    pub cart: SharedCart,
    /// Order placement and history
    pub checkout: Arc<CheckoutFlow>,
    /// Prescription intake and review
    pub prescriptions: Arc<PrescriptionDesk>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Build state from the environment and the config directory
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let settings = load_store_settings()?;
        let catalog = load_product_catalog()?;
        let sim = SimConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load simulation config: {}", e))?;

        Ok(Self::from_parts(config, catalog, settings, sim))
    }

    /// Wire the collaborators around an empty cart
    pub fn from_parts(
        config: AppConfig,
        catalog: ProductCatalog,
        settings: StoreSettings,
        sim: SimConfig,
    ) -> Self {
        let cart = CartStore::new().with_listener(Arc::new(LoggingCartListener));
        let checkout = CheckoutFlow::new(payment_strategies(&sim), settings.clone());
        let prescriptions =
            PrescriptionDesk::new(Arc::new(SimulatedReviewer::new(sim)), settings.clone());

        Self {
            catalog: Arc::new(catalog),
            settings,
            cart: Arc::new(Mutex::new(cart)),
            checkout: Arc::new(checkout),
            prescriptions: Arc::new(prescriptions),
            config,
        }
    }
}

const CONFIG_DIRS: [&str; 3] = ["config", "../config", "../../config"];

fn read_config_file(name: &str) -> Option<(String, String)> {
    CONFIG_DIRS.iter().find_map(|dir| {
        let path = format!("{}/{}", dir, name);
        std::fs::read_to_string(&path).ok().map(|content| (path, content))
    })
}

/// Load product catalog from config/products.toml
fn load_product_catalog() -> anyhow::Result<ProductCatalog> {
    match read_config_file("products.toml") {
        Some((path, content)) => {
            let catalog = ProductCatalog::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            tracing::info!("Loaded {} products from {}", catalog.len(), path);
            Ok(catalog)
        }
        None => {
            tracing::warn!("No product catalog found, using empty catalog");
            Ok(ProductCatalog::new())
        }
    }
}

/// Load store settings from config/store.toml
fn load_store_settings() -> anyhow::Result<StoreSettings> {
    match read_config_file("store.toml") {
        Some((path, content)) => {
            let settings = StoreSettings::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            tracing::info!("Loaded store settings for '{}' from {}", settings.name, path);
            Ok(settings)
        }
        None => {
            tracing::warn!("No store settings found, using defaults");
            Ok(StoreSettings::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            environment: "test".to_string(),
        };

        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:3000");
        assert!(!config.is_production());
    }

    #[test]
    fn test_bad_host_is_an_error() {
        let config = AppConfig {
            host: "not a host".to_string(),
            ..AppConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_from_parts_starts_with_empty_cart() {
        let state = AppState::from_parts(
            AppConfig::default(),
            ProductCatalog::new(),
            StoreSettings::default(),
            SimConfig::instant(),
        );
        assert!(state.cart.lock().unwrap().is_empty());
        assert_eq!(state.checkout.strategies().providers(), vec!["cod", "upi"]);
    }

    #[test]
    fn test_shipped_config_loads() {
        let catalog = load_product_catalog().unwrap();
        assert_eq!(catalog.len(), 8);
        assert!(catalog.get("azee-500").unwrap().requires_prescription);
        assert!(!catalog.get("telma-40").unwrap().in_stock);

        let settings = load_store_settings().unwrap();
        assert_eq!(settings.delivery_fee_for(500), 49);
        assert!(settings.support_email.is_some());
    }
}
