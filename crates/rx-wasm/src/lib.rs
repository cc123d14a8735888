//! # rx-wasm
//!
//! WebAssembly bindings for the pharma-cart session cart.
//!
//! The browser storefront keeps its cart client-side; this crate exposes the
//! same `CartStore` the server uses so prescription gating and totals behave
//! identically in both places.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmCart, format_price } from 'pharma-cart-wasm';
//!
//! await init();
//!
//! const cart = new WasmCart();
//! cart.add(JSON.stringify(product));
//! if (cart.has_pending_approval()) {
//!   showPrescriptionUpload(cart.awaiting_approval());
//! }
//! for (const toast of cart.take_events()) {
//!   showToast(toast.title, toast.description);
//! }
//! console.log('Total:', format_price(cart.checkout_total()));
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build --target web
//! ```

use rx_core::{
    format_amount, CartEvent, CartListener, CartStore, PrescriptionStatus, Product, StoreError,
    StoreResult, StoreSettings,
};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use wasm_bindgen::prelude::*;

/// Initialize the WASM module (called automatically)
#[wasm_bindgen(start)]
pub fn init() {}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

/// Toast-ready view of a cart event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    #[serde(flatten)]
    pub event: CartEvent,
    pub title: &'static str,
    pub description: String,
}

impl From<CartEvent> for Notification {
    fn from(event: CartEvent) -> Self {
        Self {
            title: event.title(),
            description: event.description(),
            event,
        }
    }
}

/// Buffers cart events until the page collects them
#[derive(Clone, Default)]
struct EventBuffer(Arc<Mutex<Vec<CartEvent>>>);

impl EventBuffer {
    fn drain(&self) -> Vec<Notification> {
        match self.0.lock() {
            Ok(mut events) => events.drain(..).map(Notification::from).collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl CartListener for EventBuffer {
    fn on_event(&self, event: &CartEvent) {
        if let Ok(mut events) = self.0.lock() {
            events.push(event.clone());
        }
    }
}

/// Session cart for the browser
#[wasm_bindgen]
pub struct WasmCart {
    store: CartStore,
    events: EventBuffer,
    settings: StoreSettings,
}

impl Default for WasmCart {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl WasmCart {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        let events = EventBuffer::default();
        Self {
            store: CartStore::new().with_listener(Arc::new(events.clone())),
            events,
            settings: StoreSettings::default(),
        }
    }

    /// Add one unit of a product given as JSON
    #[wasm_bindgen]
    pub fn add(&mut self, product_json: &str) -> Result<(), JsValue> {
        self.add_json(product_json).map_err(to_js_error)
    }

    /// Add one unit of a product given as a plain JS object
    #[wasm_bindgen]
    pub fn add_product(&mut self, product: JsValue) -> Result<(), JsValue> {
        let product: Product = serde_wasm_bindgen::from_value(product)
            .map_err(|e| to_js_error(format!("Invalid product: {}", e)))?;
        self.add_checked(&product).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn remove(&mut self, product_id: &str) {
        self.store.remove(product_id);
    }

    /// Set an entry's quantity; below one removes it
    #[wasm_bindgen]
    pub fn set_quantity(&mut self, product_id: &str, quantity: i32) {
        self.store.set_quantity(product_id, i64::from(quantity));
    }

    /// Set prescription status by wire name (`pending`, `approved`, `rejected`)
    #[wasm_bindgen]
    pub fn set_prescription_status(
        &mut self,
        product_id: &str,
        status: &str,
        prescription_id: Option<String>,
    ) -> Result<(), JsValue> {
        self.set_status_str(product_id, status, prescription_id)
            .map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn clear(&mut self) {
        self.store.clear();
    }

    #[wasm_bindgen]
    pub fn total_items(&self) -> u64 {
        self.store.total_item_count()
    }

    #[wasm_bindgen]
    pub fn total_price(&self) -> i64 {
        self.store.total_price()
    }

    #[wasm_bindgen]
    pub fn delivery_fee(&self) -> i64 {
        if self.store.is_empty() {
            0
        } else {
            self.settings.delivery_fee_for(self.store.total_price())
        }
    }

    /// Subtotal plus delivery
    #[wasm_bindgen]
    pub fn checkout_total(&self) -> i64 {
        self.store.total_price().saturating_add(self.delivery_fee())
    }

    #[wasm_bindgen]
    pub fn has_pending_approval(&self) -> bool {
        self.store.has_pending_approval()
    }

    /// Product ids still waiting on an approved prescription
    #[wasm_bindgen]
    pub fn awaiting_approval(&self) -> Vec<String> {
        self.store.awaiting_approval()
    }

    /// Cart entries as a JS array
    #[wasm_bindgen]
    pub fn entries(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.store.entries()).map_err(to_js_error)
    }

    /// Cart entries as JSON
    #[wasm_bindgen]
    pub fn entries_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.store.entries()).map_err(to_js_error)
    }

    /// Cart summary (entries and totals) as JSON
    #[wasm_bindgen]
    pub fn summary_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.store.summary()).map_err(to_js_error)
    }

    /// Notifications since the last call, oldest first
    #[wasm_bindgen]
    pub fn take_events(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.events.drain()).map_err(to_js_error)
    }
}

impl WasmCart {
    fn add_json(&mut self, product_json: &str) -> StoreResult<()> {
        let product: Product = serde_json::from_str(product_json)?;
        self.add_checked(&product)
    }

    fn add_checked(&mut self, product: &Product) -> StoreResult<()> {
        product.validate()?;
        if !product.in_stock {
            return Err(StoreError::ProductUnavailable {
                product_id: product.id.clone(),
            });
        }
        self.store.add(product);
        Ok(())
    }

    fn set_status_str(
        &mut self,
        product_id: &str,
        status: &str,
        prescription_id: Option<String>,
    ) -> StoreResult<()> {
        let status: PrescriptionStatus = status.parse()?;
        self.store
            .set_prescription_status(product_id, status, prescription_id);
        Ok(())
    }
}

/// Format an amount in rupees for display (e.g., "₹1,299")
#[wasm_bindgen]
pub fn format_price(amount: i64) -> String {
    format_amount(&StoreSettings::default().currency_symbol, amount)
}

/// Delivery fee for a subtotal under the default store rules
#[wasm_bindgen]
pub fn delivery_fee(subtotal: i64) -> i64 {
    StoreSettings::default().delivery_fee_for(subtotal)
}

/// Validate a product ID format
#[wasm_bindgen]
pub fn validate_product_id(product_id: &str) -> bool {
    !product_id.is_empty()
        && product_id.len() <= 100
        && product_id
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// Log to browser console
#[wasm_bindgen]
pub fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rx_core::Category;

    fn json(product: &Product) -> String {
        serde_json::to_string(product).unwrap()
    }

    fn otc() -> Product {
        Product::new("dolo-650", "Dolo 650", 30, Category::Otc)
    }

    fn rx() -> Product {
        Product::new("azee-500", "Azee 500", 119, Category::Prescription)
    }

    #[test]
    fn test_add_and_totals() {
        let mut cart = WasmCart::new();
        cart.add(&json(&otc())).unwrap();
        cart.add(&json(&otc())).unwrap();
        cart.add(&json(&rx())).unwrap();

        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price(), 179);
        assert_eq!(cart.delivery_fee(), 49);
        assert_eq!(cart.checkout_total(), 228);
        assert!(cart.has_pending_approval());
        assert_eq!(cart.awaiting_approval(), vec!["azee-500".to_string()]);
    }

    #[test]
    fn test_prescription_status_from_string() {
        let mut cart = WasmCart::new();
        cart.add(&json(&rx())).unwrap();

        cart.set_prescription_status("azee-500", "approved", Some("RX-1".into()))
            .unwrap();
        assert!(!cart.has_pending_approval());

        assert!(cart.set_status_str("azee-500", "lost", None).is_err());
        assert!(!cart.has_pending_approval());
    }

    #[test]
    fn test_quantity_and_clear() {
        let mut cart = WasmCart::new();
        cart.add(&json(&otc())).unwrap();
        cart.set_quantity("dolo-650", 20);
        assert_eq!(cart.total_price(), 600);
        assert_eq!(cart.delivery_fee(), 0);

        cart.set_quantity("dolo-650", 0);
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.checkout_total(), 0);

        cart.add(&json(&otc())).unwrap();
        cart.clear();
        assert_eq!(cart.entries_json().unwrap(), "[]");
    }

    #[test]
    fn test_rejects_bad_products() {
        let mut cart = WasmCart::new();
        assert!(cart.add_json("{not json").is_err());
        assert!(matches!(
            cart.add_json(&json(&otc().out_of_stock())),
            Err(StoreError::ProductUnavailable { .. })
        ));
        assert_eq!(cart.total_items(), 0);
    }

    #[test]
    fn test_notifications_drain() {
        let mut cart = WasmCart::new();
        cart.add(&json(&otc())).unwrap();
        cart.add(&json(&otc())).unwrap();
        cart.remove("dolo-650");

        let toasts = cart.events.drain();
        let titles: Vec<&str> = toasts.iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["Added to Cart", "Quantity Updated", "Removed from Cart"]);
        assert_eq!(toasts[0].description, "Dolo 650 has been added to your cart.");
        assert!(cart.events.drain().is_empty());
    }

    #[test]
    fn test_summary_json() {
        let mut cart = WasmCart::new();
        cart.add(&json(&rx())).unwrap();
        let summary: serde_json::Value = serde_json::from_str(&cart.summary_json().unwrap()).unwrap();
        assert_eq!(summary["total_price"], 119);
        assert_eq!(summary["has_pending_approval"], true);
        assert_eq!(summary["entries"][0]["prescription_status"], "pending");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(1299), "₹1,299");
        assert_eq!(format_price(49), "₹49");
    }

    #[test]
    fn test_delivery_fee() {
        assert_eq!(delivery_fee(500), 49);
        assert_eq!(delivery_fee(501), 0);
    }

    #[test]
    fn test_validate_product_id() {
        assert!(validate_product_id("azee-500"));
        assert!(validate_product_id("vitamin_d3"));
        assert!(!validate_product_id(""));
        assert!(!validate_product_id("bad id"));
    }
}
