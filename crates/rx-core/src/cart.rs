//! # Cart Store
//!
//! The session cart: entries unique by product id, prescription gating and
//! derived totals.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         CartStore                           │
//! │  ├── add() / remove() / set_quantity() / clear()            │
//! │  ├── set_prescription_status()   ◄── prescription desk      │
//! │  └── total_item_count() / total_price()                     │
//! │      has_pending_approval()      ◄── checkout gate          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutation is total: unknown ids are ignored and quantities below one
//! remove the entry. Listeners receive advisory [`CartEvent`]s.

use crate::error::{StoreError, StoreResult};
use crate::product::Product;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// Prescription state of a cart entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrescriptionStatus {
    /// Product is sold without prescription. Terminal.
    NotRequired,
    /// Awaiting upload or review
    Pending,
    Approved,
    Rejected,
}

impl PrescriptionStatus {
    /// Initial status for a product entering the cart
    pub fn initial_for(product: &Product) -> Self {
        if product.requires_prescription {
            PrescriptionStatus::Pending
        } else {
            PrescriptionStatus::NotRequired
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrescriptionStatus::NotRequired => "not_required",
            PrescriptionStatus::Pending => "pending",
            PrescriptionStatus::Approved => "approved",
            PrescriptionStatus::Rejected => "rejected",
        }
    }

    /// Whether an entry may move from `self` to `next`.
    ///
    /// `not_required` is never entered or left after creation. Among the
    /// prescription states every move is allowed so a rejected or approved
    /// prescription can be re-submitted.
    pub fn can_transition_to(&self, next: PrescriptionStatus) -> bool {
        match (self, next) {
            (PrescriptionStatus::NotRequired, _) => false,
            (_, PrescriptionStatus::NotRequired) => false,
            _ => true,
        }
    }
}

impl std::fmt::Display for PrescriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PrescriptionStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "not_required" => Ok(PrescriptionStatus::NotRequired),
            "pending" => Ok(PrescriptionStatus::Pending),
            "approved" => Ok(PrescriptionStatus::Approved),
            "rejected" => Ok(PrescriptionStatus::Rejected),
            other => Err(StoreError::InvalidRequest(format!(
                "Unknown prescription status: {}",
                other
            ))),
        }
    }
}

/// A product in the cart with its quantity and prescription state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    #[serde(flatten)]
    pub product: Product,

    /// Always >= 1
    pub cart_quantity: u32,

    pub prescription_status: PrescriptionStatus,

    /// Set once a prescription has been submitted for this entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prescription_id: Option<String>,
}

impl CartEntry {
    fn new(product: Product) -> Self {
        let prescription_status = PrescriptionStatus::initial_for(&product);
        Self {
            product,
            cart_quantity: 1,
            prescription_status,
            prescription_id: None,
        }
    }

    pub fn product_id(&self) -> &str {
        &self.product.id
    }

    /// Price × quantity, saturating at `i64::MAX`
    pub fn line_total(&self) -> i64 {
        self.product.price.saturating_mul(i64::from(self.cart_quantity))
    }

    /// Requires a prescription that is not approved yet
    pub fn awaiting_approval(&self) -> bool {
        self.product.requires_prescription
            && self.prescription_status != PrescriptionStatus::Approved
    }
}

/// Advisory notification emitted by cart mutations (for UI feedback)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CartEvent {
    ItemAdded { product_id: String, name: String },
    QuantityUpdated { product_id: String, name: String, quantity: u32 },
    ItemRemoved { product_id: String },
}

impl CartEvent {
    /// Short title for a toast/notification
    pub fn title(&self) -> &'static str {
        match self {
            CartEvent::ItemAdded { .. } => "Added to Cart",
            CartEvent::QuantityUpdated { .. } => "Quantity Updated",
            CartEvent::ItemRemoved { .. } => "Removed from Cart",
        }
    }

    /// Longer description for a toast/notification
    pub fn description(&self) -> String {
        match self {
            CartEvent::ItemAdded { name, .. } => format!("{} has been added to your cart.", name),
            CartEvent::QuantityUpdated { name, .. } => {
                format!("{} quantity increased in cart.", name)
            }
            CartEvent::ItemRemoved { .. } => "Item has been removed from your cart.".to_string(),
        }
    }
}

/// Receives cart notifications. Never required for correctness.
pub trait CartListener: Send + Sync {
    fn on_event(&self, event: &CartEvent);
}

/// Listener that writes every event to the tracing log
pub struct LoggingCartListener;

impl CartListener for LoggingCartListener {
    fn on_event(&self, event: &CartEvent) {
        info!("{}: {}", event.title(), event.description());
    }
}

/// The session cart.
///
/// Entries are kept in insertion order and are unique by product id. The
/// collection is only reachable through `&self` accessors; every change goes
/// through the methods below.
#[derive(Default)]
pub struct CartStore {
    entries: Vec<CartEntry>,
    listener: Option<Arc<dyn CartListener>>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("entries", &self.entries)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl CartStore {
    /// Create an empty cart
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: attach a notification listener
    pub fn with_listener(mut self, listener: Arc<dyn CartListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    fn emit(&self, event: CartEvent) {
        if let Some(listener) = &self.listener {
            listener.on_event(&event);
        }
    }

    fn entry_mut(&mut self, product_id: &str) -> Option<&mut CartEntry> {
        self.entries.iter_mut().find(|e| e.product.id == product_id)
    }

    /// Add one unit of a product.
    ///
    /// An existing entry gains one unit and keeps its prescription status.
    pub fn add(&mut self, product: &Product) {
        if let Some(entry) = self.entry_mut(&product.id) {
            entry.cart_quantity = entry.cart_quantity.saturating_add(1);
            let event = CartEvent::QuantityUpdated {
                product_id: product.id.clone(),
                name: product.name.clone(),
                quantity: entry.cart_quantity,
            };
            debug!(product_id = %product.id, quantity = entry.cart_quantity, "cart quantity incremented");
            self.emit(event);
            return;
        }

        let entry = CartEntry::new(product.clone());
        debug!(
            product_id = %product.id,
            prescription_status = %entry.prescription_status,
            "cart entry added"
        );
        self.entries.push(entry);
        self.emit(CartEvent::ItemAdded {
            product_id: product.id.clone(),
            name: product.name.clone(),
        });
    }

    /// Remove an entry. Unknown ids are ignored.
    pub fn remove(&mut self, product_id: &str) {
        let before = self.entries.len();
        self.entries.retain(|e| e.product.id != product_id);
        debug!(product_id, removed = before != self.entries.len(), "cart entry remove");
        self.emit(CartEvent::ItemRemoved {
            product_id: product_id.to_string(),
        });
    }

    /// Set the quantity of an entry; anything below one removes it
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) {
        if quantity < 1 {
            self.remove(product_id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(entry) = self.entry_mut(product_id) {
            entry.cart_quantity = quantity;
            debug!(product_id, quantity, "cart quantity set");
        }
    }

    /// Record a prescription decision or submission for an entry.
    ///
    /// The prescription id is only replaced when one is given. Moves that
    /// [`PrescriptionStatus::can_transition_to`] refuses, and unknown ids,
    /// leave the cart unchanged.
    pub fn set_prescription_status(
        &mut self,
        product_id: &str,
        status: PrescriptionStatus,
        prescription_id: Option<String>,
    ) {
        let Some(entry) = self.entry_mut(product_id) else {
            return;
        };
        if !entry.prescription_status.can_transition_to(status) {
            debug!(
                product_id,
                from = %entry.prescription_status,
                to = %status,
                "ignored prescription status change"
            );
            return;
        }
        entry.prescription_status = status;
        if prescription_id.is_some() {
            entry.prescription_id = prescription_id;
        }
        info!(product_id, status = %status, "prescription status updated");
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
        debug!("cart cleared");
    }

    /// Drop the entries an order was placed for. Entries added after the
    /// order snapshot stay in the cart.
    pub fn clear_ordered<S: AsRef<str>>(&mut self, product_ids: &[S]) {
        self.entries
            .retain(|e| !product_ids.iter().any(|id| id.as_ref() == e.product.id));
        debug!(remaining = self.entries.len(), "ordered entries cleared");
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn get(&self, product_id: &str) -> Option<&CartEntry> {
        self.entries.iter().find(|e| e.product.id == product_id)
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.get(product_id).is_some()
    }

    /// Number of distinct products
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of quantities
    pub fn total_item_count(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.cart_quantity)).sum()
    }

    /// Sum of price × quantity, saturating at `i64::MAX`
    pub fn total_price(&self) -> i64 {
        self.entries
            .iter()
            .map(CartEntry::line_total)
            .fold(0, i64::saturating_add)
    }

    /// True while any prescription entry is not approved. Checkout must
    /// refuse to place an order while this holds.
    pub fn has_pending_approval(&self) -> bool {
        self.entries.iter().any(CartEntry::awaiting_approval)
    }

    /// Ids of the entries blocking checkout
    pub fn awaiting_approval(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.awaiting_approval())
            .map(|e| e.product.id.clone())
            .collect()
    }

    /// Owned view for display and order snapshots
    pub fn summary(&self) -> CartSummary {
        CartSummary {
            entries: self.entries.clone(),
            total_items: self.total_item_count(),
            total_price: self.total_price(),
            has_pending_approval: self.has_pending_approval(),
        }
    }
}

/// A cart shared between request handlers
pub type SharedCart = Arc<Mutex<CartStore>>;

/// Lock a shared cart, turning a poisoned lock into an internal error
pub fn lock_cart(cart: &Mutex<CartStore>) -> StoreResult<MutexGuard<'_, CartStore>> {
    cart.lock()
        .map_err(|_| StoreError::Internal("cart lock poisoned".to_string()))
}

/// Serializable cart view with derived totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    pub entries: Vec<CartEntry>,
    pub total_items: u64,
    pub total_price: i64,
    pub has_pending_approval: bool,
}
