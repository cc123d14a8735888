//! # Order Types
//!
//! Orders, shipping addresses and payment methods for checkout.

use crate::cart::{CartEntry, PrescriptionStatus};
use crate::error::{StoreError, StoreResult};
use crate::settings::StoreSettings;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Shipping address collected at checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub full_name: String,
    /// 10-digit mobile number
    pub phone: String,
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    /// 6-digit postal code
    pub pincode: String,
}

impl ShippingAddress {
    /// Check required fields and phone/pincode formats
    pub fn validate(&self) -> StoreResult<()> {
        let required = [
            ("full_name", &self.full_name),
            ("phone", &self.phone),
            ("address_line1", &self.address_line1),
            ("city", &self.city),
            ("state", &self.state),
            ("pincode", &self.pincode),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(StoreError::address(field, "is required"));
            }
        }

        if !is_digits(self.phone.trim(), 10) {
            return Err(StoreError::address("phone", "must be a 10-digit number"));
        }
        if !is_digits(self.pincode.trim(), 6) {
            return Err(StoreError::address("pincode", "must be a 6-digit number"));
        }
        Ok(())
    }
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

/// How the customer pays
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery
    #[default]
    Cod,
    /// UPI transfer to the given virtual payment address
    Upi { upi_id: String },
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::Upi { .. } => "upi",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

/// A line in a placed order (snapshot of a cart entry)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: String,
    pub name: String,
    pub unit_price: i64,
    pub quantity: u32,
    pub prescription_status: PrescriptionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prescription_id: Option<String>,
}

impl OrderLine {
    pub fn from_entry(entry: &CartEntry) -> Self {
        Self {
            product_id: entry.product.id.clone(),
            name: entry.product.name.clone(),
            unit_price: entry.product.price,
            quantity: entry.cart_quantity,
            prescription_status: entry.prescription_status,
            prescription_id: entry.prescription_id.clone(),
        }
    }

    pub fn total(&self) -> i64 {
        self.unit_price.saturating_mul(i64::from(self.quantity))
    }
}

/// A placed order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Order number, `ORD` followed by eight digits
    pub id: String,
    pub lines: Vec<OrderLine>,
    pub subtotal: i64,
    pub delivery_fee: i64,
    pub total: i64,
    #[serde(default)]
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub shipping_address: ShippingAddress,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_delivery: Option<DateTime<Utc>>,
}

impl Order {
    /// Build a pending order from cart entries
    pub fn from_entries(
        entries: &[CartEntry],
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
        settings: &StoreSettings,
    ) -> Self {
        let lines: Vec<OrderLine> = entries.iter().map(OrderLine::from_entry).collect();
        let subtotal = lines.iter().map(OrderLine::total).fold(0, i64::saturating_add);
        let delivery_fee = settings.delivery_fee_for(subtotal);
        let created_at = Utc::now();

        Self {
            id: generate_order_id(),
            lines,
            subtotal,
            delivery_fee,
            total: subtotal.saturating_add(delivery_fee),
            status: OrderStatus::Pending,
            payment_method,
            payment_status: PaymentStatus::Pending,
            shipping_address,
            created_at,
            estimated_delivery: Some(created_at + Duration::days(settings.delivery_days)),
        }
    }

    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn generate_order_id() -> String {
    let digits = Uuid::new_v4().as_u128() % 100_000_000;
    format!("ORD{:08}", digits)
}

/// Receipt returned by a payment strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    /// Provider name (e.g., "cod", "upi")
    pub provider: String,
    /// Provider's transaction reference
    pub reference: String,
    pub payment_status: PaymentStatus,
}

/// Orders placed during this session, newest first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderHistory {
    orders: Vec<Order>,
}

impl OrderHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, order: Order) {
        self.orders.insert(0, order);
    }

    pub fn get(&self, order_id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == order_id)
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cart::CartStore;
    use crate::product::{Category, Product};

    pub(crate) fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Asha Rao".into(),
            phone: "9876543210".into(),
            address_line1: "12 MG Road".into(),
            address_line2: None,
            city: "Bengaluru".into(),
            state: "Karnataka".into(),
            pincode: "560001".into(),
        }
    }

    #[test]
    fn test_address_validation() {
        assert!(address().validate().is_ok());

        let mut missing = address();
        missing.city = "  ".into();
        assert!(matches!(
            missing.validate(),
            Err(StoreError::InvalidAddress { field, .. }) if field == "city"
        ));

        let mut bad_phone = address();
        bad_phone.phone = "98765".into();
        assert!(bad_phone.validate().is_err());

        let mut bad_pin = address();
        bad_pin.pincode = "56A001".into();
        assert!(matches!(
            bad_pin.validate(),
            Err(StoreError::InvalidAddress { field, .. }) if field == "pincode"
        ));
    }

    #[test]
    fn test_order_from_entries_small_basket_pays_delivery() {
        let mut cart = CartStore::new();
        cart.add(&Product::new("a", "A", 100, Category::Otc));
        cart.set_quantity("a", 2);

        let order = Order::from_entries(
            cart.entries(),
            address(),
            PaymentMethod::Cod,
            &StoreSettings::default(),
        );

        assert_eq!(order.subtotal, 200);
        assert_eq!(order.delivery_fee, 49);
        assert_eq!(order.total, 249);
        assert_eq!(order.item_count(), 2);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(
            order.estimated_delivery.unwrap() - order.created_at,
            Duration::days(3)
        );
    }

    #[test]
    fn test_order_free_delivery() {
        let mut cart = CartStore::new();
        cart.add(&Product::new("a", "A", 600, Category::Otc));
        let order = Order::from_entries(
            cart.entries(),
            address(),
            PaymentMethod::Upi {
                upi_id: "asha@okbank".into(),
            },
            &StoreSettings::default(),
        );
        assert_eq!(order.delivery_fee, 0);
        assert_eq!(order.total, 600);
    }

    #[test]
    fn test_order_id_format() {
        let id = generate_order_id();
        assert_eq!(id.len(), 11);
        assert!(id.starts_with("ORD"));
        assert!(id[3..].bytes().all(|b| b.is_ascii_digit()));
    }

    #[test]
    fn test_payment_method_json() {
        let upi: PaymentMethod =
            serde_json::from_str(r#"{"method":"upi","upi_id":"a@b"}"#).unwrap();
        assert_eq!(upi.as_str(), "upi");
        let cod: PaymentMethod = serde_json::from_str(r#"{"method":"cod"}"#).unwrap();
        assert_eq!(cod, PaymentMethod::Cod);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cod);
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
    }

    #[test]
    fn test_order_totals_saturate() {
        let mut cart = CartStore::new();
        cart.add(&Product::new("a", "A", i64::MAX / 2, Category::Otc));
        cart.add(&Product::new("b", "B", 10, Category::Otc));
        cart.set_quantity("a", 3_000_000_000);
        cart.set_quantity("b", 3_000_000_000);

        let order = Order::from_entries(
            cart.entries(),
            address(),
            PaymentMethod::Cod,
            &StoreSettings::default(),
        );
        assert_eq!(order.item_count(), 6_000_000_000);
        assert_eq!(order.subtotal, i64::MAX);
        assert_eq!(order.delivery_fee, 0);
        assert_eq!(order.total, i64::MAX);
    }

    #[test]
    fn test_history_newest_first() {
        let settings = StoreSettings::default();
        let mut history = OrderHistory::new();
        let first = Order::from_entries(&[], address(), PaymentMethod::Cod, &settings);
        let second = Order::from_entries(&[], address(), PaymentMethod::Cod, &settings);
        let second_id = second.id.clone();
        history.record(first);
        history.record(second);

        assert_eq!(history.len(), 2);
        assert_eq!(history.orders()[0].id, second_id);
        assert!(history.get(&second_id).is_some());
    }
}
