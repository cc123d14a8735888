//! # Checkout Flow
//!
//! Turns the cart into an order. The flow checks the prescription gate
//! immediately before placing the order, refuses a second order while one is
//! processing, and only clears the ordered entries once payment succeeds.

use crate::cart::{lock_cart, CartStore};
use crate::error::{StoreError, StoreResult};
use crate::order::{Order, OrderHistory, OrderStatus, PaymentMethod, ShippingAddress};
use crate::settings::StoreSettings;
use crate::strategy::PaymentStrategySelector;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::{error, info, instrument, warn};

/// What the customer submits at checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

/// Clears the busy flag when the order attempt ends, however it ends
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct CheckoutFlow {
    strategies: PaymentStrategySelector,
    settings: StoreSettings,
    busy: AtomicBool,
    history: Mutex<OrderHistory>,
}

impl CheckoutFlow {
    pub fn new(strategies: PaymentStrategySelector, settings: StoreSettings) -> Self {
        Self {
            strategies,
            settings,
            busy: AtomicBool::new(false),
            history: Mutex::new(OrderHistory::new()),
        }
    }

    /// True while an order is being placed
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    pub fn strategies(&self) -> &PaymentStrategySelector {
        &self.strategies
    }

    /// Place an order for everything in the cart.
    ///
    /// On any error the cart is left as it was.
    #[instrument(skip(self, cart, request), fields(method = request.payment_method.as_str()))]
    pub async fn place_order(
        &self,
        cart: &Mutex<CartStore>,
        request: CheckoutRequest,
    ) -> StoreResult<Order> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("order already in progress");
            return Err(StoreError::OrderInProgress);
        }
        let _busy = BusyGuard(&self.busy);

        let entries = {
            let cart = lock_cart(cart)?;
            if cart.is_empty() {
                return Err(StoreError::EmptyCart);
            }
            if cart.has_pending_approval() {
                let product_ids = cart.awaiting_approval();
                warn!(?product_ids, "checkout blocked on prescription approval");
                return Err(StoreError::PrescriptionApprovalRequired { product_ids });
            }
            cart.entries().to_vec()
        };

        request.shipping_address.validate()?;

        let strategy = self
            .strategies
            .get(request.payment_method.as_str())
            .ok_or_else(|| {
                StoreError::Configuration(format!(
                    "No payment strategy for method: {}",
                    request.payment_method.as_str()
                ))
            })?
            .clone();

        let mut order = Order::from_entries(
            &entries,
            request.shipping_address,
            request.payment_method,
            &self.settings,
        );

        info!(
            order_id = %order.id,
            items = order.item_count(),
            total = %self.settings.format_price(order.total),
            "placing order"
        );

        let receipt = strategy.process_payment(&order).await.map_err(|e| {
            error!(order_id = %order.id, "payment failed: {}", e);
            e
        })?;

        order.status = OrderStatus::Confirmed;
        order.payment_status = receipt.payment_status;

        // Payment is taken; bookkeeping failures below are logged, not returned.
        match self.history.lock() {
            Ok(mut history) => history.record(order.clone()),
            Err(_) => error!(order_id = %order.id, "order history lock poisoned, order not recorded"),
        }
        let ordered: Vec<&str> = order.lines.iter().map(|l| l.product_id.as_str()).collect();
        match lock_cart(cart) {
            Ok(mut cart) => cart.clear_ordered(&ordered),
            Err(e) => error!(order_id = %order.id, "cart not cleared after order: {}", e),
        }

        info!(
            order_id = %order.id,
            provider = %receipt.provider,
            reference = %receipt.reference,
            "order placed"
        );
        Ok(order)
    }

    /// Orders placed this session, newest first
    pub fn orders(&self) -> Vec<Order> {
        self.history
            .lock()
            .map(|h| h.orders().to_vec())
            .unwrap_or_default()
    }

    pub fn order(&self, order_id: &str) -> Option<Order> {
        self.history
            .lock()
            .ok()
            .and_then(|h| h.get(order_id).cloned())
    }
}
