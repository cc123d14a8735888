//! # Simulated Payments
//!
//! Payment strategies for the two methods the storefront offers. Neither
//! talks to a real provider; both wait out the configured delay.

use crate::config::SimConfig;
use async_trait::async_trait;
use rx_core::{
    Order, PaymentMethod, PaymentReceipt, PaymentStatus, PaymentStrategy, StoreError, StoreResult,
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Cash on delivery: the order is accepted, payment stays pending until delivery
pub struct CashOnDeliveryStrategy {
    config: SimConfig,
}

impl CashOnDeliveryStrategy {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PaymentStrategy for CashOnDeliveryStrategy {
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    async fn process_payment(&self, order: &Order) -> StoreResult<PaymentReceipt> {
        if order.is_empty() {
            return Err(StoreError::InvalidRequest("Order has no items".to_string()));
        }
        debug!("simulating order confirmation for {:?}", self.config.payment_delay);
        tokio::time::sleep(self.config.payment_delay).await;

        info!(total = order.total, "cash on delivery order accepted");
        Ok(PaymentReceipt {
            provider: self.provider_name().to_string(),
            reference: format!("COD-{}", order.id),
            payment_status: PaymentStatus::Pending,
        })
    }

    fn provider_name(&self) -> &'static str {
        "cod"
    }
}

/// UPI: declines malformed VPAs, otherwise settles after the delay
pub struct SimulatedUpiStrategy {
    config: SimConfig,
}

impl SimulatedUpiStrategy {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    /// A VPA looks like `handle@bank`
    fn check_vpa(upi_id: &str) -> StoreResult<()> {
        match upi_id.trim().split_once('@') {
            Some((handle, bank)) if !handle.is_empty() && !bank.is_empty() && !bank.contains('@') => {
                Ok(())
            }
            _ => Err(StoreError::PaymentDeclined {
                reason: format!("invalid UPI id: {}", upi_id),
            }),
        }
    }
}

#[async_trait]
impl PaymentStrategy for SimulatedUpiStrategy {
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    async fn process_payment(&self, order: &Order) -> StoreResult<PaymentReceipt> {
        let PaymentMethod::Upi { upi_id } = &order.payment_method else {
            return Err(StoreError::InvalidRequest(format!(
                "UPI strategy cannot take {} payments",
                order.payment_method.as_str()
            )));
        };
        if order.is_empty() {
            return Err(StoreError::InvalidRequest("Order has no items".to_string()));
        }
        Self::check_vpa(upi_id)?;

        debug!("simulating UPI collect request for {:?}", self.config.payment_delay);
        tokio::time::sleep(self.config.payment_delay).await;

        let reference = format!("UPI{}", &Uuid::new_v4().simple().to_string()[..12].to_uppercase());
        info!(total = order.total, %reference, "UPI payment settled");
        Ok(PaymentReceipt {
            provider: self.provider_name().to_string(),
            reference,
            payment_status: PaymentStatus::Completed,
        })
    }

    fn provider_name(&self) -> &'static str {
        "upi"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rx_core::{CartStore, Category, Product, ShippingAddress, StoreSettings};
    use std::time::Duration;

    fn order(method: PaymentMethod) -> Order {
        let mut cart = CartStore::new();
        cart.add(&Product::new("dolo-650", "Dolo 650", 30, Category::Otc));
        Order::from_entries(
            cart.entries(),
            ShippingAddress {
                full_name: "Asha Rao".into(),
                phone: "9876543210".into(),
                address_line1: "12 MG Road".into(),
                address_line2: None,
                city: "Bengaluru".into(),
                state: "Karnataka".into(),
                pincode: "560001".into(),
            },
            method,
            &StoreSettings::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_cod_waits_and_stays_pending() {
        let strategy = CashOnDeliveryStrategy::new(SimConfig::default());
        let order = order(PaymentMethod::Cod);

        let started = tokio::time::Instant::now();
        let receipt = strategy.process_payment(&order).await.unwrap();

        assert!(started.elapsed() >= Duration::from_secs(2));
        assert_eq!(receipt.payment_status, PaymentStatus::Pending);
        assert_eq!(receipt.reference, format!("COD-{}", order.id));
    }

    #[tokio::test]
    async fn test_upi_settles() {
        let strategy = SimulatedUpiStrategy::new(SimConfig::instant());
        let receipt = strategy
            .process_payment(&order(PaymentMethod::Upi {
                upi_id: "asha@okbank".into(),
            }))
            .await
            .unwrap();

        assert_eq!(receipt.provider, "upi");
        assert_eq!(receipt.payment_status, PaymentStatus::Completed);
        assert!(receipt.reference.starts_with("UPI"));
        assert_eq!(receipt.reference.len(), 15);
    }

    #[tokio::test]
    async fn test_upi_declines_bad_vpa() {
        let strategy = SimulatedUpiStrategy::new(SimConfig::instant());
        for bad in ["asha", "@okbank", "asha@", "a@b@c"] {
            let result = strategy
                .process_payment(&order(PaymentMethod::Upi { upi_id: bad.into() }))
                .await;
            assert!(
                matches!(result, Err(StoreError::PaymentDeclined { .. })),
                "{} should be declined",
                bad
            );
        }
    }

    #[tokio::test]
    async fn test_upi_rejects_cod_order() {
        let strategy = SimulatedUpiStrategy::new(SimConfig::instant());
        assert!(matches!(
            strategy.process_payment(&order(PaymentMethod::Cod)).await,
            Err(StoreError::InvalidRequest(_))
        ));
    }
}
