//! # Collaborator Traits
//!
//! Strategy traits for the collaborators that sit around the cart: payment
//! processing and prescription review. Both are simulated in this project
//! (see the `rx-sim` crate) and can be swapped without touching callers.
//!
//! ```text
//! ┌──────────────────────────────┐   ┌──────────────────────────────┐
//! │  PaymentStrategy (trait)     │   │  PrescriptionReviewer (trait)│
//! │  ├── process_payment()       │   │  ├── review()                │
//! │  └── provider_name()         │   │  └── reviewer_name()         │
//! └──────────────┬───────────────┘   └──────────────┬───────────────┘
//!        ┌───────┴───────┐                          │
//!   CashOnDelivery   SimulatedUpi           SimulatedReviewer
//! ```

use crate::error::StoreResult;
use crate::order::{Order, PaymentReceipt};
use crate::prescription::{Prescription, ReviewDecision};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Processes payment for a placed order.
///
/// The provider name must match the `PaymentMethod` it handles ("cod", "upi").
#[async_trait]
pub trait PaymentStrategy: Send + Sync {
    /// Take payment for an order. May wait on a (simulated) provider.
    async fn process_payment(&self, order: &Order) -> StoreResult<PaymentReceipt>;

    /// Get the provider name (for logging and routing).
    fn provider_name(&self) -> &'static str;
}

/// Reviews an uploaded prescription and decides on it
#[async_trait]
pub trait PrescriptionReviewer: Send + Sync {
    async fn review(&self, prescription: &Prescription) -> StoreResult<ReviewDecision>;

    fn reviewer_name(&self) -> &'static str {
        "reviewer"
    }
}

/// Type alias for a boxed payment strategy (dynamic dispatch)
pub type BoxedPaymentStrategy = Arc<dyn PaymentStrategy>;

/// Type alias for a boxed prescription reviewer
pub type BoxedPrescriptionReviewer = Arc<dyn PrescriptionReviewer>;

/// Payment strategies keyed by payment method
#[derive(Clone, Default)]
pub struct PaymentStrategySelector {
    strategies: HashMap<String, BoxedPaymentStrategy>,
}

impl PaymentStrategySelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a payment strategy under its provider name
    pub fn register(&mut self, strategy: BoxedPaymentStrategy) {
        let name = strategy.provider_name().to_string();
        self.strategies.insert(name, strategy);
    }

    /// Register with builder pattern
    pub fn with_strategy(mut self, strategy: BoxedPaymentStrategy) -> Self {
        self.register(strategy);
        self
    }

    pub fn get(&self, provider: &str) -> Option<&BoxedPaymentStrategy> {
        self.strategies.get(provider)
    }

    /// Registered provider names, sorted
    pub fn providers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.strategies.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn has_provider(&self, provider: &str) -> bool {
        self.strategies.contains_key(provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::PaymentStatus;

    struct Fixed(&'static str);

    #[async_trait]
    impl PaymentStrategy for Fixed {
        async fn process_payment(&self, order: &Order) -> StoreResult<PaymentReceipt> {
            Ok(PaymentReceipt {
                provider: self.0.to_string(),
                reference: order.id.clone(),
                payment_status: PaymentStatus::Completed,
            })
        }

        fn provider_name(&self) -> &'static str {
            self.0
        }
    }

    #[test]
    fn test_empty_selector() {
        let selector = PaymentStrategySelector::new();
        assert!(selector.providers().is_empty());
        assert!(selector.get("cod").is_none());
    }

    #[test]
    fn test_selector_registration() {
        let selector = PaymentStrategySelector::new()
            .with_strategy(Arc::new(Fixed("upi")))
            .with_strategy(Arc::new(Fixed("cod")));

        assert_eq!(selector.providers(), vec!["cod", "upi"]);
        assert!(selector.has_provider("upi"));
        assert_eq!(selector.get("cod").unwrap().provider_name(), "cod");
    }
}
