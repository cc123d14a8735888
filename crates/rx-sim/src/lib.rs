//! # rx-sim
//!
//! Simulated collaborators for pharma-cart-rs.
//!
//! Nothing here leaves the process. Each collaborator waits on a `tokio`
//! timer to mimic the latency of the real thing:
//!
//! 1. **CashOnDeliveryStrategy** - accepts the order, payment stays pending
//! 2. **SimulatedUpiStrategy** - checks the VPA shape, then settles
//! 3. **SimulatedReviewer** - approves (or rejects) prescriptions
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rx_sim::{SimConfig, payment_strategies, SimulatedReviewer};
//!
//! let config = SimConfig::from_env()?;
//! let strategies = payment_strategies(&config);
//! let reviewer = SimulatedReviewer::new(config);
//! ```

pub mod config;
pub mod payment;
pub mod review;

use rx_core::PaymentStrategySelector;
use std::sync::Arc;

// Re-exports
pub use config::{SimConfig, DEFAULT_DELAY_MS};
pub use payment::{CashOnDeliveryStrategy, SimulatedUpiStrategy};
pub use review::SimulatedReviewer;

/// Selector with both simulated payment methods registered
pub fn payment_strategies(config: &SimConfig) -> PaymentStrategySelector {
    PaymentStrategySelector::new()
        .with_strategy(Arc::new(CashOnDeliveryStrategy::new(config.clone())))
        .with_strategy(Arc::new(SimulatedUpiStrategy::new(config.clone())))
}
