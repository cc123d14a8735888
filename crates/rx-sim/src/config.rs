//! # Simulation Configuration
//!
//! Timing and decision knobs for the simulated collaborators.
//! Values are read from environment variables (a `.env` file is honoured).

use rx_core::StoreError;
use std::env;
use std::time::Duration;

/// Default delay for simulated payment and review (matches the storefront's spinner)
pub const DEFAULT_DELAY_MS: u64 = 2000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// How long a payment takes to settle
    pub payment_delay: Duration,

    /// How long a prescription review takes
    pub review_delay: Duration,

    /// Approve every prescription (false rejects every prescription)
    pub auto_approve: bool,
}

impl SimConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional env vars:
    /// - `RX_PAYMENT_DELAY_MS` (default 2000)
    /// - `RX_REVIEW_DELAY_MS` (default 2000)
    /// - `RX_AUTO_APPROVE` (default true)
    pub fn from_env() -> Result<Self, StoreError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let millis = |key: &str| -> Result<Duration, StoreError> {
            match lookup(key) {
                None => Ok(Duration::from_millis(DEFAULT_DELAY_MS)),
                Some(raw) => raw.trim().parse::<u64>().map(Duration::from_millis).map_err(|_| {
                    StoreError::Configuration(format!("{} must be a whole number of milliseconds", key))
                }),
            }
        };

        let auto_approve = match lookup("RX_AUTO_APPROVE") {
            None => true,
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                StoreError::Configuration("RX_AUTO_APPROVE must be true or false".to_string())
            })?,
        };

        Ok(Self {
            payment_delay: millis("RX_PAYMENT_DELAY_MS")?,
            review_delay: millis("RX_REVIEW_DELAY_MS")?,
            auto_approve,
        })
    }

    /// Zero delays, auto-approve (for tests and demos)
    pub fn instant() -> Self {
        Self {
            payment_delay: Duration::ZERO,
            review_delay: Duration::ZERO,
            auto_approve: true,
        }
    }

    /// Builder: set auto-approval
    pub fn with_auto_approve(mut self, auto_approve: bool) -> Self {
        self.auto_approve = auto_approve;
        self
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            payment_delay: Duration::from_millis(DEFAULT_DELAY_MS),
            review_delay: Duration::from_millis(DEFAULT_DELAY_MS),
            auto_approve: true,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SimConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, SimConfig::default());
        assert_eq!(config.payment_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_overrides() {
        let config = SimConfig::from_lookup(lookup(&[
            ("RX_PAYMENT_DELAY_MS", "150"),
            ("RX_REVIEW_DELAY_MS", "0"),
            ("RX_AUTO_APPROVE", "no"),
        ]))
        .unwrap();

        assert_eq!(config.payment_delay, Duration::from_millis(150));
        assert_eq!(config.review_delay, Duration::ZERO);
        assert!(!config.auto_approve);
    }

    #[test]
    fn test_invalid_values() {
        assert!(SimConfig::from_lookup(lookup(&[("RX_PAYMENT_DELAY_MS", "soon")])).is_err());
        assert!(SimConfig::from_lookup(lookup(&[("RX_AUTO_APPROVE", "maybe")])).is_err());
    }
}
