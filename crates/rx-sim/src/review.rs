//! # Simulated Prescription Review
//!
//! Stands in for a pharmacist: waits the configured delay, then approves or
//! rejects according to [`SimConfig::auto_approve`].

use crate::config::SimConfig;
use async_trait::async_trait;
use rx_core::{Prescription, PrescriptionReviewer, ReviewDecision, StoreResult};
use tracing::{debug, instrument};

pub struct SimulatedReviewer {
    config: SimConfig,
}

impl SimulatedReviewer {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PrescriptionReviewer for SimulatedReviewer {
    #[instrument(skip(self, prescription), fields(prescription_id = %prescription.id))]
    async fn review(&self, prescription: &Prescription) -> StoreResult<ReviewDecision> {
        debug!(file = %prescription.file_name, "simulating pharmacist review");
        tokio::time::sleep(self.config.review_delay).await;

        if self.config.auto_approve {
            Ok(ReviewDecision::approve())
        } else {
            Ok(ReviewDecision::reject(
                "Prescription could not be verified. Please upload a clearer copy.",
            ))
        }
    }

    fn reviewer_name(&self) -> &'static str {
        "simulated-pharmacist"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rx_core::{
        CartStore, Category, PrescriptionDesk, PrescriptionStatus, PrescriptionUpload, Product,
        StoreSettings,
    };
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_review_through_desk() {
        let cart = Mutex::new(CartStore::new());
        let product = Product::new("azee-500", "Azee 500", 119, Category::Prescription);
        cart.lock().unwrap().add(&product);

        let desk = PrescriptionDesk::new(
            Arc::new(SimulatedReviewer::new(SimConfig::default())),
            StoreSettings::default(),
        );
        let upload = PrescriptionUpload::new("azee-500", "scan.jpg", "image/jpeg", vec![0xFF; 128]);

        let started = tokio::time::Instant::now();
        let prescription = desk.submit(&cart, &product, upload).await.unwrap();

        assert!(started.elapsed() >= Duration::from_secs(2));
        assert_eq!(prescription.status, PrescriptionStatus::Approved);
        assert!(!cart.lock().unwrap().has_pending_approval());
    }

    #[tokio::test]
    async fn test_rejects_when_auto_approve_off() {
        let reviewer = SimulatedReviewer::new(SimConfig::instant().with_auto_approve(false));
        let desk = PrescriptionDesk::new(Arc::new(reviewer), StoreSettings::default());
        let cart = Mutex::new(CartStore::new());
        let product = Product::new("azee-500", "Azee 500", 119, Category::Prescription);
        cart.lock().unwrap().add(&product);

        let prescription = desk
            .submit(
                &cart,
                &product,
                PrescriptionUpload::new("azee-500", "scan.pdf", "application/pdf", vec![1]),
            )
            .await
            .unwrap();

        assert_eq!(prescription.status, PrescriptionStatus::Rejected);
        assert!(prescription.admin_notes.is_some());
        assert_eq!(
            cart.lock().unwrap().get("azee-500").unwrap().prescription_status,
            PrescriptionStatus::Rejected
        );
    }
}
