//! # Prescriptions
//!
//! Prescription intake: upload validation, the prescription record and the
//! desk that drives an entry from `pending` to a review decision.
//!
//! ```text
//!  upload ──► validate ──► cart: pending(RX-id) ──► reviewer ──► cart: approved | rejected
//! ```

use crate::cart::{lock_cart, CartStore, PrescriptionStatus};
use crate::error::{StoreError, StoreResult};
use crate::product::Product;
use crate::settings::StoreSettings;
use crate::strategy::BoxedPrescriptionReviewer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Mutex;
use tracing::{info, instrument, warn};

/// A prescription file as received from the customer
#[derive(Debug, Clone)]
pub struct PrescriptionUpload {
    pub product_id: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl PrescriptionUpload {
    pub fn new(
        product_id: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Check the file against the store's size and type limits
    pub fn validate(&self, settings: &StoreSettings) -> StoreResult<()> {
        if self.bytes.is_empty() {
            return Err(StoreError::InvalidUpload("file is empty".to_string()));
        }
        if self.file_name.trim().is_empty() {
            return Err(StoreError::InvalidUpload("file name is required".to_string()));
        }
        if self.bytes.len() > settings.max_upload_bytes {
            return Err(StoreError::UploadTooLarge {
                size: self.bytes.len(),
                max: settings.max_upload_bytes,
            });
        }
        if !settings.accepts_upload_type(&self.content_type) {
            return Err(StoreError::UnsupportedFileType {
                content_type: self.content_type.clone(),
            });
        }
        Ok(())
    }

    /// Prescription reference: `RX-` + the first 12 hex chars (uppercased)
    /// of SHA-256 over the product id followed by the file bytes. The same
    /// file uploaded for two products gets two ids.
    pub fn prescription_id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.product_id.as_bytes());
        hasher.update(&self.bytes);
        let digest = hex::encode(hasher.finalize());
        format!("RX-{}", &digest[..12].to_uppercase())
    }
}

/// A submitted prescription and its review outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: String,
    pub product_id: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: usize,
    pub status: PrescriptionStatus,
    pub uploaded_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
}

impl Prescription {
    fn from_upload(upload: &PrescriptionUpload) -> Self {
        Self {
            id: upload.prescription_id(),
            product_id: upload.product_id.clone(),
            file_name: upload.file_name.clone(),
            content_type: upload.content_type.clone(),
            size_bytes: upload.bytes.len(),
            status: PrescriptionStatus::Pending,
            uploaded_at: Utc::now(),
            reviewed_at: None,
            admin_notes: None,
        }
    }
}

/// Outcome of a prescription review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDecision {
    pub approved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ReviewDecision {
    pub fn approve() -> Self {
        Self {
            approved: true,
            notes: None,
        }
    }

    pub fn reject(notes: impl Into<String>) -> Self {
        Self {
            approved: false,
            notes: Some(notes.into()),
        }
    }

    pub fn status(&self) -> PrescriptionStatus {
        if self.approved {
            PrescriptionStatus::Approved
        } else {
            PrescriptionStatus::Rejected
        }
    }
}

/// Accepts prescription uploads and reports review decisions back to the cart
pub struct PrescriptionDesk {
    reviewer: BoxedPrescriptionReviewer,
    settings: StoreSettings,
    records: Mutex<Vec<Prescription>>,
}

impl PrescriptionDesk {
    pub fn new(reviewer: BoxedPrescriptionReviewer, settings: StoreSettings) -> Self {
        Self {
            reviewer,
            settings,
            records: Mutex::new(Vec::new()),
        }
    }

    /// Validate, mark the cart entry pending, review, then record the decision.
    ///
    /// The cart lock is not held while the reviewer runs. If the product is not
    /// in the cart the review still happens and the cart is left unchanged.
    #[instrument(skip(self, cart, product, upload), fields(product_id = %product.id))]
    pub async fn submit(
        &self,
        cart: &Mutex<CartStore>,
        product: &Product,
        upload: PrescriptionUpload,
    ) -> StoreResult<Prescription> {
        if upload.product_id != product.id {
            return Err(StoreError::InvalidUpload(format!(
                "upload is for {} but product is {}",
                upload.product_id, product.id
            )));
        }
        if !product.requires_prescription {
            return Err(StoreError::InvalidUpload(format!(
                "{} does not require a prescription",
                product.name
            )));
        }
        upload.validate(&self.settings)?;

        let mut prescription = Prescription::from_upload(&upload);
        lock_cart(cart)?.set_prescription_status(
            &product.id,
            PrescriptionStatus::Pending,
            Some(prescription.id.clone()),
        );
        info!(
            prescription_id = %prescription.id,
            size = prescription.size_bytes,
            "prescription submitted for review"
        );

        let decision = match self.reviewer.review(&prescription).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!(prescription_id = %prescription.id, "review failed: {}", e);
                self.store(prescription);
                return Err(e);
            }
        };

        prescription.status = decision.status();
        prescription.reviewed_at = Some(Utc::now());
        prescription.admin_notes = decision.notes;

        lock_cart(cart)?.set_prescription_status(
            &product.id,
            prescription.status,
            Some(prescription.id.clone()),
        );
        info!(
            prescription_id = %prescription.id,
            status = %prescription.status,
            reviewer = self.reviewer.reviewer_name(),
            "prescription reviewed"
        );

        self.store(prescription.clone());
        Ok(prescription)
    }

    fn store(&self, prescription: Prescription) {
        match self.records.lock() {
            Ok(mut records) => {
                records.retain(|p| p.id != prescription.id);
                records.push(prescription);
            }
            Err(_) => warn!("prescription records lock poisoned"),
        }
    }

    /// All prescriptions seen this session, oldest first
    pub fn prescriptions(&self) -> Vec<Prescription> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }
}
