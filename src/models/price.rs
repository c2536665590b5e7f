use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Treatment;
use crate::error::AnalysisError;

/// A single (clinic, treatment, price) observation. The district is denormalized
/// onto the observation by the host so the price engine never joins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceObservation {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub district: String,
    pub treatment: Treatment,
    /// Price in minor currency units (KRW). Strictly positive.
    pub price: u32,
    pub verified: bool,
    /// Sticky outlier flag. Cleared only by explicit revalidation on ingest.
    pub outlier: bool,
}

impl PriceObservation {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.price == 0 {
            return Err(AnalysisError::InvalidInput {
                field: "price".into(),
                value: "0".into(),
            });
        }
        if self.district.trim().is_empty() {
            return Err(AnalysisError::InvalidInput {
                field: "district".into(),
                value: self.district.clone(),
            });
        }
        Ok(())
    }
}
