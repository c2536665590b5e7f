use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ReviewSource;
use crate::error::AnalysisError;

/// A user review as ingested by the host service. Immutable input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub text: String,
    /// Star rating as given on the source platform, 1..=5.
    pub original_rating: u8,
    pub reviewed_at: DateTime<FixedOffset>,
    pub source: ReviewSource,
}

impl Review {
    /// Reject ratings outside the 1..=5 star scale.
    pub fn validate_rating(&self) -> Result<(), AnalysisError> {
        if (1..=5).contains(&self.original_rating) {
            Ok(())
        } else {
            Err(AnalysisError::InvalidInput {
                field: "original_rating".into(),
                value: self.original_rating.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rating: u8) -> Review {
        Review {
            id: Uuid::new_v4(),
            clinic_id: Uuid::new_v4(),
            text: "친절해요".into(),
            original_rating: rating,
            reviewed_at: "2026-03-01T10:00:00+09:00".parse().unwrap(),
            source: ReviewSource::Naver,
        }
    }

    #[test]
    fn rating_in_range() {
        for r in 1..=5 {
            assert!(review(r).validate_rating().is_ok());
        }
    }

    #[test]
    fn rating_out_of_range() {
        assert!(review(0).validate_rating().is_err());
        assert!(review(6).validate_rating().is_err());
    }
}
