use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

// -----------------------------------------------------------------------------
// Analysis configuration
// -----------------------------------------------------------------------------

/// Tunables of the analytical core. Every knob has a production default; hosts
/// deserialize overrides from their own config layer and pass the result in
/// once at construction. The core never reads the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Version tag stamped onto every analysis produced with the built-in
    /// lexicon. Custom lexicons carry their own version.
    pub lexicon_version: String,
    /// Confidence saturation constant: confidence = 1 - exp(-mass / tau).
    pub sentiment_tau: f64,
    /// MAD multiplier for the price outlier band.
    pub price_mad_k: f64,
    /// Relative band around the median used when MAD collapses to zero.
    pub price_zero_mad_band: f64,
    /// Hard cap on radius queries, in kilometres.
    pub geo_max_radius_km: f64,
    /// Keywords reported per aspect in clinic summaries.
    pub top_keywords_per_aspect: usize,
    pub weights: ScoreWeights,
}

/// Weights of the comprehensive recommendation score. Must sum to 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub price_competitiveness: f64,
    pub medical_skill: f64,
    pub overtreatment_risk: f64,
    pub patient_satisfaction: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            lexicon_version: "builtin-ko-1".to_string(),
            sentiment_tau: 4.0,
            price_mad_k: 3.5,
            price_zero_mad_band: 0.30,
            geo_max_radius_km: 50.0,
            top_keywords_per_aspect: 3,
            weights: ScoreWeights::default(),
        }
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            price_competitiveness: 0.30,
            medical_skill: 0.25,
            overtreatment_risk: 0.25,
            patient_satisfaction: 0.20,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(self.sentiment_tau > 0.0) {
            return Err(invalid("sentiment_tau", self.sentiment_tau));
        }
        if !(self.price_mad_k > 0.0) {
            return Err(invalid("price_mad_k", self.price_mad_k));
        }
        if !(self.price_zero_mad_band > 0.0 && self.price_zero_mad_band < 1.0) {
            return Err(invalid("price_zero_mad_band", self.price_zero_mad_band));
        }
        if !(self.geo_max_radius_km > 0.0) {
            return Err(invalid("geo_max_radius_km", self.geo_max_radius_km));
        }
        if self.top_keywords_per_aspect == 0 {
            return Err(AnalysisError::InvalidInput {
                field: "top_keywords_per_aspect".into(),
                value: "0".into(),
            });
        }
        self.weights.validate()
    }
}

impl ScoreWeights {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let parts = [
            ("weights.price_competitiveness", self.price_competitiveness),
            ("weights.medical_skill", self.medical_skill),
            ("weights.overtreatment_risk", self.overtreatment_risk),
            ("weights.patient_satisfaction", self.patient_satisfaction),
        ];
        for (field, w) in parts {
            if !(0.0..=1.0).contains(&w) {
                return Err(invalid(field, w));
            }
        }
        let sum: f64 = parts.iter().map(|(_, w)| w).sum();
        if (sum - 1.0).abs() > 1e-9 {
            return Err(invalid("weights", sum));
        }
        Ok(())
    }
}

fn invalid(field: &str, value: f64) -> AnalysisError {
    AnalysisError::InvalidInput {
        field: field.into(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_tau_rejected() {
        let cfg = AnalysisConfig {
            sentiment_tau: 0.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn weights_must_sum_to_one() {
        let cfg = AnalysisConfig {
            weights: ScoreWeights {
                price_competitiveness: 0.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn overrides_deserialize_over_defaults() {
        let cfg: AnalysisConfig = serde_json::from_str(r#"{"sentiment_tau": 2.5}"#).unwrap();
        assert_eq!(cfg.sentiment_tau, 2.5);
        assert_eq!(cfg.price_mad_k, 3.5);
    }
}
