//! The facade the host service talks to. Composition only: it validates
//! inputs, fetches the current lexicon, delegates to the analysis modules and
//! shapes the result. Analysis policy lives in the modules, never here.

use chrono::{DateTime, FixedOffset};
use tracing::{debug, info};
use uuid::Uuid;

use crate::aggregate::{self, ClinicSummary, DistrictSummary, ProcessedReview};
use crate::cancel::CancelToken;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::geo::{ClinicDistance, ClinicSnapshot, Coordinates};
use crate::lexicon::{Lexicon, LexiconStore};
use crate::models::{PriceObservation, Review};
use crate::pricing::{self, PriceStatsReport};
use crate::sentiment::{self, ReviewAnalysis};

pub struct AnalysisCore {
    config: AnalysisConfig,
    lexicons: LexiconStore,
}

impl AnalysisCore {
    /// Build a core with the built-in Korean lexicon installed under the
    /// configured version tag.
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        let lexicon = Lexicon::builtin(&config.lexicon_version);
        Self::with_lexicon(config, lexicon)
    }

    /// Build a core around a caller-supplied lexicon.
    pub fn with_lexicon(config: AnalysisConfig, lexicon: Lexicon) -> Result<Self, AnalysisError> {
        config.validate()?;
        info!(version = %lexicon.version, "analysis core starting");
        Ok(Self {
            config,
            lexicons: LexiconStore::with(lexicon),
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Swap the lexicon atomically. In-flight analyses finish under the
    /// version they started with.
    pub fn install_lexicon(&self, lexicon: Lexicon) -> Result<(), AnalysisError> {
        self.lexicons.install(lexicon)
    }

    /// Score an ad-hoc text against the current lexicon.
    pub fn analyze_text(&self, text: &str) -> Result<ReviewAnalysis, AnalysisError> {
        let lexicon = self.lexicons.current()?;
        Ok(sentiment::analyze_review(
            text,
            &lexicon,
            self.config.sentiment_tau,
        ))
    }

    /// Score a stored review; the analysis carries the review id.
    pub fn analyze_review(&self, review: &Review) -> Result<ReviewAnalysis, AnalysisError> {
        review.validate_rating()?;
        let mut analysis = self.analyze_text(&review.text)?;
        analysis.review_id = Some(review.id);
        debug!(review_id = %review.id, confidence = analysis.confidence, "review analyzed");
        Ok(analysis)
    }

    pub fn aggregate_clinic(
        &self,
        clinic_id: Uuid,
        reviews: &[ProcessedReview],
    ) -> Result<ClinicSummary, AnalysisError> {
        let lexicon = self.lexicons.current()?;
        aggregate::aggregate_clinic(clinic_id, reviews, &lexicon, &self.config)
    }

    /// Aggregate every clinic in a district, then roll the summaries up.
    pub fn district_summary(
        &self,
        district: &str,
        per_clinic: &[(Uuid, Vec<ProcessedReview>)],
    ) -> Result<DistrictSummary, AnalysisError> {
        let mut summaries = Vec::with_capacity(per_clinic.len());
        for (clinic_id, reviews) in per_clinic {
            summaries.push(self.aggregate_clinic(*clinic_id, reviews)?);
        }
        Ok(aggregate::summarize_district(district, summaries))
    }

    pub fn recompute_regional_stats(
        &self,
        observations: &[PriceObservation],
        as_of: DateTime<FixedOffset>,
        cancel: &CancelToken,
    ) -> Result<PriceStatsReport, AnalysisError> {
        let report = pricing::recompute_regional_stats(observations, as_of, &self.config, cancel)?;
        info!(
            pairs = report.stats.len(),
            outliers = report.outlier_ids.len(),
            "regional price stats recomputed"
        );
        Ok(report)
    }

    pub fn clinics_within_radius(
        &self,
        snapshot: &ClinicSnapshot,
        lat: f64,
        lng: f64,
        radius_km: f64,
        limit: Option<usize>,
        cancel: &CancelToken,
    ) -> Result<Vec<ClinicDistance>, AnalysisError> {
        let center = Coordinates::new(lat, lng)?;
        snapshot.clinics_within_radius(center, radius_km, limit, &self.config, cancel)
    }

    pub fn district_search(
        &self,
        snapshot: &ClinicSnapshot,
        district: &str,
        center: Option<(f64, f64)>,
        radius_km: f64,
        limit: Option<usize>,
        cancel: &CancelToken,
    ) -> Result<Vec<ClinicDistance>, AnalysisError> {
        let center = match center {
            Some((lat, lng)) => Some(Coordinates::new(lat, lng)?),
            None => None,
        };
        snapshot.district_search(district, center, radius_km, limit, &self.config, cancel)
    }

    pub fn nearby_districts(
        &self,
        snapshot: &ClinicSnapshot,
        district: &str,
        radius_km: f64,
        cancel: &CancelToken,
    ) -> Result<Vec<String>, AnalysisError> {
        snapshot.nearby_districts(district, radius_km, &self.config, cancel)
    }
}
