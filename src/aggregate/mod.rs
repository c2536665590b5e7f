//! Clinic-level aggregation of processed reviews, plus the derived 0-100
//! presentation scores and the district roll-up.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{AnalysisConfig, ScoreWeights};
use crate::error::AnalysisError;
use crate::lexicon::Lexicon;
use crate::models::{Aspect, Review};
use crate::sentiment::{AspectScores, ReviewAnalysis};

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// A review joined with its stored sentiment analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedReview {
    pub review: Review,
    pub analysis: ReviewAnalysis,
}

/// Aggregated metrics over a clinic's reviews. Present only when the clinic
/// has at least one review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    /// Mean star rating, one decimal.
    pub avg_rating: f64,
    /// Share of reviews rated 4 or 5 stars, as a percent with one decimal.
    pub positive_ratio: f64,
    /// Per-aspect score means, two decimals each.
    pub aspect_means: AspectScores,
    /// Mean analysis confidence, as a percent with one decimal.
    pub mean_confidence: f64,
    /// Most-mentioned keyword surfaces per aspect. Aspects with no matches
    /// are absent.
    pub top_keywords: BTreeMap<Aspect, Vec<String>>,
}

/// Clinic summary. `metrics` is None for the no-reviews sentinel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicSummary {
    pub clinic_id: Uuid,
    pub total_reviews: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<SummaryMetrics>,
}

/// District roll-up: the busiest clinics by review volume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistrictSummary {
    pub district: String,
    pub clinic_count: usize,
    pub total_reviews: usize,
    /// Review-weighted mean of the clinics' average ratings, one decimal.
    /// None when the district has no reviews at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_rating: Option<f64>,
    /// Top clinics by review count, at most five, ties broken by clinic id.
    pub top_clinics: Vec<ClinicSummary>,
}

// -----------------------------------------------------------------------------
// Aggregation
// -----------------------------------------------------------------------------

/// Aggregate one clinic's processed reviews into a summary.
///
/// The lexicon supplies the declaration order used to break keyword ties; it
/// should be the version the analyses were produced with.
pub fn aggregate_clinic(
    clinic_id: Uuid,
    reviews: &[ProcessedReview],
    lexicon: &Lexicon,
    config: &AnalysisConfig,
) -> Result<ClinicSummary, AnalysisError> {
    for processed in reviews {
        processed.review.validate_rating()?;
    }
    if reviews.is_empty() {
        return Ok(ClinicSummary {
            clinic_id,
            total_reviews: 0,
            metrics: None,
        });
    }

    let n = reviews.len() as f64;
    let avg_rating = reviews
        .iter()
        .map(|p| f64::from(p.review.original_rating))
        .sum::<f64>()
        / n;
    let positive = reviews
        .iter()
        .filter(|p| p.review.original_rating >= 4)
        .count() as f64;
    let mean_confidence = reviews.iter().map(|p| p.analysis.confidence).sum::<f64>() / n;

    let mut aspect_means = AspectScores::default();
    for aspect in Aspect::ALL {
        let mean = reviews
            .iter()
            .map(|p| p.analysis.scores.get(aspect))
            .sum::<f64>()
            / n;
        aspect_means.set(aspect, round2(mean));
    }

    Ok(ClinicSummary {
        clinic_id,
        total_reviews: reviews.len(),
        metrics: Some(SummaryMetrics {
            avg_rating: round1(avg_rating),
            positive_ratio: round1(positive / n * 100.0),
            aspect_means,
            mean_confidence: round1(mean_confidence * 100.0),
            top_keywords: top_keywords(reviews, lexicon, config.top_keywords_per_aspect),
        }),
    })
}

/// Union matched keywords across reviews, weighted by occurrence count, and
/// keep the top `k` per aspect. Ties break by lexicon declaration order.
fn top_keywords(
    reviews: &[ProcessedReview],
    lexicon: &Lexicon,
    k: usize,
) -> BTreeMap<Aspect, Vec<String>> {
    let mut out = BTreeMap::new();
    for aspect in Aspect::ALL {
        let mut totals: BTreeMap<&str, u32> = BTreeMap::new();
        for processed in reviews {
            if let Some(keywords) = processed.analysis.matched_keywords.get(&aspect) {
                for keyword in keywords {
                    *totals.entry(keyword.surface.as_str()).or_default() += keyword.count;
                }
            }
        }
        if totals.is_empty() {
            continue;
        }
        let entries = lexicon.entries_for(aspect);
        let declared = |surface: &str| {
            entries
                .iter()
                .position(|e| e.surface == surface)
                .unwrap_or(usize::MAX)
        };
        let mut ranked: Vec<(&str, u32)> = totals.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(declared(a.0).cmp(&declared(b.0))));
        ranked.truncate(k);
        out.insert(aspect, ranked.into_iter().map(|(s, _)| s.to_string()).collect());
    }
    out
}

// -----------------------------------------------------------------------------
// Presentation scores
// -----------------------------------------------------------------------------

/// Map a [-1, 1] sentiment score onto the 0-100 display scale.
pub fn normalize_sentiment(score: f64) -> f64 {
    ((score + 1.0) * 50.0).clamp(0.0, 100.0)
}

/// Overtreatment risk on 0-100: a strongly positive overtreatment sentiment
/// (honest, no upselling) means low risk.
pub fn overtreatment_risk(overtreatment_score: f64) -> f64 {
    ((1.0 - overtreatment_score) * 50.0).clamp(0.0, 100.0)
}

/// Patient satisfaction on 0-100: mean of kindness, waiting time and facility.
pub fn patient_satisfaction(scores: &AspectScores) -> f64 {
    let parts = [
        normalize_sentiment(scores.kindness),
        normalize_sentiment(scores.waiting_time),
        normalize_sentiment(scores.facility),
    ];
    parts.iter().sum::<f64>() / parts.len() as f64
}

impl SummaryMetrics {
    /// Weighted recommendation score on 0-100. Overtreatment risk enters
    /// inverted so that low risk raises the score.
    pub fn comprehensive_score(&self, weights: &ScoreWeights) -> f64 {
        let scores = &self.aspect_means;
        let price = normalize_sentiment(scores.price);
        let skill = normalize_sentiment(scores.skill);
        let risk = overtreatment_risk(scores.overtreatment);
        let satisfaction = patient_satisfaction(scores);
        round1(
            weights.price_competitiveness * price
                + weights.medical_skill * skill
                + weights.overtreatment_risk * (100.0 - risk)
                + weights.patient_satisfaction * satisfaction,
        )
    }
}

// -----------------------------------------------------------------------------
// District roll-up
// -----------------------------------------------------------------------------

const DISTRICT_TOP_CLINICS: usize = 5;

/// Summarize a district from its clinics' individual summaries.
pub fn summarize_district(district: &str, mut summaries: Vec<ClinicSummary>) -> DistrictSummary {
    let clinic_count = summaries.len();
    let total_reviews: usize = summaries.iter().map(|s| s.total_reviews).sum();
    let rated: Vec<(f64, usize)> = summaries
        .iter()
        .filter_map(|s| s.metrics.as_ref().map(|m| (m.avg_rating, s.total_reviews)))
        .collect();
    let rated_reviews: usize = rated.iter().map(|(_, n)| n).sum();
    let avg_rating = (rated_reviews > 0).then(|| {
        let weighted: f64 = rated.iter().map(|(r, n)| r * *n as f64).sum();
        round1(weighted / rated_reviews as f64)
    });
    summaries.sort_by(|a, b| {
        b.total_reviews
            .cmp(&a.total_reviews)
            .then(a.clinic_id.cmp(&b.clinic_id))
    });
    summaries.truncate(DISTRICT_TOP_CLINICS);
    DistrictSummary {
        district: district.to_string(),
        clinic_count,
        total_reviews,
        avg_rating,
        top_clinics: summaries,
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
