//! Aspect-based sentiment scoring of a single review text. Pure functions
//! over an immutable lexicon; no clocks, no I/O, no logging.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lexicon::{tokenize, Lexicon};
use crate::models::Aspect;

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// Per-aspect sentiment scores, each in [-1, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AspectScores {
    pub price: f64,
    pub skill: f64,
    pub kindness: f64,
    pub waiting_time: f64,
    pub facility: f64,
    pub overtreatment: f64,
}

impl AspectScores {
    pub fn get(&self, aspect: Aspect) -> f64 {
        match aspect {
            Aspect::Price => self.price,
            Aspect::Skill => self.skill,
            Aspect::Kindness => self.kindness,
            Aspect::WaitingTime => self.waiting_time,
            Aspect::Facility => self.facility,
            Aspect::Overtreatment => self.overtreatment,
        }
    }

    pub fn set(&mut self, aspect: Aspect, value: f64) {
        match aspect {
            Aspect::Price => self.price = value,
            Aspect::Skill => self.skill = value,
            Aspect::Kindness => self.kindness = value,
            Aspect::WaitingTime => self.waiting_time = value,
            Aspect::Facility => self.facility = value,
            Aspect::Overtreatment => self.overtreatment = value,
        }
    }

    /// Unweighted mean over the six aspects.
    pub fn overall(&self) -> f64 {
        Aspect::ALL.iter().map(|&a| self.get(a)).sum::<f64>() / Aspect::ALL.len() as f64
    }
}

/// A lexicon surface that matched in the text, with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedKeyword {
    pub surface: String,
    pub count: u32,
}

/// The full sentiment analysis of one review text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewAnalysis {
    /// Set by the orchestrator when analysing a stored review; `None` for
    /// ad-hoc text analysis.
    pub review_id: Option<Uuid>,
    pub lexicon_version: String,
    pub scores: AspectScores,
    /// In [0, 1); exactly 0.0 when no surface matched anywhere.
    pub confidence: f64,
    /// Matched surfaces per aspect, ordered by count descending, then lexicon
    /// order. Aspects with no matches are absent.
    pub matched_keywords: BTreeMap<Aspect, Vec<MatchedKeyword>>,
}

// -----------------------------------------------------------------------------
// Scoring
// -----------------------------------------------------------------------------

/// Score one review text against `lexicon`.
///
/// Per aspect: `score = clamp(Σ polarity·weight·count / max(Σ weight·count, 1), -1, 1)`.
/// Confidence saturates with total matched mass: `1 - exp(-mass / tau)`.
pub fn analyze_review(text: &str, lexicon: &Lexicon, tau: f64) -> ReviewAnalysis {
    let normalized = tokenize::normalize(text);

    let mut scores = AspectScores::default();
    let mut matched_keywords = BTreeMap::new();
    let mut total_mass = 0.0_f64;

    for aspect in Aspect::ALL {
        let entries = lexicon.entries_for(aspect);
        let counts = tokenize::count_matches(&normalized, entries);

        let mut signed = 0.0_f64;
        let mut mass = 0.0_f64;
        let mut hits: Vec<(usize, MatchedKeyword)> = Vec::new();
        for (i, (entry, &count)) in entries.iter().zip(&counts).enumerate() {
            if count == 0 {
                continue;
            }
            let weighted = entry.weight * f64::from(count);
            signed += f64::from(entry.polarity) * weighted;
            mass += weighted;
            hits.push((
                i,
                MatchedKeyword {
                    surface: entry.surface.clone(),
                    count,
                },
            ));
        }

        if mass > 0.0 {
            let score = (signed / mass.max(1.0)).clamp(-1.0, 1.0);
            scores.set(aspect, score);
            total_mass += mass;
            hits.sort_by(|(ia, a), (ib, b)| b.count.cmp(&a.count).then(ia.cmp(ib)));
            matched_keywords.insert(aspect, hits.into_iter().map(|(_, k)| k).collect());
        }
    }

    let confidence = if total_mass > 0.0 {
        1.0 - (-total_mass / tau).exp()
    } else {
        0.0
    };

    ReviewAnalysis {
        review_id: None,
        lexicon_version: lexicon.version.clone(),
        scores,
        confidence,
        matched_keywords,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> Lexicon {
        Lexicon::builtin("builtin-ko-1")
    }

    /// Single positive keyword per aspect, mass below the damping floor.
    #[test]
    fn short_positive_review() {
        let analysis = analyze_review("친절하고 시설이 깨끗해요", &lexicon(), 4.0);
        // 친절 (0.8): 0.8 / max(0.8, 1) = 0.8
        assert!((analysis.scores.kindness - 0.8).abs() < 1e-9);
        // 깨끗 (0.7): 0.7 / max(0.7, 1) = 0.7
        assert!((analysis.scores.facility - 0.7).abs() < 1e-9);
        assert_eq!(analysis.scores.price, 0.0);
        assert_eq!(analysis.scores.skill, 0.0);
        // mass 1.5 -> 1 - exp(-1.5/4) ≈ 0.3127
        assert!((analysis.confidence - 0.312_711).abs() < 1e-4);

        let kindness = &analysis.matched_keywords[&Aspect::Kindness];
        assert_eq!(kindness.len(), 1);
        assert_eq!(kindness[0].surface, "친절");
        let facility = &analysis.matched_keywords[&Aspect::Facility];
        assert_eq!(facility.len(), 1);
        assert_eq!(facility[0].surface, "깨끗");
    }

    /// Mixed review hits three aspects with the expected signs.
    #[test]
    fn mixed_review() {
        let analysis = analyze_review("실력은 좋은데 너무 비싸고 과잉진료 같아요", &lexicon(), 4.0);
        assert!((analysis.scores.skill - 0.7).abs() < 1e-9);
        assert!((analysis.scores.price + 0.6).abs() < 1e-9);
        // 과잉진료 matches the long surface, not 과잉
        assert!((analysis.scores.overtreatment + 0.9).abs() < 1e-9);
        let keywords = &analysis.matched_keywords[&Aspect::Overtreatment];
        assert_eq!(keywords.len(), 1);
        assert_eq!(keywords[0].surface, "과잉진료");
    }

    #[test]
    fn empty_text_is_all_zero() {
        let analysis = analyze_review("", &lexicon(), 4.0);
        assert_eq!(analysis.scores, AspectScores::default());
        assert_eq!(analysis.confidence, 0.0);
        assert!(analysis.matched_keywords.is_empty());
    }

    #[test]
    fn no_hits_means_confidence_exactly_zero() {
        let analysis = analyze_review("오늘 날씨가 맑다", &lexicon(), 4.0);
        assert_eq!(analysis.confidence, 0.0);
    }

    #[test]
    fn any_hit_means_confidence_positive() {
        let analysis = analyze_review("대기", &lexicon(), 4.0);
        assert!(analysis.confidence > 0.0);
    }

    #[test]
    fn scores_stay_in_bounds() {
        let text = "바가지 바가지 바가지 바가지 비싸 비싸 과도";
        let analysis = analyze_review(text, &lexicon(), 4.0);
        assert!(analysis.scores.price >= -1.0);
        assert!((analysis.scores.price + 1.0).abs() < 1e-9);
    }

    #[test]
    fn repeated_keyword_counts_accumulate() {
        let analysis = analyze_review("친절 친절 친절", &lexicon(), 4.0);
        let keywords = &analysis.matched_keywords[&Aspect::Kindness];
        assert_eq!(keywords[0].count, 3);
        // mass 2.4 dominates mass 0.8
        let single = analyze_review("친절", &lexicon(), 4.0);
        assert!(analysis.confidence > single.confidence);
    }

    #[test]
    fn overall_is_mean_of_six() {
        let mut scores = AspectScores::default();
        scores.set(Aspect::Price, 0.6);
        scores.set(Aspect::Skill, -0.6);
        assert!((scores.overall() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn deterministic_across_runs() {
        let a = analyze_review("친절하고 깨끗한데 비싸요", &lexicon(), 4.0);
        let b = analyze_review("친절하고 깨끗한데 비싸요", &lexicon(), 4.0);
        assert_eq!(a.scores, b.scores);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.matched_keywords, b.matched_keywords);
    }
}
