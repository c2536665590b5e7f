//! Regional price statistics with a robust MAD outlier filter. Stats are
//! kept per (district, treatment) over qualifying observations: verified and
//! not flagged as outliers.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cancel::CancelToken;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::models::{PriceObservation, Treatment};

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// Price distribution of one (district, treatment) pair over its qualifying
/// observations. Absent entirely when no observation qualifies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalPriceStats {
    pub district: String,
    pub treatment: Treatment,
    pub min_price: u32,
    pub max_price: u32,
    pub mean_price: f64,
    pub median_price: u32,
    pub sample_count: usize,
    pub last_updated: DateTime<FixedOffset>,
}

/// Result of one full recompute: stats per pair plus the ids of every
/// observation now carrying the outlier flag. In-memory result shape; hosts
/// persist the individual [`RegionalPriceStats`] records.
#[derive(Debug, Clone)]
pub struct PriceStatsReport {
    pub stats: BTreeMap<(String, Treatment), RegionalPriceStats>,
    pub outlier_ids: BTreeSet<Uuid>,
}

// -----------------------------------------------------------------------------
// Recompute
// -----------------------------------------------------------------------------

/// Recompute stats for every (district, treatment) pair in `observations`.
///
/// Outlier flags are sticky: an observation arriving with `outlier = true`
/// stays flagged regardless of the fresh band. Revalidation is the host
/// re-ingesting the observation with the flag cleared. Re-running on the same
/// input yields an identical report.
pub fn recompute_regional_stats(
    observations: &[PriceObservation],
    as_of: DateTime<FixedOffset>,
    config: &AnalysisConfig,
    cancel: &CancelToken,
) -> Result<PriceStatsReport, AnalysisError> {
    // carried flags are sticky for every observation, verified or not; the
    // band detection below only ever adds to this set
    let mut outlier_ids = BTreeSet::new();
    for obs in observations {
        cancel.check()?;
        obs.validate()?;
        if obs.outlier {
            outlier_ids.insert(obs.id);
        }
    }

    let mut groups: BTreeMap<(String, Treatment), Vec<&PriceObservation>> = BTreeMap::new();
    for obs in observations.iter().filter(|o| o.verified) {
        groups
            .entry((obs.district.clone(), obs.treatment))
            .or_default()
            .push(obs);
    }

    let mut stats = BTreeMap::new();

    for ((district, treatment), group) in groups {
        cancel.check()?;

        let mut prices: Vec<u32> = group.iter().map(|o| o.price).collect();
        prices.sort_unstable();
        let m = lower_median(&prices);

        let mut deviations: Vec<u32> = prices.iter().map(|&p| p.abs_diff(m)).collect();
        deviations.sort_unstable();
        let mad = lower_median(&deviations);

        let band = if mad > 0 {
            config.price_mad_k * f64::from(mad)
        } else {
            config.price_zero_mad_band * f64::from(m)
        };

        let mut qualifying: Vec<u32> = Vec::with_capacity(group.len());
        for obs in &group {
            let flagged = obs.outlier || f64::from(obs.price.abs_diff(m)) > band;
            if flagged {
                outlier_ids.insert(obs.id);
            } else {
                qualifying.push(obs.price);
            }
        }
        if qualifying.is_empty() {
            continue;
        }
        qualifying.sort_unstable();

        let min_price = qualifying[0];
        let max_price = qualifying[qualifying.len() - 1];
        let total: u64 = qualifying.iter().map(|&p| u64::from(p)).sum();
        let mean_price = total as f64 / qualifying.len() as f64;
        let median_price = lower_median(&qualifying);

        if !(min_price <= median_price && median_price <= max_price) {
            return Err(AnalysisError::Inconsistent(format!(
                "median {median_price} outside [{min_price}, {max_price}] for {district}"
            )));
        }
        if mean_price < f64::from(min_price) || mean_price > f64::from(max_price) {
            return Err(AnalysisError::Inconsistent(format!(
                "mean {mean_price} outside [{min_price}, {max_price}] for {district}"
            )));
        }

        stats.insert(
            (district.clone(), treatment),
            RegionalPriceStats {
                district,
                treatment,
                min_price,
                max_price,
                mean_price,
                median_price,
                sample_count: qualifying.len(),
                last_updated: as_of,
            },
        );
    }

    Ok(PriceStatsReport { stats, outlier_ids })
}

/// Lower of the two middle values for even lengths. Callers guarantee the
/// slice is sorted and non-empty.
fn lower_median(sorted: &[u32]) -> u32 {
    sorted[(sorted.len() - 1) / 2]
}
