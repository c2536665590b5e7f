//! Analytical core for a dental-clinic recommendation service.
//!
//! Four engines behind one facade:
//! - aspect-based sentiment scoring of Korean review text against a
//!   versioned lexicon ([`sentiment`], [`lexicon`]),
//! - clinic and district aggregation of processed reviews ([`aggregate`]),
//! - regional price statistics with a robust MAD outlier filter ([`pricing`]),
//! - geo queries over an in-memory clinic snapshot ([`geo`]).
//!
//! The core is pure and synchronous: no I/O, no clocks, no persistence.
//! Hosts pass in snapshots and an `as_of` timestamp and own storage and
//! transport. Long scans take a [`cancel::CancelToken`].

pub mod aggregate;
pub mod cancel;
pub mod config;
pub mod error;
pub mod geo;
pub mod lexicon;
pub mod models;
pub mod orchestrator;
pub mod pricing;
pub mod sentiment;

pub use aggregate::{ClinicSummary, DistrictSummary, ProcessedReview, SummaryMetrics};
pub use cancel::CancelToken;
pub use config::{AnalysisConfig, ScoreWeights};
pub use error::AnalysisError;
pub use geo::{ClinicDistance, ClinicSnapshot, Coordinates};
pub use lexicon::{Lexicon, LexiconStore};
pub use models::{Aspect, Clinic, PriceObservation, Review, ReviewSource, Treatment};
pub use orchestrator::AnalysisCore;
pub use pricing::{PriceStatsReport, RegionalPriceStats};
pub use sentiment::{AspectScores, MatchedKeyword, ReviewAnalysis};
