use thiserror::Error;

/// Error taxonomy of the analytical core.
///
/// "No data" situations are not errors: the aggregator returns a sentinel
/// summary and the price engine omits the stats record. The core never logs
/// and never swallows; the host translates these into its transport shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Malformed input at the boundary: out-of-range coordinates, zero price,
    /// unknown aspect, missing required field. Never retried.
    #[error("invalid {field}: {value}")]
    InvalidInput { field: String, value: String },

    /// Cooperative cancel observed during a long scan. No partial effects.
    #[error("operation cancelled")]
    Cancelled,

    /// No lexicon installed. Fatal to the analyzer; install one before the
    /// first analysis.
    #[error("no lexicon installed")]
    LexiconMissing,

    /// Contract violation detected at runtime. Indicates a bug in the core,
    /// not a user error.
    #[error("internal consistency violation: {0}")]
    Inconsistent(String),

    /// A poisoned internal lock (panic on another thread).
    #[error("internal lock failed")]
    LockFailed,
}
