use std::sync::{Arc, RwLock};

use tracing::info;

use super::Lexicon;
use crate::error::AnalysisError;

/// Holds the currently installed lexicon behind a lock. Installing a new
/// version swaps atomically; analyses already holding an `Arc` finish under
/// the version they started with.
#[derive(Debug, Default)]
pub struct LexiconStore {
    current: RwLock<Option<Arc<Lexicon>>>,
}

impl LexiconStore {
    /// A store with no lexicon. Analyses fail with `LexiconMissing` until one
    /// is installed.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(lexicon: Lexicon) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(lexicon))),
        }
    }

    pub fn install(&self, lexicon: Lexicon) -> Result<(), AnalysisError> {
        let mut slot = self
            .current
            .write()
            .map_err(|_| AnalysisError::LockFailed)?;
        info!(version = %lexicon.version, "installing lexicon");
        *slot = Some(Arc::new(lexicon));
        Ok(())
    }

    pub fn current(&self) -> Result<Arc<Lexicon>, AnalysisError> {
        let slot = self
            .current
            .read()
            .map_err(|_| AnalysisError::LockFailed)?;
        slot.clone().ok_or(AnalysisError::LexiconMissing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_reports_missing() {
        let store = LexiconStore::empty();
        assert_eq!(store.current().unwrap_err(), AnalysisError::LexiconMissing);
    }

    #[test]
    fn install_swaps_version() {
        let store = LexiconStore::with(Lexicon::builtin("v1"));
        let held = store.current().unwrap();
        store.install(Lexicon::builtin("v2")).unwrap();
        // the held handle keeps its version; fresh reads see the new one
        assert_eq!(held.version, "v1");
        assert_eq!(store.current().unwrap().version, "v2");
    }
}
