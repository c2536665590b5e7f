//! Aspect sentiment lexicon: surfaces with polarity and weight, keyed by
//! aspect. Entry order within an aspect is significant; it is the tie-break
//! for top-keyword reporting.

pub mod store;
pub mod tokenize;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::models::Aspect;

pub use store::LexiconStore;

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// One lexicon surface form. `polarity` is +1 or -1; `weight` is in (0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub surface: String,
    pub polarity: i8,
    pub weight: f64,
}

impl LexiconEntry {
    pub fn new(surface: &str, polarity: i8, weight: f64) -> Self {
        Self {
            surface: surface.to_string(),
            polarity,
            weight,
        }
    }

    fn validate(&self) -> Result<(), AnalysisError> {
        if self.surface.trim().is_empty() {
            return Err(AnalysisError::InvalidInput {
                field: "surface".into(),
                value: self.surface.clone(),
            });
        }
        if self.polarity != 1 && self.polarity != -1 {
            return Err(AnalysisError::InvalidInput {
                field: "polarity".into(),
                value: self.polarity.to_string(),
            });
        }
        if !(self.weight > 0.0 && self.weight <= 1.0) {
            return Err(AnalysisError::InvalidInput {
                field: "weight".into(),
                value: self.weight.to_string(),
            });
        }
        Ok(())
    }
}

/// A versioned, validated lexicon. Immutable once constructed; swapping
/// versions goes through [`LexiconStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lexicon {
    pub version: String,
    pub entries: BTreeMap<Aspect, Vec<LexiconEntry>>,
}

impl Lexicon {
    pub fn new(
        version: String,
        entries: BTreeMap<Aspect, Vec<LexiconEntry>>,
    ) -> Result<Self, AnalysisError> {
        if version.trim().is_empty() {
            return Err(AnalysisError::InvalidInput {
                field: "version".into(),
                value: version,
            });
        }
        for list in entries.values() {
            for entry in list {
                entry.validate()?;
            }
        }
        Ok(Self { version, entries })
    }

    /// Parse and validate a lexicon from its JSON wire form.
    pub fn from_json(raw: &str) -> Result<Self, AnalysisError> {
        let parsed: Lexicon = serde_json::from_str(raw).map_err(|e| {
            AnalysisError::InvalidInput {
                field: "lexicon".into(),
                value: e.to_string(),
            }
        })?;
        Self::new(parsed.version, parsed.entries)
    }

    pub fn entries_for(&self, aspect: Aspect) -> &[LexiconEntry] {
        self.entries.get(&aspect).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The built-in Korean dental-review lexicon.
    pub fn builtin(version: &str) -> Self {
        let mut entries: BTreeMap<Aspect, Vec<LexiconEntry>> = BTreeMap::new();
        entries.insert(
            Aspect::Price,
            vec![
                LexiconEntry::new("저렴", 1, 0.6),
                LexiconEntry::new("합리적", 1, 0.7),
                LexiconEntry::new("가성비", 1, 0.7),
                LexiconEntry::new("적당", 1, 0.5),
                LexiconEntry::new("괜찮", 1, 0.5),
                LexiconEntry::new("비싸", -1, 0.6),
                LexiconEntry::new("바가지", -1, 0.8),
                LexiconEntry::new("부담", -1, 0.6),
                LexiconEntry::new("과도", -1, 0.7),
            ],
        );
        entries.insert(
            Aspect::Skill,
            vec![
                LexiconEntry::new("실력", 1, 0.7),
                LexiconEntry::new("꼼꼼", 1, 0.7),
                LexiconEntry::new("정확", 1, 0.7),
                LexiconEntry::new("전문", 1, 0.8),
                LexiconEntry::new("능숙", 1, 0.7),
                LexiconEntry::new("훌륭", 1, 0.9),
                LexiconEntry::new("서툴", -1, 0.7),
                LexiconEntry::new("실수", -1, 0.7),
                LexiconEntry::new("미숙", -1, 0.7),
                LexiconEntry::new("대충", -1, 0.7),
            ],
        );
        entries.insert(
            Aspect::Kindness,
            vec![
                LexiconEntry::new("친절", 1, 0.8),
                LexiconEntry::new("상냥", 1, 0.7),
                LexiconEntry::new("따뜻", 1, 0.7),
                LexiconEntry::new("배려", 1, 0.7),
                LexiconEntry::new("정성", 1, 0.8),
                LexiconEntry::new("세심", 1, 0.7),
                LexiconEntry::new("불친절", -1, 0.8),
                LexiconEntry::new("차갑", -1, 0.7),
                LexiconEntry::new("무뚝뚝", -1, 0.7),
                LexiconEntry::new("무례", -1, 0.8),
            ],
        );
        entries.insert(
            Aspect::WaitingTime,
            vec![
                LexiconEntry::new("빨리", 1, 0.6),
                LexiconEntry::new("신속", 1, 0.6),
                LexiconEntry::new("바로", 1, 0.5),
                LexiconEntry::new("대기없이", 1, 0.8),
                LexiconEntry::new("대기", -1, 0.6),
                LexiconEntry::new("기다림", -1, 0.6),
                LexiconEntry::new("지연", -1, 0.6),
                LexiconEntry::new("늦", -1, 0.5),
            ],
        );
        entries.insert(
            Aspect::Facility,
            vec![
                LexiconEntry::new("깨끗", 1, 0.7),
                LexiconEntry::new("쾌적", 1, 0.7),
                LexiconEntry::new("현대적", 1, 0.7),
                LexiconEntry::new("최신", 1, 0.7),
                LexiconEntry::new("넓", 1, 0.5),
                LexiconEntry::new("더럽", -1, 0.7),
                LexiconEntry::new("낡", -1, 0.6),
                LexiconEntry::new("좁", -1, 0.5),
                LexiconEntry::new("지저분", -1, 0.7),
            ],
        );
        entries.insert(
            Aspect::Overtreatment,
            vec![
                LexiconEntry::new("적절", 1, 0.6),
                LexiconEntry::new("정직", 1, 0.8),
                LexiconEntry::new("양심적", 1, 0.8),
                LexiconEntry::new("필요한것만", 1, 0.9),
                LexiconEntry::new("과잉진료", -1, 0.9),
                LexiconEntry::new("과잉", -1, 0.7),
                LexiconEntry::new("불필요", -1, 0.7),
                LexiconEntry::new("강요", -1, 0.8),
            ],
        );
        Self {
            version: version.to_string(),
            entries,
        }
    }
}
