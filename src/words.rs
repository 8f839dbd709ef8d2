/// Chinese → English word pairs used as round prompts.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::WordBankError;

/// Options shown per round: one correct translation plus two distractors.
pub const OPTIONS_PER_ROUND: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPair {
    pub chinese: String,
    pub english: String,
}

impl WordPair {
    pub fn new(chinese: &str, english: &str) -> Self {
        Self {
            chinese: chinese.to_string(),
            english: english.to_string(),
        }
    }
}

const BUILTIN_PAIRS: &[(&str, &str)] = &[
    ("蘋果", "apple"),
    ("香蕉", "banana"),
    ("櫻桃", "cherry"),
    ("葡萄", "grape"),
    ("交通", "transport"),
    ("訊息", "message"),
    ("最快的", "fastest"),
    ("歐洲", "Europe"),
    ("之間", "between"),
    ("國家", "country"),
];

/// A validated, read-only list of word pairs.
///
/// Always holds at least `OPTIONS_PER_ROUND` distinct English words, so a
/// round can draw its distractors without running dry.
#[derive(Clone, Debug)]
pub struct WordBank {
    pairs: Vec<WordPair>,
}

impl WordBank {
    pub fn new(pairs: Vec<WordPair>) -> Result<Self, WordBankError> {
        if let Some(index) = pairs
            .iter()
            .position(|p| p.chinese.trim().is_empty() || p.english.trim().is_empty())
        {
            return Err(WordBankError::EmptyField { index });
        }

        let mut distinct: Vec<&str> = pairs.iter().map(|p| p.english.as_str()).collect();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() < OPTIONS_PER_ROUND {
            return Err(WordBankError::TooFewWords {
                distinct: distinct.len(),
                needed: OPTIONS_PER_ROUND,
            });
        }

        Ok(Self { pairs })
    }

    pub fn builtin() -> Self {
        Self {
            pairs: BUILTIN_PAIRS
                .iter()
                .map(|(zh, en)| WordPair::new(zh, en))
                .collect(),
        }
    }

    /// Parse a JSON array of `{"chinese": .., "english": ..}` objects.
    pub fn from_json_str(json: &str) -> Result<Self, WordBankError> {
        let pairs: Vec<WordPair> = serde_json::from_str(json)?;
        Self::new(pairs)
    }

    pub fn load(path: &Path) -> Result<Self, WordBankError> {
        let json = std::fs::read_to_string(path).map_err(|source| WordBankError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let bank = Self::from_json_str(&json)?;
        log::info!("loaded {} word pairs from {}", bank.len(), path.display());
        Ok(bank)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pair for a round; round indices wrap around the bank.
    pub fn pair(&self, round_index: usize) -> &WordPair {
        &self.pairs[round_index % self.pairs.len()]
    }

    /// Every English term other than `correct`, without duplicates, in
    /// bank order.
    pub fn distinct_english_except(&self, correct: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for pair in &self.pairs {
            let word = pair.english.as_str();
            if word != correct && !out.contains(&word) {
                out.push(word);
            }
        }
        out
    }
}
