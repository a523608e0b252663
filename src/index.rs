//! # Word Frequency Index
//! Per-label document-frequency counts built from one corpus.
//!
//! A word's count is the number of documents whose de-duplicated token set
//! contains it; repeating a word inside one document does not raise it.
//! Absent words read as 0. Indices are immutable once built: retraining
//! produces a new value that replaces the old one.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::normalize::normalize;

/// Sentiment label of a corpus (and of the index built from it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Positive,
    Negative,
}

impl Label {
    pub const ALL: [Label; 2] = [Label::Positive, Label::Negative];

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Positive => "positive",
            Label::Negative => "negative",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// word → number of documents containing it.
///
/// Ordered map so two builds over the same corpus serialize to identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordFrequencyIndex {
    counts: BTreeMap<String, u64>,
}

impl WordFrequencyIndex {
    /// Document count for `word`; 0 when the word was never seen.
    #[inline]
    pub fn count(&self, word: &str) -> u64 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.counts.contains_key(word)
    }

    /// Vocabulary size.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// `(word, count)` pairs in word order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.counts.iter().map(|(w, c)| (w.as_str(), *c))
    }
}

impl From<BTreeMap<String, u64>> for WordFrequencyIndex {
    fn from(counts: BTreeMap<String, u64>) -> Self {
        Self { counts }
    }
}

/// Build an index from the raw texts of one labeled corpus.
///
/// Each document is normalized, reduced to its set of distinct tokens, and
/// every distinct token is counted once. Empty documents contribute nothing;
/// an empty corpus yields an empty index.
pub fn build_index<I, S>(documents: I) -> WordFrequencyIndex
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for doc in documents {
        let distinct: HashSet<String> = normalize(doc.as_ref()).into_iter().collect();
        for word in distinct {
            *counts.entry(word).or_insert(0) += 1;
        }
    }
    WordFrequencyIndex { counts }
}

/// The two indices a scoring request needs, shared read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexPair {
    pub positive: WordFrequencyIndex,
    pub negative: WordFrequencyIndex,
}

impl IndexPair {
    pub fn new(positive: WordFrequencyIndex, negative: WordFrequencyIndex) -> Self {
        Self { positive, negative }
    }

    pub fn get(&self, label: Label) -> &WordFrequencyIndex {
        match label {
            Label::Positive => &self.positive,
            Label::Negative => &self.negative,
        }
    }
}
