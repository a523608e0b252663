//! # Sentiment Scorer
//! Signed polarity of a text against a positive and a negative index.
//!
//! Per token `w` with `p = positive[w]`, `n = negative[w]`:
//! - `p + n == 0` → `0.0` (out-of-vocabulary words are neutral, not skipped)
//! - otherwise    → `(p - n) / (p + n)`, always in `[-1, 1]`
//!
//! The score is the mean over *all* tokens, repeats included. Text with no
//! tokens has no mean and is rejected with [`SentimentError::InvalidInput`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SentimentError};
use crate::index::{IndexPair, WordFrequencyIndex};
use crate::normalize::normalize;

/// Binary label derived from a score. Zero maps to `Negative`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn from_score(score: f64) -> Self {
        if score > 0.0 {
            Polarity::Positive
        } else {
            Polarity::Negative
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Positive => f.write_str("positive"),
            Polarity::Negative => f.write_str("negative"),
        }
    }
}

/// One token's share of the score, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordContribution {
    pub word: String,
    pub positive: u64,
    pub negative: u64,
    pub contribution: f64,
}

/// Score plus the per-word trace that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub score: f64,
    pub polarity: Polarity,
    pub tokens: usize,
    pub trace: Vec<WordContribution>,
}

/// Borrowing scorer over two finished indices.
#[derive(Debug, Clone, Copy)]
pub struct SentimentScorer<'a> {
    positive: &'a WordFrequencyIndex,
    negative: &'a WordFrequencyIndex,
}

impl<'a> SentimentScorer<'a> {
    pub fn new(positive: &'a WordFrequencyIndex, negative: &'a WordFrequencyIndex) -> Self {
        Self { positive, negative }
    }

    pub fn from_pair(pair: &'a IndexPair) -> Self {
        Self::new(&pair.positive, &pair.negative)
    }

    #[inline]
    fn word_score(&self, w: &str) -> (u64, u64, f64) {
        let p = self.positive.count(w);
        let n = self.negative.count(w);
        (p, n, word_polarity(p, n))
    }

    /// Mean per-token contribution of `text`.
    pub fn score(&self, text: &str) -> Result<f64> {
        let tokens = normalize(text);
        if tokens.is_empty() {
            return Err(SentimentError::InvalidInput);
        }
        let sum: f64 = tokens.iter().map(|w| self.word_score(w).2).sum();
        Ok(sum / tokens.len() as f64)
    }

    /// Like [`score`](Self::score), keeping every token's contribution.
    pub fn score_with_trace(&self, text: &str) -> Result<ScoreReport> {
        let tokens = normalize(text);
        if tokens.is_empty() {
            return Err(SentimentError::InvalidInput);
        }

        let trace: Vec<WordContribution> = tokens
            .into_iter()
            .map(|word| {
                let (positive, negative, contribution) = self.word_score(&word);
                WordContribution {
                    word,
                    positive,
                    negative,
                    contribution,
                }
            })
            .collect();

        let sum: f64 = trace.iter().map(|c| c.contribution).sum();
        let score = sum / trace.len() as f64;
        Ok(ScoreReport {
            score,
            polarity: Polarity::from_score(score),
            tokens: trace.len(),
            trace,
        })
    }
}

/// `(p - n) / (p + n)`, or `0.0` when the word is in neither index.
pub fn word_polarity(positive: u64, negative: u64) -> f64 {
    let all = positive + negative;
    if all == 0 {
        0.0
    } else {
        (positive as f64 - negative as f64) / all as f64
    }
}

/// Score `text` against two indices.
pub fn score(
    text: &str,
    positive: &WordFrequencyIndex,
    negative: &WordFrequencyIndex,
) -> Result<f64> {
    SentimentScorer::new(positive, negative).score(text)
}

/// Score `text` and return the per-word trace alongside.
pub fn score_with_trace(
    text: &str,
    positive: &WordFrequencyIndex,
    negative: &WordFrequencyIndex,
) -> Result<ScoreReport> {
    SentimentScorer::new(positive, negative).score_with_trace(text)
}

impl IndexPair {
    pub fn score(&self, text: &str) -> Result<f64> {
        SentimentScorer::from_pair(self).score(text)
    }

    pub fn score_with_trace(&self, text: &str) -> Result<ScoreReport> {
        SentimentScorer::from_pair(self).score_with_trace(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::build_index;

    fn pair() -> IndexPair {
        IndexPair::new(
            build_index(["good great", "good movie"]),
            build_index(["bad movie", "bad terrible"]),
        )
    }

    #[test]
    fn word_polarity_bounds() {
        assert_eq!(word_polarity(0, 0), 0.0);
        assert_eq!(word_polarity(3, 0), 1.0);
        assert_eq!(word_polarity(0, 7), -1.0);
        assert_eq!(word_polarity(1, 1), 0.0);
        assert!((word_polarity(3, 1) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn repeated_words_count_repeatedly() {
        let p = pair();
        // good=1.0, good=1.0, bad=-1.0 → 1/3
        let s = p.score("good good bad").unwrap();
        assert!((s - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn oov_tokens_dilute_the_mean() {
        let p = pair();
        let s = p.score("good xyzzy").unwrap();
        assert!((s - 0.5).abs() < 1e-12);
    }

    #[test]
    fn punctuation_only_is_invalid() {
        assert_eq!(pair().score("?!"), Err(SentimentError::InvalidInput));
        assert_eq!(
            pair().score_with_trace("<br />"),
            Err(SentimentError::InvalidInput)
        );
    }

    #[test]
    fn trace_matches_score() {
        let p = pair();
        let r = p.score_with_trace("Bad, terrible movie").unwrap();
        assert_eq!(r.tokens, 3);
        assert_eq!(r.trace[0].word, "bad");
        assert_eq!(r.trace[0].negative, 2);
        assert_eq!(r.trace[2].contribution, 0.0);
        assert_eq!(r.score, p.score("Bad, terrible movie").unwrap());
        assert_eq!(r.polarity, Polarity::Negative);
    }

    #[test]
    fn zero_is_negative() {
        assert_eq!(Polarity::from_score(0.0), Polarity::Negative);
        assert_eq!(Polarity::from_score(-0.0), Polarity::Negative);
        assert_eq!(Polarity::from_score(1e-9), Polarity::Positive);
    }
}
