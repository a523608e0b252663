// src/export.rs
//! CSV export of the combined vocabulary: `word,positive,negative,polarity`.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::Write;

use crate::index::IndexPair;
use crate::scorer::word_polarity;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VocabularyRow<'a> {
    pub word: &'a str,
    pub positive: u64,
    pub negative: u64,
    pub polarity: f64,
}

/// Union of both vocabularies, sorted by word.
pub fn rows(pair: &IndexPair) -> Vec<VocabularyRow<'_>> {
    let words: BTreeSet<&str> = pair
        .positive
        .iter()
        .chain(pair.negative.iter())
        .map(|(w, _)| w)
        .collect();

    words
        .into_iter()
        .map(|word| {
            let positive = pair.positive.count(word);
            let negative = pair.negative.count(word);
            VocabularyRow {
                word,
                positive,
                negative,
                polarity: word_polarity(positive, negative),
            }
        })
        .collect()
}

/// Write the vocabulary as CSV (with header). Returns the number of rows written.
pub fn write_csv<W: Write>(pair: &IndexPair, out: W) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(out);
    let rows = rows(pair);
    for row in &rows {
        wtr.serialize(row)
            .with_context(|| format!("writing CSV row for '{}'", row.word))?;
    }
    wtr.flush().context("flushing CSV output")?;
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::build_index;

    #[test]
    fn union_vocabulary_with_polarity() {
        let pair = IndexPair::new(
            build_index(["good great", "good movie"]),
            build_index(["bad movie", "bad terrible"]),
        );
        let mut buf = Vec::new();
        let n = write_csv(&pair, &mut buf).unwrap();
        assert_eq!(n, 5);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "word,positive,negative,polarity");
        assert_eq!(lines[1], "bad,0,2,-1.0");
        assert_eq!(lines[2], "good,2,0,1.0");
        assert_eq!(lines[4], "movie,1,1,0.0");
    }

    #[test]
    fn empty_pair_writes_nothing() {
        let mut buf = Vec::new();
        assert_eq!(write_csv(&IndexPair::default(), &mut buf).unwrap(), 0);
    }
}
