//! # Training
//! Builds the positive and negative indices from their corpora.
//!
//! The two passes share nothing, so they run side by side on the blocking
//! pool and are joined before anything is persisted.

use anyhow::{Context, Result};
use metrics::{counter, gauge};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::config::AppConfig;
use crate::corpus::CorpusSource;
use crate::index::{build_index, IndexPair, Label, WordFrequencyIndex};
use crate::metrics::{TRAINING_DOCUMENTS_TOTAL, VOCABULARY_SIZE};
use crate::store::IndexStore;

/// Result of one label's pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelOutcome {
    pub label: Label,
    pub documents: u64,
    pub index: WordFrequencyIndex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingOutcome {
    pub positive: LabelOutcome,
    pub negative: LabelOutcome,
}

impl TrainingOutcome {
    pub fn into_pair(self) -> IndexPair {
        IndexPair::new(self.positive.index, self.negative.index)
    }
}

/// Load and index one corpus. Blocking.
pub fn train_label(label: Label, source: &dyn CorpusSource) -> Result<LabelOutcome> {
    let started = Instant::now();
    info!(target: "train", %label, source = %source.describe(), "training started");

    let docs = source
        .documents()
        .with_context(|| format!("loading {label} corpus from {}", source.describe()))?;
    let documents = docs.len() as u64;
    let index = build_index(&docs);

    counter!(TRAINING_DOCUMENTS_TOTAL, "label" => label.as_str()).increment(documents);
    gauge!(VOCABULARY_SIZE, "label" => label.as_str()).set(index.len() as f64);
    info!(
        target: "train",
        %label,
        documents,
        vocabulary = index.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "training finished"
    );

    Ok(LabelOutcome {
        label,
        documents,
        index,
    })
}

/// Train both labels concurrently.
pub async fn train(
    positive: Arc<dyn CorpusSource>,
    negative: Arc<dyn CorpusSource>,
) -> Result<TrainingOutcome> {
    let pos = tokio::task::spawn_blocking(move || train_label(Label::Positive, positive.as_ref()));
    let neg = tokio::task::spawn_blocking(move || train_label(Label::Negative, negative.as_ref()));

    let (pos, neg) = tokio::join!(pos, neg);
    let positive = pos.context("positive training task panicked")??;
    let negative = neg.context("negative training task panicked")??;

    Ok(TrainingOutcome { positive, negative })
}

/// Persist both indices as one replacement. Returns the written paths.
pub fn persist(store: &IndexStore, outcome: &TrainingOutcome) -> Result<Vec<PathBuf>> {
    let [p, n] = [&outcome.positive, &outcome.negative];
    store.save_pair([
        (p.label, &p.index, p.documents),
        (n.label, &n.index, n.documents),
    ])
}

/// Full run from configuration: load both directories, index, save.
pub async fn train_and_persist(cfg: &AppConfig) -> Result<TrainingOutcome> {
    let positive: Arc<dyn CorpusSource> = Arc::new(cfg.corpus_for(Label::Positive));
    let negative: Arc<dyn CorpusSource> = Arc::new(cfg.corpus_for(Label::Negative));

    let outcome = train(positive, negative).await?;
    let written = persist(&cfg.store(), &outcome)?;
    info!(target: "train", files = ?written, "indices persisted");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::MemoryCorpus;

    #[tokio::test]
    async fn trains_both_labels() {
        let out = train(
            Arc::new(MemoryCorpus::new(["good great", "good movie"])),
            Arc::new(MemoryCorpus::new(["bad movie", "bad terrible", ""])),
        )
        .await
        .unwrap();

        assert_eq!(out.positive.label, Label::Positive);
        assert_eq!(out.positive.documents, 2);
        assert_eq!(out.negative.documents, 3);
        assert_eq!(out.positive.index.count("good"), 2);
        assert_eq!(out.negative.index.count("bad"), 2);
    }

    #[test]
    fn persist_writes_both_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IndexStore::new(tmp.path());
        let out = TrainingOutcome {
            positive: train_label(Label::Positive, &MemoryCorpus::new(["fine"])).unwrap(),
            negative: train_label(Label::Negative, &MemoryCorpus::new(["awful"])).unwrap(),
        };
        let paths = persist(&store, &out).unwrap();
        assert_eq!(paths.len(), 2);
        let pair = store.load_pair().unwrap();
        assert_eq!(pair, out.into_pair());
    }

    #[test]
    fn persist_failure_leaves_old_indices_in_place() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IndexStore::new(tmp.path());
        let old = TrainingOutcome {
            positive: train_label(Label::Positive, &MemoryCorpus::new(["fine"])).unwrap(),
            negative: train_label(Label::Negative, &MemoryCorpus::new(["awful"])).unwrap(),
        };
        persist(&store, &old).unwrap();

        let blocker = store.path_for(Label::Negative).with_extension("json.tmp");
        std::fs::create_dir_all(blocker.join("occupied")).unwrap();

        let new = TrainingOutcome {
            positive: train_label(Label::Positive, &MemoryCorpus::new(["splendid"])).unwrap(),
            negative: train_label(Label::Negative, &MemoryCorpus::new(["dreadful"])).unwrap(),
        };
        assert!(persist(&store, &new).is_err());

        let pair = store.load_pair().unwrap();
        assert_eq!(pair.positive.count("splendid"), 0);
        assert_eq!(pair.negative.count("dreadful"), 0);
        assert_eq!(pair, old.into_pair());
    }
}
