// src/store.rs
//! On-disk persistence of trained indices: one JSON file per label.
//!
//! Layout inside the index directory:
//! - `positive.json`
//! - `negative.json`
//!
//! Files are replaced atomically (write `*.json.tmp`, then rename), so a
//! reader never sees a half-written index. [`IndexStore::save_pair`] writes
//! both temp files before renaming either, so a failed write cannot leave a
//! new positive index next to an old negative one.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::SentimentError;
use crate::index::{IndexPair, Label, WordFrequencyIndex};

/// Persisted envelope around one index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexFile {
    pub label: Label,
    /// Number of documents the index was built from.
    pub documents: u64,
    pub trained_at: DateTime<Utc>,
    pub counts: WordFrequencyIndex,
}

#[derive(Debug, Clone)]
pub struct IndexStore {
    dir: PathBuf,
}

impl IndexStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, label: Label) -> PathBuf {
        self.dir.join(format!("{}.json", label.as_str()))
    }

    /// Write one index, replacing any previous file for the same label.
    pub fn save(&self, label: Label, index: &WordFrequencyIndex, documents: u64) -> Result<PathBuf> {
        self.stage(label, index, documents)?.commit()
    }

    /// Write both indices. Nothing is renamed into place until both temp
    /// files are on disk; a failed write leaves the previous pair untouched.
    pub fn save_pair(&self, entries: [(Label, &WordFrequencyIndex, u64); 2]) -> Result<Vec<PathBuf>> {
        let mut staged = Vec::with_capacity(entries.len());
        for (label, index, documents) in entries {
            match self.stage(label, index, documents) {
                Ok(s) => staged.push(s),
                Err(e) => {
                    staged.into_iter().for_each(StagedIndex::discard);
                    return Err(e);
                }
            }
        }

        let mut written = Vec::with_capacity(staged.len());
        let mut pending = staged.into_iter();
        while let Some(s) = pending.next() {
            match s.commit() {
                Ok(path) => written.push(path),
                Err(e) => {
                    pending.for_each(StagedIndex::discard);
                    return Err(e);
                }
            }
        }
        Ok(written)
    }

    /// Serialize `index` to `<label>.json.tmp` without touching the live file.
    pub fn stage(&self, label: Label, index: &WordFrequencyIndex, documents: u64) -> Result<StagedIndex> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating index directory {}", self.dir.display()))?;

        let file = IndexFile {
            label,
            documents,
            trained_at: Utc::now(),
            counts: index.clone(),
        };
        let body = serde_json::to_string_pretty(&file)
            .with_context(|| format!("serializing {label} index"))?;

        let path = self.path_for(label);
        let tmp = path.with_extension("json.tmp");
        if let Err(e) = fs::write(&tmp, body) {
            // A partial write may have left a file behind.
            if tmp.is_file() {
                let _ = fs::remove_file(&tmp);
            }
            return Err(anyhow::Error::new(e).context(format!("writing {}", tmp.display())));
        }
        Ok(StagedIndex {
            label,
            words: index.len(),
            tmp,
            path,
        })
    }

    /// Load the envelope for `label`.
    ///
    /// An absent file is reported as [`SentimentError::MissingIndex`] so callers
    /// can tell "never trained" apart from a corrupt file.
    pub fn load_file(&self, label: Label) -> Result<IndexFile> {
        let path = self.path_for(label);
        let raw = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(anyhow::Error::new(SentimentError::MissingIndex { label })
                    .context(format!("no index file at {}", path.display())));
            }
            Err(e) => {
                return Err(anyhow::Error::new(e).context(format!("reading {}", path.display())));
            }
        };

        let file: IndexFile = serde_json::from_str(&raw)
            .with_context(|| format!("parsing index file {}", path.display()))?;
        if file.label != label {
            return Err(anyhow!(
                "{} holds the {} index, expected {}",
                path.display(),
                file.label,
                label
            ));
        }
        Ok(file)
    }

    pub fn load(&self, label: Label) -> Result<WordFrequencyIndex> {
        Ok(self.load_file(label)?.counts)
    }

    /// Load both labels; fails if either was never trained.
    pub fn load_pair(&self) -> Result<IndexPair> {
        Ok(IndexPair::new(
            self.load(Label::Positive)?,
            self.load(Label::Negative)?,
        ))
    }
}

/// An index written to its temp file, waiting to replace the live one.
#[derive(Debug)]
pub struct StagedIndex {
    label: Label,
    words: usize,
    tmp: PathBuf,
    path: PathBuf,
}

impl StagedIndex {
    pub fn tmp_path(&self) -> &Path {
        &self.tmp
    }

    /// Rename the temp file over the live one.
    pub fn commit(self) -> Result<PathBuf> {
        if let Err(e) = fs::rename(&self.tmp, &self.path) {
            let _ = fs::remove_file(&self.tmp);
            return Err(anyhow::Error::new(e).context(format!(
                "replacing {} with {}",
                self.path.display(),
                self.tmp.display()
            )));
        }
        tracing::debug!(target: "store", label = %self.label, path = %self.path.display(), words = self.words, "index saved");
        Ok(self.path)
    }

    /// Drop the temp file; the live file is left as it was.
    pub fn discard(self) {
        if let Err(e) = fs::remove_file(&self.tmp) {
            tracing::warn!(target: "store", tmp = %self.tmp.display(), error = %e, "could not remove staged index");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::build_index;

    #[test]
    fn save_then_load_is_lossless() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IndexStore::new(tmp.path().join("idx"));
        let idx = build_index(["naïve café", "café <br /> über"]);

        let path = store.save(Label::Positive, &idx, 2).unwrap();
        assert!(path.ends_with("positive.json"));
        assert!(!path.with_extension("json.tmp").exists());

        let f = store.load_file(Label::Positive).unwrap();
        assert_eq!(f.documents, 2);
        assert_eq!(f.counts, idx);
        assert_eq!(f.counts.count("café"), 2);
    }

    #[test]
    fn missing_file_maps_to_missing_index() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IndexStore::new(tmp.path());
        let err = store.load(Label::Negative).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SentimentError>(),
            Some(&SentimentError::MissingIndex {
                label: Label::Negative
            })
        );
    }

    #[test]
    fn label_mismatch_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IndexStore::new(tmp.path());
        store.save(Label::Negative, &build_index(["bad"]), 1).unwrap();
        fs::rename(store.path_for(Label::Negative), store.path_for(Label::Positive)).unwrap();
        let err = store.load(Label::Positive).unwrap_err();
        assert!(err.to_string().contains("expected positive"));
    }

    #[test]
    fn staged_index_is_invisible_until_commit() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IndexStore::new(tmp.path());
        store.save(Label::Positive, &build_index(["old"]), 1).unwrap();

        let staged = store.stage(Label::Positive, &build_index(["new"]), 1).unwrap();
        assert!(staged.tmp_path().exists());
        assert_eq!(store.load(Label::Positive).unwrap().count("new"), 0);

        staged.commit().unwrap();
        assert_eq!(store.load(Label::Positive).unwrap().count("new"), 1);
        assert!(!store.path_for(Label::Positive).with_extension("json.tmp").exists());
    }

    #[test]
    fn failed_second_write_keeps_previous_pair() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IndexStore::new(tmp.path());
        let old_pos = build_index(["old good"]);
        let old_neg = build_index(["old bad"]);
        store
            .save_pair([(Label::Positive, &old_pos, 1), (Label::Negative, &old_neg, 1)])
            .unwrap();

        // A directory in the way makes the negative temp write fail.
        let blocker = store.path_for(Label::Negative).with_extension("json.tmp");
        fs::create_dir_all(blocker.join("occupied")).unwrap();

        let new_pos = build_index(["new good"]);
        let new_neg = build_index(["new bad"]);
        let res = store.save_pair([(Label::Positive, &new_pos, 1), (Label::Negative, &new_neg, 1)]);
        assert!(res.is_err());

        let pair = store.load_pair().unwrap();
        assert_eq!(pair.positive, old_pos);
        assert_eq!(pair.negative, old_neg);
        assert!(!store.path_for(Label::Positive).with_extension("json.tmp").exists());
        assert!(blocker.is_dir(), "a directory is never removed as a temp file");
    }

    #[test]
    fn corrupt_file_is_not_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let store = IndexStore::new(tmp.path());
        fs::write(store.path_for(Label::Positive), "{not json").unwrap();
        let err = store.load(Label::Positive).unwrap_err();
        assert!(err.downcast_ref::<SentimentError>().is_none());
    }
}
