// src/corpus.rs
//! Corpus sources: where the raw document texts of one label come from.

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Anything that can hand the trainer the raw texts of one labeled corpus.
pub trait CorpusSource: Send + Sync {
    fn documents(&self) -> Result<Vec<String>>;
    fn describe(&self) -> String;
}

/// One document per file inside a directory (e.g. `aclImdb/train/pos/*.txt`).
#[derive(Debug, Clone)]
pub struct DirectoryCorpus {
    dir: PathBuf,
    /// Lower-case extension without the dot; empty accepts every file.
    extension: String,
}

impl DirectoryCorpus {
    pub fn new(dir: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.trim_start_matches('.').to_ascii_lowercase(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Matching files, sorted by path.
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.is_dir() {
            return Err(anyhow!("corpus directory {} does not exist", self.dir.display()));
        }
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("listing corpus directory {}", self.dir.display()))?;

        let mut files = Vec::new();
        for e in entries {
            let path = e
                .with_context(|| format!("reading entry in {}", self.dir.display()))?
                .path();
            if path.is_file() && self.matches(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn matches(&self, path: &Path) -> bool {
        if self.extension.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }
}

impl CorpusSource for DirectoryCorpus {
    fn documents(&self) -> Result<Vec<String>> {
        let files = self.files()?;
        let mut docs = Vec::with_capacity(files.len());
        for path in files {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("reading document {}", path.display()))?;
            docs.push(text);
        }
        Ok(docs)
    }

    fn describe(&self) -> String {
        if self.extension.is_empty() {
            format!("{}/*", self.dir.display())
        } else {
            format!("{}/*.{}", self.dir.display(), self.extension)
        }
    }
}

/// Fixed in-memory corpus; handy for tests and for callers that already hold texts.
#[derive(Debug, Clone, Default)]
pub struct MemoryCorpus {
    docs: Vec<String>,
}

impl MemoryCorpus {
    pub fn new<I, S>(docs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            docs: docs.into_iter().map(Into::into).collect(),
        }
    }
}

impl CorpusSource for MemoryCorpus {
    fn documents(&self) -> Result<Vec<String>> {
        Ok(self.docs.clone())
    }

    fn describe(&self) -> String {
        format!("memory ({} docs)", self.docs.len())
    }
}
