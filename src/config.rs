// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::corpus::DirectoryCorpus;
use crate::index::Label;
use crate::store::IndexStore;

pub const ENV_CONFIG_PATH: &str = "POLARITY_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/polarity.toml";

pub const ENV_POSITIVE_DIR: &str = "POLARITY_POSITIVE_DIR";
pub const ENV_NEGATIVE_DIR: &str = "POLARITY_NEGATIVE_DIR";
pub const ENV_INDEX_DIR: &str = "POLARITY_INDEX_DIR";
pub const ENV_ADDR: &str = "POLARITY_ADDR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusConfig {
    #[serde(default = "default_positive_dir")]
    pub positive_dir: PathBuf,
    #[serde(default = "default_negative_dir")]
    pub negative_dir: PathBuf,
    /// File extension of documents; empty string accepts every file.
    #[serde(default = "default_extension")]
    pub extension: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    #[serde(default = "default_index_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
}

fn default_positive_dir() -> PathBuf {
    PathBuf::from("data/aclImdb/train/pos")
}
fn default_negative_dir() -> PathBuf {
    PathBuf::from("data/aclImdb/train/neg")
}
fn default_extension() -> String {
    "txt".to_string()
}
fn default_index_dir() -> PathBuf {
    PathBuf::from("index")
}
fn default_addr() -> String {
    "127.0.0.1:8000".to_string()
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            positive_dir: default_positive_dir(),
            negative_dir: default_negative_dir(),
            extension: default_extension(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dir: default_index_dir(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
        }
    }
}

impl AppConfig {
    /// Load from an explicit TOML file, then apply env overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let mut cfg: AppConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.apply_env();
        Ok(cfg)
    }

    /// Load using env var + fallbacks:
    /// 1) $POLARITY_CONFIG_PATH
    /// 2) config/polarity.toml
    /// 3) built-in defaults
    ///
    /// Per-field env overrides apply in every case.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            } else {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
        }
        let fallback = PathBuf::from(DEFAULT_CONFIG_PATH);
        if fallback.exists() {
            return Self::load_from(&fallback);
        }
        let mut cfg = Self::default();
        cfg.apply_env();
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        if let Some(v) = env_nonempty(ENV_POSITIVE_DIR) {
            self.corpus.positive_dir = PathBuf::from(v);
        }
        if let Some(v) = env_nonempty(ENV_NEGATIVE_DIR) {
            self.corpus.negative_dir = PathBuf::from(v);
        }
        if let Some(v) = env_nonempty(ENV_INDEX_DIR) {
            self.index.dir = PathBuf::from(v);
        }
        if let Some(v) = env_nonempty(ENV_ADDR) {
            self.server.addr = v;
        }
    }

    pub fn corpus_for(&self, label: Label) -> DirectoryCorpus {
        let dir = match label {
            Label::Positive => &self.corpus.positive_dir,
            Label::Negative => &self.corpus.negative_dir,
        };
        DirectoryCorpus::new(dir.clone(), &self.corpus.extension)
    }

    pub fn store(&self) -> IndexStore {
        IndexStore::new(self.index.dir.clone())
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
[corpus]
positive_dir = "reviews/pos"

[server]
addr = "0.0.0.0:9000"
"#,
        )
        .unwrap();
        assert_eq!(cfg.corpus.positive_dir, PathBuf::from("reviews/pos"));
        assert_eq!(cfg.corpus.negative_dir, default_negative_dir());
        assert_eq!(cfg.corpus.extension, "txt");
        assert_eq!(cfg.index.dir, PathBuf::from("index"));
        assert_eq!(cfg.server.addr, "0.0.0.0:9000");
    }

    #[test]
    fn empty_toml_is_default() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn corpus_for_picks_label_dir() {
        let cfg = AppConfig::default();
        assert_eq!(
            cfg.corpus_for(Label::Negative).dir(),
            Path::new("data/aclImdb/train/neg")
        );
        assert_eq!(cfg.store().dir(), Path::new("index"));
    }
}
