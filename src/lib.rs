// src/lib.rs
// Public library surface for the binary and integration tests.

// Scoring core
pub mod error;
pub mod index;
pub mod normalize;
pub mod scorer;

// Collaborators: corpus files, persisted indices, training, export
pub mod config;
pub mod corpus;
pub mod export;
pub mod store;
pub mod train;

// Service surface
pub mod api;
pub mod logging;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::error::SentimentError;
pub use crate::index::{build_index, IndexPair, Label, WordFrequencyIndex};
pub use crate::normalize::{normalize, normalize_to_string};
pub use crate::scorer::{score, score_with_trace, Polarity, ScoreReport, WordContribution};
