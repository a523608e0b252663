//! Typed failure conditions raised by the scoring core.
//!
//! Collaborators (corpus loading, the index store, the HTTP layer) wrap these
//! in `anyhow` chains; callers that need to branch on the kind use
//! `anyhow::Error::downcast_ref::<SentimentError>()`.

use thiserror::Error;

use crate::index::Label;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SentimentError {
    /// The input text normalized to zero tokens, so no mean exists.
    #[error("invalid input: text contains no scorable words")]
    InvalidInput,

    /// The index for `label` was never built or loaded.
    #[error("missing {label} index: run training first")]
    MissingIndex { label: Label },
}

pub type Result<T> = std::result::Result<T, SentimentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_label() {
        let e = SentimentError::MissingIndex {
            label: Label::Negative,
        };
        assert_eq!(e.to_string(), "missing negative index: run training first");
    }

    #[test]
    fn downcasts_through_anyhow() {
        let err: anyhow::Error = SentimentError::InvalidInput.into();
        let err = err.context("scoring request");
        assert_eq!(
            err.downcast_ref::<SentimentError>(),
            Some(&SentimentError::InvalidInput)
        );
    }
}
