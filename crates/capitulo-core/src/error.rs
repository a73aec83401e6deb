//! Error types for chapter loading, speech and navigation.

use std::time::Duration;

use thiserror::Error;

/// Errors produced by the chapter reading engine.
///
/// None of these ever reach the rendering layer as a failure: fetch errors are
/// folded into [`crate::LoadState::Failed`], speech errors are logged and
/// dropped, and navigation errors simply mean no navigation happens.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChapterError {
    /// Verse retrieval failed (transport error or non-2xx status).
    #[error("network error: {0}")]
    Network(String),

    /// The verse API answered with a body we could not use.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The verse API did not answer in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The speech engine is missing or failed to initialize.
    #[error("speech unavailable: {0}")]
    SpeechUnavailable(String),

    /// Jump target outside `1..=total`.
    #[error("chapter {selected} is outside 1..={total}")]
    InvalidNavigationTarget {
        /// Chapter the user asked for.
        selected: u32,
        /// Number of chapters in the book.
        total: u32,
    },

    /// Navigation parameters that do not describe a chapter.
    #[error("invalid chapter reference: {0}")]
    InvalidChapterRef(String),

    /// Translation code outside the supported set.
    #[error("unknown translation: {0}")]
    UnknownTranslation(String),
}

impl ChapterError {
    /// Short message suitable for the failed-chapter affordance.
    pub fn user_message(&self) -> String {
        match self {
            ChapterError::Network(_) | ChapterError::Timeout(_) => {
                "Could not load this chapter. Check your connection and try again.".to_string()
            }
            ChapterError::MalformedResponse(_) => {
                "The server sent an unexpected answer. Try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChapterError>;
