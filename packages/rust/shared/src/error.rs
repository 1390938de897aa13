//! Error types for docbrief.
//!
//! Library crates use [`DocBriefError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

use crate::types::Stage;

/// A failed call to the remote generation endpoint.
///
/// Carries the provider's message verbatim (auth, quota, transport, or a
/// malformed response). No finer classification is attempted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct InvocationError {
    message: String,
}

impl InvocationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The provider message, untouched.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Top-level error type for all docbrief operations.
#[derive(Debug, thiserror::Error)]
pub enum DocBriefError {
    /// Configuration loading or validation error (including a missing credential).
    #[error("config error: {message}")]
    Config { message: String },

    /// A question-answering invocation failed.
    #[error("invocation error: {0}")]
    Invocation(#[from] InvocationError),

    /// A pipeline stage failed; remaining stages were not run.
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: InvocationError,
    },

    /// An operation needing document text was called before any was processed.
    #[error("no document text available: process at least one readable document first")]
    EmptyCorpus,

    /// A blank question was submitted.
    #[error("question must not be empty")]
    EmptyQuestion,

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocBriefError>;

impl DocBriefError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Tag an invocation failure with the pipeline stage it happened in.
    pub fn stage(stage: Stage, source: InvocationError) -> Self {
        Self::Stage { stage, source }
    }

    /// The failing pipeline stage, if this error came from the pipeline.
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DocBriefError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = DocBriefError::validation("file name is empty");
        assert!(err.to_string().contains("file name is empty"));
    }

    #[test]
    fn invocation_message_is_verbatim() {
        let err = InvocationError::new("429 Too Many Requests: quota exceeded");
        assert_eq!(err.message(), "429 Too Many Requests: quota exceeded");
        assert_eq!(err.to_string(), "429 Too Many Requests: quota exceeded");
    }

    #[test]
    fn stage_error_carries_tag_and_message() {
        let err = DocBriefError::stage(Stage::Write, InvocationError::new("deadline exceeded"));
        assert_eq!(err.failed_stage(), Some(Stage::Write));
        assert_eq!(err.to_string(), "write stage failed: deadline exceeded");

        assert_eq!(DocBriefError::EmptyCorpus.failed_stage(), None);
    }

    #[test]
    fn invocation_converts_into_top_level_error() {
        let err: DocBriefError = InvocationError::new("bad key").into();
        assert!(matches!(err, DocBriefError::Invocation(_)));
    }
}
