//! Error taxonomy for the pipeline's public surface.
//!
//! Every public derivation function returns a typed result; no panic or
//! partially-populated object ever crosses the pipeline boundary. Upstream
//! failures inside synthesis agents are absorbed locally (the agents degrade
//! to defaults), so `Upstream` only surfaces from calls where total failure
//! is the documented behavior.

use thiserror::Error;

/// Errors that can cross the pipeline boundary.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed or missing required fields in a request. No partial work
    /// was started.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A required external collaborator failed in a context where no
    /// documented default applies.
    #[error("upstream failure in {source_name}: {message}")]
    Upstream {
        source_name: String,
        message: String,
    },

    /// The deep-research final synthesis call failed. Fatal to that single
    /// query; no partial analysis is meaningful without it.
    #[error("synthesis failed: {0}")]
    Synthesis(String),

    /// The caller abandoned the query; in-flight subtask results were
    /// discarded.
    #[error("query cancelled")]
    Cancelled,

    /// The event store could not serve a read.
    #[error("store error: {0}")]
    Store(String),
}

impl PipelineError {
    /// Build an upstream error tagged with the collaborator that failed.
    pub fn upstream(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

/// Convenience alias used across the pipeline.
pub type PipelineResult<T> = Result<T, PipelineError>;
