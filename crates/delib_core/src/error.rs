//! Error taxonomy (spec §7). One variant per row of the error-kind table;
//! recoverable kinds (`RankingParseFailed`, transient `GatewayUnavailable`)
//! are handled in place by `delib_engine` and never surface here as a fatal
//! session outcome — they show up only in the event stream and the
//! `degraded` flag on `Result`.

use thiserror::Error;

/// Top-level error for a deliberation session.
#[derive(Debug, Error)]
pub enum DeliberationError {
    /// Fewer than two opinions, an empty question, or an otherwise malformed
    /// pre-flight input. Raised before any model call.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A prompt template is missing a required placeholder, or failed to
    /// parse. Raised before any model call (spec §6).
    #[error("template error: {0}")]
    TemplateError(String),

    /// The model gateway's transport failed after its local retry budget.
    #[error("model gateway unavailable: {0}")]
    GatewayUnavailable(String),

    /// A group's K candidates could not be produced after per-candidate
    /// retries; the containing group (and everything above it) aborts.
    #[error("candidate generation failed for group {group_index} at level {level}: {reason}")]
    GenerationFailed {
        level: u32,
        group_index: u32,
        reason: String,
    },

    /// The session's cancel signal was observed; no further model calls are
    /// made. Not really an "error" in the failure sense — callers should
    /// treat this as a normal, early-exit outcome.
    #[error("session cancelled")]
    Cancelled,
}

impl DeliberationError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn template(msg: impl Into<String>) -> Self {
        Self::TemplateError(msg.into())
    }
}
