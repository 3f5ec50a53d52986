//! The Model Gateway contract (spec §2, §6): `Complete(prompt, system?,
//! sampling) → stream of text chunks`, plus cancellation via a shared
//! cancel signal. This is the only interface the deliberation engine
//! requires of the underlying model; everything else about the model is
//! out of scope (spec §1).

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

use delib_core::config::Sampling;

use crate::cancel::CancelToken;

/// Everything one `Complete` call needs. `endpoint` and `model` are carried
/// per-request (not baked into the gateway) so generation and ranking calls
/// can target distinct endpoints/models per spec §6.
#[derive(Clone, Debug)]
pub struct CompletionRequest {
    pub endpoint: String,
    pub model: String,
    pub prompt: String,
    pub system: Option<String>,
    pub sampling: Sampling,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("gateway cancelled")]
    Cancelled,
}

/// A stream of text chunks; concatenation of all `Ok` items yields the full
/// completion (spec §6: "Any other streaming transport conforming to
/// 'concatenation of chunks yields the full completion' is acceptable").
pub type ChunkStream = BoxStream<'static, Result<String, GatewayError>>;

/// The gateway trait itself. Implementations must honor `cancel`: once
/// tripped, in-flight streams are aborted at their next chunk boundary and
/// no further chunks are yielded (spec §5).
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn complete(&self, request: CompletionRequest, cancel: &CancelToken) -> Result<ChunkStream, GatewayError>;
}
