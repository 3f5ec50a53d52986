//! Shared machinery for draining one `ModelGateway::complete` call into a
//! `String`, with the transport-level bounded retry spec §7 assigns to
//! `GatewayUnavailable` ("local retry with bounded backoff (max 3); surfaced
//! as fatal if persistent"). This is deliberately separate from the Ranking
//! Oracle's own attempt loop (spec §4.4), which retries on *parse* failure,
//! not transport failure — a transport failure that survives this retry
//! always propagates as a fatal `GatewayUnavailable`, never as a fallback
//! ranking.

use std::time::Duration;

use futures::StreamExt;

use delib_core::DeliberationError;
use delib_gateway::{CancelToken, CompletionRequest, GatewayError, ModelGateway};

const TRANSPORT_RETRY_LIMIT: u32 = 3;

enum DrainError {
    Cancelled,
    Transport(String),
}

/// Issue one completion request, draining its chunk stream into a single
/// `String`, retrying transport failures up to `TRANSPORT_RETRY_LIMIT`
/// times with exponential backoff. `on_chunk` is invoked for every chunk of
/// a successful attempt (used to emit `CandidateChunk` events); chunks from
/// an attempt that is later retried are not un-emitted, since the spec's
/// ordering guarantee only binds the final sequence the caller commits to,
/// not intermediate retried attempts.
pub(crate) async fn complete_text(
    gateway: &dyn ModelGateway,
    request: &CompletionRequest,
    cancel: &CancelToken,
    mut on_chunk: impl FnMut(&str),
) -> Result<String, DeliberationError> {
    let mut last_error = String::new();
    for attempt in 0..TRANSPORT_RETRY_LIMIT {
        if cancel.is_cancelled() {
            return Err(DeliberationError::Cancelled);
        }
        match drain_once(gateway, request.clone(), cancel, &mut on_chunk).await {
            Ok(text) => return Ok(text),
            Err(DrainError::Cancelled) => return Err(DeliberationError::Cancelled),
            Err(DrainError::Transport(message)) => {
                last_error = message;
                if attempt + 1 < TRANSPORT_RETRY_LIMIT {
                    let backoff = Duration::from_millis(50u64 * (1u64 << attempt));
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(DeliberationError::Cancelled),
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        }
    }
    Err(DeliberationError::GatewayUnavailable(last_error))
}

async fn drain_once(
    gateway: &dyn ModelGateway,
    request: CompletionRequest,
    cancel: &CancelToken,
    on_chunk: &mut impl FnMut(&str),
) -> Result<String, DrainError> {
    let mut stream = gateway.complete(request, cancel).await.map_err(|error| match error {
        GatewayError::Cancelled => DrainError::Cancelled,
        GatewayError::Transport(message) => DrainError::Transport(message),
    })?;

    let mut text = String::new();
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(DrainError::Cancelled),
            next = stream.next() => match next {
                None => return Ok(text),
                Some(Ok(chunk)) => {
                    on_chunk(&chunk);
                    text.push_str(&chunk);
                }
                Some(Err(GatewayError::Cancelled)) => return Err(DrainError::Cancelled),
                Some(Err(GatewayError::Transport(message))) => return Err(DrainError::Transport(message)),
            },
        }
    }
}
