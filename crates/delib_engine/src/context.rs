//! Everything a running session needs, threaded explicitly rather than
//! reached for as a global (spec §5: "Configuration, RNG, gateway client,
//! cancel signal, and event sink are passed explicitly through the
//! coordinator — never process-wide singletons").

use std::sync::{Arc, Mutex};

use delib_core::{DeliberationRng, EngineConfig, Event, EventSink, InMemorySink, SessionId};
use delib_gateway::{CancelToken, ModelGateway};

use crate::admission::AdmissionControl;

pub(crate) struct EngineContext {
    pub gateway: Arc<dyn ModelGateway>,
    pub config: EngineConfig,
    pub sink: Arc<dyn EventSink>,
    pub cancel: CancelToken,
    pub admission: AdmissionControl,
    /// Shared across every generator/oracle call site so a single seed
    /// determines the whole session's sequence of shuffles and fallback
    /// permutations (spec §4.4: "The oracle accepts an injectable RNG so
    /// tests can make fallbacks reproducible"). Locked only for the
    /// duration of drawing a shuffle/permutation, never across an `.await`.
    pub rng: Arc<Mutex<DeliberationRng>>,
    /// This session's monotonic id (spec §3: "`SessionTranscript` keyed by a
    /// monotonic session id"), generated once in `DeliberationCoordinator::new`.
    pub session_id: SessionId,
    /// Records every event this session emits, independent of whatever sink
    /// the caller supplied, so `DeliberationResult` can always return its own
    /// event log (spec §4.1) even when the caller passed a `NullSink`.
    pub recorder: Arc<InMemorySink>,
}

/// Forwards each event to both the caller's sink and the coordinator's own
/// recorder. `EngineContext::sink` is always one of these, never the bare
/// caller-supplied sink, so call sites keep calling `ctx.sink.emit(..)`
/// unchanged while the recorder is filled as a side effect.
pub(crate) struct TeeSink {
    outer: Arc<dyn EventSink>,
    recorder: Arc<InMemorySink>,
}

impl TeeSink {
    pub fn new(outer: Arc<dyn EventSink>, recorder: Arc<InMemorySink>) -> Self {
        Self { outer, recorder }
    }
}

impl EventSink for TeeSink {
    fn emit(&self, event: Event) {
        self.recorder.emit(event.clone());
        self.outer.emit(event);
    }
}
