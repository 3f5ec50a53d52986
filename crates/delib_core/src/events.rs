//! Typed event stream (spec §4.1) and `SessionTranscript` (spec §3).
//!
//! The event sink is the sole programmatic surface external consumers (the
//! out-of-scope GUI and transcript writers) observe — no files, no TTY
//! writes. `EventSink` is passed explicitly by the coordinator; there is no
//! global sink (spec §5: "No globals").

use std::sync::Mutex;

use crate::ids::{CandidateIndex, ParticipantPosition};

/// One entry of the coordinator's typed event stream, emitted in causal
/// order within a single group (spec §5: "Events emitted by a single group
/// are strictly ordered").
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    LevelStart { level: u32, num_groups: u32 },
    GroupStart { level: u32, group_index: u32, num_members: u32 },
    CandidateStart { level: u32, group_index: u32, candidate_index: u32 },
    CandidateChunk { level: u32, group_index: u32, candidate_index: u32, chunk: String },
    CandidateDone { level: u32, group_index: u32, candidate_index: u32 },
    OracleStart { level: u32, group_index: u32, voter: ParticipantPosition },
    OracleAttempt { level: u32, group_index: u32, voter: ParticipantPosition, attempt: u32, error: String },
    OracleFallback { level: u32, group_index: u32, voter: ParticipantPosition },
    OracleDone { level: u32, group_index: u32, voter: ParticipantPosition },
    ElectionDone { level: u32, group_index: u32, winner: CandidateIndex },
    LevelDone { level: u32 },
    Done { winner_statement: String, degraded: bool },
    Cancelled,
}

/// Sink for the event stream. The default `InMemorySink` accumulates a
/// `SessionTranscript`; an external transcript writer (out of scope here)
/// would implement this trait itself against its own storage.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

/// Append-only in-memory transcript (spec §3: "An append-only sequence of
/// events... a wall-clock timestamp suffices for uniqueness when sessions
/// are serial"). Appends are atomic with respect to concurrent emitters
/// (spec §5: "The event sink is a concurrent writer; events are appended
/// atomically").
#[derive(Default)]
pub struct InMemorySink {
    events: Mutex<Vec<Event>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far, in append order.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().expect("event sink mutex poisoned").clone()
    }
}

impl EventSink for InMemorySink {
    fn emit(&self, event: Event) {
        self.events.lock().expect("event sink mutex poisoned").push(event);
    }
}

/// A sink that discards every event; useful for tests and for callers that
/// only care about the final `Result`.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: Event) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_sink_preserves_order() {
        let sink = InMemorySink::new();
        sink.emit(Event::LevelStart { level: 0, num_groups: 1 });
        sink.emit(Event::LevelDone { level: 0 });
        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::LevelStart { .. }));
        assert!(matches!(events[1], Event::LevelDone { .. }));
    }
}
