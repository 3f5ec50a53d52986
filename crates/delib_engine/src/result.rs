//! The Coordinator's return value (spec §4.1: "`Result` exposes the winning
//! statement, the full tree of GroupNodes, and the event log").

use delib_core::{Event, GroupNode, SessionId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunKind {
    Completed,
    /// The session's cancel signal was observed before a winner was
    /// produced (spec §4.1: "returns promptly with a `Cancelled` result
    /// containing partial progress"). Never carries a winning statement.
    Cancelled,
}

#[derive(Debug)]
pub struct DeliberationResult {
    pub kind: RunKind,
    pub winning_statement: Option<String>,
    /// The root of the recursion tree. `None` only for `Cancelled` runs that
    /// were interrupted before any level finished.
    pub root: Option<GroupNode>,
    /// `true` iff any ranking anywhere in the tree was a fallback
    /// permutation (spec §7: "A session that finishes with any fallback
    /// ranking still yields a winner and a boolean `degraded` flag").
    pub degraded: bool,
    /// This session's monotonic id (spec §3).
    pub session_id: SessionId,
    /// The full event log for this session, in emission order, regardless
    /// of whatever sink the caller supplied (spec §4.1).
    pub events: Vec<Event>,
}

impl DeliberationResult {
    pub(crate) fn cancelled(session_id: SessionId, events: Vec<Event>) -> Self {
        Self {
            kind: RunKind::Cancelled,
            winning_statement: None,
            root: None,
            degraded: false,
            session_id,
            events,
        }
    }
}
