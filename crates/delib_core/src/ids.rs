//! Newtyped indices (spec §3: "Positions are the participant's stable
//! identity"; "Candidates are never compared across groups").
//!
//! Grounded on the teacher crate's `tokens` module, which wraps bare strings
//! in newtypes so a validated identifier can't be confused with a raw
//! `String` at a call site. Here the underlying representation is `u32`
//! rather than a string, but the intent — make the two index spaces
//! impossible to mix up at the type level — is the same.

use core::fmt;

use crate::rng::DeliberationRng;

/// A participant's stable position `p ∈ [0, P)`. Survives partitioning:
/// a synthetic participant promoted from a subgroup is *not* a
/// `ParticipantPosition` — it has no originating position of its own, only
/// a set of originating positions (`GroupNode::member_participant_positions`).
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct ParticipantPosition(pub u32);

impl ParticipantPosition {
    pub fn new(p: u32) -> Self {
        Self(p)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ParticipantPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// A candidate index `c ∈ [0, K)`, scoped to a single group election.
/// Never compared across groups — a `CandidateIndex` from one `GroupNode`
/// carries no meaning in another.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct CandidateIndex(pub u32);

impl CandidateIndex {
    pub fn new(c: u32) -> Self {
        Self(c)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CandidateIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Session id: a monotonic key for a `SessionTranscript` (spec §3). A
/// wall-clock timestamp plus a random suffix suffices for uniqueness when
/// sessions are serial, as spec.md explicitly permits.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct SessionId(String);

impl SessionId {
    /// Construct from an already-formatted unique token (e.g.
    /// `"{unix_timestamp_nanos}-{random_suffix}"`).
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Fresh id for a new session: the current wall-clock time plus a random
    /// suffix drawn from `rng`. Collisions are practically impossible for
    /// the serial sessions this engine runs (spec §3).
    pub fn generate(rng: &mut DeliberationRng) -> Self {
        let nanos = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
        let suffix = rng.gen_range(1u64 << 32).unwrap_or(0) as u32;
        Self::new(format!("{nanos:x}-{suffix:08x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_differ_across_calls() {
        let mut rng = DeliberationRng::from_seed_u64(1);
        let a = SessionId::generate(&mut rng);
        let b = SessionId::generate(&mut rng);
        assert_ne!(a, b, "two ids drawn from an advancing rng must not collide");
    }

    #[test]
    fn generated_id_is_nonempty() {
        let mut rng = DeliberationRng::from_seed_u64(2);
        let id = SessionId::generate(&mut rng);
        assert!(!id.as_str().is_empty());
    }
}
