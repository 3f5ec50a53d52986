//! Data model (spec §3): Question, Participant, Candidate, Ranking,
//! GroupNode.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::error::DeliberationError;
use crate::ids::{CandidateIndex, ParticipantPosition};

/// Free-form text, immutable per session.
pub type Question = String;

/// An ordered position plus an opinion string. Positions are the
/// participant's stable identity across the session; they survive
/// partitioning (spec §3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    pub position: ParticipantPosition,
    pub opinion: String,
}

impl Participant {
    pub fn new(position: ParticipantPosition, opinion: impl Into<String>) -> Self {
        Self {
            position,
            opinion: opinion.into(),
        }
    }
}

/// A generated consensus statement, identified only by its index `c` within
/// one group's election. Never compared across groups.
pub type Candidate = String;

/// A total strict order over `[0, K)`: a length-K permutation, most
/// preferred first. Constructing one validates the permutation invariant
/// from spec §3 so an invalid ranking can never exist past this boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ranking {
    order: Vec<CandidateIndex>,
    /// Set when this ranking is a uniform-random fallback rather than a
    /// genuine model prediction (spec §3: "explicitly flagged in the audit
    /// record").
    pub fallback: bool,
}

impl Ranking {
    /// Validate `order` as a permutation of `0..k` and wrap it. Rejects
    /// wrong length, out-of-range values, and duplicates.
    pub fn new(order: Vec<CandidateIndex>, k: usize, fallback: bool) -> Result<Self, DeliberationError> {
        if order.len() != k {
            return Err(DeliberationError::invalid_input(format!(
                "ranking length {} does not match K={}",
                order.len(),
                k
            )));
        }
        let mut seen = vec![false; k];
        for idx in &order {
            let i = idx.index();
            if i >= k || seen[i] {
                return Err(DeliberationError::invalid_input(format!(
                    "ranking is not a permutation of 0..{k}"
                )));
            }
            seen[i] = true;
        }
        Ok(Self { order, fallback })
    }

    pub fn order(&self) -> &[CandidateIndex] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// `true` iff `a` is ranked ahead of `b` in this ballot.
    pub fn prefers(&self, a: CandidateIndex, b: CandidateIndex) -> bool {
        let pos = |x: CandidateIndex| self.order.iter().position(|&y| y == x);
        match (pos(a), pos(b)) {
            (Some(pa), Some(pb)) => pa < pb,
            _ => false,
        }
    }
}

/// How a parent level's voter population is computed from subtree winners
/// (spec §4.2).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotingStrategy {
    /// Voters are the original participants whose opinions transitively feed
    /// this parent group's candidates (the union of child `GroupNode`
    /// `member_participant_positions`).
    OwnGroupOnly,
    /// Voters are every original participant in the session, regardless of
    /// subtree.
    AllParticipants,
}

impl Default for VotingStrategy {
    fn default() -> Self {
        VotingStrategy::OwnGroupOnly
    }
}

/// A node in the recursion tree (spec §3). Created by the Partitioner,
/// mutated only by its owning election step, finalized when the winner is
/// set.
#[derive(Clone, Debug)]
pub struct GroupNode {
    pub level: u32,
    pub group_index: u32,
    /// Originating participants whose opinions transitively feed this node.
    pub member_participant_positions: BTreeSet<ParticipantPosition>,
    /// Opinions (or, above level 0, promoted winning statements) of this
    /// group's items, in the shuffled order the Partitioner assigned.
    pub statements: Vec<String>,
    /// Generated candidate statements for this group's election.
    pub candidates: Vec<Candidate>,
    /// Per-voter rankings over `candidates`, keyed by the *original*
    /// participant position that cast the ballot (spec §4.2: "The Oracle
    /// uses the original participant's own opinion... in both strategies").
    pub rankings: BTreeMap<ParticipantPosition, Ranking>,
    pub winner_candidate_index: Option<CandidateIndex>,
    /// K×K pairwise preference matrix, set once the election completes.
    pub pairwise: Option<Vec<Vec<u64>>>,
    /// K×K strongest-path matrix, set once the election completes.
    pub strongest_paths: Option<Vec<Vec<u64>>>,
    pub child_nodes: Option<Vec<GroupNode>>,
}

impl GroupNode {
    pub fn new(
        level: u32,
        group_index: u32,
        member_participant_positions: BTreeSet<ParticipantPosition>,
        statements: Vec<String>,
    ) -> Self {
        Self {
            level,
            group_index,
            member_participant_positions,
            statements,
            candidates: Vec::new(),
            rankings: BTreeMap::new(),
            winner_candidate_index: None,
            pairwise: None,
            strongest_paths: None,
            child_nodes: None,
        }
    }

    /// The statement text of the winning candidate, once set.
    pub fn winning_statement(&self) -> Option<&str> {
        self.winner_candidate_index
            .and_then(|i| self.candidates.get(i.index()))
            .map(String::as_str)
    }
}
