//! delib_core — data model, config, error taxonomy, and deterministic RNG.
//!
//! This crate is I/O-free and async-free. It defines the stable types shared
//! by `delib_gateway`, `delib_algo`, `delib_engine`, and `delib_cli`:
//! Question/Participant/Candidate/Ranking/GroupNode (spec §3), `EngineConfig`
//! (spec §6), the `DeliberationError` taxonomy (spec §7), the typed event
//! stream (spec §4.1), and a seeded RNG used for partitioner shuffling and
//! oracle fallback permutations.

pub mod config;
pub mod error;
pub mod events;
pub mod ids;
pub mod model;
pub mod rng;

pub use config::{EngineConfig, GenerationConfig, PromptTemplates, RankingConfig, VotingStrategy};
pub use error::DeliberationError;
pub use events::{Event, EventSink, InMemorySink, NullSink};
pub use ids::{CandidateIndex, ParticipantPosition, SessionId};
pub use model::{Candidate, GroupNode, Participant, Question, Ranking};
pub use rng::DeliberationRng;
