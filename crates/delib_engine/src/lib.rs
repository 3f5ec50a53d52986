//! delib_engine — orchestration of the deliberation pipeline (spec §4):
//! Deliberation Coordinator, Recursive Partitioner, Candidate Generator,
//! Ranking Oracle, tied together with the concurrency and cancellation
//! model of spec §5. The Schulze Tabulator itself lives in `delib_algo`;
//! this crate calls it once per group election.

mod admission;
mod complete;
mod context;
mod coordinator;
mod generate;
mod oracle;
mod partition;
mod result;

pub use coordinator::DeliberationCoordinator;
pub use result::{DeliberationResult, RunKind};
