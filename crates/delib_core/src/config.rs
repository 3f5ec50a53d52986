//! Configuration surface (spec §6). Defaults mirror spec.md §6's default
//! column exactly. Validation (missing prompt placeholders) runs before any
//! model call is issued, per spec §7's `TemplateError` row.

pub use crate::model::VotingStrategy;
use crate::error::DeliberationError;

use serde::Deserialize;

/// Sampling parameters for one of the two model-gateway call sites
/// (generation vs. ranking — spec §6 allows distinct endpoints/models/
/// sampling per call site).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Sampling {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub sampling: Sampling,
    pub endpoint: String,
    pub model: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            sampling: Sampling {
                temperature: 0.7,
                top_p: 0.9,
                top_k: 40,
            },
            endpoint: String::new(),
            model: String::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub sampling: Sampling,
    pub max_retries: u32,
    pub endpoint: String,
    pub model: String,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            sampling: Sampling {
                temperature: 0.2,
                top_p: 0.9,
                top_k: 40,
            },
            max_retries: 3,
            endpoint: String::new(),
            model: String::new(),
        }
    }
}

/// Candidate-generation and ranking prompt templates (spec §6). Each must
/// contain its declared placeholders, checked by `PromptTemplates::validate`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PromptTemplates {
    pub candidate: String,
    pub ranking: String,
}

const CANDIDATE_PLACEHOLDERS: &[&str] = &["{question}", "{participant_statements}"];
const RANKING_PLACEHOLDERS: &[&str] = &[
    "{question}",
    "{participant_num}",
    "{participant_statement}",
    "{num_candidates}",
    "{candidate_statements}",
];

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            candidate: DEFAULT_CANDIDATE_TEMPLATE.to_string(),
            ranking: DEFAULT_RANKING_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplates {
    /// Check that both templates contain every placeholder their operation
    /// requires. Returns the first missing placeholder as a `TemplateError`
    /// — a pre-flight check, run before any model call.
    pub fn validate(&self) -> Result<(), DeliberationError> {
        for ph in CANDIDATE_PLACEHOLDERS {
            if !self.candidate.contains(ph) {
                return Err(DeliberationError::template(format!(
                    "candidate template missing placeholder {ph}"
                )));
            }
        }
        for ph in RANKING_PLACEHOLDERS {
            if !self.ranking.contains(ph) {
                return Err(DeliberationError::template(format!(
                    "ranking template missing placeholder {ph}"
                )));
            }
        }
        Ok(())
    }

    pub fn render_candidate(&self, question: &str, participant_statements: &str) -> String {
        self.candidate
            .replace("{question}", question)
            .replace("{participant_statements}", participant_statements)
    }

    pub fn render_ranking(
        &self,
        question: &str,
        participant_num: usize,
        participant_statement: &str,
        num_candidates: usize,
        candidate_statements: &str,
    ) -> String {
        self.ranking
            .replace("{question}", question)
            .replace("{participant_num}", &participant_num.to_string())
            .replace("{participant_statement}", participant_statement)
            .replace("{num_candidates}", &num_candidates.to_string())
            .replace("{candidate_statements}", candidate_statements)
    }
}

const DEFAULT_CANDIDATE_TEMPLATE: &str = "\
You are helping a group reach consensus on the following question:

{question}

Here are the participants' opinions, in no particular order:

{participant_statements}

Draft a single consensus statement that a broad range of these participants \
could agree represents common ground. Respond with only the statement.";

const DEFAULT_RANKING_TEMPLATE: &str = "\
Question: {question}

Participant #{participant_num}'s opinion:
{participant_statement}

Here are {num_candidates} candidate consensus statements:
{candidate_statements}

Rank all {num_candidates} candidates from most to least preferred by this \
participant. Respond with a JSON object of the form {{\"ranking\": [a1, a2, ...]}} \
using the 1-based candidate numbers above, most preferred first.";

/// Top-level configuration for a deliberation session (spec §6).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub generation: GenerationConfig,
    pub ranking: RankingConfig,
    /// K: candidates per group, clamped to `[2, min(9, members)]` at use time.
    pub num_candidates: u32,
    /// Partitioner cap (recursive mode only).
    pub max_group_size: u32,
    pub voting_strategy: VotingStrategy,
    /// Global model-call concurrency ceiling; `None` means "CPU count, floor 2".
    pub max_in_flight: Option<usize>,
    pub prompt_templates: PromptTemplates,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            ranking: RankingConfig::default(),
            num_candidates: 4,
            max_group_size: 12,
            voting_strategy: VotingStrategy::OwnGroupOnly,
            max_in_flight: None,
            prompt_templates: PromptTemplates::default(),
        }
    }
}

impl EngineConfig {
    /// Resolve `max_in_flight` against the available parallelism, applying
    /// the spec's floor of 2.
    pub fn resolved_max_in_flight(&self) -> usize {
        self.max_in_flight.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(2)
                .max(2)
        })
    }

    /// Clamp a requested K against the group size per spec §3:
    /// `2 ≤ K ≤ min(9, |members|)`.
    ///
    /// # Panics
    /// Panics if `members < 2` — a group with fewer than two statements has
    /// no election to run at all (no valid K satisfies the invariant above)
    /// and must be promoted directly by the caller instead of clamped.
    pub fn clamp_num_candidates(&self, members: usize) -> usize {
        assert!(members >= 2, "clamp_num_candidates: group must have at least two statements");
        let upper = members.min(9);
        (self.num_candidates as usize).clamp(2, upper)
    }

    /// Pre-flight validation: templates, and basic numeric sanity. Run once
    /// at session start, before any model call (spec §7).
    pub fn validate(&self) -> Result<(), DeliberationError> {
        self.prompt_templates.validate()?;
        if self.max_group_size < 2 {
            return Err(DeliberationError::invalid_input(
                "max_group_size must be at least 2",
            ));
        }
        if self.num_candidates < 2 {
            return Err(DeliberationError::invalid_input(
                "num_candidates must be at least 2",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_templates_validate() {
        assert!(PromptTemplates::default().validate().is_ok());
    }

    #[test]
    fn missing_placeholder_is_rejected() {
        let templates = PromptTemplates {
            candidate: "no placeholders here".into(),
            ranking: PromptTemplates::default().ranking,
        };
        assert!(templates.validate().is_err());
    }

    #[test]
    fn clamp_respects_member_count_and_cap() {
        let cfg = EngineConfig {
            num_candidates: 20,
            ..Default::default()
        };
        assert_eq!(cfg.clamp_num_candidates(5), 5);
        assert_eq!(cfg.clamp_num_candidates(50), 9);
    }

    #[test]
    #[should_panic(expected = "at least two statements")]
    fn clamp_rejects_singleton_groups() {
        EngineConfig::default().clamp_num_candidates(1);
    }
}
