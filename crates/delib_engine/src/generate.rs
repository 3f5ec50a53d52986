//! Candidate Generator (spec §4.3): K concurrent generation calls per
//! group, each fed an independently shuffled ordering of the group's
//! statements, with model-family artefact stripping, an optional
//! structured envelope, and empty-statement retry before the group aborts.

use futures::future::try_join_all;

use delib_core::{DeliberationError, Event};
use delib_gateway::{strip_reasoning_tags, CompletionRequest};

use crate::complete::complete_text;
use crate::context::EngineContext;

const GENERATION_ATTEMPT_LIMIT: u32 = 3;

/// Prompts may ask the model to wrap its final answer between these two
/// markers, separating a reasoning section from the statement itself
/// (spec §4.3: "Optional structured envelope"). Absent the terminal marker,
/// the whole cleaned response is taken as the statement — degrade, don't
/// fail.
const STATEMENT_BEGIN: &str = "[[STATEMENT]]";
const STATEMENT_END: &str = "[[/STATEMENT]]";

pub(crate) async fn generate_candidates(
    ctx: &EngineContext,
    level: u32,
    group_index: u32,
    question: &str,
    statements: &[String],
    k: usize,
) -> Result<Vec<String>, DeliberationError> {
    let tasks = (0..k as u32).map(|candidate_index| {
        generate_one(ctx, level, group_index, candidate_index, question, statements)
    });
    try_join_all(tasks).await
}

async fn generate_one(
    ctx: &EngineContext,
    level: u32,
    group_index: u32,
    candidate_index: u32,
    question: &str,
    statements: &[String],
) -> Result<String, DeliberationError> {
    let mut last_reason = String::from("model never produced a non-empty statement");

    for _attempt in 0..GENERATION_ATTEMPT_LIMIT {
        if ctx.cancel.is_cancelled() {
            return Err(DeliberationError::Cancelled);
        }

        ctx.sink.emit(Event::CandidateStart {
            level,
            group_index,
            candidate_index,
        });

        let shuffled = {
            let mut rng = ctx.rng.lock().expect("rng mutex poisoned");
            rng.shuffled(statements)
        };
        let participant_statements = shuffled.join("\n\n");
        let prompt = ctx
            .config
            .prompt_templates
            .render_candidate(question, &participant_statements);

        let request = CompletionRequest {
            endpoint: ctx.config.generation.endpoint.clone(),
            model: ctx.config.generation.model.clone(),
            prompt,
            system: None,
            sampling: ctx.config.generation.sampling.clone(),
        };

        let permit = ctx.admission.acquire(&ctx.cancel).await?;
        let raw = complete_text(ctx.gateway.as_ref(), &request, &ctx.cancel, |chunk| {
            ctx.sink.emit(Event::CandidateChunk {
                level,
                group_index,
                candidate_index,
                chunk: chunk.to_string(),
            });
        })
        .await?;
        drop(permit);

        let cleaned = strip_reasoning_tags(&raw);
        let statement = extract_envelope(&cleaned);
        if statement.is_empty() {
            last_reason = "model returned an empty statement".to_string();
            continue;
        }

        ctx.sink.emit(Event::CandidateDone {
            level,
            group_index,
            candidate_index,
        });
        return Ok(statement);
    }

    tracing::warn!(level, group_index, candidate_index, reason = %last_reason, "candidate generation exhausted retries");
    Err(DeliberationError::GenerationFailed {
        level,
        group_index,
        reason: last_reason,
    })
}

fn extract_envelope(text: &str) -> String {
    if let Some(start) = text.find(STATEMENT_BEGIN) {
        let after_start = &text[start + STATEMENT_BEGIN.len()..];
        if let Some(end) = after_start.find(STATEMENT_END) {
            return after_start[..end].trim().to_string();
        }
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_extracts_between_markers() {
        let text = "reasoning noise [[STATEMENT]]the actual statement[[/STATEMENT]] trailing noise";
        assert_eq!(extract_envelope(text), "the actual statement");
    }

    #[test]
    fn missing_terminal_marker_falls_back_to_whole_text() {
        let text = "just a plain answer with no markers";
        assert_eq!(extract_envelope(text), "just a plain answer with no markers");
    }

    #[test]
    fn unterminated_begin_marker_falls_back_to_whole_text() {
        let text = "some text [[STATEMENT]] never closed";
        assert_eq!(extract_envelope(text), "some text [[STATEMENT]] never closed");
    }
}
