//! Ranking Oracle (spec §4.4): for one voter and one candidate set, obtain a
//! valid total ordering via the Model Gateway, retrying structured-output
//! parse failures before falling back to a uniformly random permutation.
//! Never returns a fatal error for a parse failure — only cancellation or a
//! persistent transport failure (`GatewayUnavailable`) propagates.

use delib_core::{CandidateIndex, DeliberationError, Event, ParticipantPosition, Ranking};
use delib_gateway::{extract_ranking, strip_reasoning_tags, CompletionRequest};

use crate::complete::complete_text;
use crate::context::EngineContext;

#[allow(clippy::too_many_arguments)]
pub(crate) async fn predict_ranking(
    ctx: &EngineContext,
    level: u32,
    group_index: u32,
    voter: ParticipantPosition,
    question: &str,
    voter_opinion: &str,
    candidates: &[String],
    k: usize,
) -> Result<Ranking, DeliberationError> {
    ctx.sink.emit(Event::OracleStart {
        level,
        group_index,
        voter,
    });

    let candidate_statements = candidates
        .iter()
        .enumerate()
        .map(|(i, statement)| format!("{}. {}", i + 1, statement))
        .collect::<Vec<_>>()
        .join("\n");

    let max_attempts = ctx.config.ranking.max_retries.max(1);

    for attempt in 1..=max_attempts {
        if ctx.cancel.is_cancelled() {
            return Err(DeliberationError::Cancelled);
        }

        let prompt = ctx.config.prompt_templates.render_ranking(
            question,
            voter.index() + 1,
            voter_opinion,
            k,
            &candidate_statements,
        );
        let request = CompletionRequest {
            endpoint: ctx.config.ranking.endpoint.clone(),
            model: ctx.config.ranking.model.clone(),
            prompt,
            system: None,
            sampling: ctx.config.ranking.sampling.clone(),
        };

        let permit = ctx.admission.acquire(&ctx.cancel).await?;
        let raw = complete_text(ctx.gateway.as_ref(), &request, &ctx.cancel, |_chunk| {}).await?;
        drop(permit);

        let cleaned = strip_reasoning_tags(&raw);
        match extract_ranking(&cleaned, k) {
            Ok(order) => {
                let ranking = Ranking::new(order, k, false)?;
                ctx.sink.emit(Event::OracleDone {
                    level,
                    group_index,
                    voter,
                });
                return Ok(ranking);
            }
            Err(parse_error) => {
                tracing::debug!(level, group_index, voter = %voter, attempt, %parse_error, "ranking attempt failed to parse");
                ctx.sink.emit(Event::OracleAttempt {
                    level,
                    group_index,
                    voter,
                    attempt,
                    error: parse_error.to_string(),
                });
            }
        }
    }

    tracing::warn!(level, group_index, voter = %voter, attempts = max_attempts, "ranking oracle exhausted retries, using fallback permutation");

    let fallback_order: Vec<CandidateIndex> = {
        let mut rng = ctx.rng.lock().expect("rng mutex poisoned");
        rng.random_permutation(k).into_iter().map(CandidateIndex::new).collect()
    };
    let ranking = Ranking::new(fallback_order, k, true)?;
    ctx.sink.emit(Event::OracleFallback {
        level,
        group_index,
        voter,
    });
    ctx.sink.emit(Event::OracleDone {
        level,
        group_index,
        voter,
    });
    Ok(ranking)
}
