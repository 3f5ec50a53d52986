//! Deliberation Coordinator (spec §4.1): the two public entry points,
//! `single_run` and `recursive`, plus the level-by-level recursion loop
//! that drives Partitioner → Generator → Oracle → Tabulator and promotes
//! winners upward until one statement remains.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use futures::future::try_join_all;
use futures::FutureExt;

use delib_core::{
    CandidateIndex, DeliberationError, DeliberationRng, EngineConfig, Event, EventSink, GroupNode,
    InMemorySink, ParticipantPosition, Question, SessionId, VotingStrategy,
};
use delib_gateway::{CancelToken, ModelGateway};

use crate::admission::AdmissionControl;
use crate::context::{EngineContext, TeeSink};
use crate::generate::generate_candidates;
use crate::oracle::predict_ranking;
use crate::partition::partition;
use crate::result::{DeliberationResult, RunKind};

/// One item at a recursion level: either an original participant's opinion
/// (level 0) or a promoted subgroup winner (level > 0), carrying the set of
/// original participants behind it and, once promoted, the finished child
/// node itself (so `GroupNode::child_nodes` can be reconstructed).
#[derive(Clone)]
struct LevelItem {
    label: String,
    member_positions: BTreeSet<ParticipantPosition>,
    child: Option<GroupNode>,
}

pub struct DeliberationCoordinator {
    ctx: EngineContext,
}

impl DeliberationCoordinator {
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        config: EngineConfig,
        sink: Arc<dyn EventSink>,
        cancel: CancelToken,
        mut rng: DeliberationRng,
    ) -> Result<Self, DeliberationError> {
        config.validate()?;
        let admission = AdmissionControl::new(config.resolved_max_in_flight());
        let session_id = SessionId::generate(&mut rng);
        let recorder = Arc::new(InMemorySink::new());
        let sink: Arc<dyn EventSink> = Arc::new(TeeSink::new(sink, recorder.clone()));
        tracing::debug!(session_id = %session_id, "starting deliberation session");
        Ok(Self {
            ctx: EngineContext {
                gateway,
                config,
                sink,
                cancel,
                admission,
                rng: Arc::new(Mutex::new(rng)),
                session_id,
                recorder,
            },
        })
    }

    /// This session's id (spec §3: `SessionTranscript` is keyed by a
    /// monotonic session id).
    pub fn session_id(&self) -> &SessionId {
        &self.ctx.session_id
    }

    /// `2 ≤ |opinions| ≤ maxGroupSize`; runs exactly one election (spec
    /// §4.1).
    pub async fn single_run(&self, question: Question, opinions: Vec<String>) -> Result<DeliberationResult, DeliberationError> {
        self.run_catching_cancellation(question, opinions, true).await
    }

    /// Runs the full hierarchical procedure, recursing whenever a level has
    /// more than one group (spec §4.1).
    pub async fn recursive(&self, question: Question, opinions: Vec<String>) -> Result<DeliberationResult, DeliberationError> {
        self.run_catching_cancellation(question, opinions, false).await
    }

    async fn run_catching_cancellation(
        &self,
        question: Question,
        opinions: Vec<String>,
        enforce_single_group: bool,
    ) -> Result<DeliberationResult, DeliberationError> {
        match run(&self.ctx, question, opinions, enforce_single_group).await {
            Ok(result) => Ok(result),
            Err(DeliberationError::Cancelled) => {
                self.ctx.sink.emit(Event::Cancelled);
                Ok(DeliberationResult::cancelled(
                    self.ctx.session_id.clone(),
                    self.ctx.recorder.events(),
                ))
            }
            Err(other) => Err(other),
        }
    }
}

fn validate_inputs(
    question: &str,
    opinions: &[String],
    enforce_single_group: bool,
    config: &EngineConfig,
) -> Result<(), DeliberationError> {
    if question.trim().is_empty() {
        return Err(DeliberationError::invalid_input("question must not be empty"));
    }
    if opinions.len() < 2 {
        return Err(DeliberationError::invalid_input("at least two opinions are required"));
    }
    if enforce_single_group && opinions.len() > config.max_group_size as usize {
        return Err(DeliberationError::invalid_input(format!(
            "single_run requires at most {} opinions, got {}",
            config.max_group_size,
            opinions.len()
        )));
    }
    Ok(())
}

async fn run(
    ctx: &EngineContext,
    question: Question,
    opinions: Vec<String>,
    enforce_single_group: bool,
) -> Result<DeliberationResult, DeliberationError> {
    validate_inputs(&question, &opinions, enforce_single_group, &ctx.config)?;

    let all_positions: BTreeSet<ParticipantPosition> =
        (0..opinions.len() as u32).map(ParticipantPosition::new).collect();
    let original_opinions: BTreeMap<ParticipantPosition, String> = all_positions
        .iter()
        .zip(opinions.into_iter())
        .map(|(&position, opinion)| (position, opinion))
        .collect();

    let mut items: Vec<LevelItem> = all_positions
        .iter()
        .map(|&position| LevelItem {
            label: original_opinions[&position].clone(),
            member_positions: BTreeSet::from([position]),
            child: None,
        })
        .collect();

    let mut level: u32 = 0;
    loop {
        if ctx.cancel.is_cancelled() {
            return Err(DeliberationError::Cancelled);
        }

        let groups = {
            let mut rng = ctx.rng.lock().expect("rng mutex poisoned");
            partition(&items, ctx.config.max_group_size as usize, &mut rng)
        };
        tracing::debug!(level, num_groups = groups.len(), "starting level");
        ctx.sink.emit(Event::LevelStart {
            level,
            num_groups: groups.len() as u32,
        });

        let elections = groups.iter().enumerate().map(|(group_index, group_items)| {
            let group_index = group_index as u32;
            run_group_election(ctx, &question, level, group_index, group_items, &original_opinions, &all_positions)
        });
        let mut nodes = try_join_all(elections).await?;

        ctx.sink.emit(Event::LevelDone { level });

        if nodes.len() == 1 {
            let root = nodes.pop().expect("checked len == 1");
            let degraded = tree_has_fallback(&root);
            let winning_statement = root.winning_statement().map(str::to_string);
            ctx.sink.emit(Event::Done {
                winner_statement: winning_statement.clone().unwrap_or_default(),
                degraded,
            });
            return Ok(DeliberationResult {
                kind: RunKind::Completed,
                winning_statement,
                root: Some(root),
                degraded,
                session_id: ctx.session_id.clone(),
                events: ctx.recorder.events(),
            });
        }

        items = nodes
            .into_iter()
            .map(|node| LevelItem {
                label: node.winning_statement().unwrap_or_default().to_string(),
                member_positions: node.member_participant_positions.clone(),
                child: Some(node),
            })
            .collect();
        level += 1;
    }
}

#[tracing::instrument(skip(ctx, question, items, original_opinions, all_positions), fields(level, group_index))]
async fn run_group_election(
    ctx: &EngineContext,
    question: &str,
    level: u32,
    group_index: u32,
    items: &[LevelItem],
    original_opinions: &BTreeMap<ParticipantPosition, String>,
    all_positions: &BTreeSet<ParticipantPosition>,
) -> Result<GroupNode, DeliberationError> {
    let mut node = build_group_node(level, group_index, items);
    ctx.sink.emit(Event::GroupStart {
        level,
        group_index,
        num_members: node.member_participant_positions.len() as u32,
    });

    if ctx.cancel.is_cancelled() {
        return Err(DeliberationError::Cancelled);
    }

    if node.statements.len() < 2 {
        // A singleton group has nothing to elect between; its one member's
        // statement advances unchanged rather than forcing an election over
        // an unsatisfiable K (spec §9: a level strictly reduces group count
        // unless it already contained a single group).
        node.candidates = node.statements.clone();
        let winner = CandidateIndex::new(0);
        node.winner_candidate_index = Some(winner);
        ctx.sink.emit(Event::ElectionDone { level, group_index, winner });
        return Ok(node);
    }

    let k = ctx.config.clamp_num_candidates(node.statements.len());
    node.candidates = generate_candidates(ctx, level, group_index, question, &node.statements, k).await?;

    let voters = voters_for_group(level, &node, ctx.config.voting_strategy, all_positions);
    let oracle_calls = voters.iter().map(|&voter| {
        let opinion = original_opinions.get(&voter).map(String::as_str).unwrap_or_default();
        predict_ranking(ctx, level, group_index, voter, question, opinion, &node.candidates, k)
            .map(move |outcome| outcome.map(|ranking| (voter, ranking)))
    });
    let ballots = try_join_all(oracle_calls).await?;
    node.rankings = ballots.into_iter().collect();

    if ctx.cancel.is_cancelled() {
        return Err(DeliberationError::Cancelled);
    }

    let tabulation = delib_algo::schulze(&node.rankings, k);
    node.winner_candidate_index = Some(tabulation.winner);
    node.pairwise = Some(tabulation.pairwise);
    node.strongest_paths = Some(tabulation.strongest);

    ctx.sink.emit(Event::ElectionDone {
        level,
        group_index,
        winner: tabulation.winner,
    });

    Ok(node)
}

fn build_group_node(level: u32, group_index: u32, items: &[LevelItem]) -> GroupNode {
    let mut members = BTreeSet::new();
    let mut statements = Vec::with_capacity(items.len());
    let mut children = Vec::new();

    for item in items {
        members.extend(item.member_positions.iter().copied());
        statements.push(item.label.clone());
        if let Some(child) = &item.child {
            children.push(child.clone());
        }
    }

    let mut node = GroupNode::new(level, group_index, members, statements);
    if !children.is_empty() {
        node.child_nodes = Some(children);
    }
    node
}

/// Voter population for a group's election (spec §4.2). At level 0, voters
/// are trivially the group's own members — there are no synthetic items yet
/// for a voting strategy to distinguish between. At higher levels the
/// configured strategy decides.
fn voters_for_group(
    level: u32,
    node: &GroupNode,
    strategy: VotingStrategy,
    all_positions: &BTreeSet<ParticipantPosition>,
) -> BTreeSet<ParticipantPosition> {
    if level == 0 {
        return node.member_participant_positions.clone();
    }
    match strategy {
        VotingStrategy::OwnGroupOnly => node.member_participant_positions.clone(),
        VotingStrategy::AllParticipants => all_positions.clone(),
    }
}

fn tree_has_fallback(node: &GroupNode) -> bool {
    if node.rankings.values().any(|ranking| ranking.fallback) {
        return true;
    }
    node.child_nodes
        .as_ref()
        .map(|children| children.iter().any(tree_has_fallback))
        .unwrap_or(false)
}
