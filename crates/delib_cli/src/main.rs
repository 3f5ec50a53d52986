// crates/delib_cli/src/main.rs
//
// Drives one deliberation session against an HTTP model gateway: parses
// flags, assembles an EngineConfig, wires a DeliberationCoordinator, prints
// the event stream as it arrives, and reports the final result.

mod args;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;

use args::{collect_opinions, parse_and_validate};
use delib_core::{DeliberationRng, Event, EventSink, NullSink};
use delib_engine::{DeliberationCoordinator, RunKind};
use delib_gateway::{CancelToken, HttpModelGateway};

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("delib: error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run() -> anyhow::Result<ExitCode> {
    let (args, config) = parse_and_validate().context("parsing arguments")?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let opinions = collect_opinions(&args).context("collecting opinions")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;

    runtime.block_on(async_main(args, config, opinions))
}

async fn async_main(
    args: args::Args,
    config: delib_core::EngineConfig,
    opinions: Vec<String>,
) -> anyhow::Result<ExitCode> {
    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let gateway = Arc::new(HttpModelGateway::new());
    let sink: Arc<dyn EventSink> = if args.quiet {
        Arc::new(NullSink)
    } else {
        Arc::new(PrintingSink)
    };
    let rng = DeliberationRng::from_seed_u64(args.seed);

    let coordinator = DeliberationCoordinator::new(gateway, config, sink, cancel, rng)
        .context("building deliberation coordinator")?;

    let result = if args.recursive {
        coordinator.recursive(args.question, opinions).await
    } else {
        coordinator.single_run(args.question, opinions).await
    }
    .context("running deliberation session")?;

    match result.kind {
        RunKind::Completed => {
            let statement = result.winning_statement.unwrap_or_default();
            println!("winner: {statement}");
            if result.degraded {
                println!("note: one or more rankings fell back to a random permutation");
            }
            Ok(ExitCode::from(0))
        }
        RunKind::Cancelled => {
            eprintln!("delib: session cancelled");
            Ok(ExitCode::from(130))
        }
    }
}

/// Prints every event as it arrives; `--quiet` swaps this for a silent
/// `NullSink` since the final result is all that's printed either way (the
/// result's own `events` field still carries the full log if needed).
struct PrintingSink;

impl EventSink for PrintingSink {
    fn emit(&self, event: Event) {
        match event {
            Event::LevelStart { level, num_groups } => {
                println!("level {level}: {num_groups} group(s)");
            }
            Event::GroupStart { level, group_index, num_members } => {
                println!("  group {level}.{group_index}: {num_members} member(s)");
            }
            Event::CandidateDone { level, group_index, candidate_index } => {
                println!("    candidate {level}.{group_index}.{candidate_index} ready");
            }
            Event::OracleFallback { level, group_index, voter } => {
                println!("    voter {voter} at {level}.{group_index}: fallback ranking");
            }
            Event::ElectionDone { level, group_index, winner } => {
                println!("  group {level}.{group_index} elected {winner}");
            }
            Event::Done { winner_statement, degraded } => {
                println!("done (degraded={degraded}): {winner_statement}");
            }
            Event::Cancelled => println!("cancelled"),
            _ => {}
        }
    }
}
