// crates/delib_cli/src/args.rs
//
// CLI argument parsing & validation: either a TOML config file (--config)
// supplies the full EngineConfig, or individual --generation-* / --ranking-*
// flags build one programmatically. Opinions come from repeated --opinion
// flags or a newline-delimited --opinions-file.

use std::{fs, path::PathBuf};

use clap::Parser;
use delib_core::{EngineConfig, VotingStrategy};

#[derive(Debug, Parser)]
#[command(name = "delib", about = "Run a deliberation session against a model gateway")]
pub struct Args {
    /// The question participants are opining on.
    #[arg(long)]
    pub question: String,

    /// One participant opinion; repeat for each participant.
    #[arg(long = "opinion")]
    pub opinions: Vec<String>,

    /// Newline-delimited opinions file, used in addition to any --opinion flags.
    #[arg(long)]
    pub opinions_file: Option<PathBuf>,

    /// TOML file overriding any subset of EngineConfig's fields; CLI flags
    /// below still apply, layered on top of the file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub generation_endpoint: Option<String>,
    #[arg(long)]
    pub generation_model: Option<String>,
    #[arg(long)]
    pub ranking_endpoint: Option<String>,
    #[arg(long)]
    pub ranking_model: Option<String>,

    #[arg(long)]
    pub num_candidates: Option<u32>,
    #[arg(long)]
    pub max_group_size: Option<u32>,
    #[arg(long)]
    pub max_in_flight: Option<usize>,
    #[arg(long, value_parser = ["own-group-only", "all-participants"])]
    pub voting_strategy: Option<String>,

    /// Run the hierarchical procedure instead of a single election; required
    /// whenever there are more opinions than the effective max group size.
    #[arg(long)]
    pub recursive: bool,

    /// Seed for the deterministic RNG driving shuffles and fallback permutations.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    #[arg(long)]
    pub quiet: bool,
}

#[derive(Debug)]
pub enum CliError {
    Io(PathBuf, std::io::Error),
    BadConfig(toml::de::Error),
    BadVotingStrategy(String),
    NoOpinions,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Io(path, e) => write!(f, "cannot read {}: {e}", path.display()),
            CliError::BadConfig(e) => write!(f, "invalid config file: {e}"),
            CliError::BadVotingStrategy(s) => write!(f, "unknown voting strategy: {s}"),
            CliError::NoOpinions => write!(f, "at least one --opinion or --opinions-file entry is required"),
        }
    }
}

impl std::error::Error for CliError {}

/// Parse CLI flags and assemble the final `(EngineConfig, question, opinions)`
/// triple. A `--config` file, if given, is the base; CLI flags override its
/// fields one at a time.
pub fn parse_and_validate() -> Result<(Args, EngineConfig), CliError> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| CliError::Io(path.clone(), e))?;
            toml::from_str::<EngineConfig>(&text).map_err(CliError::BadConfig)?
        }
        None => EngineConfig::default(),
    };

    apply_overrides(&mut config, &args)?;

    if args.opinions.is_empty() && args.opinions_file.is_none() {
        return Err(CliError::NoOpinions);
    }

    Ok((args, config))
}

fn apply_overrides(config: &mut EngineConfig, args: &Args) -> Result<(), CliError> {
    if let Some(endpoint) = &args.generation_endpoint {
        config.generation.endpoint = endpoint.clone();
    }
    if let Some(model) = &args.generation_model {
        config.generation.model = model.clone();
    }
    if let Some(endpoint) = &args.ranking_endpoint {
        config.ranking.endpoint = endpoint.clone();
    }
    if let Some(model) = &args.ranking_model {
        config.ranking.model = model.clone();
    }
    if let Some(k) = args.num_candidates {
        config.num_candidates = k;
    }
    if let Some(cap) = args.max_group_size {
        config.max_group_size = cap;
    }
    if args.max_in_flight.is_some() {
        config.max_in_flight = args.max_in_flight;
    }
    if let Some(strategy) = &args.voting_strategy {
        config.voting_strategy = match strategy.as_str() {
            "own-group-only" => VotingStrategy::OwnGroupOnly,
            "all-participants" => VotingStrategy::AllParticipants,
            other => return Err(CliError::BadVotingStrategy(other.to_string())),
        };
    }
    Ok(())
}

/// Collect all opinions: repeated `--opinion` flags first, then one per
/// non-blank line of `--opinions-file`.
pub fn collect_opinions(args: &Args) -> Result<Vec<String>, CliError> {
    let mut opinions = args.opinions.clone();
    if let Some(path) = &args.opinions_file {
        let text = fs::read_to_string(path).map_err(|e| CliError::Io(path.clone(), e))?;
        opinions.extend(text.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string));
    }
    Ok(opinions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voting_strategy_override_parses_known_values() {
        let mut config = EngineConfig::default();
        let args = Args {
            question: "q".into(),
            opinions: vec![],
            opinions_file: None,
            config: None,
            generation_endpoint: None,
            generation_model: None,
            ranking_endpoint: None,
            ranking_model: None,
            num_candidates: None,
            max_group_size: None,
            max_in_flight: None,
            voting_strategy: Some("all-participants".into()),
            recursive: false,
            seed: 0,
            quiet: false,
        };
        apply_overrides(&mut config, &args).unwrap();
        assert_eq!(config.voting_strategy, VotingStrategy::AllParticipants);
    }

    #[test]
    fn overrides_replace_only_named_fields() {
        let mut config = EngineConfig::default();
        let args = Args {
            question: "q".into(),
            opinions: vec![],
            opinions_file: None,
            config: None,
            generation_endpoint: Some("http://localhost:11434/api/generate".into()),
            generation_model: None,
            ranking_endpoint: None,
            ranking_model: None,
            num_candidates: Some(6),
            max_group_size: None,
            max_in_flight: None,
            voting_strategy: None,
            recursive: false,
            seed: 0,
            quiet: false,
        };
        apply_overrides(&mut config, &args).unwrap();
        assert_eq!(config.generation.endpoint, "http://localhost:11434/api/generate");
        assert_eq!(config.num_candidates, 6);
        assert_eq!(config.max_group_size, EngineConfig::default().max_group_size);
    }
}
