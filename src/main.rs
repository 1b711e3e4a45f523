//! Splendor between two language-model agents.
//!
//! Starts a fresh game, or resumes an interrupted one from its event log.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use ai_splendor::core::{GameConfig, GameRng, ProviderCredentials};
use ai_splendor::events::reconstruct;
use ai_splendor::provider::{LlmMoveProvider, MoveProvider, OpenRouterClient};
use ai_splendor::sim::{
    new_game_id, RetryPolicy, SimulationLoop, SimulationOptions, SimulationOutcome, StdinGate,
};
use ai_splendor::{setup_game, EventLog, GameState, Result, SplendorRules};

/// Splendor played by language models
#[derive(Parser, Debug)]
#[command(name = "ai-splendor")]
#[command(about = "Run a Splendor game between two language-model agents", long_about = None)]
struct Args {
    /// TOML configuration file (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Resume the game recorded in this event log
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Shuffle seed for a fresh game (overrides the configuration)
    #[arg(long, conflicts_with = "resume")]
    seed: Option<u64>,
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    let config = GameConfig::load(args.config.as_deref());
    init_tracing(config.as_ref().is_ok_and(|c| c.debug));

    let outcome = config
        .map_err(ai_splendor::Error::from)
        .and_then(|config| run(&args, config));

    match outcome {
        Ok(outcome) => {
            info!(
                rounds = outcome.rounds_played,
                forfeits = outcome.forfeited_turns,
                aborted = outcome.aborted,
                "run finished"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "run failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, mut config: GameConfig) -> Result<SimulationOutcome> {
    let credentials = ProviderCredentials::from_env()?;
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    let (game_id, state, models) = match &args.resume {
        Some(path) => {
            let point = reconstruct(path)?;
            let game_id = point.resumed_game_id();
            info!(
                original = %point.game_id,
                %game_id,
                turn = point.state.turn,
                player = %point.state.current_player,
                "resuming game"
            );
            (game_id, point.state, point.models)
        }
        None => {
            let seed = config.seed.unwrap_or_else(GameRng::random_seed);
            info!(seed, "setting up new game");
            let state: GameState = setup_game(&GameRng::new(seed))?;
            (new_game_id(), state, config.models().to_vec())
        }
    };

    let providers = build_providers(&credentials, &config, &models)?;
    info!(
        semi_auto = config.semi_auto,
        debug = config.debug,
        log_dir = %config.log_dir.display(),
        "run configured"
    );

    let log = EventLog::create(&config.log_dir, &game_id)?;
    let mut sim = SimulationLoop::new(SplendorRules::new(), providers, log)
        .with_policy(RetryPolicy::from(&config.retry))
        .with_options(SimulationOptions::from_config(&config));
    if config.semi_auto {
        sim = sim.with_gate(Box::new(StdinGate));
    }

    Ok(sim.run(&game_id, state)?)
}

/// One OpenRouter-backed provider per model, reasoning options by seat.
fn build_providers(
    credentials: &ProviderCredentials,
    config: &GameConfig,
    models: &[String],
) -> Result<Vec<Box<dyn MoveProvider>>> {
    let seats = config.players();
    models
        .iter()
        .enumerate()
        .map(|(seat, model)| -> Result<Box<dyn MoveProvider>> {
            let reasoning = seats
                .get(seat)
                .map(|p| p.reasoning.clone())
                .unwrap_or_default();
            let effort = if reasoning.enabled {
                reasoning.effort.as_str()
            } else {
                "disabled"
            };
            info!(seat, %model, reasoning = effort, "configured player");
            let client = OpenRouterClient::new(credentials, config.retry.request_timeout_ms)?;
            Ok(Box::new(LlmMoveProvider::new(model.clone(), reasoning, client)))
        })
        .collect()
}
