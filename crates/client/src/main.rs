//! Play-testing agent binary.
//!
//! Replays a recorded snapshot stream through the orchestrator and prints
//! the run report as JSON on stdout.
//!
//! ```bash
//! PLAYTEST_REPLAY=runs/floor1.jsonl PLAYTEST_TICK_MS=0 cargo run -p dungeon-playtest
//! ```
//!
//! The replay path may also be given as the first argument.
mod config;
mod logging;

use anyhow::{Context, Result};
use game_core::AgentConfig;
use runtime::{Orchestrator, ReplaySession};

use crate::config::PlaytestConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let mut config = PlaytestConfig::from_env();
    if let Some(path) = std::env::args_os().nth(1) {
        config.replay = Some(path.into());
    }

    let _guard = logging::setup_logging(&config)?;

    let mut agent = match &config.agent_config {
        Some(path) => runtime::load_agent_config(path)
            .with_context(|| format!("loading agent config {}", path.display()))?,
        None => AgentConfig::default(),
    };
    if let Some(seed) = config.seed {
        agent.seed = seed;
    }

    let replay = config
        .replay
        .as_deref()
        .context("no replay given; set PLAYTEST_REPLAY or pass a path")?;
    let mut session = ReplaySession::load_from_file(replay)
        .with_context(|| format!("loading replay {}", replay.display()))?;
    tracing::info!("Replaying {} snapshots from {}", session.remaining(), replay.display());

    let report = Orchestrator::builder()
        .config(config.runtime.clone())
        .agent_config(agent)
        .build()
        .run(&mut session)
        .await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
