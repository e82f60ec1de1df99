//! Autonomous play-testing agent and the loop that drives it.
//!
//! This crate turns per-tick [`game_core::WorldSnapshot`]s into
//! [`game_core::Command`]s and watches the snapshot stream for broken game
//! invariants. Consumers embed [`Orchestrator`] with a [`GameSession`] that
//! talks to the game under test.
//!
//! Modules are organized by responsibility:
//! - [`navigation`] plans and follows grid paths and explores unknown floors
//! - [`providers`] hosts the rule-based decision engine
//! - [`anomaly`] checks snapshots against game invariants
//! - [`runtime`] hosts the tick loop and run report
//! - [`api`] exposes the session trait and error types
//! - [`scenario`] replays recorded sessions
pub mod anomaly;
pub mod api;
pub mod config;
pub mod navigation;
pub mod providers;
pub mod runtime;
pub mod scenario;

pub use anomaly::{Anomaly, AnomalyDetector, AnomalyKind, Severity};
pub use api::{GameSession, Result, RuntimeError};
pub use config::load_agent_config;
pub use navigation::{
    ExplorationStrategy, NavigationController, NavigationState, Path, Pathfinder, Route,
};
pub use providers::{AgentState, DecisionEngine, Phase};
pub use runtime::{Orchestrator, OrchestratorBuilder, RunReport, RuntimeConfig, Tick};
pub use scenario::ReplaySession;
