//! Observation and command vocabulary for the dungeon play-testing agent.
//!
//! `game-core` defines what the agent can see ([`WorldSnapshot`]), what it can
//! do ([`Command`]), and how it is tuned ([`AgentConfig`]). It has no
//! behaviour of its own beyond pure queries, so session drivers can depend on
//! it without pulling in the agent.
pub mod command;
pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod snapshot;

pub use command::{Command, MoveKeys};
pub use config::{
    AgentConfig, AnomalyConfig, BossCombatConfig, DecisionConfig, NavigationConfig,
    PathfindingConfig,
};
pub use error::SnapshotError;
pub use geometry::{AngleConvention, CellPos, WorldPoint, angle_delta, normalize_angle};
pub use grid::{CellKind, GridMap};
pub use snapshot::{
    BossState, Door, Hostile, ItemKind, PlayerState, StatusFlags, Vitals, WorldItem,
    WorldSnapshot,
};
