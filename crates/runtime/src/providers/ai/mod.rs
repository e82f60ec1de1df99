//! Rule-based play-testing agent.
//!
//! The agent is a fixed-priority list of rules over a per-tick
//! [`game_core::WorldSnapshot`]:
//!
//! - [`rules`]: consumables, melee, shrine, pickup and the phase objectives
//! - [`boss`]: the boss-fight sub-policy used by the `fight_boss` objective
//! - [`phase`]: which objective the floor currently calls for
//! - [`context`]: the blackboard the rules share between ticks
//! - [`engine`]: wires the rules into a selector and feeds the watchdogs
pub mod boss;
pub mod context;
pub mod engine;
pub mod phase;
pub mod rules;

pub use context::{AgentState, Episode};
pub use engine::DecisionEngine;
pub use phase::Phase;
