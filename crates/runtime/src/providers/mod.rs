//! Command providers that drive a play session.

pub mod ai;

pub use ai::{AgentState, DecisionEngine, Phase};
