//! Lightweight priority rule tree for tick-driven agents.
//!
//! A tree is evaluated once per tick against a read-only input (the world
//! observation) and a mutable state (the agent's memory). Every node either
//! produces an output or declines, so a tree behaves like an ordered list of
//! guarded rules where the first rule that produces an output wins.
//!
//! - **No delta time**: every tick completes immediately
//! - **No Running state**: a node answers or declines within the tick
//! - **Zero dependencies**: pure Rust with no external crates
//!
//! # Architecture
//!
//! - [`Behavior`]: core trait for all nodes
//! - [`Rule`]: adapts a plain function into a node
//! - Composite nodes: [`Selector`]
//! - Decorator nodes: [`Guard`]
//! - Builders: [`rule`], [`guard`]
//! - [`Decision`]: the winning output tagged with the label of its branch

pub mod behavior;
pub mod builder;
pub mod composite;
pub mod decision;
pub mod decorator;

// Re-export core types for ergonomic API
pub use behavior::{Behavior, Rule};
pub use builder::{guard, rule};
pub use composite::Selector;
pub use decision::Decision;
pub use decorator::Guard;
