//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate so
//! other layers can stay focused on the agent and the tick loop.

pub mod errors;
pub mod session;

pub use errors::{Result, RuntimeError};
pub use session::GameSession;
