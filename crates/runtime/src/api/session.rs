//! Asynchronous abstraction over the game under test.
//!
//! The orchestrator never talks to the game directly. A [`GameSession`]
//! implementation reads the world (a live game bridge, a recorded replay, a
//! scripted fixture) and carries out the agent's commands.
use async_trait::async_trait;
use game_core::{Command, WorldSnapshot};

use super::errors::Result;

#[async_trait]
pub trait GameSession: Send {
    /// Reads the next world snapshot.
    ///
    /// `Ok(None)` ends the run. Errors are treated as transient faults and
    /// retried after a backoff.
    async fn next_snapshot(&mut self) -> Result<Option<WorldSnapshot>>;

    /// Carries out one command in the game.
    async fn execute(&mut self, command: &Command) -> Result<()>;
}
