//! Recorded sessions.
//!
//! A replay file is JSON lines: one [`WorldSnapshot`] per line, blank lines
//! ignored. [`ReplaySession`] feeds the snapshots to the orchestrator in
//! order and records every command it is asked to execute, so a run can be
//! reproduced and compared offline.

use std::collections::VecDeque;
use std::path::Path;

use async_trait::async_trait;
use game_core::{Command, WorldSnapshot};

use crate::api::{GameSession, Result, RuntimeError};

#[derive(Debug, Default)]
pub struct ReplaySession {
    snapshots: VecDeque<WorldSnapshot>,
    executed: Vec<Command>,
}

impl ReplaySession {
    pub fn new(snapshots: impl IntoIterator<Item = WorldSnapshot>) -> Self {
        Self {
            snapshots: snapshots.into_iter().collect(),
            executed: Vec::new(),
        }
    }

    /// Parse a replay from JSON-lines text.
    pub fn from_json_lines(content: &str) -> Result<Self> {
        let snapshots = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                serde_json::from_str::<WorldSnapshot>(line).map_err(|source| RuntimeError::Replay {
                    line: index + 1,
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::info!("Loaded replay with {} snapshots", snapshots.len());
        Ok(Self::new(snapshots))
    }

    /// Load a replay from a JSON-lines file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| RuntimeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_lines(&content)
    }

    /// Snapshots not yet handed out.
    pub fn remaining(&self) -> usize {
        self.snapshots.len()
    }

    /// Commands executed so far, in order.
    pub fn executed(&self) -> &[Command] {
        &self.executed
    }
}

#[async_trait]
impl GameSession for ReplaySession {
    async fn next_snapshot(&mut self) -> Result<Option<WorldSnapshot>> {
        Ok(self.snapshots.pop_front())
    }

    async fn execute(&mut self, command: &Command) -> Result<()> {
        self.executed.push(*command);
        Ok(())
    }
}

/// Serialize snapshots as JSON lines, the format [`ReplaySession`] reads.
pub fn to_json_lines<'a>(snapshots: impl IntoIterator<Item = &'a WorldSnapshot>) -> Result<String> {
    let mut out = String::new();
    for snapshot in snapshots {
        out.push_str(&serde_json::to_string(snapshot)?);
        out.push('\n');
    }
    Ok(out)
}
