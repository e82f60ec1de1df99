//! Loading agent tunables from disk.

use std::path::Path;

use game_core::AgentConfig;

use crate::api::{Result, RuntimeError};

/// Load an [`AgentConfig`] from a RON file.
///
/// Sections and fields left out of the file keep their defaults, so a file
/// containing only `(seed: 7)` is valid.
pub fn load_agent_config(path: &Path) -> Result<AgentConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| RuntimeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_agent_config(&content)
}

/// Parse an [`AgentConfig`] from RON text.
pub fn parse_agent_config(content: &str) -> Result<AgentConfig> {
    ron::from_str(content).map_err(|e| {
        RuntimeError::InvalidConfig(format!("Failed to parse agent config RON: {}", e))
    })
}
