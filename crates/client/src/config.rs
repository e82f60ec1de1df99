//! Playtest binary configuration, read from the environment.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use runtime::RuntimeConfig;

/// Settings for one playtest run.
#[derive(Clone, Debug, Default)]
pub struct PlaytestConfig {
    /// JSON-lines snapshot recording to replay.
    pub replay: Option<PathBuf>,
    /// RON file with agent tunables; defaults apply when unset.
    pub agent_config: Option<PathBuf>,
    /// Overrides the seed from the agent config.
    pub seed: Option<u64>,
    pub runtime: RuntimeConfig,
    pub session_id: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl PlaytestConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `PLAYTEST_REPLAY` - Snapshot recording to replay
    /// - `PLAYTEST_AGENT_CONFIG` - Agent tunables in RON (default: built-in)
    /// - `PLAYTEST_SEED` - RNG seed override
    /// - `PLAYTEST_TICK_MS` - Pause between ticks (default: 100)
    /// - `PLAYTEST_BACKOFF_MS` - Pause after a faulted tick (default: 500)
    /// - `PLAYTEST_MAX_TICKS` - Stop after this many ticks (default: unbounded)
    /// - `PLAYTEST_SESSION_ID` - Log subdirectory name (default: timestamp)
    /// - `PLAYTEST_LOG_DIR` - Log root (default: platform cache dir)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let parse = |key: &str| read(key).and_then(|value| value.trim().parse::<u64>().ok());

        let mut config = Self::default();
        config.replay = read("PLAYTEST_REPLAY").map(PathBuf::from);
        config.agent_config = read("PLAYTEST_AGENT_CONFIG").map(PathBuf::from);
        config.seed = parse("PLAYTEST_SEED");

        if let Some(ms) = parse("PLAYTEST_TICK_MS") {
            config.runtime.tick_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = parse("PLAYTEST_BACKOFF_MS") {
            config.runtime.error_backoff = Duration::from_millis(ms);
        }
        config.runtime.max_ticks = parse("PLAYTEST_MAX_TICKS");

        config.session_id = read("PLAYTEST_SESSION_ID");
        config.log_dir = read("PLAYTEST_LOG_DIR").map(PathBuf::from);
        config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> PlaytestConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PlaytestConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_variables() {
        let config = config(&[]);
        assert!(config.replay.is_none());
        assert!(config.seed.is_none());
        assert_eq!(config.runtime, RuntimeConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("PLAYTEST_REPLAY", "runs/floor1.jsonl"),
            ("PLAYTEST_TICK_MS", "0"),
            ("PLAYTEST_MAX_TICKS", "500"),
            ("PLAYTEST_SEED", "99"),
            ("PLAYTEST_BACKOFF_MS", "soon"),
        ]);
        assert_eq!(config.replay, Some(PathBuf::from("runs/floor1.jsonl")));
        assert_eq!(config.runtime.tick_interval, Duration::ZERO);
        assert_eq!(config.runtime.max_ticks, Some(500));
        assert_eq!(config.seed, Some(99));
        // Unparseable values fall back to the default.
        assert_eq!(
            config.runtime.error_backoff,
            RuntimeConfig::default().error_backoff
        );
    }
}
