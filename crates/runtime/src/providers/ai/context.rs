//! Agent blackboard shared by every rule.
//!
//! [`AgentState`] is everything the agent remembers between ticks. Rules read
//! the snapshot, consult and update this state, and optionally return a
//! command. Nothing here survives a floor or life boundary except the
//! configuration and the random stream inside the navigation controller.

use game_core::{AgentConfig, Command, WorldSnapshot};
use tracing::info;

use super::phase::Phase;
use crate::navigation::{ExplorationStrategy, NavigationController};

/// Floor and life the agent's memory belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Episode {
    pub floor: u32,
    pub deaths: u32,
}

impl Episode {
    pub fn of(snapshot: &WorldSnapshot) -> Self {
        Self {
            floor: snapshot.floor,
            deaths: snapshot.deaths,
        }
    }
}

pub struct AgentState {
    pub config: AgentConfig,
    pub nav: NavigationController,
    pub exploration: ExplorationStrategy,
    pub phase: Phase,
    /// Human-readable reason for the last command.
    pub rationale: String,
    /// Interactions attempted on the current floor's shrine.
    pub shrine_attempts: u32,
    pub last_command: Command,
    episode: Option<Episode>,
}

impl AgentState {
    pub fn new(config: AgentConfig) -> Self {
        Self {
            nav: NavigationController::new(&config),
            exploration: ExplorationStrategy::new(&config.navigation),
            phase: Phase::Explore,
            rationale: String::new(),
            shrine_attempts: 0,
            last_command: Command::Noop,
            episode: None,
            config,
        }
    }

    pub fn episode(&self) -> Option<Episode> {
        self.episode
    }

    /// Prepares the state for a new tick.
    ///
    /// Resets all per-floor memory when the snapshot belongs to a different
    /// floor or life than the previous one, then feeds the stuck watchdog and
    /// recomputes the phase.
    pub fn begin_tick(&mut self, snapshot: &WorldSnapshot) {
        let episode = Episode::of(snapshot);
        if self.episode != Some(episode) {
            if let Some(previous) = self.episode {
                info!(
                    target: "runtime::agent",
                    from_floor = previous.floor,
                    to_floor = episode.floor,
                    deaths = episode.deaths,
                    "floor or life changed, resetting agent memory"
                );
            }
            self.reset();
            self.episode = Some(episode);
        }

        let expect_motion = self.last_command.is_movement() && !snapshot.boss_fight_active();
        self.nav
            .observe(&snapshot.grid, snapshot.position(), expect_motion);
        self.phase = Phase::determine(snapshot, self);
    }

    /// Hard reset of everything scoped to one floor and life.
    pub fn reset(&mut self) {
        self.nav.reset();
        self.shrine_attempts = 0;
        self.last_command = Command::Noop;
        self.phase = Phase::Explore;
    }

    pub fn explain(&mut self, rationale: impl Into<String>) {
        self.rationale = rationale.into();
    }
}
