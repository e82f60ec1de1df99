//! Per-tick decision making.

use behavior_tree::{Behavior, Selector, guard, rule};
use game_core::{AgentConfig, Command, WorldSnapshot};
use tracing::debug;

use super::context::AgentState;
use super::phase::Phase;
use super::rules;
use crate::navigation::NavigationState;

type AgentRule = Box<dyn Behavior<WorldSnapshot, AgentState, Command>>;

/// Turns one snapshot into one command.
///
/// Rules are evaluated in strict priority order and the first one that
/// produces a command wins:
///
/// 1. stay put while dead
/// 2. consumables
/// 3. melee against nearby hostiles
/// 4. shrine interaction
/// 5. opportunistic item pickup
/// 6. a running random walk
/// 7. the objective for the current [`Phase`]
///
/// When nothing applies the engine returns [`Command::Noop`]. Every `Noop`
/// outside of death counts towards the idle watchdog, including a rule
/// deliberately holding still.
///
/// Given the same configuration and the same sequence of snapshots, the
/// engine produces the same sequence of commands.
pub struct DecisionEngine {
    rules: Selector<WorldSnapshot, AgentState, Command>,
    state: AgentState,
    last_rule: &'static str,
    coverage: f32,
}

impl DecisionEngine {
    pub fn new(config: AgentConfig) -> Self {
        Self {
            rules: rule_list(),
            state: AgentState::new(config),
            last_rule: "",
            coverage: 0.0,
        }
    }

    pub fn decide(&mut self, snapshot: &WorldSnapshot) -> Command {
        self.state.begin_tick(snapshot);

        let (mut label, mut command) = match self.rules.select(snapshot, &mut self.state) {
            Some(decision) => (decision.label, decision.output),
            None => {
                self.state.explain("no rule applies");
                ("idle", Command::Noop)
            }
        };

        // Holding still counts towards the idle watchdog unless the player
        // is dead, whichever rule chose it.
        let actionable = !command.is_noop() || label == "dead";
        if self.state.nav.record_outcome(actionable) {
            command = self.state.nav.random_walk_step().unwrap_or_default();
            label = "watchdog";
            self.state.explain("idle watchdog fired, random walk");
        }

        self.state.last_command = command;
        self.last_rule = label;
        self.coverage = self.state.nav.coverage_percent(&snapshot.grid);

        debug!(
            target: "runtime::agent",
            tick_ms = snapshot.timestamp_ms,
            phase = %self.state.phase,
            rule = label,
            command = command.name(),
            "{}",
            self.state.rationale
        );
        command
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Why the last command was chosen.
    pub fn rationale(&self) -> &str {
        &self.state.rationale
    }

    /// Label of the rule that produced the last command.
    pub fn last_rule(&self) -> &'static str {
        self.last_rule
    }

    /// Share of the current floor's walkable cells visited so far.
    pub fn coverage_percent(&self) -> f32 {
        self.coverage
    }

    pub fn navigation(&self) -> &NavigationState {
        self.state.nav.state()
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn config(&self) -> &AgentConfig {
        &self.state.config
    }

    /// Rule labels in evaluation order.
    pub fn rule_labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.labels()
    }
}

fn in_phase(phase: Phase) -> impl Fn(&WorldSnapshot, &AgentState) -> bool + Send + Sync + 'static {
    move |_: &WorldSnapshot, state: &AgentState| state.phase == phase
}

fn walking(_: &WorldSnapshot, state: &AgentState) -> bool {
    state.nav.random_walk_active()
}

fn rule_list() -> Selector<WorldSnapshot, AgentState, Command> {
    let children: Vec<(&'static str, AgentRule)> = vec![
        ("dead", rule(rules::dead)),
        ("utility_items", rule(rules::utility_items)),
        ("melee", rule(rules::melee_engagement)),
        ("shrine", rule(rules::shrine_interaction)),
        ("pickup", rule(rules::opportunistic_pickup)),
        ("random_walk", guard(walking, rule(rules::random_walk_recovery))),
        ("get_key", guard(in_phase(Phase::GetKey), rule(rules::get_key))),
        (
            "get_shrine",
            guard(in_phase(Phase::GetShrine), rule(rules::get_shrine)),
        ),
        (
            "fight_boss",
            guard(in_phase(Phase::FightBoss), rule(rules::fight_boss)),
        ),
        ("ascend", guard(in_phase(Phase::Ascend), rule(rules::ascend))),
        ("explore", guard(in_phase(Phase::Explore), rule(rules::explore))),
    ];
    Selector::new(children)
}

#[cfg(test)]
mod tests {
    use game_core::{BossState, GridMap, ItemKind, WorldItem, WorldPoint};

    use super::*;

    fn room() -> GridMap {
        GridMap::from_ascii(
            &[
                "########",
                "#......#",
                "#......#",
                "#......#",
                "########",
            ],
            2.0,
        )
        .unwrap()
    }

    #[test]
    fn rules_are_in_priority_order() {
        let engine = DecisionEngine::new(AgentConfig::default());
        let labels: Vec<_> = engine.rule_labels().collect();
        assert_eq!(
            labels,
            [
                "dead",
                "utility_items",
                "melee",
                "shrine",
                "pickup",
                "random_walk",
                "get_key",
                "get_shrine",
                "fight_boss",
                "ascend",
                "explore"
            ]
        );
    }

    #[test]
    fn floor_change_clears_navigation_memory() {
        let mut engine = DecisionEngine::new(AgentConfig::default());
        let mut snapshot = WorldSnapshot::new(room(), WorldPoint::new(3.0, 3.0));
        snapshot.flags.has_boss_key = true;

        engine.decide(&snapshot);
        snapshot.player.position = WorldPoint::new(5.0, 3.0);
        engine.decide(&snapshot);
        assert_eq!(engine.navigation().visited_count(), 2);
        assert!(engine.navigation().exploration_target().is_some());

        snapshot.floor = 1;
        snapshot.player.position = WorldPoint::new(9.0, 5.0);
        engine.decide(&snapshot);
        assert_eq!(engine.navigation().visited_count(), 1);
        assert_eq!(engine.state().episode().map(|e| e.floor), Some(1));
    }

    #[test]
    fn death_resets_shrine_attempts() {
        let mut engine = DecisionEngine::new(AgentConfig::default());
        let mut snapshot = WorldSnapshot::new(room(), WorldPoint::new(3.0, 3.0));
        snapshot.shrine = Some(WorldPoint::new(4.0, 3.0));

        for _ in 0..3 {
            assert_eq!(engine.decide(&snapshot), Command::Interact);
            assert_eq!(engine.last_rule(), "shrine");
        }
        assert_ne!(engine.decide(&snapshot), Command::Interact);
        assert_eq!(engine.state().shrine_attempts, 3);

        snapshot.deaths = 1;
        assert_eq!(engine.decide(&snapshot), Command::Interact);
        assert_eq!(engine.state().shrine_attempts, 1);
        assert_eq!(engine.state().episode().map(|e| e.deaths), Some(1));
    }

    #[test]
    fn dead_player_holds_still() {
        let mut engine = DecisionEngine::new(AgentConfig::default());
        let mut snapshot = WorldSnapshot::new(room(), WorldPoint::new(3.0, 3.0));
        snapshot.vitals.hp = 0.0;
        snapshot.inventory = vec![ItemKind::Potion];
        // Respawn can take a while; the idle watchdog must not kick in.
        for _ in 0..50 {
            assert_eq!(engine.decide(&snapshot), Command::Noop);
            assert_eq!(engine.last_rule(), "dead");
        }
    }

    #[test]
    fn long_telegraph_hold_trips_idle_watchdog() {
        let mut engine = DecisionEngine::new(AgentConfig::default());
        let mut snapshot = WorldSnapshot::new(room(), WorldPoint::new(3.0, 3.0));
        snapshot.flags.boss_active = true;
        snapshot.boss = Some(BossState {
            position: WorldPoint::new(13.0, 3.0),
            hp: 100.0,
            max_hp: 100.0,
            active: true,
            telegraphing: true,
            ..BossState::default()
        });

        for _ in 1..40 {
            assert_eq!(engine.decide(&snapshot), Command::Noop);
            assert_eq!(engine.last_rule(), "fight_boss");
        }
        assert!(engine.decide(&snapshot).is_movement());
        assert_eq!(engine.last_rule(), "watchdog");

        assert!(engine.decide(&snapshot).is_movement());
        assert_eq!(engine.last_rule(), "random_walk");
    }

    #[test]
    fn pickup_marks_phase() {
        let mut engine = DecisionEngine::new(AgentConfig::default());
        let mut snapshot = WorldSnapshot::new(room(), WorldPoint::new(3.0, 3.0));
        snapshot.items.push(WorldItem {
            position: WorldPoint::new(9.0, 5.0),
            kind: ItemKind::Torch,
        });
        assert!(engine.decide(&snapshot).is_movement());
        assert_eq!(engine.phase(), Phase::PickupItem);
        assert!(engine.rationale().contains("torch"));
    }

    #[test]
    fn coverage_tracks_visited_cells() {
        let mut engine = DecisionEngine::new(AgentConfig::default());
        let snapshot = WorldSnapshot::new(room(), WorldPoint::new(3.0, 3.0));
        engine.decide(&snapshot);
        assert!((engine.coverage_percent() - 100.0 / 18.0).abs() < 1e-3);
        assert_eq!(engine.navigation().visited_count(), 1);
    }
}
