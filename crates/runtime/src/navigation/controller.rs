//! Path following with stuck and idle recovery.
//!
//! The controller caches one planned path and keeps following it until the
//! live target drifts away from the cached one. Two watchdogs guard against
//! livelock: a displacement counter abandons targets the agent cannot make
//! progress towards, and an idle counter starts a short seeded random walk
//! when the rule list keeps declining to act.

use std::collections::HashSet;
use std::f32::consts::PI;

use game_core::{AgentConfig, CellPos, Command, GridMap, NavigationConfig, WorldPoint};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use super::path::Path;
use super::pathfinder::Pathfinder;

/// Heading and remaining length of an active random walk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RandomWalk {
    pub heading: f32,
    pub remaining: u32,
}

/// Mutable navigation memory, cleared on floor or life boundaries.
///
/// `visited` and `blacklist` are only ever probed, never iterated, so hash
/// ordering cannot leak into decisions.
#[derive(Clone, Debug, Default)]
pub struct NavigationState {
    path: Option<Path>,
    cached_target: Option<WorldPoint>,
    visited: HashSet<CellPos>,
    blacklist: HashSet<CellPos>,
    stuck_ticks: u32,
    idle_ticks: u32,
    last_position: Option<WorldPoint>,
    exploration_target: Option<CellPos>,
    /// The exploration target came from random sampling and may already be visited.
    exploration_sampled: bool,
    random_walk: Option<RandomWalk>,
    replans: u64,
}

impl NavigationState {
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    pub fn cached_target(&self) -> Option<WorldPoint> {
        self.cached_target
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn blacklist_len(&self) -> usize {
        self.blacklist.len()
    }

    pub fn stuck_ticks(&self) -> u32 {
        self.stuck_ticks
    }

    pub fn idle_ticks(&self) -> u32 {
        self.idle_ticks
    }

    pub fn exploration_target(&self) -> Option<CellPos> {
        self.exploration_target
    }

    pub fn exploration_sampled(&self) -> bool {
        self.exploration_sampled
    }

    pub fn random_walk(&self) -> Option<RandomWalk> {
        self.random_walk
    }

    /// Number of A* searches that produced the cached path since the last reset.
    pub fn replans(&self) -> u64 {
        self.replans
    }
}

pub struct NavigationController {
    config: NavigationConfig,
    pathfinder: Pathfinder,
    rng: ChaCha8Rng,
    state: NavigationState,
}

impl NavigationController {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            config: config.navigation.clone(),
            pathfinder: Pathfinder::new(&config.pathfinding),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            state: NavigationState::default(),
        }
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    pub fn pathfinder(&self) -> &Pathfinder {
        &self.pathfinder
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub(crate) fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    /// Forgets everything learned about the current floor.
    ///
    /// The random stream is not reseeded, so a run stays reproducible from
    /// its seed across resets.
    pub fn reset(&mut self) {
        self.state = NavigationState::default();
    }

    /// Records the player's position for this tick.
    ///
    /// Marks the current cell visited and runs the stuck watchdog when the
    /// previous command was expected to move the player. Returns `true` when
    /// the watchdog fired and the current target was abandoned.
    pub fn observe(&mut self, grid: &GridMap, position: WorldPoint, expect_motion: bool) -> bool {
        let cell = grid.world_to_grid(position);
        if grid.contains(cell) {
            self.state.visited.insert(cell);
        }

        let displaced = self
            .state
            .last_position
            .map(|previous| previous.distance(position))
            .unwrap_or(f32::INFINITY);
        self.state.last_position = Some(position);

        if !expect_motion || displaced >= self.config.stuck_displacement {
            self.state.stuck_ticks = 0;
            return false;
        }

        self.state.stuck_ticks += 1;
        if self.state.stuck_ticks < self.config.stuck_ticks {
            return false;
        }

        let abandoned = self
            .state
            .cached_target
            .map(|target| grid.world_to_grid(target))
            .or(self.state.exploration_target);
        warn!(
            target: "runtime::navigation",
            ticks = self.state.stuck_ticks,
            position = %position,
            abandoned = ?abandoned,
            "no progress, abandoning target"
        );
        if let Some(target_cell) = self.state.cached_target.map(|t| grid.world_to_grid(t)) {
            self.state.blacklist.insert(target_cell);
        }
        if let Some(target_cell) = self.state.exploration_target.take() {
            self.state.blacklist.insert(target_cell);
        }
        self.state.exploration_sampled = false;
        self.clear_path();
        self.state.stuck_ticks = 0;
        true
    }

    /// Steers towards `target`, walking straight at it if no route exists.
    ///
    /// The straight walk still counts as pursuing `target`, so the stuck
    /// watchdog can blacklist it.
    pub fn move_toward(&mut self, grid: &GridMap, position: WorldPoint, target: WorldPoint) -> Command {
        match self.follow(grid, position, target) {
            Some(command) => command,
            None => {
                debug!(
                    target: "runtime::navigation",
                    target_point = %target,
                    "no route, walking straight"
                );
                self.state.cached_target = Some(target);
                Command::walk(self.config.angle_convention.heading(position, target))
            }
        }
    }

    /// Steers towards `target` if a route exists; otherwise blacklists the
    /// target's cell and declines.
    pub fn try_move_toward(
        &mut self,
        grid: &GridMap,
        position: WorldPoint,
        target: WorldPoint,
    ) -> Option<Command> {
        let command = self.follow(grid, position, target);
        if command.is_none() {
            let cell = grid.world_to_grid(target);
            debug!(target: "runtime::navigation", cell = %cell, "unreachable, blacklisting");
            self.state.blacklist.insert(cell);
        }
        command
    }

    fn follow(&mut self, grid: &GridMap, position: WorldPoint, target: WorldPoint) -> Option<Command> {
        if self
            .state
            .cached_target
            .is_some_and(|cached| cached.distance(target) > self.config.target_drift)
        {
            self.clear_path();
        }

        if self.state.path.is_none() {
            let path = self.pathfinder.find_path(grid, position, target)?;
            self.state.replans += 1;
            debug!(
                target: "runtime::navigation",
                from = %position,
                to = %target,
                waypoints = path.len(),
                "planned path"
            );
            self.state.path = Some(path);
            self.state.cached_target = Some(target);
        }

        let path = self.state.path.as_mut()?;
        path.trim(position, self.config.waypoint_reach);
        let aim = path.next().unwrap_or(target);
        Some(Command::walk(self.config.angle_convention.heading(position, aim)))
    }

    pub fn clear_path(&mut self) {
        self.state.path = None;
        self.state.cached_target = None;
    }

    pub fn is_visited(&self, cell: CellPos) -> bool {
        self.state.visited.contains(&cell)
    }

    pub fn is_blacklisted(&self, cell: CellPos) -> bool {
        self.state.blacklist.contains(&cell)
    }

    pub fn blacklist(&mut self, cell: CellPos) {
        self.state.blacklist.insert(cell);
    }

    pub fn exploration_target(&self) -> Option<CellPos> {
        self.state.exploration_target
    }

    pub fn commit_exploration(&mut self, cell: CellPos) {
        self.state.exploration_target = Some(cell);
        self.state.exploration_sampled = false;
    }

    /// Commits to a randomly sampled cell. Unlike a frontier cell it stays
    /// committed when already visited, until reached or blacklisted.
    pub fn commit_sampled_exploration(&mut self, cell: CellPos) {
        self.state.exploration_target = Some(cell);
        self.state.exploration_sampled = true;
    }

    pub fn exploration_sampled(&self) -> bool {
        self.state.exploration_sampled
    }

    pub fn release_exploration(&mut self) {
        self.state.exploration_target = None;
        self.state.exploration_sampled = false;
    }

    /// Percentage of walkable cells visited on this floor.
    pub fn coverage_percent(&self, grid: &GridMap) -> f32 {
        let walkable = grid.walkable_count();
        if walkable == 0 {
            return 0.0;
        }
        let visited = self.state.visited.len().min(walkable);
        visited as f32 * 100.0 / walkable as f32
    }

    /// Feeds the idle watchdog with whether the rules produced a command.
    ///
    /// Returns `true` when the idle limit was reached and a random walk was
    /// started.
    pub fn record_outcome(&mut self, actionable: bool) -> bool {
        if actionable {
            self.state.idle_ticks = 0;
            return false;
        }
        self.state.idle_ticks += 1;
        if self.state.idle_ticks < self.config.noop_ticks {
            return false;
        }
        self.state.idle_ticks = 0;
        self.start_random_walk();
        true
    }

    /// Starts a random walk in a seeded random direction and drops any
    /// exploration commitment.
    pub fn start_random_walk(&mut self) {
        let heading = self.rng.gen_range(-PI..PI);
        warn!(
            target: "runtime::navigation",
            heading,
            ticks = self.config.random_walk_ticks,
            "idle too long, starting random walk"
        );
        self.state.random_walk = Some(RandomWalk {
            heading,
            remaining: self.config.random_walk_ticks,
        });
        self.release_exploration();
        self.clear_path();
    }

    pub fn random_walk_active(&self) -> bool {
        self.state.random_walk.is_some_and(|walk| walk.remaining > 0)
    }

    /// Next random-walk step, if a walk is under way.
    pub fn random_walk_step(&mut self) -> Option<Command> {
        let walk = self.state.random_walk.as_mut()?;
        if walk.remaining == 0 {
            self.state.random_walk = None;
            return None;
        }
        walk.remaining -= 1;
        let command = Command::walk(walk.heading);
        if walk.remaining == 0 {
            self.state.random_walk = None;
        }
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_room() -> GridMap {
        GridMap::from_ascii(
            &[
                "##########",
                "#........#",
                "#........#",
                "#........#",
                "#........#",
                "##########",
            ],
            2.0,
        )
        .unwrap()
    }

    fn controller() -> NavigationController {
        NavigationController::new(&AgentConfig::default())
    }

    #[test]
    fn cached_path_is_reused_until_target_drifts() {
        let grid = open_room();
        let mut nav = controller();
        let start = WorldPoint::new(3.0, 3.0);
        let target = WorldPoint::new(15.0, 7.0);

        for _ in 0..5 {
            assert!(nav.try_move_toward(&grid, start, target).is_some());
        }
        assert_eq!(nav.state().replans(), 1);

        // Small drift keeps the cached path.
        nav.move_toward(&grid, start, WorldPoint::new(16.0, 7.5));
        assert_eq!(nav.state().replans(), 1);

        // Large drift replans.
        nav.move_toward(&grid, start, WorldPoint::new(5.0, 9.0));
        assert_eq!(nav.state().replans(), 2);
    }

    #[test]
    fn first_step_heads_along_the_route() {
        let grid = open_room();
        let mut nav = controller();
        // Player in cell (1,2); target straight east along the open middle row.
        let command = nav
            .try_move_toward(&grid, WorldPoint::new(3.0, 5.0), WorldPoint::new(13.0, 5.0))
            .unwrap();
        let heading = command.heading().unwrap();
        assert!((heading - std::f32::consts::FRAC_PI_2).abs() < 1e-4);
        assert!(command.is_movement());
    }

    #[test]
    fn unreachable_target_is_blacklisted() {
        let grid = GridMap::from_ascii(&["..#..", "..#..", "..#.."], 2.0).unwrap();
        let mut nav = controller();
        let target = WorldPoint::new(9.0, 1.0);
        assert!(nav.try_move_toward(&grid, WorldPoint::new(1.0, 1.0), target).is_none());
        assert!(nav.is_blacklisted(CellPos::new(4, 0)));

        // The best-effort variant still walks straight at it.
        let command = nav.move_toward(&grid, WorldPoint::new(1.0, 1.0), target);
        assert!(command.is_movement());
    }

    #[test]
    fn stuck_watchdog_blacklists_after_threshold() {
        let grid = open_room();
        let mut nav = controller();
        let frozen = WorldPoint::new(3.0, 3.0);
        let target = WorldPoint::new(15.0, 7.0);

        let mut fired_at = None;
        for tick in 1..=21 {
            if nav.observe(&grid, frozen, tick > 1) {
                fired_at = Some(tick);
            }
            nav.move_toward(&grid, frozen, target);
        }
        assert_eq!(fired_at, Some(21));
        assert!(nav.is_blacklisted(grid.world_to_grid(target)));
        assert_eq!(nav.state().stuck_ticks(), 0);
    }

    #[test]
    fn straight_walk_target_is_abandoned_when_stuck() {
        let grid = GridMap::from_ascii(&["..#..", "..#..", "..#.."], 2.0).unwrap();
        let mut nav = controller();
        let frozen = WorldPoint::new(1.0, 1.0);
        let target = WorldPoint::new(9.0, 1.0);

        let mut fired_at = None;
        for tick in 1..=21 {
            if nav.observe(&grid, frozen, tick > 1) {
                fired_at = Some(tick);
            }
            assert!(nav.move_toward(&grid, frozen, target).is_movement());
        }
        assert_eq!(fired_at, Some(21));
        assert!(nav.is_blacklisted(CellPos::new(4, 0)));
        assert_eq!(nav.state().replans(), 0);
    }

    #[test]
    fn stationary_commands_do_not_count_as_stuck() {
        let grid = open_room();
        let mut nav = controller();
        for _ in 0..50 {
            assert!(!nav.observe(&grid, WorldPoint::new(3.0, 3.0), false));
        }
        assert_eq!(nav.state().stuck_ticks(), 0);
    }

    #[test]
    fn idle_watchdog_starts_a_bounded_random_walk() {
        let mut nav = controller();
        for _ in 0..39 {
            assert!(!nav.record_outcome(false));
        }
        assert!(nav.record_outcome(false));
        assert!(nav.random_walk_active());

        let steps: Vec<_> = std::iter::from_fn(|| nav.random_walk_step()).collect();
        assert_eq!(steps.len(), 8);
        assert!(steps.iter().all(|step| *step == steps[0] && step.is_movement()));
        assert!(!nav.random_walk_active());
    }

    #[test]
    fn random_walk_heading_depends_only_on_seed() {
        let config = AgentConfig::with_seed(7);
        let mut a = NavigationController::new(&config);
        let mut b = NavigationController::new(&config);
        a.start_random_walk();
        b.start_random_walk();
        assert_eq!(a.state().random_walk(), b.state().random_walk());
    }

    #[test]
    fn coverage_counts_visited_walkable_cells() {
        let grid = open_room();
        let mut nav = controller();
        assert_eq!(nav.coverage_percent(&grid), 0.0);
        nav.observe(&grid, WorldPoint::new(3.0, 3.0), false);
        nav.observe(&grid, WorldPoint::new(5.0, 3.0), false);
        assert!((nav.coverage_percent(&grid) - 2.0 * 100.0 / 32.0).abs() < 1e-4);

        nav.reset();
        assert_eq!(nav.coverage_percent(&grid), 0.0);
    }
}
