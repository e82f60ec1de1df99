//! Frontier exploration with a committed target.
//!
//! The agent holds one frontier cell as its exploration target until it is
//! reached, visited on the way, or blacklisted. Only then is the frontier
//! recomputed and a new target chosen, nearest first. A randomly sampled
//! target may already be visited, so it is held until reached or blacklisted.

use game_core::{CellPos, Command, GridMap, MoveKeys, NavigationConfig, WorldPoint};
use rand::Rng;
use tracing::debug;

use super::controller::NavigationController;

/// How an exploration step was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ExploreMode {
    /// Still heading for the committed target.
    Committed,
    /// Committed to a new frontier cell this tick.
    Frontier,
    /// No frontier cell routed; committed to a random cell.
    RandomSample,
    /// Nothing routed at all.
    ForwardWalk,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExploreStep {
    pub command: Command,
    pub mode: ExploreMode,
    pub target: Option<CellPos>,
}

#[derive(Clone, Debug)]
pub struct ExplorationStrategy {
    frontier_candidates: usize,
    random_samples: usize,
    target_reached: f32,
}

impl ExplorationStrategy {
    pub fn new(config: &NavigationConfig) -> Self {
        Self {
            frontier_candidates: config.frontier_candidates,
            random_samples: config.random_samples,
            target_reached: config.target_reached,
        }
    }

    /// Frontier cells ranked by Euclidean distance from `position`.
    ///
    /// The grid is scanned row-major and the sort is stable, so equally
    /// distant cells keep scan order.
    pub fn frontier(
        &self,
        nav: &NavigationController,
        grid: &GridMap,
        position: WorldPoint,
    ) -> Vec<CellPos> {
        let mut candidates: Vec<(f32, CellPos)> = grid
            .walkable_cells()
            .filter(|&cell| !nav.is_visited(cell) && !nav.is_blacklisted(cell))
            .filter(|&cell| cell.neighbors4().iter().any(|&n| nav.is_visited(n)))
            .map(|cell| (grid.grid_to_world(cell).distance_squared(position), cell))
            .collect();
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0));
        candidates.into_iter().map(|(_, cell)| cell).collect()
    }

    pub fn explore(
        &self,
        nav: &mut NavigationController,
        grid: &GridMap,
        position: WorldPoint,
    ) -> ExploreStep {
        if let Some(target) = nav.exploration_target() {
            let center = grid.grid_to_world(target);
            let lapsed = center.distance(position) < self.target_reached
                || (nav.is_visited(target) && !nav.exploration_sampled())
                || nav.is_blacklisted(target);
            if !lapsed && let Some(command) = nav.try_move_toward(grid, position, center) {
                return ExploreStep {
                    command,
                    mode: ExploreMode::Committed,
                    target: Some(target),
                };
            }
            debug!(target: "runtime::navigation", cell = %target, "exploration target lapsed");
            nav.release_exploration();
        }

        nav.clear_path();
        let frontier = self.frontier(nav, grid, position);
        for &cell in frontier.iter().take(self.frontier_candidates) {
            if let Some(command) = nav.try_move_toward(grid, position, grid.grid_to_world(cell)) {
                debug!(
                    target: "runtime::navigation",
                    cell = %cell,
                    frontier = frontier.len(),
                    "committed to frontier cell"
                );
                nav.commit_exploration(cell);
                return ExploreStep {
                    command,
                    mode: ExploreMode::Frontier,
                    target: Some(cell),
                };
            }
        }

        if let Some(step) = self.random_sample(nav, grid, position) {
            return step;
        }

        debug!(target: "runtime::navigation", "nothing routes, walking forward");
        ExploreStep {
            command: Command::Move {
                keys: MoveKeys::FORWARD,
            },
            mode: ExploreMode::ForwardWalk,
            target: None,
        }
    }

    fn random_sample(
        &self,
        nav: &mut NavigationController,
        grid: &GridMap,
        position: WorldPoint,
    ) -> Option<ExploreStep> {
        let (width, height) = (grid.width() as i32, grid.height() as i32);
        if width == 0 || height == 0 {
            return None;
        }
        let here = grid.world_to_grid(position);

        for _ in 0..self.random_samples {
            let cell = CellPos::new(nav.rng().gen_range(0..width), nav.rng().gen_range(0..height));
            if cell == here || !grid.is_walkable(cell) || nav.is_blacklisted(cell) {
                continue;
            }
            if let Some(command) = nav.try_move_toward(grid, position, grid.grid_to_world(cell)) {
                debug!(target: "runtime::navigation", cell = %cell, "committed to random cell");
                nav.commit_sampled_exploration(cell);
                return Some(ExploreStep {
                    command,
                    mode: ExploreMode::RandomSample,
                    target: Some(cell),
                });
            }
        }
        None
    }
}
