//! Wall-aware A* over the walkable grid.
//!
//! Movement is 4-connected. Entering a cell costs `1 + wall_penalty * walls`
//! where `walls` counts walls among the cell's eight neighbours, so routes
//! prefer corridor centers over hugging walls. The Manhattan heuristic never
//! overestimates because every step costs at least one.
//!
//! Unwalkable goals are replaced by the nearest walkable cell found on the
//! concentric square rings around them, up to `substitute_radius`.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use game_core::{CellPos, GridMap, PathfindingConfig, WorldPoint};

use super::path::{Path, Route};

#[derive(Clone, Debug)]
pub struct Pathfinder {
    wall_penalty: f32,
    substitute_radius: u32,
}

impl Pathfinder {
    pub fn new(config: &PathfindingConfig) -> Self {
        Self {
            wall_penalty: config.wall_penalty,
            substitute_radius: config.substitute_radius,
        }
    }

    /// Cost of stepping into `cell`.
    pub fn step_cost(&self, grid: &GridMap, cell: CellPos) -> f32 {
        1.0 + self.wall_penalty * f32::from(grid.adjacent_wall_count(cell))
    }

    /// Returns `goal` if walkable, else the nearest walkable substitute.
    ///
    /// Rings are scanned outwards; within a ring the cell with the smallest
    /// Euclidean offset wins and ties keep the first one in row-major order.
    pub fn resolve_goal(&self, grid: &GridMap, goal: CellPos) -> Option<CellPos> {
        if grid.is_walkable(goal) {
            return Some(goal);
        }

        for radius in 1..=self.substitute_radius as i32 {
            let mut best: Option<(i32, CellPos)> = None;
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    let cell = CellPos::new(goal.x + dx, goal.y + dy);
                    if goal.ring_distance(cell) != radius as u32 || !grid.is_walkable(cell) {
                        continue;
                    }
                    let offset = dx * dx + dy * dy;
                    if best.is_none_or(|(known, _)| offset < known) {
                        best = Some((offset, cell));
                    }
                }
            }
            if let Some((_, cell)) = best {
                return Some(cell);
            }
        }

        None
    }

    /// Plans a route between two cells.
    ///
    /// Returns `None` when the start is not walkable, no substitute goal
    /// exists, or the goal is disconnected from the start.
    pub fn find_route(&self, grid: &GridMap, start: CellPos, goal: CellPos) -> Option<Route> {
        if !grid.is_walkable(start) {
            return None;
        }
        let goal = self.resolve_goal(grid, goal)?;

        let heuristic = |cell: CellPos| cell.manhattan(goal) as f32;

        let mut open = BinaryHeap::new();
        let mut best_cost: HashMap<CellPos, f32> = HashMap::new();
        let mut came_from: HashMap<CellPos, CellPos> = HashMap::new();
        let mut closed: HashSet<CellPos> = HashSet::new();
        let mut seq = 0u64;

        best_cost.insert(start, 0.0);
        open.push(OpenNode {
            estimate: heuristic(start),
            seq,
            cell: start,
        });

        while let Some(OpenNode { cell, .. }) = open.pop() {
            if cell == goal {
                return Some(reconstruct(&came_from, &best_cost, start, goal));
            }
            if !closed.insert(cell) {
                continue;
            }

            let cost_here = best_cost.get(&cell).copied().unwrap_or(0.0);
            for next in cell.neighbors4() {
                if closed.contains(&next) || !grid.is_walkable(next) {
                    continue;
                }
                let tentative = cost_here + self.step_cost(grid, next);
                if best_cost
                    .get(&next)
                    .is_none_or(|&known| tentative < known)
                {
                    best_cost.insert(next, tentative);
                    came_from.insert(next, cell);
                    seq += 1;
                    open.push(OpenNode {
                        estimate: tentative + heuristic(next),
                        seq,
                        cell: next,
                    });
                }
            }
        }

        None
    }

    /// Plans between world positions and converts the route to waypoints.
    pub fn find_path(&self, grid: &GridMap, start: WorldPoint, goal: WorldPoint) -> Option<Path> {
        let route = self.find_route(grid, grid.world_to_grid(start), grid.world_to_grid(goal))?;
        Some(Path::from_route(grid, &route))
    }
}

fn reconstruct(
    came_from: &HashMap<CellPos, CellPos>,
    best_cost: &HashMap<CellPos, f32>,
    start: CellPos,
    goal: CellPos,
) -> Route {
    let mut cells = vec![goal];
    let mut current = goal;
    while current != start {
        match came_from.get(&current) {
            Some(&previous) => {
                cells.push(previous);
                current = previous;
            }
            None => break,
        }
    }
    cells.reverse();

    let costs = cells
        .iter()
        .map(|cell| best_cost.get(cell).copied().unwrap_or(0.0))
        .collect();
    Route { cells, costs }
}

/// Open-set entry. Ordered so the max-heap pops the lowest estimate first,
/// and among equal estimates the earliest pushed.
#[derive(Clone, Copy, Debug)]
struct OpenNode {
    estimate: f32,
    seq: u64,
    cell: CellPos,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .total_cmp(&self.estimate)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}
