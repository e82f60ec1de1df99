//! Planned routes in grid space and world space.

use std::collections::VecDeque;

use game_core::{CellPos, GridMap, WorldPoint};

/// A* result in grid space.
///
/// `costs[i]` is the accumulated cost of reaching `cells[i]` from the start;
/// it is non-decreasing along the route.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub cells: Vec<CellPos>,
    pub costs: Vec<f32>,
}

impl Route {
    pub fn start(&self) -> Option<CellPos> {
        self.cells.first().copied()
    }

    /// Final cell; may be a walkable substitute for the requested goal.
    pub fn goal(&self) -> Option<CellPos> {
        self.cells.last().copied()
    }

    pub fn total_cost(&self) -> f32 {
        self.costs.last().copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// World-space waypoints, consumed from the front as the agent advances.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    waypoints: VecDeque<WorldPoint>,
    goal: CellPos,
}

impl Path {
    /// Converts a route into cell-center waypoints.
    pub fn from_route(grid: &GridMap, route: &Route) -> Self {
        Self {
            waypoints: route.cells.iter().map(|&c| grid.grid_to_world(c)).collect(),
            goal: route.goal().unwrap_or_default(),
        }
    }

    /// Next waypoint to steer towards.
    pub fn next(&self) -> Option<WorldPoint> {
        self.waypoints.front().copied()
    }

    /// Cell the path ends in.
    pub fn goal(&self) -> CellPos {
        self.goal
    }

    /// Drops leading waypoints within `reach` of `position`; returns how many.
    pub fn trim(&mut self, position: WorldPoint, reach: f32) -> usize {
        let mut dropped = 0;
        while self
            .waypoints
            .front()
            .is_some_and(|wp| wp.distance(position) < reach)
        {
            self.waypoints.pop_front();
            dropped += 1;
        }
        dropped
    }

    pub fn waypoints(&self) -> impl Iterator<Item = &WorldPoint> {
        self.waypoints.iter()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_only_consumes_from_the_front() {
        let grid = GridMap::from_ascii(&["....."], 2.0).unwrap();
        let route = Route {
            cells: (0..5).map(|x| CellPos::new(x, 0)).collect(),
            costs: vec![0.0, 1.0, 2.0, 3.0, 4.0],
        };
        let mut path = Path::from_route(&grid, &route);
        assert_eq!(path.len(), 5);

        // Standing between the first two centers passes both of them.
        assert_eq!(path.trim(WorldPoint::new(2.0, 1.0), 1.5), 2);
        assert_eq!(path.next(), Some(WorldPoint::new(5.0, 1.0)));

        // A far waypoint behind a near one is not skipped.
        assert_eq!(path.trim(WorldPoint::new(20.0, 1.0), 1.5), 0);
        assert_eq!(path.goal(), CellPos::new(4, 0));
    }
}
