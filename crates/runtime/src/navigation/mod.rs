//! Grid navigation: planning, path following and exploration.
//!
//! [`Pathfinder`] plans routes over the [`game_core::GridMap`],
//! [`NavigationController`] follows them and owns all per-floor navigation
//! memory, and [`ExplorationStrategy`] picks where to go when nothing else
//! needs doing.
pub mod controller;
pub mod exploration;
pub mod path;
pub mod pathfinder;

pub use controller::{NavigationController, NavigationState, RandomWalk};
pub use exploration::{ExplorationStrategy, ExploreMode, ExploreStep};
pub use path::{Path, Route};
pub use pathfinder::Pathfinder;
