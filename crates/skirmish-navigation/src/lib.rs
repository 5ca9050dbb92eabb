#![warn(missing_docs)]
#![doc = "Occupancy grids and budgeted A* pathfinding over a bounded 2D lattice."]
#![doc = ""]
#![doc = "The planner is 4-connected with unit step cost. Any occupant blocks its cell."]

pub mod astar;
pub mod error;
pub mod map;

pub use astar::{PathFinder, PathResult, search, DEFAULT_MAX_SEARCH_DISTANCE};
pub use error::NavigationError;
pub use map::{Grid, GridCoord, GridIndex};
