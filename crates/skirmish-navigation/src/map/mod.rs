//! Map-related functionality for navigation.
//!
//! This module provides the lattice coordinate type and the occupancy index
//! that path planning reads from.

/// Occupancy index and the read-only grid view used by the planner.
pub mod occupancy;
/// Integer cell coordinates on the board.
pub mod point_types;

pub use occupancy::{Grid, GridIndex};
pub use point_types::GridCoord;
