//! This module defines the error types used by the `skirmish-navigation` crate.

use crate::map::GridCoord;

/// Error type for navigation operations.
///
/// Unreachable targets are not errors: a search that cannot reach its goal
/// returns `None`. These variants cover malformed requests and placement
/// conflicts on the occupancy index.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    /// A coordinate lies outside the `width` x `height` lattice.
    #[error("coordinate {coord} is outside the {width}x{height} grid")]
    OutOfBounds {
        /// The offending coordinate.
        coord: GridCoord,
        /// Grid width in cells.
        width: u32,
        /// Grid height in cells.
        height: u32,
    },
    /// A placement targeted a cell that already holds an occupant.
    #[error("cell {0} is already occupied")]
    CellOccupied(GridCoord),
    /// Grid width or height is zero.
    #[error("invalid grid dimensions: {0}")]
    InvalidDimensions(&'static str),
}
