//! Occupancy index for a bounded 2D lattice.
//!
//! This module provides the `Grid` trait that path planning reads from, and
//! `GridIndex`, a sparse map from cell to occupant that enforces the
//! one-occupant-per-cell invariant. Any occupant blocks movement; there are no
//! graded costs.

#![warn(missing_docs)]

use std::collections::HashMap;

use crate::error::NavigationError;
use crate::map::GridCoord;

/// Read-only view of an occupancy lattice.
///
/// Implementors own their occupants; the pathfinder only asks whether a cell
/// is inside the board and whether something stands on it.
pub trait Grid {
    /// What stands on a cell (tree, rock, another actor, ...).
    type Occupant;

    /// Number of columns (valid `x` is `0..width`).
    fn width(&self) -> u32;

    /// Number of rows (valid `z` is `0..height`).
    fn height(&self) -> u32;

    /// Returns the occupant of `coord`, or `None` for a free cell.
    ///
    /// Out-of-bounds coordinates report `None`; use [`Grid::contains`] first.
    fn get_object(&self, coord: GridCoord) -> Option<&Self::Occupant>;

    /// Returns `true` if `coord` lies inside the lattice.
    fn contains(&self, coord: GridCoord) -> bool {
        coord.x >= 0
            && coord.z >= 0
            && (coord.x as u32) < self.width()
            && (coord.z as u32) < self.height()
    }

    /// Returns `true` if `coord` has an occupant.
    fn is_occupied(&self, coord: GridCoord) -> bool {
        self.get_object(coord).is_some()
    }

    /// Checks that `coord` lies inside the lattice.
    ///
    /// # Returns
    /// * `Result<(), NavigationError>` - `OutOfBounds` if the coordinate is off the board
    fn check_bounds(&self, coord: GridCoord) -> Result<(), NavigationError> {
        if self.contains(coord) {
            Ok(())
        } else {
            Err(NavigationError::OutOfBounds {
                coord,
                width: self.width(),
                height: self.height(),
            })
        }
    }
}

/// Sparse occupancy index keyed by cell.
///
/// At most one occupant per cell. Entries are only added or removed through
/// explicit placement calls; nothing in the search path mutates them.
#[derive(Debug, Clone)]
pub struct GridIndex<T> {
    width: u32,
    height: u32,
    cells: HashMap<GridCoord, T>,
}

impl<T> GridIndex<T> {
    /// Creates an empty index of `width` x `height` cells.
    ///
    /// # Arguments
    /// * `width` - Number of columns
    /// * `height` - Number of rows
    ///
    /// # Returns
    /// * `Result<Self, NavigationError>` - The index, or `InvalidDimensions` if either side is zero
    pub fn new(width: u32, height: u32) -> Result<Self, NavigationError> {
        if width == 0 || height == 0 {
            return Err(NavigationError::InvalidDimensions(
                "width and height must be non-zero",
            ));
        }
        if width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(NavigationError::InvalidDimensions(
                "dimensions must fit in a signed coordinate",
            ));
        }

        Ok(Self {
            width,
            height,
            cells: HashMap::new(),
        })
    }

    /// Puts `occupant` on `coord`.
    ///
    /// # Returns
    /// * `Result<(), NavigationError>` - `OutOfBounds` or `CellOccupied`; an existing occupant is never replaced
    pub fn place(&mut self, coord: GridCoord, occupant: T) -> Result<(), NavigationError> {
        self.check_bounds(coord)?;
        if self.cells.contains_key(&coord) {
            return Err(NavigationError::CellOccupied(coord));
        }
        self.cells.insert(coord, occupant);
        Ok(())
    }

    /// Removes and returns whatever occupies `coord`.
    pub fn remove(&mut self, coord: GridCoord) -> Option<T> {
        self.cells.remove(&coord)
    }

    /// Moves the occupant of `from` onto the free cell `to`.
    ///
    /// # Returns
    /// * `Result<(), NavigationError>` - `OutOfBounds` if `to` is off the board,
    ///   `CellOccupied(to)` if `to` is taken. Moving onto the same cell is a no-op.
    pub fn relocate(&mut self, from: GridCoord, to: GridCoord) -> Result<(), NavigationError> {
        self.check_bounds(to)?;
        if from == to {
            return Ok(());
        }
        if self.cells.contains_key(&to) {
            return Err(NavigationError::CellOccupied(to));
        }
        if let Some(occupant) = self.cells.remove(&from) {
            self.cells.insert(to, occupant);
        }
        Ok(())
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if no cell is occupied.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<T> Grid for GridIndex<T> {
    type Occupant = T;

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn get_object(&self, coord: GridCoord) -> Option<&T> {
        self.cells.get(&coord)
    }
}
