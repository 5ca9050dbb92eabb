use std::fmt;

/// Represents a single lattice cell `(x, z)`.
///
/// The board lies on the ground plane, so the second axis is `z` rather than
/// `y`. Coordinates are signed so that neighbor arithmetic can step off the
/// board and be rejected by a bounds check instead of wrapping.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridCoord {
    /// The x-coordinate (column index).
    pub x: i32,
    /// The z-coordinate (row index).
    pub z: i32,
}

impl GridCoord {
    /// Creates a new `GridCoord`.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Manhattan distance to `other`.
    #[must_use]
    pub fn manhattan_distance(&self, other: &GridCoord) -> u32 {
        self.x.abs_diff(other.x) + self.z.abs_diff(other.z)
    }

    /// The four axis-aligned neighbors in the order -x, +x, -z, +z.
    ///
    /// No bounds check is applied.
    #[must_use]
    pub const fn neighbors(&self) -> [GridCoord; 4] {
        [
            GridCoord::new(self.x - 1, self.z),
            GridCoord::new(self.x + 1, self.z),
            GridCoord::new(self.x, self.z - 1),
            GridCoord::new(self.x, self.z + 1),
        ]
    }

    /// Returns `true` when `other` is exactly one step away along one axis.
    #[must_use]
    pub fn is_adjacent(&self, other: &GridCoord) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Deterministic string key, `"x-z"`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}-{}", self.x, self.z)
    }
}

impl From<(i32, i32)> for GridCoord {
    fn from((x, z): (i32, i32)) -> Self {
        Self::new(x, z)
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}
