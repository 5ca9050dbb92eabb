/*

A* = f(n) = g(n) + h(n)

Where:
    n = a cell on the lattice
    g(n) = steps taken from start to n (every step costs 1)
    h(n) = Manhattan distance from n to the goal
    f(n) = estimated length of the cheapest path through n

Initialize:
    - frontier holding only the start cell, g(start) = 0
    - cost map g and parent map came_from

Loop:
    - pop the frontier cell with lowest f (ties: lowest h, then smallest (x, z))
    - if it is the goal, rebuild the path from came_from
    - if it is farther than the search radius from start, do not expand it
    - for each in-bounds, unoccupied neighbor:
        - tentative = g(n) + 1
        - if the neighbor is new or tentative < g(neighbor):
            - record g(neighbor) = tentative and came_from(neighbor) = n
            - push it onto the frontier

*/

//! Budgeted A* path planning over the occupancy lattice.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;

use tracing::{debug, trace};

use crate::error::NavigationError;
use crate::map::{Grid, GridCoord};

/// Search radius used by [`PathFinder::default`] and [`search`].
pub const DEFAULT_MAX_SEARCH_DISTANCE: u32 = 50;

/// Represents the result of an A* pathfinding operation with metadata.
///
/// `path == None` means the goal was not reachable within the search budget.
/// `path == Some(vec![])` means the start already was the goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResult {
    /// The computed path (start and goal inclusive), if one was found.
    pub path: Option<Vec<GridCoord>>,
    /// Number of steps along the path.
    pub total_cost: Option<u32>,
    /// The number of cells popped from the frontier during the search.
    pub nodes_explored: usize,
    /// The length of the path (number of waypoints).
    pub path_length: usize,
}

impl PathResult {
    /// Creates a new PathResult for a successful path.
    pub fn success(path: Vec<GridCoord>, total_cost: u32, nodes_explored: usize) -> Self {
        let path_length = path.len();
        Self {
            path: Some(path),
            total_cost: Some(total_cost),
            nodes_explored,
            path_length,
        }
    }

    /// Creates a new PathResult for a failed path search.
    pub fn failure(nodes_explored: usize) -> Self {
        Self {
            path: None,
            total_cost: None,
            nodes_explored,
            path_length: 0,
        }
    }

    /// Returns true if a path was found.
    pub fn is_success(&self) -> bool {
        self.path.is_some()
    }

    /// Returns the path if one was found.
    pub fn into_path(self) -> Option<Vec<GridCoord>> {
        self.path
    }
}

impl fmt::Display for PathResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(_) => write!(
                f,
                "PathResult {{ success: true, path_length: {}, total_cost: {}, nodes_explored: {} }}",
                self.path_length,
                self.total_cost.unwrap_or(0),
                self.nodes_explored
            ),
            None => write!(
                f,
                "PathResult {{ success: false, nodes_explored: {} }}",
                self.nodes_explored
            ),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
struct State {
    f: u32,
    h: u32,
    g: u32,
    position: GridCoord,
}

// BinaryHeap is a max-heap, so every comparison is flipped: the "greatest"
// state is the one with the lowest f, then lowest h, then smallest (x, z).
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.position.cmp(&self.position))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reconstructs the path from a map of `came_from` links.
fn reconstruct_path(
    came_from: &HashMap<GridCoord, GridCoord>,
    mut current: GridCoord,
) -> Vec<GridCoord> {
    let mut path = vec![current];
    while let Some(&previous) = came_from.get(&current) {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}

/// Stateless 4-connected A* planner with a bounded search radius.
///
/// Every occupied cell is impassable. Cells farther than
/// `max_search_distance` (Manhattan, from the start) are never expanded but
/// can still be recognised as the goal. This bounds the work per call and
/// means very distant targets on large open boards come back unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathFinder {
    max_search_distance: u32,
}

impl Default for PathFinder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SEARCH_DISTANCE)
    }
}

impl PathFinder {
    /// Creates a planner that expands cells up to `max_search_distance` steps from the start.
    pub const fn new(max_search_distance: u32) -> Self {
        Self {
            max_search_distance,
        }
    }

    /// The configured search radius.
    pub const fn max_search_distance(&self) -> u32 {
        self.max_search_distance
    }

    /// Finds a path from `start` to `end`.
    ///
    /// # Arguments
    /// * `start` - The mover's cell. Its own occupancy is ignored.
    /// * `end` - Target cell. An occupied target is never reached.
    /// * `grid` - Occupancy to plan against.
    ///
    /// # Returns
    /// * `Result<Option<Vec<GridCoord>>, NavigationError>` - `Ok(None)` when unreachable,
    ///   `Ok(Some(vec![]))` when `start == end`, `Err(OutOfBounds)` for off-board input.
    pub fn search<G: Grid>(
        &self,
        start: GridCoord,
        end: GridCoord,
        grid: &G,
    ) -> Result<Option<Vec<GridCoord>>, NavigationError> {
        Ok(self.search_detailed(start, end, grid)?.into_path())
    }

    /// Same as [`PathFinder::search`] but returns the search metadata as well.
    pub fn search_detailed<G: Grid>(
        &self,
        start: GridCoord,
        end: GridCoord,
        grid: &G,
    ) -> Result<PathResult, NavigationError> {
        grid.check_bounds(start)?;
        grid.check_bounds(end)?;

        if start == end {
            return Ok(PathResult::success(Vec::new(), 0, 0));
        }

        debug!(%start, %end, radius = self.max_search_distance, "Searching for path");

        let mut open_set = BinaryHeap::new();
        let mut came_from: HashMap<GridCoord, GridCoord> = HashMap::new();
        let mut g_score: HashMap<GridCoord, u32> = HashMap::new();
        let mut nodes_explored = 0;

        g_score.insert(start, 0);
        let h = start.manhattan_distance(&end);
        open_set.push(State {
            f: h,
            h,
            g: 0,
            position: start,
        });

        while let Some(State {
            g, position: current, ..
        }) = open_set.pop()
        {
            // Skip entries superseded by a cheaper route found later.
            if g_score.get(&current).is_some_and(|&best| g > best) {
                continue;
            }

            nodes_explored += 1;

            if current == end {
                let path = reconstruct_path(&came_from, current);
                debug!(steps = g, nodes_explored, "Path found");
                return Ok(PathResult::success(path, g, nodes_explored));
            }

            if current.manhattan_distance(&start) > self.max_search_distance {
                trace!(%current, "Beyond search radius, not expanding");
                continue;
            }

            for neighbor in current.neighbors() {
                if !grid.contains(neighbor) || grid.is_occupied(neighbor) {
                    continue;
                }

                let tentative_g_score = g + 1;
                if tentative_g_score < *g_score.get(&neighbor).unwrap_or(&u32::MAX) {
                    came_from.insert(neighbor, current);
                    g_score.insert(neighbor, tentative_g_score);
                    let h = neighbor.manhattan_distance(&end);
                    open_set.push(State {
                        f: tentative_g_score + h,
                        h,
                        g: tentative_g_score,
                        position: neighbor,
                    });
                }
            }
        }

        debug!(nodes_explored, "No path found");
        Ok(PathResult::failure(nodes_explored))
    }
}

/// Finds a path with the default search radius.
///
/// See [`PathFinder::search`].
pub fn search<G: Grid>(
    start: GridCoord,
    end: GridCoord,
    grid: &G,
) -> Result<Option<Vec<GridCoord>>, NavigationError> {
    PathFinder::default().search(start, end, grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::GridIndex;

    fn empty(width: u32, height: u32) -> GridIndex<char> {
        GridIndex::new(width, height).unwrap()
    }

    fn assert_contiguous(path: &[GridCoord]) {
        for pair in path.windows(2) {
            assert!(
                pair[0].is_adjacent(&pair[1]),
                "Path jumps from {} to {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_astar_same_start_goal_is_empty() {
        let grid = empty(4, 4);
        for x in 0..4 {
            for z in 0..4 {
                let c = GridCoord::new(x, z);
                let path = search(c, c, &grid).unwrap();
                assert_eq!(path, Some(Vec::new()), "Expected empty path at {}", c);
            }
        }
    }

    #[test]
    fn test_astar_5x5_corner_to_corner() {
        let grid = empty(5, 5);
        let start = GridCoord::new(0, 0);
        let goal = GridCoord::new(4, 4);

        let path = search(start, goal, &grid).unwrap().expect("path on empty grid");
        assert_eq!(path.len(), 9);
        assert_eq!(path[0], start);
        assert_eq!(*path.last().unwrap(), goal);
        assert_contiguous(&path);

        // Every step brings the mover one closer to the goal.
        for pair in path.windows(2) {
            assert_eq!(
                pair[1].manhattan_distance(&goal) + 1,
                pair[0].manhattan_distance(&goal)
            );
        }
    }

    #[test]
    fn test_astar_empty_grid_paths_are_manhattan_optimal() {
        let grid = empty(8, 8);
        for sx in 0..8 {
            for sz in 0..8 {
                for ex in 0..8 {
                    for ez in 0..8 {
                        let start = GridCoord::new(sx, sz);
                        let end = GridCoord::new(ex, ez);
                        if start == end {
                            continue;
                        }
                        let path = search(start, end, &grid).unwrap().unwrap();
                        assert_eq!(path.len() as u32, start.manhattan_distance(&end) + 1);
                        assert_eq!(path[0], start);
                        assert_eq!(*path.last().unwrap(), end);
                        assert_contiguous(&path);
                    }
                }
            }
        }
    }

    #[test]
    fn test_astar_tie_break_is_deterministic() {
        let grid = empty(3, 3);
        let path = search(GridCoord::new(0, 0), GridCoord::new(2, 2), &grid)
            .unwrap()
            .unwrap();

        // Lowest h wins ties, then the smaller (x, z): the search hugs x = 0 first.
        let expected: Vec<GridCoord> = [(0, 0), (0, 1), (0, 2), (1, 2), (2, 2)]
            .into_iter()
            .map(GridCoord::from)
            .collect();
        assert_eq!(path, expected);

        let again = search(GridCoord::new(0, 0), GridCoord::new(2, 2), &grid)
            .unwrap()
            .unwrap();
        assert_eq!(path, again);
    }

    #[test]
    fn test_astar_avoids_obstacles() {
        let mut grid = empty(10, 10);
        // A box in the middle.
        for x in 3..7 {
            for z in 3..7 {
                grid.place(GridCoord::new(x, z), 'R').unwrap();
            }
        }

        let start = GridCoord::new(0, 0);
        let goal = GridCoord::new(9, 9);
        let path = search(start, goal, &grid).unwrap().expect("path around the box");

        assert_eq!(path[0], start);
        assert_eq!(*path.last().unwrap(), goal);
        assert_eq!(path.len(), 19, "A monotone route around the box exists");
        assert_contiguous(&path);
        for cell in &path {
            assert!(!grid.is_occupied(*cell), "Path crosses occupied cell {}", cell);
        }
    }

    #[test]
    fn test_astar_detour_is_longer_than_manhattan() {
        let mut grid = empty(5, 5);
        // Wall at x = 2 with a single gap at z = 4.
        for z in 0..4 {
            grid.place(GridCoord::new(2, z), 'T').unwrap();
        }

        let start = GridCoord::new(0, 0);
        let goal = GridCoord::new(4, 0);
        let path = search(start, goal, &grid).unwrap().unwrap();

        assert!(path.contains(&GridCoord::new(2, 4)));
        assert_eq!(path.len(), 13);
        assert_contiguous(&path);
    }

    #[test]
    fn test_astar_no_path_through_wall() {
        let mut grid = empty(5, 5);
        for z in 0..5 {
            grid.place(GridCoord::new(2, z), 'T').unwrap();
        }

        let result = search(GridCoord::new(0, 0), GridCoord::new(4, 4), &grid).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_astar_enclosed_goal_is_unreachable() {
        let mut grid = empty(5, 5);
        let goal = GridCoord::new(2, 2);
        for n in goal.neighbors() {
            grid.place(n, 'R').unwrap();
        }

        let result = search(GridCoord::new(0, 0), goal, &grid).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_astar_occupied_goal_is_unreachable() {
        let mut grid = empty(5, 5);
        let start = GridCoord::new(1, 1);
        let goal = GridCoord::new(2, 1);
        grid.place(goal, 'B').unwrap();

        assert!(start.is_adjacent(&goal));
        assert!(search(start, goal, &grid).unwrap().is_none());
    }

    #[test]
    fn test_astar_ignores_occupancy_of_start() {
        let mut grid = empty(5, 5);
        let start = GridCoord::new(0, 0);
        grid.place(start, 'A').unwrap();

        let path = search(start, GridCoord::new(0, 3), &grid).unwrap().unwrap();
        assert_eq!(path.len(), 4);
    }

    #[test]
    fn test_astar_search_radius_limits_expansion() {
        let grid = empty(20, 1);
        let finder = PathFinder::new(5);
        let start = GridCoord::new(0, 0);

        // One past the radius is still recognised as the goal.
        let near = finder.search(start, GridCoord::new(6, 0), &grid).unwrap();
        assert_eq!(near.map(|p| p.len()), Some(7));

        let far = finder.search(start, GridCoord::new(10, 0), &grid).unwrap();
        assert!(far.is_none(), "Goal beyond the radius should be unreachable");

        let unbounded = PathFinder::default()
            .search(start, GridCoord::new(10, 0), &grid)
            .unwrap();
        assert_eq!(unbounded.map(|p| p.len()), Some(11));
    }

    #[test]
    fn test_astar_out_of_bounds() {
        let grid = empty(5, 5);
        let inside = GridCoord::new(0, 0);

        let err = search(inside, GridCoord::new(5, 5), &grid).unwrap_err();
        assert_eq!(
            err,
            NavigationError::OutOfBounds {
                coord: GridCoord::new(5, 5),
                width: 5,
                height: 5,
            }
        );

        assert!(matches!(
            search(GridCoord::new(-1, 0), inside, &grid),
            Err(NavigationError::OutOfBounds { .. })
        ));

        // Identical out-of-bounds endpoints are still rejected.
        let off = GridCoord::new(9, 9);
        assert!(search(off, off, &grid).is_err());
    }

    #[test]
    fn test_path_result_detailed() {
        let mut grid = empty(5, 5);
        grid.place(GridCoord::new(2, 1), 'R').unwrap();
        grid.place(GridCoord::new(2, 2), 'R').unwrap();

        let start = GridCoord::new(0, 0);
        let goal = GridCoord::new(4, 4);
        let result = PathFinder::default()
            .search_detailed(start, goal, &grid)
            .unwrap();

        assert!(result.is_success());
        assert!(result.nodes_explored > 0);
        assert_eq!(result.path_length, 9);
        assert_eq!(result.total_cost, Some(8));

        let display_str = format!("{}", result);
        assert!(display_str.contains("success: true"));
        assert!(display_str.contains("nodes_explored"));

        let mut blocked = empty(5, 5);
        for z in 0..5 {
            blocked.place(GridCoord::new(2, z), 'T').unwrap();
        }
        let blocked_result = PathFinder::default()
            .search_detailed(start, goal, &blocked)
            .unwrap();
        assert!(!blocked_result.is_success());
        assert_eq!(blocked_result.path_length, 0);
        assert!(blocked_result.total_cost.is_none());
        assert!(format!("{}", blocked_result).contains("success: false"));
    }

    #[test]
    fn test_path_result_trivial_success() {
        let grid = empty(3, 3);
        let c = GridCoord::new(1, 1);
        let result = PathFinder::default().search_detailed(c, c, &grid).unwrap();
        assert!(result.is_success());
        assert_eq!(result.path_length, 0);
        assert_eq!(result.total_cost, Some(0));
        assert_eq!(result.nodes_explored, 0);
    }
}
