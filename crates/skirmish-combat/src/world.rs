//! The board: static obstacles and actors sharing one occupancy index.
//!
//! `World` owns the index and is the only writer. Path planning and movement
//! validation read it through the [`Grid`] impl. Actors are registered as
//! occupants, so a standing actor blocks everyone else's searches.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rand::Rng;
use skirmish_navigation::{Grid, GridCoord, GridIndex, PathFinder};
use tracing::debug;

use crate::error::CombatError;

/// Identity of an actor on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor-{}", self.0)
    }
}

/// Static scenery that blocks a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Obstacle {
    Tree,
    Rock,
    Bush,
}

impl Obstacle {
    fn glyph(self) -> char {
        match self {
            Obstacle::Tree => 'T',
            Obstacle::Rock => 'R',
            Obstacle::Bush => 'B',
        }
    }
}

/// Anything that can stand on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occupant {
    Obstacle(Obstacle),
    Actor(ActorId),
}

/// Shared handle to the board. Never hold a guard across an `.await`.
pub type SharedWorld = Arc<RwLock<World>>;

#[derive(Debug, Clone)]
pub struct World {
    grid: GridIndex<Occupant>,
    actors: HashMap<ActorId, GridCoord>,
    pathfinder: PathFinder,
    show_path_debug: bool,
}

impl World {
    /// Creates an empty board of `width` x `height` cells with the default pathfinder.
    pub fn new(width: u32, height: u32) -> Result<Self, CombatError> {
        Ok(Self {
            grid: GridIndex::new(width, height)?,
            actors: HashMap::new(),
            pathfinder: PathFinder::default(),
            show_path_debug: false,
        })
    }

    /// Replaces the planner used for movement validation on this board.
    pub fn with_pathfinder(mut self, pathfinder: PathFinder) -> Self {
        self.pathfinder = pathfinder;
        self
    }

    /// Publish planned routes as `PathPlanned` events.
    pub fn with_path_debug(mut self, enabled: bool) -> Self {
        self.show_path_debug = enabled;
        self
    }

    pub fn into_shared(self) -> SharedWorld {
        Arc::new(RwLock::new(self))
    }

    pub fn pathfinder(&self) -> PathFinder {
        self.pathfinder
    }

    pub fn show_path_debug(&self) -> bool {
        self.show_path_debug
    }

    pub fn place_obstacle(&mut self, coord: GridCoord, obstacle: Obstacle) -> Result<(), CombatError> {
        self.grid.place(coord, Occupant::Obstacle(obstacle))?;
        Ok(())
    }

    /// Removes whatever stands on `coord`. Removing an actor forgets its position too.
    pub fn remove_object(&mut self, coord: GridCoord) -> Option<Occupant> {
        let removed = self.grid.remove(coord);
        if let Some(Occupant::Actor(actor)) = removed {
            self.actors.remove(&actor);
        }
        removed
    }

    pub fn spawn_actor(&mut self, actor: ActorId, coord: GridCoord) -> Result<(), CombatError> {
        if self.actors.contains_key(&actor) {
            return Err(CombatError::DuplicateActor(actor));
        }
        self.grid.place(coord, Occupant::Actor(actor))?;
        self.actors.insert(actor, coord);
        debug!(%actor, %coord, "Actor spawned");
        Ok(())
    }

    /// Moves `actor` onto `to` and returns the cell it left.
    ///
    /// This is the position sink driven once per movement tick. The target
    /// must be free; the actor stays put on failure.
    pub fn move_actor(&mut self, actor: ActorId, to: GridCoord) -> Result<GridCoord, CombatError> {
        let from = self
            .actor_position(actor)
            .ok_or(CombatError::UnknownActor(actor))?;
        self.grid.relocate(from, to)?;
        self.actors.insert(actor, to);
        Ok(from)
    }

    pub fn actor_position(&self, actor: ActorId) -> Option<GridCoord> {
        self.actors.get(&actor).copied()
    }

    pub fn object_at(&self, coord: GridCoord) -> Option<Occupant> {
        self.grid.get_object(coord).copied()
    }

    /// Tries `attempts` random cells and puts `obstacle` on each free one.
    ///
    /// Returns how many were actually placed.
    pub fn scatter<R: Rng + ?Sized>(&mut self, rng: &mut R, obstacle: Obstacle, attempts: usize) -> usize {
        let width = self.width() as i32;
        let height = self.height() as i32;
        let mut placed = 0;
        for _ in 0..attempts {
            let coord = GridCoord::new(rng.random_range(0..width), rng.random_range(0..height));
            if self.place_obstacle(coord, obstacle).is_ok() {
                placed += 1;
            }
        }
        debug!(?obstacle, attempts, placed, "Scattered obstacles");
        placed
    }

    /// Text view of the board, one line per row (`z`).
    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width() as usize + 1) * self.height() as usize);
        for z in 0..self.height() as i32 {
            for x in 0..self.width() as i32 {
                let glyph = match self.grid.get_object(GridCoord::new(x, z)) {
                    None => '.',
                    Some(Occupant::Obstacle(o)) => o.glyph(),
                    Some(Occupant::Actor(actor)) => char::from_digit(actor.0 % 10, 10).unwrap_or('@'),
                };
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }
}

impl Grid for World {
    type Occupant = Occupant;

    fn width(&self) -> u32 {
        self.grid.width()
    }

    fn height(&self) -> u32 {
        self.grid.height()
    }

    fn get_object(&self, coord: GridCoord) -> Option<&Occupant> {
        self.grid.get_object(coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use skirmish_navigation::NavigationError;

    #[test]
    fn test_new_rejects_empty_board() {
        assert!(matches!(
            World::new(0, 3),
            Err(CombatError::Navigation(NavigationError::InvalidDimensions(_)))
        ));
    }

    #[test]
    fn test_spawn_and_move_actor() {
        let mut world = World::new(5, 5).unwrap();
        let hero = ActorId(1);
        world.spawn_actor(hero, GridCoord::new(0, 0)).unwrap();

        assert_eq!(world.object_at(GridCoord::new(0, 0)), Some(Occupant::Actor(hero)));

        let from = world.move_actor(hero, GridCoord::new(1, 0)).unwrap();
        assert_eq!(from, GridCoord::new(0, 0));
        assert_eq!(world.actor_position(hero), Some(GridCoord::new(1, 0)));
        assert_eq!(world.object_at(GridCoord::new(0, 0)), None);
        assert_eq!(world.object_at(GridCoord::new(1, 0)), Some(Occupant::Actor(hero)));
    }

    #[test]
    fn test_spawn_duplicate_or_onto_obstacle() {
        let mut world = World::new(5, 5).unwrap();
        let hero = ActorId(1);
        world.place_obstacle(GridCoord::new(2, 2), Obstacle::Rock).unwrap();

        assert_eq!(
            world.spawn_actor(hero, GridCoord::new(2, 2)),
            Err(CombatError::Navigation(NavigationError::CellOccupied(GridCoord::new(2, 2))))
        );

        world.spawn_actor(hero, GridCoord::new(0, 0)).unwrap();
        assert_eq!(
            world.spawn_actor(hero, GridCoord::new(1, 1)),
            Err(CombatError::DuplicateActor(hero))
        );
    }

    #[test]
    fn test_move_actor_onto_occupied_cell_fails() {
        let mut world = World::new(5, 5).unwrap();
        let hero = ActorId(1);
        world.spawn_actor(hero, GridCoord::new(0, 0)).unwrap();
        world.place_obstacle(GridCoord::new(1, 0), Obstacle::Tree).unwrap();

        assert!(world.move_actor(hero, GridCoord::new(1, 0)).is_err());
        assert_eq!(world.actor_position(hero), Some(GridCoord::new(0, 0)));

        assert_eq!(
            world.move_actor(ActorId(9), GridCoord::new(3, 3)),
            Err(CombatError::UnknownActor(ActorId(9)))
        );
    }

    #[test]
    fn test_remove_object_forgets_actor() {
        let mut world = World::new(5, 5).unwrap();
        let hero = ActorId(3);
        world.spawn_actor(hero, GridCoord::new(4, 4)).unwrap();

        assert_eq!(world.remove_object(GridCoord::new(4, 4)), Some(Occupant::Actor(hero)));
        assert_eq!(world.actor_position(hero), None);
        assert_eq!(
            world.move_actor(hero, GridCoord::new(0, 0)),
            Err(CombatError::UnknownActor(hero))
        );
    }

    #[test]
    fn test_scatter_never_overwrites() {
        let mut world = World::new(4, 4).unwrap();
        world.spawn_actor(ActorId(1), GridCoord::new(0, 0)).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let placed = world.scatter(&mut rng, Obstacle::Tree, 100);

        assert!(placed <= 15);
        assert_eq!(world.object_at(GridCoord::new(0, 0)), Some(Occupant::Actor(ActorId(1))));
        let trees = (0..4)
            .flat_map(|x| (0..4).map(move |z| GridCoord::new(x, z)))
            .filter(|c| world.object_at(*c) == Some(Occupant::Obstacle(Obstacle::Tree)))
            .count();
        assert_eq!(trees, placed);
    }

    #[test]
    fn test_world_is_a_grid_for_pathfinding() {
        let mut world = World::new(3, 3).unwrap();
        let hero = ActorId(1);
        world.spawn_actor(hero, GridCoord::new(0, 0)).unwrap();
        world.spawn_actor(ActorId(2), GridCoord::new(1, 0)).unwrap();

        let path = world
            .pathfinder()
            .search(GridCoord::new(0, 0), GridCoord::new(2, 0), &world)
            .unwrap()
            .unwrap();
        assert!(!path.contains(&GridCoord::new(1, 0)), "Other actors block the route");
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn test_render_ascii() {
        let mut world = World::new(3, 2).unwrap();
        world.place_obstacle(GridCoord::new(1, 0), Obstacle::Tree).unwrap();
        world.place_obstacle(GridCoord::new(2, 1), Obstacle::Bush).unwrap();
        world.spawn_actor(ActorId(4), GridCoord::new(0, 1)).unwrap();

        assert_eq!(world.render_ascii(), ".T.\n4.B\n");
    }
}
