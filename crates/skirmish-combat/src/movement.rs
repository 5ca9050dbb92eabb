//! Tick-paced execution of planned paths.
//!
//! Each scheduled walk runs as its own task that moves the actor one cell per
//! tick. The scheduler remembers the live walk of every actor; scheduling a
//! new walk for the same actor aborts the old one first.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use skirmish_navigation::GridCoord;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use crate::bus::{CombatEvent, EventBus};
use crate::world::{ActorId, SharedWorld};

/// Tick period used when none is configured.
pub const DEFAULT_TICK: Duration = Duration::from_millis(300);

/// How a walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementOutcome {
    /// Every step of the path was taken.
    Arrived,
    /// The next cell was occupied when its tick came; the actor stopped short.
    Blocked { at: GridCoord },
    /// A newer walk for the same actor replaced this one.
    Superseded,
}

struct Schedule {
    generation: u64,
    abort: AbortHandle,
}

/// Per-actor registry of running walks.
#[derive(Clone)]
pub struct MovementScheduler {
    tick: Duration,
    active: Arc<Mutex<HashMap<ActorId, Schedule>>>,
    next_generation: Arc<AtomicU64>,
}

impl Default for MovementScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_TICK)
    }
}

impl MovementScheduler {
    pub fn new(tick: Duration) -> Self {
        Self {
            tick,
            active: Arc::new(Mutex::new(HashMap::new())),
            next_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Returns `true` while a walk for `actor` is still running.
    pub fn is_moving(&self, actor: ActorId) -> bool {
        self.active.lock().contains_key(&actor)
    }

    /// Starts walking `actor` along `path`, replacing any walk already running for it.
    ///
    /// `path[0]` is the actor's current cell; each later cell is entered one
    /// tick after the previous one. Paths with fewer than two cells finish
    /// immediately.
    pub fn schedule(
        &self,
        actor: ActorId,
        path: Vec<GridCoord>,
        world: SharedWorld,
        bus: EventBus,
    ) -> MovementHandle {
        let (done_tx, done_rx) = oneshot::channel();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);

        // Held until the new schedule is registered, so the task cannot
        // deregister itself before it is inserted.
        let mut active = self.active.lock();
        if let Some(previous) = active.remove(&actor) {
            debug!(%actor, generation = previous.generation, "Superseding running movement");
            previous.abort.abort();
        }

        if path.len() < 2 {
            let _ = done_tx.send(MovementOutcome::Arrived);
            return MovementHandle { done: done_rx };
        }

        let registry = Arc::clone(&self.active);
        let tick = self.tick;
        let task = tokio::spawn(async move {
            let outcome = walk(actor, &path, tick, &world, &bus).await;
            {
                let mut registry = registry.lock();
                if registry
                    .get(&actor)
                    .is_some_and(|s| s.generation == generation)
                {
                    registry.remove(&actor);
                }
            }
            let _ = done_tx.send(outcome);
        });

        active.insert(
            actor,
            Schedule {
                generation,
                abort: task.abort_handle(),
            },
        );
        MovementHandle { done: done_rx }
    }
}

async fn walk(
    actor: ActorId,
    path: &[GridCoord],
    tick: Duration,
    world: &SharedWorld,
    bus: &EventBus,
) -> MovementOutcome {
    let mut ticker = time::interval_at(Instant::now() + tick, tick);
    for &step in &path[1..] {
        ticker.tick().await;
        let moved = world.write().move_actor(actor, step);
        match moved {
            Ok(from) => {
                debug!(%actor, %from, to = %step, "Step");
                bus.publish(CombatEvent::ActorMoved {
                    actor,
                    from,
                    to: step,
                });
            }
            Err(e) => {
                warn!(%actor, at = %step, error = %e, "Movement blocked");
                return MovementOutcome::Blocked { at: step };
            }
        }
    }
    MovementOutcome::Arrived
}

/// Completion side of a scheduled walk.
#[derive(Debug)]
pub struct MovementHandle {
    done: oneshot::Receiver<MovementOutcome>,
}

impl MovementHandle {
    /// Waits until the walk ends. An aborted walk reports `Superseded`.
    pub async fn finished(self) -> MovementOutcome {
        self.done.await.unwrap_or(MovementOutcome::Superseded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Obstacle, World};

    fn setup() -> (SharedWorld, EventBus, ActorId) {
        let mut world = World::new(6, 6).unwrap();
        let hero = ActorId(1);
        world.spawn_actor(hero, GridCoord::new(0, 0)).unwrap();
        (world.into_shared(), EventBus::new(64), hero)
    }

    fn line(cells: &[(i32, i32)]) -> Vec<GridCoord> {
        cells.iter().copied().map(GridCoord::from).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_walk_takes_one_tick_per_step() {
        let (world, bus, hero) = setup();
        let mut events = bus.subscribe();
        let scheduler = MovementScheduler::new(Duration::from_millis(300));

        let started = Instant::now();
        let handle = scheduler.schedule(
            hero,
            line(&[(0, 0), (1, 0), (2, 0), (3, 0)]),
            world.clone(),
            bus.clone(),
        );
        assert!(scheduler.is_moving(hero));

        assert_eq!(handle.finished().await, MovementOutcome::Arrived);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(900) && elapsed < Duration::from_millis(1200));
        assert_eq!(world.read().actor_position(hero), Some(GridCoord::new(3, 0)));
        assert!(!scheduler.is_moving(hero));

        let mut visited = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let CombatEvent::ActorMoved { to, .. } = *event {
                visited.push(to);
            }
        }
        assert_eq!(visited, line(&[(1, 0), (2, 0), (3, 0)]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_paths_finish_immediately() {
        let (world, bus, hero) = setup();
        let scheduler = MovementScheduler::default();
        let started = Instant::now();

        let empty = scheduler.schedule(hero, Vec::new(), world.clone(), bus.clone());
        assert_eq!(empty.finished().await, MovementOutcome::Arrived);

        let single = scheduler.schedule(hero, line(&[(0, 0)]), world.clone(), bus.clone());
        assert_eq!(single.finished().await, MovementOutcome::Arrived);

        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(world.read().actor_position(hero), Some(GridCoord::new(0, 0)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reissue_supersedes_previous_walk() {
        let (world, bus, hero) = setup();
        let scheduler = MovementScheduler::new(Duration::from_millis(100));

        let first = scheduler.schedule(
            hero,
            line(&[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]),
            world.clone(),
            bus.clone(),
        );
        let second = scheduler.schedule(
            hero,
            line(&[(0, 0), (0, 1), (0, 2)]),
            world.clone(),
            bus.clone(),
        );

        assert_eq!(first.finished().await, MovementOutcome::Superseded);
        assert_eq!(second.finished().await, MovementOutcome::Arrived);
        assert_eq!(world.read().actor_position(hero), Some(GridCoord::new(0, 2)));
        assert!(!scheduler.is_moving(hero));
    }

    #[tokio::test(start_paused = true)]
    async fn test_walk_stops_when_path_becomes_blocked() {
        let (world, bus, hero) = setup();
        let scheduler = MovementScheduler::new(Duration::from_millis(100));

        // Something lands on the route after it was planned.
        world
            .write()
            .place_obstacle(GridCoord::new(2, 0), Obstacle::Rock)
            .unwrap();

        let handle = scheduler.schedule(
            hero,
            line(&[(0, 0), (1, 0), (2, 0), (3, 0)]),
            world.clone(),
            bus,
        );

        assert_eq!(
            handle.finished().await,
            MovementOutcome::Blocked { at: GridCoord::new(2, 0) }
        );
        assert_eq!(world.read().actor_position(hero), Some(GridCoord::new(1, 0)));
    }
}
