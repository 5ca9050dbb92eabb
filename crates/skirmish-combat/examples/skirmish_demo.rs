use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use skirmish_combat::{
    ActorId, AiPlayer, CombatEvent, EventBus, MovementScheduler, Obstacle, TurnCoordinator, World,
};
use skirmish_navigation::GridCoord;
use tracing::info;
use tracing_subscriber::EnvFilter;

const ROUNDS: u64 = 4;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let mut world = World::new(12, 8)?.with_path_debug(true);
    let spawns = [(1, GridCoord::new(0, 0)), (2, GridCoord::new(11, 7)), (3, GridCoord::new(6, 3))];
    for (id, at) in spawns {
        world.spawn_actor(ActorId(id), at)?;
    }
    let mut rng = StdRng::seed_from_u64(2024);
    world.scatter(&mut rng, Obstacle::Tree, 14);
    world.scatter(&mut rng, Obstacle::Rock, 6);
    let world = world.into_shared();

    println!("{}", world.read().render_ascii());

    let bus = EventBus::new(128);
    let mut coordinator = TurnCoordinator::new(
        world.clone(),
        MovementScheduler::new(Duration::from_millis(50)),
        bus.clone(),
    );
    for (id, _) in spawns {
        coordinator.add_player(AiPlayer::new(format!("goblin-{id}"), ActorId(id), world.clone(), id as u64))?;
    }

    let control = coordinator.control();
    let mut events = bus.subscribe();
    let board = world.clone();
    let observer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if let CombatEvent::TurnCompleted { actor, round, action, .. } = &*event {
                info!(%actor, round, %action, "Turn done");
                println!("{}", board.read().render_ascii());
                if *round + 1 >= ROUNDS && actor.0 == 3 {
                    control.stop();
                    break;
                }
            }
        }
    });

    coordinator.take_turns().await?;
    observer.await?;
    Ok(())
}
