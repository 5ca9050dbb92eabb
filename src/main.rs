mod console; // brings `console.rs` in as `crate::console`
mod settings; // brings `settings.rs` in as `crate::settings`
mod view; // brings `view.rs` in as `crate::view`

use std::time::Duration;

use anyhow::{Context, bail};
use rand::SeedableRng;
use rand::rngs::StdRng;
use skirmish_combat::{
    ActorId, AiPlayer, EventBus, HumanPlayer, MovementScheduler, Obstacle, SharedWorld, TurnCoordinator, World,
};
use skirmish_navigation::PathFinder;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use console::InputRouter;
use settings::{PlayerKind, Settings};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Skirmish starting. Loading configuration...");
    let settings = settings::load_settings().context("failed to load configuration")?;

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    let result = runtime.block_on(run(settings));

    // The console reader may still be parked on a blocking stdin read.
    runtime.shutdown_timeout(Duration::from_millis(250));
    result
}

async fn run(settings: Settings) -> anyhow::Result<()> {
    if settings.players.is_empty() {
        bail!("no players configured");
    }

    let seed = settings.world.seed.unwrap_or_else(rand::random);
    let world = build_world(&settings, seed)?;
    info!("\n{}", world.read().render_ascii());

    let bus = EventBus::new(256);
    let scheduler = MovementScheduler::new(settings.movement.tick());
    let mut coordinator =
        TurnCoordinator::new(world.clone(), scheduler, bus.clone()).with_round_limit(settings.combat.max_rounds);

    let mut controllers = Vec::new();
    for (index, player) in settings.players.iter().enumerate() {
        let actor = actor_id(index);
        match player.kind {
            PlayerKind::Human => {
                let (human, controller) = HumanPlayer::new(player.name.clone(), actor, world.clone());
                coordinator.add_player(human)?;
                controllers.push(controller);
            }
            PlayerKind::Ai => {
                let ai = AiPlayer::new(player.name.clone(), actor, world.clone(), seed.wrapping_add(actor.0 as u64));
                coordinator.add_player(ai)?;
            }
        }
    }

    let control = coordinator.control();

    let event_log = tokio::spawn(view::run_event_log(bus.subscribe(), world.clone()));

    if !controllers.is_empty() {
        tokio::spawn(console::run_console(
            InputRouter::new(controllers),
            world.clone(),
            bus.subscribe(),
            control.clone(),
        ));
    }

    tokio::spawn({
        let control = control.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl-C received, stopping combat");
                    control.stop();
                }
                Err(e) => error!(error = %e, "Failed to listen for Ctrl-C"),
            }
        }
    });

    info!(players = coordinator.players().len(), seed, "Combat starting");
    let result = coordinator.take_turns().await;
    info!(rounds = coordinator.round(), "Combat finished");

    drop(coordinator);
    drop(bus);
    if let Err(e) = event_log.await {
        warn!(error = %e, "Event log task failed");
    }

    result.context("combat loop failed")
}

fn actor_id(index: usize) -> ActorId {
    ActorId(index as u32 + 1)
}

/// Spawns the configured players first so scenery never lands on them.
fn build_world(settings: &Settings, seed: u64) -> anyhow::Result<SharedWorld> {
    let cfg = &settings.world;
    let mut world = World::new(cfg.width, cfg.height)
        .context("invalid world dimensions")?
        .with_pathfinder(PathFinder::new(settings.pathfinding.max_search_distance))
        .with_path_debug(cfg.show_path_debug);

    for (index, player) in settings.players.iter().enumerate() {
        world
            .spawn_actor(actor_id(index), player.spawn)
            .with_context(|| format!("cannot spawn {} at {}", player.name, player.spawn))?;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let trees = world.scatter(&mut rng, Obstacle::Tree, cfg.trees);
    let rocks = world.scatter(&mut rng, Obstacle::Rock, cfg.rocks);
    let bushes = world.scatter(&mut rng, Obstacle::Bush, cfg.bushes);
    info!(seed, trees, rocks, bushes, "World generated");

    Ok(world.into_shared())
}
