use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, anyhow, bail};
use skirmish_combat::{ActionKind, ActorId, CombatEvent, CoordinatorControl, HumanController, Occupant, SharedWorld};
use skirmish_navigation::Grid;
use skirmish_navigation::GridCoord;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

pub const HELP: &str = "commands: move X Z (m X Z) | wait (w) | look X Z";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(GridCoord),
    Wait,
    Look(GridCoord),
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or_else(|| anyhow!("empty command"))?;
        let args: Vec<&str> = words.collect();

        match verb.to_ascii_lowercase().as_str() {
            "move" | "m" => Ok(Command::Move(parse_coord(&args)?)),
            "look" | "l" => Ok(Command::Look(parse_coord(&args)?)),
            "wait" | "w" if args.is_empty() => Ok(Command::Wait),
            "wait" | "w" => bail!("wait takes no arguments"),
            other => bail!("unknown command `{other}`"),
        }
    }
}

fn parse_coord(args: &[&str]) -> anyhow::Result<GridCoord> {
    let [x, z] = args else {
        bail!("expected two coordinates, got {}", args.len());
    };
    let x = x.parse().with_context(|| format!("invalid x coordinate `{x}`"))?;
    let z = z.parse().with_context(|| format!("invalid z coordinate `{z}`"))?;
    Ok(GridCoord::new(x, z))
}

/// Sends console commands to whichever human player holds the highlight.
#[derive(Debug)]
pub struct InputRouter {
    controllers: HashMap<ActorId, HumanController>,
    active: Option<ActorId>,
}

impl InputRouter {
    pub fn new(controllers: impl IntoIterator<Item = HumanController>) -> Self {
        Self {
            controllers: controllers.into_iter().map(|c| (c.actor(), c)).collect(),
            active: None,
        }
    }

    pub fn active(&self) -> Option<ActorId> {
        self.active
    }

    pub fn observe(&mut self, event: &CombatEvent) {
        match *event {
            CombatEvent::Highlighted { actor } if self.controllers.contains_key(&actor) => {
                self.active = Some(actor);
            }
            CombatEvent::Unhighlighted { actor } if self.active == Some(actor) => {
                self.active = None;
            }
            _ => {}
        }
    }

    /// Delivers a turn command and returns the actor it went to.
    pub fn dispatch(&self, command: Command) -> anyhow::Result<ActorId> {
        if let Command::Look(_) = command {
            bail!("look is answered by the console, not sent to a player");
        }
        let actor = self
            .active
            .ok_or_else(|| anyhow!("no human player is waiting for input"))?;
        let controller = self
            .controllers
            .get(&actor)
            .with_context(|| format!("no console controller for {actor}"))?;

        match command {
            Command::Move(target) => {
                controller.choose(ActionKind::Movement)?;
                controller.select_square(target)?;
            }
            Command::Wait => controller.choose(ActionKind::Wait)?,
            Command::Look(_) => {}
        }
        Ok(actor)
    }
}

/// Describes what stands on `target`.
pub fn look(world: &SharedWorld, target: GridCoord) -> String {
    let world = world.read();
    if !world.contains(target) {
        return format!("{target} is outside the board");
    }
    match world.object_at(target) {
        None => format!("{target}: empty"),
        Some(Occupant::Obstacle(obstacle)) => format!("{target}: {obstacle:?}"),
        Some(Occupant::Actor(actor)) => format!("{target}: {actor}"),
    }
}

/// Reads stdin lines until EOF, then stops the combat loop.
pub async fn run_console(
    mut router: InputRouter,
    world: SharedWorld,
    mut events: broadcast::Receiver<Arc<CombatEvent>>,
    control: CoordinatorControl,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!("Console ready, {HELP}");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => router.observe(&event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Console event receiver lagged.");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            line = lines.next_line() => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match line.parse::<Command>() {
                    Ok(Command::Look(target)) => info!("{}", look(&world, target)),
                    Ok(command) => match router.dispatch(command) {
                        Ok(actor) => info!(%actor, ?command, "Input accepted"),
                        Err(e) => warn!(active = ?router.active(), "Input ignored: {e:#}"),
                    },
                    Err(e) => warn!("{e:#}; {HELP}"),
                },
                Ok(None) => {
                    info!("Console input closed, stopping combat");
                    control.stop();
                    break;
                }
                Err(e) => {
                    error!(error = %e, "Failed to read console input");
                    control.stop();
                    break;
                }
            },
        }
    }
}
