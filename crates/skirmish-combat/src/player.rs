//! Decision-makers bound to actors.
//!
//! A [`HumanPlayer`] waits on an input channel fed by the host through a
//! [`HumanController`]. An [`AiPlayer`] decides immediately from a seeded RNG.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use skirmish_navigation::{Grid, GridCoord};
use tokio::sync::mpsc;
use tracing::debug;

use crate::action::{Action, ActionKind};
use crate::error::CombatError;
use crate::world::{ActorId, Occupant, SharedWorld};

/// One unit of input from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerInput {
    /// Pick an entry from the action menu.
    Choose(ActionKind),
    /// Click on a square.
    Square(GridCoord),
    /// Click on whatever stands on a square.
    Object(GridCoord),
}

/// Host-side sender for a human player's input.
#[derive(Debug, Clone)]
pub struct HumanController {
    actor: ActorId,
    tx: mpsc::UnboundedSender<PlayerInput>,
}

impl HumanController {
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    pub fn send(&self, input: PlayerInput) -> Result<(), CombatError> {
        self.tx
            .send(input)
            .map_err(|_| CombatError::InputClosed(self.actor))
    }

    pub fn choose(&self, kind: ActionKind) -> Result<(), CombatError> {
        self.send(PlayerInput::Choose(kind))
    }

    pub fn select_square(&self, coord: GridCoord) -> Result<(), CombatError> {
        self.send(PlayerInput::Square(coord))
    }

    pub fn select_object(&self, coord: GridCoord) -> Result<(), CombatError> {
        self.send(PlayerInput::Object(coord))
    }
}

#[derive(Debug)]
pub struct HumanPlayer {
    name: String,
    actor: ActorId,
    world: SharedWorld,
    inputs: mpsc::UnboundedReceiver<PlayerInput>,
    highlighted: bool,
}

impl HumanPlayer {
    pub fn new(name: impl Into<String>, actor: ActorId, world: SharedWorld) -> (Self, HumanController) {
        let (tx, inputs) = mpsc::unbounded_channel();
        let player = Self {
            name: name.into(),
            actor,
            world,
            inputs,
            highlighted: false,
        };
        (player, HumanController { actor, tx })
    }

    /// Entries of the action menu.
    pub fn available_actions(&self) -> &'static [ActionKind] {
        &ActionKind::ALL
    }

    async fn next_input(&mut self) -> Result<PlayerInput, CombatError> {
        self.inputs
            .recv()
            .await
            .ok_or(CombatError::InputClosed(self.actor))
    }

    async fn request_action(&mut self) -> Result<Action, CombatError> {
        loop {
            match self.next_input().await? {
                PlayerInput::Choose(kind) => {
                    return Ok(Action::from_kind(kind, self.actor, &self.world));
                }
                other => debug!(actor = %self.actor, ?other, "Ignoring input while choosing an action"),
            }
        }
    }

    async fn get_target_square(&mut self) -> Result<Option<GridCoord>, CombatError> {
        loop {
            match self.next_input().await? {
                PlayerInput::Square(coord) => return Ok(Some(coord)),
                other => debug!(actor = %self.actor, ?other, "Ignoring input while choosing a square"),
            }
        }
    }

    async fn get_target_object(&mut self) -> Result<Option<Occupant>, CombatError> {
        loop {
            match self.next_input().await? {
                PlayerInput::Object(coord) => return Ok(self.world.read().object_at(coord)),
                other => debug!(actor = %self.actor, ?other, "Ignoring input while choosing an object"),
            }
        }
    }
}

/// Chance that the AI skips its turn instead of wandering.
pub const DEFAULT_REST_CHANCE: f64 = 0.2;
/// How far from its own cell the AI picks wander targets, per axis.
pub const DEFAULT_WANDER_RADIUS: u32 = 4;

#[derive(Debug)]
pub struct AiPlayer {
    name: String,
    actor: ActorId,
    world: SharedWorld,
    rng: StdRng,
    rest_chance: f64,
    wander_radius: u32,
    highlighted: bool,
}

impl AiPlayer {
    pub fn new(name: impl Into<String>, actor: ActorId, world: SharedWorld, seed: u64) -> Self {
        Self {
            name: name.into(),
            actor,
            world,
            rng: StdRng::seed_from_u64(seed),
            rest_chance: DEFAULT_REST_CHANCE,
            wander_radius: DEFAULT_WANDER_RADIUS,
            highlighted: false,
        }
    }

    pub fn with_rest_chance(mut self, chance: f64) -> Self {
        self.rest_chance = chance.clamp(0.0, 1.0);
        self
    }

    pub fn with_wander_radius(mut self, radius: u32) -> Self {
        self.wander_radius = radius;
        self
    }

    fn request_action(&mut self) -> Action {
        if self.rng.random_bool(self.rest_chance) {
            Action::wait(self.actor)
        } else {
            Action::movement(self.actor, self.world.clone())
        }
    }

    /// Random square around the actor, clamped to the board.
    fn get_target_square(&mut self) -> Option<GridCoord> {
        let (origin, width, height) = {
            let world = self.world.read();
            (world.actor_position(self.actor)?, world.width() as i32, world.height() as i32)
        };
        let r = self.wander_radius as i32;
        let dx = self.rng.random_range(-r..=r);
        let dz = self.rng.random_range(-r..=r);
        Some(GridCoord::new(
            (origin.x + dx).clamp(0, width - 1),
            (origin.z + dz).clamp(0, height - 1),
        ))
    }
}

/// A participant in the turn order.
#[derive(Debug)]
pub enum Player {
    Human(HumanPlayer),
    Ai(AiPlayer),
}

impl From<HumanPlayer> for Player {
    fn from(player: HumanPlayer) -> Self {
        Player::Human(player)
    }
}

impl From<AiPlayer> for Player {
    fn from(player: AiPlayer) -> Self {
        Player::Ai(player)
    }
}

impl Player {
    pub fn actor(&self) -> ActorId {
        match self {
            Player::Human(p) => p.actor,
            Player::Ai(p) => p.actor,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Player::Human(p) => &p.name,
            Player::Ai(p) => &p.name,
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, Player::Human(_))
    }

    /// Current cell of the controlled actor, if it is still on the board.
    pub fn position(&self) -> Option<GridCoord> {
        let world = match self {
            Player::Human(p) => &p.world,
            Player::Ai(p) => &p.world,
        };
        world.read().actor_position(self.actor())
    }

    pub fn is_highlighted(&self) -> bool {
        match self {
            Player::Human(p) => p.highlighted,
            Player::Ai(p) => p.highlighted,
        }
    }

    pub fn highlight(&mut self) {
        self.set_highlighted(true);
    }

    pub fn unhighlight(&mut self) {
        self.set_highlighted(false);
    }

    fn set_highlighted(&mut self, on: bool) {
        match self {
            Player::Human(p) => p.highlighted = on,
            Player::Ai(p) => p.highlighted = on,
        }
    }

    /// Produces a fresh action for the current attempt.
    pub async fn request_action(&mut self) -> Result<Action, CombatError> {
        match self {
            Player::Human(p) => p.request_action().await,
            Player::Ai(p) => Ok(p.request_action()),
        }
    }

    /// Asks for a destination square. `None` means no choice was made.
    pub async fn get_target_square(&mut self) -> Result<Option<GridCoord>, CombatError> {
        match self {
            Player::Human(p) => p.get_target_square().await,
            Player::Ai(p) => Ok(p.get_target_square()),
        }
    }

    /// Asks for an object on the board. The AI never targets objects.
    pub async fn get_target_object(&mut self) -> Result<Option<Occupant>, CombatError> {
        match self {
            Player::Human(p) => p.get_target_object().await,
            Player::Ai(_) => Ok(None),
        }
    }
}
