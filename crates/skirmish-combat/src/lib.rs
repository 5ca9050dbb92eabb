//! Turn-based combat core: the shared board, actions, players and the
//! round-robin coordinator that drives them.

pub mod action;
pub mod bus;
pub mod error;
pub mod movement;
pub mod player;
pub mod turn;
pub mod world;

pub use action::{Action, ActionKind, ActionOutcome, ActionState, PerformContext};
pub use bus::{CombatEvent, EventBus, Topic};
pub use error::CombatError;
pub use movement::{MovementHandle, MovementOutcome, MovementScheduler, DEFAULT_TICK};
pub use player::{AiPlayer, HumanController, HumanPlayer, Player, PlayerInput};
pub use turn::{CoordinatorControl, RunState, TurnCoordinator, TurnReport};
pub use world::{ActorId, Obstacle, Occupant, SharedWorld, World};
