//! Error types for the combat core.
//!
//! A rejected action is not an error; `can_perform` reports it as `Ok(false)`.
//! These variants are protocol faults and registration problems.

use skirmish_navigation::NavigationError;

use crate::world::ActorId;

/// Errors raised by the world, actions, players and the turn coordinator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CombatError {
    /// Placement or bounds failure from the occupancy index.
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    /// The actor has not been spawned into the world.
    #[error("{0} is not placed in the world")]
    UnknownActor(ActorId),
    /// The actor already exists in the world or in the turn order.
    #[error("{0} is already registered")]
    DuplicateActor(ActorId),
    /// `take_turn` was called with no registered players.
    #[error("no players registered")]
    NoPlayers,
    /// The input source of a player was closed by the host.
    #[error("input source for {0} closed")]
    InputClosed(ActorId),
    /// `perform` was called on an action that has not passed validation.
    #[error("action must be validated before it is performed")]
    NotValidated,
    /// The action was already rejected or performed.
    #[error("action was already resolved")]
    AlreadyResolved,
    /// The player validating an action does not own its actor.
    #[error("action belongs to {expected}, not {actual}")]
    ActorMismatch {
        /// Actor the action was created for.
        expected: ActorId,
        /// Actor of the player that tried to validate it.
        actual: ActorId,
    },
}
