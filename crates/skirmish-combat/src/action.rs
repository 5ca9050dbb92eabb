//! What a player can do on their turn.
//!
//! An action is created fresh for every attempt and moves through
//! `Proposed -> Validated -> Performed`, or `Proposed -> Rejected`. A rejected
//! instance is dropped; the coordinator asks the player for a new one.

use std::fmt;

use skirmish_navigation::GridCoord;
use tracing::{debug, warn};

use crate::bus::{CombatEvent, EventBus};
use crate::error::CombatError;
use crate::movement::{MovementOutcome, MovementScheduler};
use crate::player::Player;
use crate::world::{ActorId, SharedWorld};

/// Payload-free name of an action, as offered in a player's action menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Movement,
    Wait,
}

impl ActionKind {
    pub const ALL: [ActionKind; 2] = [ActionKind::Movement, ActionKind::Wait];

    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Movement => "Movement",
            ActionKind::Wait => "Wait",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    Proposed,
    Validated,
    Rejected,
    Performed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Waited,
    Moved(MovementOutcome),
}

/// Collaborators needed to carry out a validated action.
#[derive(Clone, Copy)]
pub struct PerformContext<'a> {
    pub scheduler: &'a MovementScheduler,
    pub bus: &'a EventBus,
}

/// Walk the actor to a square chosen by its player.
#[derive(Debug)]
pub struct Movement {
    actor: ActorId,
    world: SharedWorld,
    target: Option<GridCoord>,
    path: Option<Vec<GridCoord>>,
}

impl Movement {
    pub fn new(actor: ActorId, world: SharedWorld) -> Self {
        Self {
            actor,
            world,
            target: None,
            path: None,
        }
    }

    /// Square picked during validation.
    pub fn target(&self) -> Option<GridCoord> {
        self.target
    }

    /// Route found during validation. Empty when the actor already stands on the target.
    pub fn path(&self) -> Option<&[GridCoord]> {
        self.path.as_deref()
    }

    async fn can_perform(&mut self, player: &mut Player) -> Result<bool, CombatError> {
        let Some(target) = player.get_target_square().await? else {
            debug!(actor = %self.actor, "No target square selected");
            return Ok(false);
        };
        self.target = Some(target);

        let planned = {
            let world = self.world.read();
            let Some(start) = world.actor_position(self.actor) else {
                warn!(actor = %self.actor, %target, "Actor is not on the board, cannot move");
                return Ok(false);
            };
            world.pathfinder().search(start, target, &*world)
        };

        match planned {
            Ok(path) => {
                debug!(actor = %self.actor, %target, steps = ?path.as_ref().map(|p| p.len().saturating_sub(1)), "Movement planned");
                self.path = path;
                Ok(self.path.is_some())
            }
            Err(e) => {
                warn!(actor = %self.actor, %target, error = %e, "Target square rejected");
                Ok(false)
            }
        }
    }

    async fn perform(&mut self, ctx: PerformContext<'_>) -> MovementOutcome {
        let path = self.path.take().unwrap_or_default();

        if self.world.read().show_path_debug() && !path.is_empty() {
            ctx.bus.publish(CombatEvent::PathPlanned {
                actor: self.actor,
                path: path.clone(),
            });
        }

        ctx.scheduler
            .schedule(self.actor, path, self.world.clone(), ctx.bus.clone())
            .finished()
            .await
    }
}

/// Skip the turn.
#[derive(Debug, Clone, Copy)]
pub struct Wait {
    actor: ActorId,
}

impl Wait {
    pub fn new(actor: ActorId) -> Self {
        Self { actor }
    }
}

#[derive(Debug)]
enum ActionVariant {
    Movement(Movement),
    Wait(Wait),
}

/// One attempt at acting, carrying its own validation state.
#[derive(Debug)]
pub struct Action {
    variant: ActionVariant,
    state: ActionState,
}

impl Action {
    pub fn movement(actor: ActorId, world: SharedWorld) -> Self {
        Self::proposed(ActionVariant::Movement(Movement::new(actor, world)))
    }

    pub fn wait(actor: ActorId) -> Self {
        Self::proposed(ActionVariant::Wait(Wait::new(actor)))
    }

    pub fn from_kind(kind: ActionKind, actor: ActorId, world: &SharedWorld) -> Self {
        match kind {
            ActionKind::Movement => Self::movement(actor, world.clone()),
            ActionKind::Wait => Self::wait(actor),
        }
    }

    fn proposed(variant: ActionVariant) -> Self {
        Self {
            variant,
            state: ActionState::Proposed,
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self.variant {
            ActionVariant::Movement(_) => ActionKind::Movement,
            ActionVariant::Wait(_) => ActionKind::Wait,
        }
    }

    pub fn actor(&self) -> ActorId {
        match &self.variant {
            ActionVariant::Movement(m) => m.actor,
            ActionVariant::Wait(w) => w.actor,
        }
    }

    pub fn state(&self) -> ActionState {
        self.state
    }

    pub fn as_movement(&self) -> Option<&Movement> {
        match &self.variant {
            ActionVariant::Movement(m) => Some(m),
            ActionVariant::Wait(_) => None,
        }
    }

    /// Validates the action, asking `player` for any input it needs.
    ///
    /// `Ok(false)` is an ordinary rejection. Errors are reserved for a closed
    /// input source, a player that does not own the actor, or re-validating
    /// an action that was already resolved.
    pub async fn can_perform(&mut self, player: &mut Player) -> Result<bool, CombatError> {
        if self.state != ActionState::Proposed {
            return Err(CombatError::AlreadyResolved);
        }
        if player.actor() != self.actor() {
            return Err(CombatError::ActorMismatch {
                expected: self.actor(),
                actual: player.actor(),
            });
        }

        let valid = match &mut self.variant {
            ActionVariant::Movement(m) => m.can_perform(player).await?,
            ActionVariant::Wait(_) => true,
        };

        self.state = if valid {
            ActionState::Validated
        } else {
            ActionState::Rejected
        };
        Ok(valid)
    }

    /// Carries out a validated action and waits until it has fully resolved.
    pub async fn perform(&mut self, ctx: PerformContext<'_>) -> Result<ActionOutcome, CombatError> {
        match self.state {
            ActionState::Validated => {}
            ActionState::Proposed => return Err(CombatError::NotValidated),
            ActionState::Rejected | ActionState::Performed => {
                return Err(CombatError::AlreadyResolved);
            }
        }

        let outcome = match &mut self.variant {
            ActionVariant::Movement(m) => ActionOutcome::Moved(m.perform(ctx).await),
            ActionVariant::Wait(_) => ActionOutcome::Waited,
        };
        self.state = ActionState::Performed;
        Ok(outcome)
    }
}
