//! Round-robin turn sequencing.
//!
//! One player acts at a time. A turn only ends once an action has passed
//! validation and finished performing, so a movement turn lasts as long as
//! the walk takes. Rejected actions are retried with a fresh request from the
//! same player.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::action::{ActionKind, ActionOutcome, PerformContext};
use crate::bus::{CombatEvent, EventBus};
use crate::error::CombatError;
use crate::movement::MovementScheduler;
use crate::player::Player;
use crate::world::{ActorId, SharedWorld};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
    Stopped,
}

/// Remote control for a running [`TurnCoordinator::take_turns`] loop.
///
/// Pausing takes effect between turns. Stopping also interrupts a turn that
/// is still waiting on its player.
#[derive(Debug, Clone)]
pub struct CoordinatorControl {
    tx: Arc<watch::Sender<RunState>>,
}

impl CoordinatorControl {
    pub fn pause(&self) {
        self.set(RunState::Paused);
    }

    pub fn resume(&self) {
        self.set(RunState::Running);
    }

    pub fn stop(&self) {
        self.set(RunState::Stopped);
    }

    pub fn state(&self) -> RunState {
        *self.tx.borrow()
    }

    fn set(&self, state: RunState) {
        let previous = self.tx.send_replace(state);
        if previous != state {
            debug!(?previous, ?state, "Run state changed");
        }
    }
}

/// Summary of one completed turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReport {
    pub actor: ActorId,
    pub round: u64,
    /// Number of actions requested, including the one that succeeded.
    pub attempts: u32,
    pub action: ActionKind,
    pub outcome: ActionOutcome,
}

pub struct TurnCoordinator {
    players: Vec<Player>,
    current: usize,
    round: u64,
    round_limit: Option<u64>,
    world: SharedWorld,
    scheduler: MovementScheduler,
    bus: EventBus,
    control: CoordinatorControl,
    run_state: watch::Receiver<RunState>,
}

impl TurnCoordinator {
    pub fn new(world: SharedWorld, scheduler: MovementScheduler, bus: EventBus) -> Self {
        let (tx, run_state) = watch::channel(RunState::Running);
        Self {
            players: Vec::new(),
            current: 0,
            round: 0,
            round_limit: None,
            world,
            scheduler,
            bus,
            control: CoordinatorControl { tx: Arc::new(tx) },
            run_state,
        }
    }

    /// Makes [`TurnCoordinator::take_turns`] return once `limit` full
    /// rotations have completed. `None` runs until stopped.
    pub fn with_round_limit(mut self, limit: Option<u64>) -> Self {
        self.round_limit = limit;
        self
    }

    pub fn control(&self) -> CoordinatorControl {
        self.control.clone()
    }

    pub fn world(&self) -> &SharedWorld {
        &self.world
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Index of the player whose turn is next.
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current)
    }

    /// Completed full rotations.
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Appends `player` to the turn order. Its actor must already be on the board.
    pub fn add_player(&mut self, player: impl Into<Player>) -> Result<(), CombatError> {
        let player = player.into();
        let actor = player.actor();
        if self.players.iter().any(|p| p.actor() == actor) {
            return Err(CombatError::DuplicateActor(actor));
        }
        if self.world.read().actor_position(actor).is_none() {
            return Err(CombatError::UnknownActor(actor));
        }
        info!(%actor, name = player.name(), human = player.is_human(), "Player joined");
        self.players.push(player);
        Ok(())
    }

    /// Takes a player out of the turn order, keeping the remaining order and
    /// the player due next.
    pub fn remove_player(&mut self, actor: ActorId) -> Result<Player, CombatError> {
        let index = self
            .players
            .iter()
            .position(|p| p.actor() == actor)
            .ok_or(CombatError::UnknownActor(actor))?;

        let mut removed = self.players.remove(index);
        if removed.is_highlighted() {
            removed.unhighlight();
            self.bus.publish(CombatEvent::Unhighlighted { actor });
        }

        if index < self.current {
            self.current -= 1;
        }
        if self.current >= self.players.len() {
            // The rotation ended with the removed player.
            if self.current > 0 {
                self.round += 1;
            }
            self.current = 0;
        }
        info!(%actor, remaining = self.players.len(), "Player left");
        Ok(removed)
    }

    /// Runs one turn for the current player and advances the turn order.
    pub async fn take_turn(&mut self) -> Result<TurnReport, CombatError> {
        if self.players.is_empty() {
            return Err(CombatError::NoPlayers);
        }

        let index = self.current;
        let round = self.round;
        let player = &mut self.players[index];
        let actor = player.actor();

        info!(%actor, name = player.name(), round, "Turn started");
        self.bus.publish(CombatEvent::TurnStarted { actor, round });
        player.highlight();
        self.bus.publish(CombatEvent::Highlighted { actor });

        let ctx = PerformContext {
            scheduler: &self.scheduler,
            bus: &self.bus,
        };
        let resolved = resolve_action(player, ctx).await;

        player.unhighlight();
        self.bus.publish(CombatEvent::Unhighlighted { actor });
        let (action, outcome, attempts) = resolved?;

        info!(%actor, %action, ?outcome, attempts, "Turn completed");
        self.bus.publish(CombatEvent::TurnCompleted {
            actor,
            round,
            action,
            attempts,
            outcome,
        });

        self.current = (index + 1) % self.players.len();
        if self.current == 0 {
            self.round += 1;
        }

        Ok(TurnReport {
            actor,
            round,
            attempts,
            action,
            outcome,
        })
    }

    /// Takes turns until stopped through [`CoordinatorControl`], until the
    /// round limit is reached, or until a turn fails.
    pub async fn take_turns(&mut self) -> Result<(), CombatError> {
        let mut run_state = self.run_state.clone();
        info!(players = self.players.len(), "Combat loop started");

        loop {
            loop {
                let state = *run_state.borrow_and_update();
                match state {
                    RunState::Running => break,
                    RunState::Stopped => {
                        info!(round = self.round, "Combat loop stopped");
                        return Ok(());
                    }
                    RunState::Paused => {
                        debug!("Combat loop paused");
                        if run_state.changed().await.is_err() {
                            return Ok(());
                        }
                    }
                }
            }

            if self.round_limit.is_some_and(|limit| self.round >= limit) {
                info!(round = self.round, "Round limit reached");
                return Ok(());
            }

            let stopped = tokio::select! {
                biased;
                _ = wait_for_stop(&mut run_state) => true,
                report = self.take_turn() => {
                    report?;
                    false
                }
            };

            if stopped {
                self.clear_highlights();
                info!(round = self.round, "Combat loop stopped mid-turn");
                return Ok(());
            }

            // Let observers and movement tasks run between turns.
            tokio::task::yield_now().await;
        }
    }

    fn clear_highlights(&mut self) {
        for player in self.players.iter_mut().filter(|p| p.is_highlighted()) {
            player.unhighlight();
            self.bus.publish(CombatEvent::Unhighlighted {
                actor: player.actor(),
            });
        }
    }
}

async fn resolve_action(
    player: &mut Player,
    ctx: PerformContext<'_>,
) -> Result<(ActionKind, ActionOutcome, u32), CombatError> {
    let actor = player.actor();
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        let mut action = player.request_action().await?;
        let kind = action.kind();

        if action.can_perform(player).await? {
            let outcome = action.perform(ctx).await?;
            return Ok((kind, outcome, attempts));
        }

        warn!(%actor, action = %kind, attempt = attempts, "Action cannot be performed");
        ctx.bus.publish(CombatEvent::ActionRejected {
            actor,
            action: kind,
            attempt: attempts,
        });
        tokio::task::yield_now().await;
    }
}

async fn wait_for_stop(run_state: &mut watch::Receiver<RunState>) {
    if run_state
        .wait_for(|s| *s == RunState::Stopped)
        .await
        .is_err()
    {
        std::future::pending::<()>().await;
    }
}
