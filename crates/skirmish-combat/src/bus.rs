use std::sync::Arc;

use skirmish_navigation::GridCoord;
use tokio::sync::broadcast;

use crate::action::{ActionKind, ActionOutcome};
use crate::world::ActorId;

/// Broadcast topic with bounded capacity.
/// `T` must be `Send + Sync` because subscribers may live on other tasks.
#[derive(Debug, Clone)]
pub struct Topic<T> {
    tx: broadcast::Sender<Arc<T>>,
}

impl<T: Send + Sync + 'static> Topic<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes `msg` to current subscribers. Having none is not an error.
    pub fn publish(&self, msg: T) {
        let _ = self.tx.send(Arc::new(msg));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<T>> {
        self.tx.subscribe()
    }
}

/// What the combat core reports to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum CombatEvent {
    TurnStarted { actor: ActorId, round: u64 },
    Highlighted { actor: ActorId },
    Unhighlighted { actor: ActorId },
    ActionRejected { actor: ActorId, action: ActionKind, attempt: u32 },
    /// Planned route, published only when the world has path debugging on.
    PathPlanned { actor: ActorId, path: Vec<GridCoord> },
    /// One tick of movement.
    ActorMoved { actor: ActorId, from: GridCoord, to: GridCoord },
    TurnCompleted {
        actor: ActorId,
        round: u64,
        action: ActionKind,
        attempts: u32,
        outcome: ActionOutcome,
    },
}

pub type EventBus = Topic<CombatEvent>;
