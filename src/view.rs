use std::sync::Arc;

use skirmish_combat::{ActionOutcome, CombatEvent, MovementOutcome, SharedWorld};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Logs combat events and the board after every completed turn.
pub async fn run_event_log(mut events: broadcast::Receiver<Arc<CombatEvent>>, world: SharedWorld) {
    info!("Event log starting...");

    loop {
        match events.recv().await {
            Ok(event) => {
                log_event(&event);
                if let CombatEvent::TurnCompleted { .. } = *event {
                    let board = world.read().render_ascii();
                    info!("\n{board}");
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Event log receiver lagged.");
            }
            Err(broadcast::error::RecvError::Closed) => {
                error!("Event bus closed. Exiting event log.");
                break;
            }
        }
    }
}

fn log_event(event: &CombatEvent) {
    match event {
        CombatEvent::PathPlanned { .. } | CombatEvent::ActorMoved { .. } => debug!("{}", describe(event)),
        CombatEvent::ActionRejected { .. } => warn!("{}", describe(event)),
        _ => info!("{}", describe(event)),
    }
}

/// One-line summary of an event for the console.
pub fn describe(event: &CombatEvent) -> String {
    match event {
        CombatEvent::TurnStarted { actor, round } => format!("Round {round}: {actor} to act"),
        CombatEvent::Highlighted { actor } => format!("{actor} highlighted"),
        CombatEvent::Unhighlighted { actor } => format!("{actor} unhighlighted"),
        CombatEvent::ActionRejected { actor, action, attempt } => {
            format!("{actor}: {action} rejected (attempt {attempt}), choose again")
        }
        CombatEvent::PathPlanned { actor, path } => {
            let route: Vec<String> = path.iter().map(|c| c.key()).collect();
            format!("{actor} path: {}", route.join(" -> "))
        }
        CombatEvent::ActorMoved { actor, from, to } => format!("{actor} moved {from} -> {to}"),
        CombatEvent::TurnCompleted { actor, action, attempts, outcome, .. } => {
            let result = match outcome {
                ActionOutcome::Waited => "waited".to_string(),
                ActionOutcome::Moved(MovementOutcome::Arrived) => "arrived".to_string(),
                ActionOutcome::Moved(MovementOutcome::Blocked { at }) => format!("blocked at {at}"),
                ActionOutcome::Moved(MovementOutcome::Superseded) => "superseded".to_string(),
            };
            format!("{actor} finished {action} after {attempts} attempt(s): {result}")
        }
    }
}
