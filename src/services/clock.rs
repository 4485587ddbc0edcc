//! Authoritative per-room round clock.
//!
//! One task per running game owns the round schedule. Clients still report
//! their local countdowns (`request-round`) and the coordinator reports
//! full-roster submissions, but both arrive here only as [`ClockHint`]s: the
//! task validates each against the stage it is actually in and otherwise
//! lets its own timers drive the game. A room that goes silent therefore
//! still finishes on schedule.

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::{
    dto::{room::RoundData, ws::ServerMessage},
    services::{events, results, room_service},
    state::{
        SharedState,
        room::{ClockHandle, ClockHint, RoomPhase},
    },
};

/// Spawn the clock task for a freshly started game.
///
/// The returned handle is stored on the room; dropping the room aborts the
/// task through [`ClockHandle::shutdown`].
pub fn spawn(state: SharedState, code: String, total_rounds: usize) -> ClockHandle {
    let (hints_tx, hints_rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(state, code, total_rounds, hints_rx));
    ClockHandle::new(hints_tx, task)
}

async fn run(
    state: SharedState,
    code: String,
    total_rounds: usize,
    mut hints: mpsc::UnboundedReceiver<ClockHint>,
) {
    let timings = state.config().timings();

    // Lead-in between game-started and the first round; a client that is
    // already counted down may pull the first round early.
    wait_stage(&mut hints, timings.lead_in, |hint| {
        hint == ClockHint::Advance { round_index: 0 }
    })
    .await;

    for round_index in 0..total_rounds {
        if !serve_round(&state, &code, round_index).await {
            debug!(code, round_index, "room unavailable, stopping clock");
            return;
        }

        // Guess stage: the client-side countdown plus the answer window. A
        // full roster of submissions ends it early.
        wait_stage(&mut hints, timings.countdown + timings.guess_window, |hint| {
            hint == ClockHint::AllSubmitted { round_index }
        })
        .await;

        // Reveal stage; clients that finished their reveal animation may
        // request the next round (or, after the last one, game completion).
        let next = round_index + 1;
        wait_stage(&mut hints, timings.reveal, |hint| {
            hint == ClockHint::Advance { round_index: next }
        })
        .await;
    }

    finish_game(&state, &code).await;
}

/// Sleep for a stage's duration, returning early when an accepted hint
/// arrives. Hints for other stages are stale and dropped.
async fn wait_stage(
    hints: &mut mpsc::UnboundedReceiver<ClockHint>,
    duration: std::time::Duration,
    accept: impl Fn(ClockHint) -> bool,
) {
    let deadline = tokio::time::sleep(duration);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            () = &mut deadline => return,
            hint = hints.recv() => match hint {
                Some(hint) if accept(hint) => return,
                Some(stale) => debug!(?stale, "dropping stale clock hint"),
                // Sender gone; ride out the timer.
                None => {
                    deadline.as_mut().await;
                    return;
                }
            },
        }
    }
}

/// Open one round and broadcast its question to the whole room.
///
/// Returns `false` when the room no longer exists or left the playing
/// phase, which stops the clock.
async fn serve_round(state: &SharedState, code: &str, round_index: usize) -> bool {
    let Some(shared) = state.rooms().get(code) else {
        return false;
    };

    let (message, targets) = {
        let mut room = shared.lock().await;
        if room.phase != RoomPhase::Playing {
            return false;
        }
        let Some(content) = room.rounds.get(round_index) else {
            return false;
        };
        let payload = RoundData::new(round_index, room.rounds.len(), content);
        room.open_round(round_index);
        (
            ServerMessage::RoundData(payload),
            room_service::member_ids(&room),
        )
    };

    debug!(code, round_index, "serving round");
    events::broadcast(state, &targets, &message);
    true
}

/// Close the game: broadcast final standings and hand results to storage.
async fn finish_game(state: &SharedState, code: &str) {
    let Some(shared) = state.rooms().get(code) else {
        return;
    };

    let (rankings, game_results, targets) = {
        let mut room = shared.lock().await;
        if room.phase != RoomPhase::Playing {
            return;
        }
        room.phase = RoomPhase::Finished;
        room.round_index = None;
        // Detach our own handle; the task is about to end anyway and the
        // room must not try to abort a finished game's clock.
        drop(room.clock.take());

        (
            crate::dto::room::rankings_of(&room),
            results::results_of(&room),
            room_service::member_ids(&room),
        )
    };

    info!(code, players = targets.len(), "game over");
    events::broadcast(state, &targets, &ServerMessage::GameOver { rankings });
    results::record_results(state, game_results);
}
