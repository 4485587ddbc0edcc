//! Room coordinator: every client-initiated room mutation funnels through
//! these handlers.
//!
//! Handlers lock one room at a time, collect the events and target
//! connections under the lock, and send only after the guard is dropped.
//! Failures are returned to the caller, which reports them to the initiating
//! connection only.

use rand::Rng;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dto::{
        room::{PlayerSummary, RoomSettingsDto, RoomSnapshot},
        ws::ServerMessage,
    },
    error::ServiceError,
    services::{clock, events},
    state::{
        SharedState, scoring,
        room::{ClockHint, ConnectionId, LeaveOutcome, Player, Room, RoomPhase, RoomSettings, Submission},
        store::SharedRoom,
    },
};

/// Attempts at generating an unclaimed room code before giving up.
const CODE_ATTEMPTS: usize = 32;

/// A connection is in at most one room; creating or joining another room
/// implies leaving the current one first, so no roster keeps a player whose
/// connection has moved on.
async fn leave_previous_room(
    state: &SharedState,
    connection_id: ConnectionId,
    joining: Option<&str>,
) {
    let Some(current) = state.registry().room_of(connection_id) else {
        return;
    };
    if joining == Some(current.as_str()) {
        return;
    }
    debug!(code = current, %connection_id, "leaving current room before entering another");
    leave_room(state, connection_id).await;
}

/// Create a room with the caller as sole player and host, and reply with a
/// `room-created` event.
///
/// A client-picked code is honoured when free; otherwise a random six-digit
/// code is allocated.
pub async fn create_room(
    state: &SharedState,
    connection_id: ConnectionId,
    display_name: String,
    durable_user_id: Option<Uuid>,
    settings: RoomSettingsDto,
    desired_code: Option<String>,
) -> Result<(), ServiceError> {
    leave_previous_room(state, connection_id, None).await;
    let settings: RoomSettings = settings.into();

    let shared = match desired_code {
        Some(code) => state.rooms().create(Room::new(
            code,
            Player::new(connection_id, display_name, durable_user_id),
            settings,
        ))?,
        None => create_with_generated_code(state, connection_id, display_name, durable_user_id, settings)?,
    };

    let (code, snapshot) = {
        let room = shared.lock().await;
        (room.code.clone(), RoomSnapshot::from(&*room))
    };

    state.registry().bind(connection_id, code.clone());
    info!(code, %connection_id, "room created");

    events::send_to_connection(
        state,
        connection_id,
        &ServerMessage::RoomCreated {
            code,
            room: snapshot,
        },
    );
    Ok(())
}

fn create_with_generated_code(
    state: &SharedState,
    connection_id: ConnectionId,
    display_name: String,
    durable_user_id: Option<Uuid>,
    settings: RoomSettings,
) -> Result<SharedRoom, ServiceError> {
    for _ in 0..CODE_ATTEMPTS {
        let room = Room::new(
            generate_room_code(),
            Player::new(connection_id, display_name.clone(), durable_user_id),
            settings.clone(),
        );
        match state.rooms().create(room) {
            Ok(shared) => return Ok(shared),
            // Collision with a concurrent creation; roll a new code.
            Err(ServiceError::RoomExists) => continue,
            Err(err) => return Err(err),
        }
    }
    Err(ServiceError::InvalidInput(
        "could not allocate a unique room code".into(),
    ))
}

/// Random six-decimal-digit room code, zero-padded.
fn generate_room_code() -> String {
    format!("{:06}", rand::rng().random_range(0..1_000_000u32))
}

/// Add a player to a waiting room and broadcast the refreshed roster.
pub async fn join_room(
    state: &SharedState,
    connection_id: ConnectionId,
    code: &str,
    display_name: String,
    durable_user_id: Option<Uuid>,
) -> Result<(), ServiceError> {
    leave_previous_room(state, connection_id, Some(code)).await;
    let shared = state.rooms().get(code).ok_or(ServiceError::RoomNotFound)?;

    let (snapshot, targets) = {
        let mut room = shared.lock().await;
        room.add_player(Player::new(connection_id, display_name, durable_user_id))?;
        (RoomSnapshot::from(&*room), member_ids(&room))
    };

    state.registry().bind(connection_id, code.to_owned());
    info!(code, %connection_id, "player joined");

    events::broadcast(state, &targets, &ServerMessage::PlayerJoined { room: snapshot });
    Ok(())
}

/// Reattach a reconnected client to its existing player entry, preserving
/// score and streak.
///
/// The match key is the display name. Host privilege and recorded
/// submissions follow the player to the new connection.
pub async fn rejoin_room(
    state: &SharedState,
    connection_id: ConnectionId,
    code: &str,
    display_name: &str,
) -> Result<(), ServiceError> {
    leave_previous_room(state, connection_id, Some(code)).await;
    let shared = state.rooms().get(code).ok_or(ServiceError::RoomNotFound)?;

    let (old_connection, snapshot, targets) = {
        let mut room = shared.lock().await;
        let old_connection = match room.rebind_player(display_name, connection_id) {
            Some(old_connection) => Some(old_connection),
            // No player under that name; fall back to a fresh join, which
            // enforces the usual phase and capacity rules.
            None => {
                room.add_player(Player::new(connection_id, display_name.to_owned(), None))?;
                None
            }
        };
        (old_connection, RoomSnapshot::from(&*room), member_ids(&room))
    };

    if let Some(old_connection) = old_connection {
        state.registry().unbind(old_connection);
    }
    state.registry().bind(connection_id, code.to_owned());
    info!(code, %connection_id, rebound = old_connection.is_some(), "player rejoined");

    events::send_to_connection(
        state,
        connection_id,
        &ServerMessage::RoomRejoined {
            room: snapshot.clone(),
        },
    );
    let others: Vec<ConnectionId> = targets
        .into_iter()
        .filter(|id| *id != connection_id)
        .collect();
    events::broadcast(state, &others, &ServerMessage::PlayerJoined { room: snapshot });
    Ok(())
}

/// Replace the room settings (host only, waiting phase only) and broadcast
/// the new values.
pub async fn update_settings(
    state: &SharedState,
    connection_id: ConnectionId,
    code: &str,
    settings: RoomSettingsDto,
) -> Result<(), ServiceError> {
    let shared = state.rooms().get(code).ok_or(ServiceError::RoomNotFound)?;

    let (dto, targets) = {
        let mut room = shared.lock().await;
        if room.host != connection_id {
            return Err(ServiceError::Unauthorized);
        }
        if room.phase != RoomPhase::Waiting {
            return Err(ServiceError::GameInProgress);
        }
        room.settings = settings.into();
        ((&room.settings).into(), member_ids(&room))
    };

    events::broadcast(state, &targets, &ServerMessage::SettingsUpdated { settings: dto });
    Ok(())
}

/// Fetch round content and transition the room into the playing phase.
///
/// The room mutex is never held across the provider fetch; a `starting`
/// guard on the room makes concurrent start requests fail fast instead of
/// fetching twice. On any failure the room stays in the waiting phase.
pub async fn start_game(
    state: &SharedState,
    connection_id: ConnectionId,
    code: &str,
) -> Result<(), ServiceError> {
    let shared = state.rooms().get(code).ok_or(ServiceError::RoomNotFound)?;

    let (source, round_count) = {
        let mut room = shared.lock().await;
        if room.host != connection_id {
            return Err(ServiceError::Unauthorized);
        }
        if room.phase != RoomPhase::Waiting || room.starting {
            return Err(ServiceError::GameInProgress);
        }
        room.starting = true;
        (room.settings.content_source.clone(), room.settings.round_count)
    };

    let fetched = state.provider().get_rounds(&source, round_count).await;

    let (message, targets) = {
        let mut room = shared.lock().await;
        room.starting = false;
        let rounds = fetched?;
        if room.phase != RoomPhase::Waiting {
            return Err(ServiceError::GameInProgress);
        }
        if !state.rooms().contains(code) {
            // Everyone left during the fetch and the room was deleted.
            return Err(ServiceError::RoomNotFound);
        }

        room.rounds = rounds;
        room.phase = RoomPhase::Playing;
        room.clock = Some(clock::spawn(state.clone(), code.to_owned(), room.rounds.len()));
        info!(code, rounds = room.rounds.len(), "game started");

        (
            ServerMessage::GameStarted {
                total_rounds: room.rounds.len(),
                settings: (&room.settings).into(),
            },
            member_ids(&room),
        )
    };

    events::broadcast(state, &targets, &message);
    Ok(())
}

/// Forward a client's round request to the room clock as an advance hint.
///
/// The clock validates the hint against its own schedule; a stale index is
/// simply dropped there.
pub async fn request_round(
    state: &SharedState,
    connection_id: ConnectionId,
    code: &str,
    round_index: usize,
) -> Result<(), ServiceError> {
    let shared = state.rooms().get(code).ok_or(ServiceError::RoomNotFound)?;
    let room = shared.lock().await;

    if room.player(connection_id).is_none() {
        return Err(ServiceError::Unauthorized);
    }
    if room.phase != RoomPhase::Playing {
        debug!(code, round_index, "ignoring round request outside playing phase");
        return Ok(());
    }
    if round_index > room.rounds.len() {
        return Err(ServiceError::InvalidInput("round index out of range".into()));
    }

    if let Some(clock) = &room.clock {
        clock.hint(ClockHint::Advance { round_index });
    }
    Ok(())
}

/// Score a submitted answer, reply privately, and broadcast refreshed
/// scores.
///
/// Duplicate and stale submissions are ignored without an error so a
/// retrying client never corrupts the round. When the submission completes
/// the round roster, the clock is hinted to cut the guess window short.
pub async fn submit_answer(
    state: &SharedState,
    connection_id: ConnectionId,
    code: &str,
    round_index: usize,
    answer: String,
    time_remaining: f64,
) -> Result<(), ServiceError> {
    let shared = state.rooms().get(code).ok_or(ServiceError::RoomNotFound)?;

    let (result, scores, targets) = {
        let mut room = shared.lock().await;
        if room.phase != RoomPhase::Playing || room.round_index != Some(round_index) {
            debug!(code, round_index, "ignoring submission for non-current round");
            return Ok(());
        }
        let Some(player) = room.player(connection_id) else {
            return Err(ServiceError::Unauthorized);
        };
        if room.has_submitted(round_index, connection_id) {
            debug!(code, %connection_id, round_index, "ignoring duplicate submission");
            return Ok(());
        }

        let prior_streak = player.streak;
        let clamped = time_remaining.clamp(0.0, state.config().timings().guess_window_secs());
        let is_correct = room
            .rounds
            .get(round_index)
            .is_some_and(|content| content.correct_answer == answer);

        let outcome = scoring::score(is_correct, clamped, prior_streak);
        let total_score = {
            let Some(player) = room.player_mut(connection_id) else {
                return Err(ServiceError::Unauthorized);
            };
            player.score += outcome.points;
            player.streak = outcome.streak;
            if is_correct {
                player.correct_answers += 1;
            }
            player.score
        };

        room.record_submission(
            round_index,
            connection_id,
            Submission {
                answer,
                is_correct,
                points: outcome.points,
                time_remaining: clamped,
            },
        );

        if room.all_players_submitted(round_index) {
            if let Some(clock) = &room.clock {
                clock.hint(ClockHint::AllSubmitted { round_index });
            }
        }

        let players: Vec<PlayerSummary> = room.players.iter().map(PlayerSummary::from).collect();
        (
            ServerMessage::AnswerResult {
                is_correct,
                points: outcome.points,
                streak: outcome.streak,
                total_score,
            },
            ServerMessage::ScoresUpdated { players },
            member_ids(&room),
        )
    };

    events::send_to_connection(state, connection_id, &result);
    events::broadcast(state, &targets, &scores);
    Ok(())
}

enum Departure {
    DeleteRoom,
    Notify {
        snapshot: RoomSnapshot,
        targets: Vec<ConnectionId>,
        new_host: Option<ConnectionId>,
    },
}

/// Remove a connection from whatever room it is in, promoting a new host or
/// deleting the room as needed.
///
/// Used for both an explicit `leave-room` and a socket disconnect, so it is
/// infallible: a connection that is in no room is a no-op.
pub async fn leave_room(state: &SharedState, connection_id: ConnectionId) {
    let Some(code) = state.registry().unbind(connection_id) else {
        return;
    };
    let Some(shared) = state.rooms().get(&code) else {
        return;
    };

    let (action, stopped_clock) = {
        let mut room = shared.lock().await;
        match room.remove_player(connection_id) {
            LeaveOutcome::NotMember => (None, None),
            LeaveOutcome::Empty => (Some(Departure::DeleteRoom), room.clock.take()),
            outcome @ (LeaveOutcome::Left | LeaveOutcome::HostChanged { .. }) => {
                // The departure may leave everyone remaining with an answer
                // already recorded; cut the guess window short if so.
                if room.phase == RoomPhase::Playing
                    && let Some(index) = room.round_index
                    && room.all_players_submitted(index)
                    && let Some(clock) = &room.clock
                {
                    clock.hint(ClockHint::AllSubmitted { round_index: index });
                }

                let new_host = match outcome {
                    LeaveOutcome::HostChanged { new_host } => Some(new_host),
                    _ => None,
                };
                (
                    Some(Departure::Notify {
                        snapshot: RoomSnapshot::from(&*room),
                        targets: member_ids(&room),
                        new_host,
                    }),
                    None,
                )
            }
        }
    };

    match action {
        None => {}
        Some(Departure::DeleteRoom) => {
            state.rooms().delete(&code);
            if let Some(clock) = stopped_clock {
                clock.shutdown();
            }
            info!(code, "room deleted after last player left");
        }
        Some(Departure::Notify {
            snapshot,
            targets,
            new_host,
        }) => {
            info!(code, %connection_id, "player left");
            events::broadcast(state, &targets, &ServerMessage::PlayerLeft { room: snapshot });
            if let Some(new_host_id) = new_host {
                events::broadcast(state, &targets, &ServerMessage::HostChanged { new_host_id });
            }
        }
    }
}

/// Connection ids of every current member, collected under the room lock.
pub fn member_ids(room: &Room) -> Vec<ConnectionId> {
    room.players.iter().map(|player| player.connection_id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_six_decimal_digits() {
        for _ in 0..100 {
            let code = generate_room_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
