//! Closed tagged unions for the bidirectional WebSocket event contract.
//!
//! Event names are kebab-case strings on the wire (`create-room`,
//! `round-data`, ...) but dispatch in code is a single exhaustive `match` per
//! direction.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::dto::room::{
    PlayerSummary, RankingEntry, RoomSettingsDto, RoomSnapshot, RoundData,
};
use crate::dto::validation::{validate_display_name, validate_room_code};

/// Error returned when an inbound frame fails to parse or validate.
#[derive(Debug, Error)]
pub enum MessageParseError {
    /// The frame was not valid JSON for any known event.
    #[error("invalid message: {0}")]
    Json(#[from] serde_json::Error),
    /// The frame parsed but carried an invalid payload.
    #[error("invalid payload: {0}")]
    Validation(String),
}

/// Messages accepted from game clients.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Create a new room with the caller as sole player and host.
    #[serde(rename = "create-room", rename_all = "camelCase")]
    CreateRoom {
        /// Name shown to other players.
        display_name: String,
        /// Durable account identifier for result persistence, if logged in.
        #[serde(default)]
        durable_user_id: Option<Uuid>,
        /// Initial game settings.
        settings: RoomSettingsDto,
        /// Client-picked room code; the server generates one when absent.
        #[serde(default)]
        desired_code: Option<String>,
    },
    /// Join an existing waiting room.
    #[serde(rename = "join-room", rename_all = "camelCase")]
    JoinRoom {
        /// Code of the room to join.
        code: String,
        /// Name shown to other players.
        display_name: String,
        /// Durable account identifier for result persistence, if logged in.
        #[serde(default)]
        durable_user_id: Option<Uuid>,
    },
    /// Reattach to a room after the transport reconnected with a fresh
    /// connection identifier.
    #[serde(rename = "rejoin-room", rename_all = "camelCase")]
    RejoinRoom {
        /// Code of the room to rejoin.
        code: String,
        /// Display name used to locate the existing player entry.
        display_name: String,
    },
    /// Replace the room settings (host only, waiting phase only).
    #[serde(rename = "update-settings", rename_all = "camelCase")]
    UpdateSettings {
        /// Code of the addressed room.
        code: String,
        /// Replacement settings.
        settings: RoomSettingsDto,
    },
    /// Fetch content and begin play (host only).
    #[serde(rename = "start-game", rename_all = "camelCase")]
    StartGame {
        /// Code of the addressed room.
        code: String,
    },
    /// Client-side countdown reached zero; ask for the next round. Treated as
    /// a hint to the room's authoritative clock.
    #[serde(rename = "request-round", rename_all = "camelCase")]
    RequestRound {
        /// Code of the addressed room.
        code: String,
        /// Round the client expects next; the round count signals completion.
        round_index: usize,
    },
    /// Submit an answer for the current round.
    #[serde(rename = "submit-answer", rename_all = "camelCase")]
    SubmitAnswer {
        /// Code of the addressed room.
        code: String,
        /// Round being answered.
        round_index: usize,
        /// The chosen option.
        answer: String,
        /// Seconds left on the client's round clock.
        time_remaining: f64,
    },
    /// Leave the current room.
    #[serde(rename = "leave-room")]
    LeaveRoom {},
    /// Any unrecognised event name; logged and dropped.
    #[serde(other)]
    Unknown,
}

impl ClientMessage {
    /// Parse and validate an inbound text frame.
    pub fn from_json_str(payload: &str) -> Result<Self, MessageParseError> {
        let message: Self = serde_json::from_str(payload)?;
        message
            .validate_payload()
            .map_err(MessageParseError::Validation)?;
        Ok(message)
    }

    fn validate_payload(&self) -> Result<(), String> {
        match self {
            ClientMessage::CreateRoom {
                display_name,
                settings,
                desired_code,
                ..
            } => {
                validate_display_name(display_name).map_err(describe)?;
                settings.validate().map_err(|err| err.to_string())?;
                if let Some(code) = desired_code {
                    validate_room_code(code).map_err(describe)?;
                }
                Ok(())
            }
            ClientMessage::JoinRoom {
                code, display_name, ..
            }
            | ClientMessage::RejoinRoom { code, display_name } => {
                validate_room_code(code).map_err(describe)?;
                validate_display_name(display_name).map_err(describe)
            }
            ClientMessage::UpdateSettings { code, settings } => {
                validate_room_code(code).map_err(describe)?;
                settings.validate().map_err(|err| err.to_string())
            }
            ClientMessage::StartGame { code }
            | ClientMessage::RequestRound { code, .. }
            | ClientMessage::SubmitAnswer { code, .. } => {
                validate_room_code(code).map_err(describe)
            }
            ClientMessage::LeaveRoom {} | ClientMessage::Unknown => Ok(()),
        }
    }
}

fn describe(err: ValidationError) -> String {
    err.message
        .map(|message| message.into_owned())
        .unwrap_or_else(|| err.code.into_owned())
}

/// Messages emitted to game clients, either as a private reply or a room-wide
/// broadcast.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Reply to `create-room`.
    #[serde(rename = "room-created")]
    RoomCreated {
        /// Code of the freshly created room.
        code: String,
        /// Snapshot of the new room.
        room: RoomSnapshot,
    },
    /// Roster broadcast after a join or rejoin.
    #[serde(rename = "player-joined")]
    PlayerJoined {
        /// Updated room snapshot.
        room: RoomSnapshot,
    },
    /// Private reply confirming a successful rejoin.
    #[serde(rename = "room-rejoined")]
    RoomRejoined {
        /// Current room snapshot for the reconnected client.
        room: RoomSnapshot,
    },
    /// Broadcast after the host changed the settings.
    #[serde(rename = "settings-updated")]
    SettingsUpdated {
        /// The new settings.
        settings: RoomSettingsDto,
    },
    /// Broadcast once content is fetched and play begins.
    #[serde(rename = "game-started", rename_all = "camelCase")]
    GameStarted {
        /// Number of rounds that will be played.
        total_rounds: usize,
        /// Settings the game was started with.
        settings: RoomSettingsDto,
    },
    /// Broadcast serving one round's question to the whole room.
    #[serde(rename = "round-data")]
    RoundData(RoundData),
    /// Private scoring result for a submitted answer.
    #[serde(rename = "answer-result", rename_all = "camelCase")]
    AnswerResult {
        /// Whether the submitted option was correct.
        is_correct: bool,
        /// Points awarded for this submission.
        points: u32,
        /// The player's streak after this submission.
        streak: u32,
        /// The player's cumulative score.
        total_score: u32,
    },
    /// Broadcast of the roster with refreshed scores after any submission.
    #[serde(rename = "scores-updated")]
    ScoresUpdated {
        /// Players with current scores and streaks, in join order.
        players: Vec<PlayerSummary>,
    },
    /// Broadcast of the final standings; terminal for gameplay.
    #[serde(rename = "game-over")]
    GameOver {
        /// Players ranked descending by score, ties by join order.
        rankings: Vec<RankingEntry>,
    },
    /// Roster broadcast after a departure.
    #[serde(rename = "player-left")]
    PlayerLeft {
        /// Updated room snapshot.
        room: RoomSnapshot,
    },
    /// Broadcast when host privilege moved to another connection.
    #[serde(rename = "host-changed", rename_all = "camelCase")]
    HostChanged {
        /// Connection now holding host privilege.
        new_host_id: Uuid,
    },
    /// Private failure report for the initiating connection.
    #[serde(rename = "error")]
    Error {
        /// Human-readable message displayed verbatim by the client.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_room_round_trips_with_optional_fields_absent() {
        let raw = r#"{
            "type": "create-room",
            "displayName": "Ava",
            "settings": {"contentSource": "top-charts", "roundCount": 7}
        }"#;
        let message = ClientMessage::from_json_str(raw).unwrap();
        match message {
            ClientMessage::CreateRoom {
                display_name,
                durable_user_id,
                settings,
                desired_code,
            } => {
                assert_eq!(display_name, "Ava");
                assert!(durable_user_id.is_none());
                assert!(desired_code.is_none());
                assert_eq!(settings.round_count, 7);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn unknown_event_names_parse_to_unknown() {
        let message = ClientMessage::from_json_str(r#"{"type": "ready-up"}"#).unwrap();
        assert!(matches!(message, ClientMessage::Unknown));
    }

    #[test]
    fn bad_room_code_is_rejected_at_parse_time() {
        let raw = r#"{"type": "join-room", "code": "48x913", "displayName": "Ben"}"#;
        assert!(matches!(
            ClientMessage::from_json_str(raw),
            Err(MessageParseError::Validation(_))
        ));
    }

    #[test]
    fn round_count_out_of_bounds_is_rejected() {
        let raw = r#"{
            "type": "create-room",
            "displayName": "Ava",
            "settings": {"contentSource": "top-charts", "roundCount": 0}
        }"#;
        assert!(matches!(
            ClientMessage::from_json_str(raw),
            Err(MessageParseError::Validation(_))
        ));
    }

    #[test]
    fn server_events_use_kebab_case_tags() {
        let json = serde_json::to_value(ServerMessage::HostChanged {
            new_host_id: Uuid::nil(),
        })
        .unwrap();
        assert_eq!(json["type"], "host-changed");
        assert!(json["newHostId"].is_string());
    }
}
