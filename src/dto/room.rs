//! Snapshot DTOs describing rooms, players, rounds, and rankings on the wire.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::state::room::{Player, Room, RoomPhase, RoomSettings, RoundContent};

/// Room phase as exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VisiblePhase {
    /// Players can join; host can configure and start.
    Waiting,
    /// Rounds are in progress.
    Playing,
    /// Final rankings have been broadcast.
    Finished,
}

impl From<RoomPhase> for VisiblePhase {
    fn from(value: RoomPhase) -> Self {
        match value {
            RoomPhase::Waiting => VisiblePhase::Waiting,
            RoomPhase::Playing => VisiblePhase::Playing,
            RoomPhase::Finished => VisiblePhase::Finished,
        }
    }
}

/// Game settings as carried on the wire in both directions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomSettingsDto {
    /// Playlist identifier resolved by the content provider.
    #[validate(length(min = 1, max = 64))]
    pub content_source: String,
    /// Number of rounds to play.
    #[validate(range(min = 1, max = 20))]
    pub round_count: usize,
}

impl From<&RoomSettings> for RoomSettingsDto {
    fn from(value: &RoomSettings) -> Self {
        Self {
            content_source: value.content_source.clone(),
            round_count: value.round_count,
        }
    }
}

impl From<RoomSettingsDto> for RoomSettings {
    fn from(value: RoomSettingsDto) -> Self {
        Self {
            content_source: value.content_source,
            round_count: value.round_count,
        }
    }
}

/// Public view of one participant.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    /// Live connection identifier (also the host identifier in snapshots).
    pub id: Uuid,
    /// Display name.
    pub display_name: String,
    /// Cumulative score.
    pub score: u32,
    /// Current consecutive-correct streak.
    pub streak: u32,
}

impl From<&Player> for PlayerSummary {
    fn from(value: &Player) -> Self {
        Self {
            id: value.connection_id,
            display_name: value.display_name.clone(),
            score: value.score,
            streak: value.streak,
        }
    }
}

/// Full room snapshot broadcast on roster changes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    /// Shareable room code.
    pub code: String,
    /// Connection currently holding host privilege.
    pub host_id: Uuid,
    /// Current phase.
    pub phase: VisiblePhase,
    /// Participants in join order.
    pub players: Vec<PlayerSummary>,
    /// Current game settings.
    pub settings: RoomSettingsDto,
    /// Index of the round in progress, `-1` before play starts.
    pub round_index: i64,
    /// Total number of rounds once the game has started.
    pub total_rounds: usize,
}

impl From<&Room> for RoomSnapshot {
    fn from(value: &Room) -> Self {
        Self {
            code: value.code.clone(),
            host_id: value.host,
            phase: value.phase.into(),
            players: value.players.iter().map(PlayerSummary::from).collect(),
            settings: (&value.settings).into(),
            round_index: value.round_index.map_or(-1, |index| index as i64),
            total_rounds: value.rounds.len(),
        }
    }
}

/// Payload of a `round-data` broadcast: everything clients need to play and
/// then reveal one round.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoundData {
    /// Index of the round being served.
    pub round_index: usize,
    /// Total rounds in this game.
    pub total_rounds: usize,
    /// Audio preview URL fetched directly by clients.
    pub preview_url: String,
    /// Shuffled answer options.
    pub options: Vec<String>,
    /// Track title, for the reveal phase.
    pub song_name: String,
    /// Primary artist, for the reveal phase.
    pub artist: String,
    /// Artwork URL, for the reveal phase.
    pub image: String,
    /// The correct option, marked client-side at reveal.
    pub correct_answer: String,
}

impl RoundData {
    /// Build the broadcast payload for one round of a room.
    pub fn new(round_index: usize, total_rounds: usize, content: &RoundContent) -> Self {
        Self {
            round_index,
            total_rounds,
            preview_url: content.preview_url.clone(),
            options: content.options.clone(),
            song_name: content.song_name.clone(),
            artist: content.artist.clone(),
            image: content.artwork_url.clone(),
            correct_answer: content.correct_answer.clone(),
        }
    }
}

/// One row of the final standings broadcast at game over.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    /// 1-based placement.
    pub rank: usize,
    /// Connection identifier of the ranked player.
    pub id: Uuid,
    /// Display name.
    pub display_name: String,
    /// Final score.
    pub score: u32,
    /// Correct answers across all rounds.
    pub correct_answers: u32,
}

/// Rank players descending by score; ties keep join order.
pub fn rankings_of(room: &Room) -> Vec<RankingEntry> {
    room.rankings()
        .into_iter()
        .enumerate()
        .map(|(index, player)| RankingEntry {
            rank: index + 1,
            id: player.connection_id,
            display_name: player.display_name.clone(),
            score: player.score,
            correct_answers: player.correct_answers,
        })
        .collect()
}
