//! In-memory representation of one multiplayer session and its participants.

use std::collections::HashMap;

use tokio::{sync::mpsc, task::JoinHandle};
use uuid::Uuid;

use crate::error::ServiceError;

/// Identifier of one live WebSocket connection.
pub type ConnectionId = Uuid;

/// Hard cap on concurrent players per room.
pub const MAX_PLAYERS: usize = 8;

/// Coarse state-machine position of a room, governing which events are
/// accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomPhase {
    /// Players can join and the host can change settings or start the game.
    Waiting,
    /// Rounds are being served and answers accepted.
    Playing,
    /// Gameplay is over; the room lingers only until its last player leaves.
    Finished,
}

/// Host-controlled game settings, mutable only while the room is waiting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSettings {
    /// Playlist identifier handed to the content provider.
    pub content_source: String,
    /// Number of rounds to fetch and play.
    pub round_count: usize,
}

/// One participant, identified by its live connection.
#[derive(Debug, Clone)]
pub struct Player {
    /// Current live connection; rebound in place on reconnect.
    pub connection_id: ConnectionId,
    /// Display name shown to other players, also the rejoin key.
    pub display_name: String,
    /// Durable account identifier used for result persistence, if any.
    pub user_id: Option<Uuid>,
    /// Cumulative score across all rounds.
    pub score: u32,
    /// Consecutive correct answers, reset to zero on a miss.
    pub streak: u32,
    /// Total correct answers, used for accuracy reporting downstream.
    pub correct_answers: u32,
}

impl Player {
    /// Create a fresh participant with zeroed counters.
    pub fn new(connection_id: ConnectionId, display_name: String, user_id: Option<Uuid>) -> Self {
        Self {
            connection_id,
            display_name,
            user_id,
            score: 0,
            streak: 0,
            correct_answers: 0,
        }
    }
}

/// One question: a playable preview, the correct artist, and the options the
/// player picks from. Display metadata is used only for the reveal phase,
/// never for scoring.
#[derive(Debug, Clone)]
pub struct RoundContent {
    /// URL of the short audio preview the clients play.
    pub preview_url: String,
    /// The artist name that counts as correct.
    pub correct_answer: String,
    /// Shuffled answer options (correct answer plus distractors).
    pub options: Vec<String>,
    /// Track title, shown at reveal.
    pub song_name: String,
    /// Primary artist, shown at reveal.
    pub artist: String,
    /// Artwork URL, shown at reveal.
    pub artwork_url: String,
}

/// One player's answer to one round, immutable once recorded.
#[derive(Debug, Clone)]
pub struct Submission {
    /// The option the player chose.
    pub answer: String,
    /// Whether the chosen option matched the correct answer.
    pub is_correct: bool,
    /// Points awarded by the scoring formula.
    pub points: u32,
    /// Seconds left on the round clock at submission time.
    pub time_remaining: f64,
}

/// Client-originated signals forwarded to a room's clock task.
///
/// The clock re-validates each hint against its own schedule; a stale or
/// bogus hint is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockHint {
    /// A client finished its local countdown and asked for this round (or,
    /// when the index equals the round count, for game completion).
    Advance {
        /// Index of the round the client wants served next.
        round_index: usize,
    },
    /// Every current player has submitted an answer for this round.
    AllSubmitted {
        /// Index of the fully-answered round.
        round_index: usize,
    },
}

/// Handle to the authoritative per-room clock task.
#[derive(Debug)]
pub struct ClockHandle {
    hints: mpsc::UnboundedSender<ClockHint>,
    task: JoinHandle<()>,
}

impl ClockHandle {
    /// Bundle the hint channel and the spawned driver task.
    pub fn new(hints: mpsc::UnboundedSender<ClockHint>, task: JoinHandle<()>) -> Self {
        Self { hints, task }
    }

    /// Forward a hint to the clock task, ignoring a closed channel (the task
    /// already finished).
    pub fn hint(&self, hint: ClockHint) {
        let _ = self.hints.send(hint);
    }

    /// Stop the clock task; called when the room is deleted.
    pub fn shutdown(&self) {
        self.task.abort();
    }
}

/// Outcome of removing a player from a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The connection was not a member of this room.
    NotMember,
    /// The player left and others remain; no host change was needed.
    Left,
    /// The departing player was host; the earliest remaining joiner took over.
    HostChanged {
        /// Connection now holding host privilege.
        new_host: ConnectionId,
    },
    /// The last player left; the caller must delete the room.
    Empty,
}

/// One multiplayer session, addressed by a short shareable code.
///
/// Vec order of `players` is join order and defines host succession.
#[derive(Debug)]
pub struct Room {
    /// Immutable shareable identifier, unique among active rooms.
    pub code: String,
    /// Connection currently privileged to change settings and start the game.
    pub host: ConnectionId,
    /// Participants in join order.
    pub players: Vec<Player>,
    /// Host-controlled game settings.
    pub settings: RoomSettings,
    /// Coarse phase governing event acceptance.
    pub phase: RoomPhase,
    /// Index of the round currently being played; `None` before play starts.
    pub round_index: Option<usize>,
    /// Question sequence, fixed once fetched at game start.
    pub rounds: Vec<RoundContent>,
    /// Guard flag: a content fetch for `start-game` is in flight.
    pub starting: bool,
    /// Authoritative round driver, present while a game is running.
    pub clock: Option<ClockHandle>,
    submissions: HashMap<usize, HashMap<ConnectionId, Submission>>,
}

impl Room {
    /// Create a waiting room with the given player as sole member and host.
    pub fn new(code: String, host: Player, settings: RoomSettings) -> Self {
        Self {
            code,
            host: host.connection_id,
            players: vec![host],
            settings,
            phase: RoomPhase::Waiting,
            round_index: None,
            rounds: Vec::new(),
            starting: false,
            clock: None,
            submissions: HashMap::new(),
        }
    }

    /// Borrow a player by connection id.
    pub fn player(&self, connection_id: ConnectionId) -> Option<&Player> {
        self.players
            .iter()
            .find(|player| player.connection_id == connection_id)
    }

    /// Mutably borrow a player by connection id.
    pub fn player_mut(&mut self, connection_id: ConnectionId) -> Option<&mut Player> {
        self.players
            .iter_mut()
            .find(|player| player.connection_id == connection_id)
    }

    /// Append a joining player after checking phase, capacity, and uniqueness.
    pub fn add_player(&mut self, player: Player) -> Result<(), ServiceError> {
        if self.phase != RoomPhase::Waiting {
            return Err(ServiceError::GameInProgress);
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(ServiceError::RoomFull);
        }
        if self.player(player.connection_id).is_some() {
            return Err(ServiceError::InvalidInput(
                "connection already joined this room".into(),
            ));
        }
        self.players.push(player);
        Ok(())
    }

    /// Rebind an existing player (matched by display name) to a new
    /// connection, preserving score and streak across the reconnect.
    ///
    /// Returns the replaced connection id when a match was found. Host
    /// privilege and recorded submissions follow the player to the new
    /// connection.
    pub fn rebind_player(
        &mut self,
        display_name: &str,
        new_connection: ConnectionId,
    ) -> Option<ConnectionId> {
        let player = self
            .players
            .iter_mut()
            .find(|player| player.display_name == display_name)?;

        let old_connection = player.connection_id;
        player.connection_id = new_connection;

        if self.host == old_connection {
            self.host = new_connection;
        }

        for round_submissions in self.submissions.values_mut() {
            if let Some(submission) = round_submissions.remove(&old_connection) {
                round_submissions.insert(new_connection, submission);
            }
        }

        Some(old_connection)
    }

    /// Remove a player, promoting the earliest remaining joiner when the host
    /// departs.
    pub fn remove_player(&mut self, connection_id: ConnectionId) -> LeaveOutcome {
        let Some(position) = self
            .players
            .iter()
            .position(|player| player.connection_id == connection_id)
        else {
            return LeaveOutcome::NotMember;
        };

        self.players.remove(position);

        if self.players.is_empty() {
            return LeaveOutcome::Empty;
        }

        if self.host == connection_id {
            let new_host = self.players[0].connection_id;
            self.host = new_host;
            return LeaveOutcome::HostChanged { new_host };
        }

        LeaveOutcome::Left
    }

    /// Index of the round the clock is expected to serve next.
    pub fn next_round_index(&self) -> usize {
        self.round_index.map_or(0, |index| index + 1)
    }

    /// Reset the submission map for a round about to be served.
    pub fn open_round(&mut self, round_index: usize) {
        self.round_index = Some(round_index);
        self.submissions.insert(round_index, HashMap::new());
    }

    /// Whether a connection already has a recorded submission for a round.
    pub fn has_submitted(&self, round_index: usize, connection_id: ConnectionId) -> bool {
        self.submissions
            .get(&round_index)
            .is_some_and(|round| round.contains_key(&connection_id))
    }

    /// Record a submission. Panics in debug builds on a duplicate, which the
    /// caller must have ruled out via [`Room::has_submitted`].
    pub fn record_submission(
        &mut self,
        round_index: usize,
        connection_id: ConnectionId,
        submission: Submission,
    ) {
        let round = self.submissions.entry(round_index).or_default();
        debug_assert!(!round.contains_key(&connection_id));
        round.insert(connection_id, submission);
    }

    /// Whether every current player has submitted for the given round.
    pub fn all_players_submitted(&self, round_index: usize) -> bool {
        let Some(round) = self.submissions.get(&round_index) else {
            return false;
        };
        self.players
            .iter()
            .all(|player| round.contains_key(&player.connection_id))
    }

    /// Players sorted descending by score with a stable tie-break on join
    /// order (earlier joiner ranks higher).
    pub fn rankings(&self) -> Vec<&Player> {
        let mut ranked: Vec<&Player> = self.players.iter().collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> RoomSettings {
        RoomSettings {
            content_source: "best-of-gen-z".into(),
            round_count: 7,
        }
    }

    fn room_with_players(names: &[&str]) -> (Room, Vec<ConnectionId>) {
        let mut ids = vec![Uuid::new_v4()];
        let mut room = Room::new(
            "482913".into(),
            Player::new(ids[0], names[0].into(), None),
            settings(),
        );
        for name in &names[1..] {
            let id = Uuid::new_v4();
            room.add_player(Player::new(id, (*name).into(), None)).unwrap();
            ids.push(id);
        }
        (room, ids)
    }

    #[test]
    fn join_rejected_once_playing() {
        let (mut room, _) = room_with_players(&["Ava"]);
        room.phase = RoomPhase::Playing;
        let err = room
            .add_player(Player::new(Uuid::new_v4(), "Ben".into(), None))
            .unwrap_err();
        assert!(matches!(err, ServiceError::GameInProgress));
    }

    #[test]
    fn join_rejected_at_capacity() {
        let names: Vec<String> = (0..MAX_PLAYERS).map(|i| format!("p{i}")).collect();
        let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let (mut room, _) = room_with_players(&name_refs);
        let err = room
            .add_player(Player::new(Uuid::new_v4(), "late".into(), None))
            .unwrap_err();
        assert!(matches!(err, ServiceError::RoomFull));
    }

    #[test]
    fn duplicate_connection_rejected() {
        let (mut room, ids) = room_with_players(&["Ava"]);
        let err = room
            .add_player(Player::new(ids[0], "Ava2".into(), None))
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[test]
    fn host_succession_follows_join_order() {
        let (mut room, ids) = room_with_players(&["Ava", "Ben", "Cleo"]);
        assert_eq!(room.host, ids[0]);

        let outcome = room.remove_player(ids[0]);
        assert_eq!(outcome, LeaveOutcome::HostChanged { new_host: ids[1] });
        assert_eq!(room.host, ids[1]);
    }

    #[test]
    fn non_host_departure_keeps_host() {
        let (mut room, ids) = room_with_players(&["Ava", "Ben"]);
        assert_eq!(room.remove_player(ids[1]), LeaveOutcome::Left);
        assert_eq!(room.host, ids[0]);
    }

    #[test]
    fn last_player_departure_empties_room() {
        let (mut room, ids) = room_with_players(&["Ava"]);
        assert_eq!(room.remove_player(ids[0]), LeaveOutcome::Empty);
    }

    #[test]
    fn rebind_preserves_score_and_transfers_host() {
        let (mut room, ids) = room_with_players(&["Ava", "Ben"]);
        room.player_mut(ids[0]).unwrap().score = 300;
        room.player_mut(ids[0]).unwrap().streak = 2;

        let new_connection = Uuid::new_v4();
        let old = room.rebind_player("Ava", new_connection).unwrap();
        assert_eq!(old, ids[0]);
        assert_eq!(room.host, new_connection);

        let player = room.player(new_connection).unwrap();
        assert_eq!(player.score, 300);
        assert_eq!(player.streak, 2);
    }

    #[test]
    fn rebind_migrates_recorded_submissions() {
        let (mut room, ids) = room_with_players(&["Ava"]);
        room.open_round(0);
        room.record_submission(
            0,
            ids[0],
            Submission {
                answer: "Queen".into(),
                is_correct: true,
                points: 300,
                time_remaining: 5.0,
            },
        );

        let new_connection = Uuid::new_v4();
        room.rebind_player("Ava", new_connection);
        assert!(room.has_submitted(0, new_connection));
        assert!(!room.has_submitted(0, ids[0]));
    }

    #[test]
    fn all_players_submitted_tracks_current_roster() {
        let (mut room, ids) = room_with_players(&["Ava", "Ben"]);
        room.open_round(0);
        assert!(!room.all_players_submitted(0));

        room.record_submission(
            0,
            ids[0],
            Submission {
                answer: "Queen".into(),
                is_correct: true,
                points: 250,
                time_remaining: 0.0,
            },
        );
        assert!(!room.all_players_submitted(0));

        // Ben leaves; Ava alone now satisfies the predicate.
        room.remove_player(ids[1]);
        assert!(room.all_players_submitted(0));
    }

    #[test]
    fn rankings_break_ties_by_join_order() {
        let (mut room, ids) = room_with_players(&["Ava", "Ben", "Cleo"]);
        room.player_mut(ids[0]).unwrap().score = 300;
        room.player_mut(ids[1]).unwrap().score = 550;
        room.player_mut(ids[2]).unwrap().score = 300;

        let ranked = room.rankings();
        let names: Vec<&str> = ranked.iter().map(|p| p.display_name.as_str()).collect();
        assert_eq!(names, vec!["Ben", "Ava", "Cleo"]);
    }
}
