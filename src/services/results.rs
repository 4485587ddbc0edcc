//! Fire-and-forget persistence of finished-game results.

use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::{
    dao::models::GameResultEntity,
    state::{SharedState, room::Room},
};

/// Game mode label written with every multiplayer room result.
const MULTIPLAYER_MODE: &str = "multiplayer";

/// Build one result entity per ranked player that carries a durable account
/// id. Guests are skipped; their score lived only in the room.
pub fn results_of(room: &Room) -> Vec<GameResultEntity> {
    let total_questions = room.rounds.len() as u32;
    let total_players = room.players.len() as u32;

    room.rankings()
        .into_iter()
        .enumerate()
        .filter_map(|(index, player)| {
            let user_id = player.user_id?;
            Some(GameResultEntity {
                user_id,
                score: player.score,
                game_mode: MULTIPLAYER_MODE.to_owned(),
                playlist: room.settings.content_source.clone(),
                correct_answers: player.correct_answers,
                total_questions,
                accuracy: GameResultEntity::accuracy_percent(player.correct_answers, total_questions),
                room_code: room.code.clone(),
                placement: (index + 1) as u32,
                total_players,
                recorded_at: OffsetDateTime::now_utc(),
            })
        })
        .collect()
}

/// Persist results on a detached task so game-over delivery never waits on
/// storage. Failures are logged and dropped; gameplay state is already gone.
pub fn record_results(state: &SharedState, results: Vec<GameResultEntity>) {
    if results.is_empty() {
        return;
    }

    let state = state.clone();
    tokio::spawn(async move {
        let Some(store) = state.result_store().await else {
            info!(
                count = results.len(),
                "degraded mode: skipping game result persistence"
            );
            return;
        };

        for result in results {
            let user_id = result.user_id;
            match store.record_game_result(result).await {
                Ok(()) => debug!(%user_id, "game result recorded"),
                Err(err) => warn!(%user_id, error = %err, "failed to persist game result"),
            }
        }
    });
}
