//! Round content provisioning: the provider abstraction and the question
//! builder turning candidate tracks into playable rounds.

pub mod catalog;
pub mod itunes;

use std::collections::HashSet;

use futures::future::BoxFuture;
use rand::{Rng, seq::SliceRandom};
use thiserror::Error;

pub use itunes::ItunesContentProvider;

use crate::state::room::RoundContent;

/// Number of wrong options offered alongside the correct artist.
const DISTRACTOR_COUNT: usize = 3;

/// Errors surfaced by content providers. All of them are reported to the
/// host as a failed game start; the room stays in the waiting phase.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The content source is not in the catalogue.
    #[error("unknown content source `{0}`")]
    UnknownSource(String),
    /// The upstream search API could not be reached.
    #[error("content request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Fewer usable tracks were found than the game needs.
    #[error("not enough usable tracks: needed {needed}, got {got}")]
    NotEnoughTracks {
        /// Number of tracks the game requires.
        needed: usize,
        /// Number of usable tracks actually found.
        got: usize,
    },
}

/// Async source of playable song questions, keyed by content source.
///
/// The coordinator treats this as an opaque function: it must return at
/// least `count` usable rounds or fail, and the caller surfaces any failure
/// as `ContentUnavailable` without mutating room state.
pub trait RoundContentProvider: Send + Sync {
    /// Fetch a shuffled, deduplicated set of `count` rounds for a source.
    fn get_rounds(
        &self,
        source: &str,
        count: usize,
    ) -> BoxFuture<'static, Result<Vec<RoundContent>, ProviderError>>;
}

/// One candidate track as returned by a track search, before question
/// building.
#[derive(Debug, Clone)]
pub struct Track {
    /// Upstream track identifier, used only for deduplication.
    pub id: i64,
    /// Track title.
    pub name: String,
    /// Primary artist.
    pub artist: String,
    /// Short audio preview URL.
    pub preview_url: String,
    /// Artwork URL.
    pub artwork_url: String,
}

/// Collapse a string to a comparison key: lowercase alphanumerics only.
fn normalize_key(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Drop tracks that are the same song under a slightly different listing.
fn dedupe_tracks(tracks: Vec<Track>) -> Vec<Track> {
    let mut seen = HashSet::new();
    tracks
        .into_iter()
        .filter(|track| {
            let key = format!(
                "{}-{}",
                normalize_key(&track.artist),
                normalize_key(&track.name)
            );
            seen.insert(key)
        })
        .collect()
}

/// Build `count` artist-guessing rounds from a candidate track pool.
///
/// The pool is deduplicated and shuffled; each selected track gets the
/// correct artist plus [`DISTRACTOR_COUNT`] unique wrong artists drawn from
/// the rest of the pool, with the options shuffled.
pub fn build_rounds<R: Rng>(
    tracks: Vec<Track>,
    count: usize,
    rng: &mut R,
) -> Result<Vec<RoundContent>, ProviderError> {
    let mut pool = dedupe_tracks(tracks);
    pool.retain(|track| !track.preview_url.is_empty());

    let distinct_artists: HashSet<String> =
        pool.iter().map(|track| normalize_key(&track.artist)).collect();
    if pool.len() < count || distinct_artists.len() < DISTRACTOR_COUNT + 1 {
        return Err(ProviderError::NotEnoughTracks {
            needed: count,
            got: pool.len().min(distinct_artists.len()),
        });
    }

    pool.shuffle(rng);

    let rounds = pool
        .iter()
        .take(count)
        .map(|track| {
            let mut distractors: Vec<String> = Vec::with_capacity(DISTRACTOR_COUNT);
            let mut seen = HashSet::new();
            seen.insert(normalize_key(&track.artist));

            let mut others: Vec<&Track> = pool
                .iter()
                .filter(|candidate| candidate.id != track.id)
                .collect();
            others.shuffle(rng);

            for candidate in others {
                if distractors.len() == DISTRACTOR_COUNT {
                    break;
                }
                if seen.insert(normalize_key(&candidate.artist)) {
                    distractors.push(candidate.artist.clone());
                }
            }

            let mut options = Vec::with_capacity(DISTRACTOR_COUNT + 1);
            options.push(track.artist.clone());
            options.extend(distractors);
            options.shuffle(rng);

            RoundContent {
                preview_url: track.preview_url.clone(),
                correct_answer: track.artist.clone(),
                options,
                song_name: track.name.clone(),
                artist: track.artist.clone(),
                artwork_url: track.artwork_url.clone(),
            }
        })
        .collect();

    Ok(rounds)
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn track(id: i64, artist: &str, name: &str) -> Track {
        Track {
            id,
            name: name.into(),
            artist: artist.into(),
            preview_url: format!("https://audio.example/{id}.m4a"),
            artwork_url: format!("https://art.example/{id}.jpg"),
        }
    }

    fn pool() -> Vec<Track> {
        vec![
            track(1, "Queen", "Bohemian Rhapsody"),
            track(2, "ABBA", "Waterloo"),
            track(3, "Madonna", "Like a Prayer"),
            track(4, "Prince", "Kiss"),
            track(5, "Toto", "Africa"),
            track(6, "Blondie", "Call Me"),
        ]
    }

    #[test]
    fn rounds_have_four_unique_options_including_answer() {
        let mut rng = StdRng::seed_from_u64(7);
        let rounds = build_rounds(pool(), 4, &mut rng).unwrap();
        assert_eq!(rounds.len(), 4);
        for round in rounds {
            assert_eq!(round.options.len(), 4);
            assert!(round.options.contains(&round.correct_answer));
            let unique: HashSet<&String> = round.options.iter().collect();
            assert_eq!(unique.len(), 4);
        }
    }

    #[test]
    fn duplicate_listings_are_collapsed() {
        let mut tracks = pool();
        tracks.push(track(99, "QUEEN", "Bohemian Rhapsody!"));
        let mut rng = StdRng::seed_from_u64(7);
        let rounds = build_rounds(tracks, 6, &mut rng).unwrap();
        let bohemians = rounds
            .iter()
            .filter(|round| normalize_key(&round.song_name).starts_with("bohemianrhapsody"))
            .count();
        assert!(bohemians <= 1);
    }

    #[test]
    fn too_few_tracks_is_an_error() {
        let mut rng = StdRng::seed_from_u64(7);
        let err = build_rounds(pool(), 10, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::NotEnoughTracks { needed: 10, .. }
        ));
    }

    #[test]
    fn too_few_distinct_artists_is_an_error() {
        let tracks = vec![
            track(1, "Queen", "Bohemian Rhapsody"),
            track(2, "Queen", "Under Pressure"),
            track(3, "ABBA", "Waterloo"),
        ];
        let mut rng = StdRng::seed_from_u64(7);
        assert!(build_rounds(tracks, 2, &mut rng).is_err());
    }

    #[test]
    fn tracks_without_previews_are_unusable() {
        let mut tracks = pool();
        for track in &mut tracks {
            track.preview_url.clear();
        }
        let mut rng = StdRng::seed_from_u64(7);
        assert!(build_rounds(tracks, 2, &mut rng).is_err());
    }
}
