//! iTunes Search API backed [`RoundContentProvider`].

use std::time::Duration;

use futures::future::BoxFuture;
use rand::seq::SliceRandom;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{ProviderError, RoundContentProvider, Track, build_rounds, catalog};
use crate::state::room::RoundContent;

/// Per-request timeout against the search API.
const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);
/// Upper bound on results requested per search call.
const SEARCH_RESULT_CAP: usize = 200;
/// For large artist pools, how many artists to sample per game.
const ARTIST_SAMPLE: usize = 15;
/// Smallest candidate pool worth building questions from.
const MIN_POOL_TARGET: usize = 30;

/// Content provider that searches the iTunes catalogue per artist and builds
/// artist-guessing questions from tracks that carry a playable preview.
#[derive(Clone)]
pub struct ItunesContentProvider {
    http: reqwest::Client,
    base_url: String,
}

/// Response envelope of the iTunes search endpoint.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<RawTrack>,
}

/// One raw search result; fields are optional because the API omits them for
/// non-song entities.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTrack {
    track_id: Option<i64>,
    track_name: Option<String>,
    artist_name: Option<String>,
    preview_url: Option<String>,
    artwork_url100: Option<String>,
}

impl ItunesContentProvider {
    /// Build a provider against the given API base URL.
    pub fn new(base_url: &str) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Search songs for one term, keeping only results with every field the
    /// game needs. In strict mode, results whose primary artist does not
    /// match the searched artist (featured credits, tributes) are dropped.
    async fn search_songs(
        &self,
        term: &str,
        limit: usize,
        strict: bool,
    ) -> Result<Vec<Track>, ProviderError> {
        // iTunes orders by popularity; over-fetch so shuffling has variety.
        let fetch_limit = (limit * 5).min(SEARCH_RESULT_CAP);
        let fetch_limit = fetch_limit.to_string();
        let url = format!("{}/search", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[
                ("term", term),
                ("entity", "song"),
                ("limit", fetch_limit.as_str()),
                ("country", "US"),
                ("explicit", "Yes"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let payload: SearchResponse = response.json().await?;

        let tracks: Vec<Track> = payload
            .results
            .into_iter()
            .filter_map(|raw| {
                let track = Track {
                    id: raw.track_id?,
                    name: raw.track_name?,
                    artist: raw.artist_name?,
                    preview_url: raw.preview_url?,
                    // Higher-resolution artwork for the reveal screen.
                    artwork_url: raw.artwork_url100?.replace("100x100", "300x300"),
                };
                (!strict || primary_artist_matches(&track.artist, term)).then_some(track)
            })
            .take(limit)
            .collect();

        debug!(term, found = tracks.len(), "iTunes search completed");
        Ok(tracks)
    }
}

/// Whether the searched artist is the primary credit on a result.
///
/// Tracks credited as "X feat. Y" only count for X; plain credits must
/// contain the search term (or vice versa, for shortened listings).
fn primary_artist_matches(credited: &str, term: &str) -> bool {
    let credited = credited.to_lowercase();
    let term = term.to_lowercase();

    let featured_markers = ["feat.", "ft.", "featuring", " & ", " x "];
    if featured_markers.iter().any(|marker| credited.contains(marker)) {
        let first = featured_markers
            .iter()
            .fold(credited.as_str(), |acc, marker| {
                acc.split(marker).next().unwrap_or(acc)
            })
            .trim();
        return first.contains(&term) || term.contains(first);
    }

    credited.contains(&term) || term.contains(credited.trim())
}

impl RoundContentProvider for ItunesContentProvider {
    fn get_rounds(
        &self,
        source: &str,
        count: usize,
    ) -> BoxFuture<'static, Result<Vec<RoundContent>, ProviderError>> {
        let provider = self.clone();
        let source = source.to_owned();

        Box::pin(async move {
            let Some(artists) = catalog::artists_for(&source) else {
                return Err(ProviderError::UnknownSource(source));
            };

            // Keep the thread-local rng out of scope across awaits; the
            // future must stay Send.
            let selected: Vec<&str> = {
                let mut rng = rand::rng();
                let mut selected = artists.to_vec();
                selected.shuffle(&mut rng);
                selected.truncate(ARTIST_SAMPLE);
                selected
            };

            let pool_target = (count * 3).max(MIN_POOL_TARGET);
            let songs_per_artist = (pool_target / selected.len() + 3).max(5);

            let mut tracks = Vec::new();
            for &artist in &selected {
                match provider.search_songs(artist, songs_per_artist, true).await {
                    Ok(found) => tracks.extend(found),
                    // One failing artist search must not sink the whole game
                    // start; the pool check below catches systemic failure.
                    Err(err) => warn!(artist, error = %err, "artist search failed"),
                }
                if tracks.len() >= pool_target {
                    break;
                }
            }

            build_rounds(tracks, count, &mut rand::rng())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_credit_matches_plain_listing() {
        assert!(primary_artist_matches("Juice WRLD", "Juice WRLD"));
        assert!(primary_artist_matches("The Notorious B.I.G.", "Notorious B.I.G."));
    }

    #[test]
    fn featured_credit_counts_only_for_primary_artist() {
        assert!(primary_artist_matches("Juice WRLD feat. Polo G", "Juice WRLD"));
        assert!(!primary_artist_matches("Polo G feat. Juice WRLD", "Juice WRLD"));
    }

    #[test]
    fn unrelated_artist_is_rejected() {
        assert!(!primary_artist_matches("Random Tribute Band", "Queen"));
    }
}
