//! Application-level configuration loading: round timing windows and content
//! provider settings.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "AUDIOFY_BACK_CONFIG_PATH";

const DEFAULT_LEAD_IN_MS: u64 = 3_000;
const DEFAULT_COUNTDOWN_MS: u64 = 3_000;
const DEFAULT_GUESS_WINDOW_MS: u64 = 7_000;
const DEFAULT_REVEAL_MS: u64 = 5_000;
const DEFAULT_ITUNES_BASE_URL: &str = "https://itunes.apple.com";

/// Timing windows that drive the per-room game clock.
#[derive(Debug, Clone, Copy)]
pub struct ClockTimings {
    /// Delay between `game-started` and the first round being served.
    pub lead_in: Duration,
    /// Pre-round countdown shown to players before the preview plays.
    pub countdown: Duration,
    /// Window during which answers are accepted for a round.
    pub guess_window: Duration,
    /// Time spent revealing the answer before the next round.
    pub reveal: Duration,
}

impl ClockTimings {
    /// Answer window in whole seconds, used to cap the time bonus.
    pub fn guess_window_secs(&self) -> f64 {
        self.guess_window.as_secs_f64()
    }
}

impl Default for ClockTimings {
    fn default() -> Self {
        Self {
            lead_in: Duration::from_millis(DEFAULT_LEAD_IN_MS),
            countdown: Duration::from_millis(DEFAULT_COUNTDOWN_MS),
            guess_window: Duration::from_millis(DEFAULT_GUESS_WINDOW_MS),
            reveal: Duration::from_millis(DEFAULT_REVEAL_MS),
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    timings: ClockTimings,
    itunes_base_url: Option<String>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in
    /// defaults when the file is missing or malformed.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Build a configuration from explicit timing windows, used by tests to
    /// shrink the clock schedule.
    pub fn with_timings(timings: ClockTimings) -> Self {
        Self {
            timings,
            itunes_base_url: None,
        }
    }

    /// Timing windows used by the per-room game clock.
    pub fn timings(&self) -> ClockTimings {
        self.timings
    }

    /// Base URL for the iTunes search API.
    pub fn itunes_base_url(&self) -> &str {
        self.itunes_base_url
            .as_deref()
            .unwrap_or(DEFAULT_ITUNES_BASE_URL)
    }
}

/// On-disk shape of the configuration file; every field is optional.
#[derive(Debug, Deserialize)]
struct RawConfig {
    lead_in_ms: Option<u64>,
    countdown_ms: Option<u64>,
    guess_window_ms: Option<u64>,
    reveal_ms: Option<u64>,
    itunes_base_url: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = ClockTimings::default();
        Self {
            timings: ClockTimings {
                lead_in: raw.lead_in_ms.map(Duration::from_millis).unwrap_or(defaults.lead_in),
                countdown: raw
                    .countdown_ms
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.countdown),
                guess_window: raw
                    .guess_window_ms
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.guess_window),
                reveal: raw.reveal_ms.map(Duration::from_millis).unwrap_or(defaults.reveal),
            },
            itunes_base_url: raw.itunes_base_url,
        }
    }
}

fn resolve_config_path() -> PathBuf {
    env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_windows() {
        let config = AppConfig::default();
        assert_eq!(config.timings().guess_window, Duration::from_secs(7));
        assert_eq!(config.timings().reveal, Duration::from_secs(5));
        assert_eq!(config.itunes_base_url(), "https://itunes.apple.com");
    }

    #[test]
    fn raw_config_overrides_only_present_fields() {
        let raw: RawConfig =
            serde_json::from_str(r#"{"guess_window_ms": 10000, "itunes_base_url": "http://localhost:9999"}"#)
                .unwrap();
        let config: AppConfig = raw.into();
        assert_eq!(config.timings().guess_window, Duration::from_secs(10));
        assert_eq!(config.timings().countdown, Duration::from_secs(3));
        assert_eq!(config.itunes_base_url(), "http://localhost:9999");
    }
}
