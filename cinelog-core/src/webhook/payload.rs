//! Lenient extraction of playback events from media-server webhook bodies.
//!
//! Media servers disagree on field names and on whether numbers arrive as
//! JSON numbers or strings, so every field is looked up under a list of
//! aliases and coerced. Coercion never fails: unusable values read as absent.

use std::fmt;

use serde_json::{Map, Value};

/// Minimum fraction of the runtime that counts as a completed watch.
pub const COMPLETION_THRESHOLD: f64 = 0.75;

const TMDB_ID_FIELDS: &[&str] = &["tmdbId", "Provider_tmdb"];
const SERIES_TMDB_ID_FIELDS: &[&str] =
    &["tmdbId", "seriesTmdbId", "SeriesProvider_tmdb"];
const TOTAL_TICKS_FIELDS: &[&str] = &["totalRunTimeInTicks", "RunTimeTicks"];
const POSITION_TICKS_FIELDS: &[&str] =
    &["currentRunTimeInTicks", "PlaybackPositionTicks"];
const SEASON_NUMBER_FIELDS: &[&str] = &["seasonNumber", "SeasonNumber"];
const EPISODE_NUMBER_FIELDS: &[&str] = &["episodeNumber", "EpisodeNumber"];

/// Why a well-formed delivery was accepted without recording anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkipReason {
    NotAnObject,
    MissingExternalId,
    MissingSeasonNumber,
    MissingEpisodeNumber,
    BelowThreshold { percentage: f64 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotAnObject => {
                f.write_str("Payload is not a JSON object")
            }
            SkipReason::MissingExternalId => {
                f.write_str("No TMDB id found in payload")
            }
            SkipReason::MissingSeasonNumber => {
                f.write_str("No season number found in payload")
            }
            SkipReason::MissingEpisodeNumber => {
                f.write_str("No episode number found in payload")
            }
            SkipReason::BelowThreshold { percentage } => write!(
                f,
                "Watch percentage {:.1}% is below the {:.0}% threshold",
                percentage * 100.0,
                COMPLETION_THRESHOLD * 100.0
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PayloadRejection {
    /// Body is not JSON at all. Terminal.
    Malformed(String),
    Skipped(SkipReason),
}

impl From<SkipReason> for PayloadRejection {
    fn from(reason: SkipReason) -> Self {
        PayloadRejection::Skipped(reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackProgress {
    pub total_ticks: f64,
    pub position_ticks: f64,
}

impl PlaybackProgress {
    /// `position / total`, or 0 when the total is unknown.
    pub fn watch_percentage(&self) -> f64 {
        if self.total_ticks > 0.0 {
            self.position_ticks / self.total_ticks
        } else {
            0.0
        }
    }

    pub fn is_complete(&self) -> bool {
        self.watch_percentage() >= COMPLETION_THRESHOLD
    }

    /// Skips anything under [`COMPLETION_THRESHOLD`].
    pub fn require_complete(&self) -> Result<(), SkipReason> {
        if self.is_complete() {
            Ok(())
        } else {
            Err(SkipReason::BelowThreshold {
                percentage: self.watch_percentage(),
            })
        }
    }

    fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            total_ticks: lookup(object, TOTAL_TICKS_FIELDS)
                .and_then(coerce_f64)
                .unwrap_or(0.0),
            position_ticks: lookup(object, POSITION_TICKS_FIELDS)
                .and_then(coerce_f64)
                .unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoviePlaybackEvent {
    pub external_id: i64,
    pub progress: PlaybackProgress,
}

impl MoviePlaybackEvent {
    pub fn parse(body: &[u8]) -> Result<Self, PayloadRejection> {
        let value = parse_json(body)?;
        let object = value.as_object().ok_or(SkipReason::NotAnObject)?;

        let external_id = lookup(object, TMDB_ID_FIELDS)
            .and_then(coerce_i64)
            .filter(|id| *id > 0)
            .ok_or(SkipReason::MissingExternalId)?;

        Ok(Self {
            external_id,
            progress: PlaybackProgress::from_object(object),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodePlaybackEvent {
    /// TMDB id of the show, not of the episode.
    pub show_external_id: i64,
    pub season_number: i32,
    pub episode_number: i32,
    pub progress: PlaybackProgress,
}

impl EpisodePlaybackEvent {
    pub fn parse(body: &[u8]) -> Result<Self, PayloadRejection> {
        let value = parse_json(body)?;
        let object = value.as_object().ok_or(SkipReason::NotAnObject)?;

        let show_external_id = lookup(object, SERIES_TMDB_ID_FIELDS)
            .and_then(coerce_i64)
            .filter(|id| *id > 0)
            .ok_or(SkipReason::MissingExternalId)?;
        // Season 0 holds specials.
        let season_number = lookup(object, SEASON_NUMBER_FIELDS)
            .and_then(coerce_i32)
            .filter(|n| *n >= 0)
            .ok_or(SkipReason::MissingSeasonNumber)?;
        let episode_number = lookup(object, EPISODE_NUMBER_FIELDS)
            .and_then(coerce_i32)
            .filter(|n| *n > 0)
            .ok_or(SkipReason::MissingEpisodeNumber)?;

        Ok(Self {
            show_external_id,
            season_number,
            episode_number,
            progress: PlaybackProgress::from_object(object),
        })
    }
}

fn parse_json(body: &[u8]) -> Result<Value, PayloadRejection> {
    serde_json::from_slice(body)
        .map_err(|e| PayloadRejection::Malformed(e.to_string()))
}

/// First alias carrying a non-null value.
fn lookup<'a>(object: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| object.get(*name))
        .find(|value| !value.is_null())
}

fn coerce_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| integral(n.as_f64()?)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| integral(s.parse::<f64>().ok()?))
        }
        _ => None,
    }
}

fn coerce_i32(value: &Value) -> Option<i32> {
    coerce_i64(value).and_then(|n| i32::try_from(n).ok())
}

fn integral(number: f64) -> Option<i64> {
    (number.is_finite()
        && number.fract() == 0.0
        && number.abs() < i64::MAX as f64)
        .then_some(number as i64)
}
