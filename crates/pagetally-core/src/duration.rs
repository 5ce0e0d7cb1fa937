//! Playlist duration arithmetic.
//!
//! [`Duration::add_timestamp`] is the only place that carries seconds into
//! minutes, minutes into hours and hours into days. Conversions from a raw
//! second count go through it as well, so the accumulated and the
//! floor-division views of a total always agree.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CoreError;

const SECONDS_PER_MINUTE: u64 = 60;
const MINUTES_PER_HOUR: u64 = 60;
const HOURS_PER_DAY: u64 = 24;
const SECONDS_PER_HOUR: u64 = SECONDS_PER_MINUTE * MINUTES_PER_HOUR;
const SECONDS_PER_DAY: u64 = SECONDS_PER_HOUR * HOURS_PER_DAY;

/// Chunk lengths reported by [`chunk_hints`] for playlists of an hour or more.
const HINT_CHUNK_MINUTES: [i64; 2] = [15, 30];

/// Normalized elapsed time. `hours < 24`, `minutes < 60`, `seconds < 60`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Duration {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

/// A single video length as rendered in a duration badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("timestamp is empty")]
    Empty,

    #[error("timestamp \"{0}\" must have 2 or 3 colon-separated parts")]
    PartCount(String),

    #[error("timestamp \"{input}\" has a non-numeric part \"{part}\"")]
    NotNumeric { input: String, part: String },
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TimestampError::Empty);
        }

        let parts = trimmed
            .split(':')
            .map(|part| {
                let part = part.trim();
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(TimestampError::NotNumeric {
                        input: trimmed.to_string(),
                        part: part.to_string(),
                    });
                }
                part.parse::<u64>().map_err(|_| TimestampError::NotNumeric {
                    input: trimmed.to_string(),
                    part: part.to_string(),
                })
            })
            .collect::<Result<Vec<u64>, _>>()?;

        match parts.as_slice() {
            [minutes, seconds] => Ok(Self {
                hours: 0,
                minutes: *minutes,
                seconds: *seconds,
            }),
            [hours, minutes, seconds] => Ok(Self {
                hours: *hours,
                minutes: *minutes,
                seconds: *seconds,
            }),
            _ => Err(TimestampError::PartCount(trimmed.to_string())),
        }
    }
}

impl Duration {
    pub const ZERO: Self = Self {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Adds one timestamp, carrying overflow upward unit by unit.
    pub fn add_timestamp(&mut self, ts: Timestamp) {
        let seconds = self.seconds.saturating_add(ts.seconds);
        self.seconds = seconds % SECONDS_PER_MINUTE;

        let minutes = self
            .minutes
            .saturating_add(ts.minutes)
            .saturating_add(seconds / SECONDS_PER_MINUTE);
        self.minutes = minutes % MINUTES_PER_HOUR;

        let hours = self
            .hours
            .saturating_add(ts.hours)
            .saturating_add(minutes / MINUTES_PER_HOUR);
        self.hours = hours % HOURS_PER_DAY;

        self.days = self.days.saturating_add(hours / HOURS_PER_DAY);
    }

    #[must_use]
    pub fn from_total_seconds(total: u64) -> Self {
        let mut duration = Self::ZERO;
        duration.add_timestamp(Timestamp {
            hours: 0,
            minutes: 0,
            seconds: total,
        });
        duration
    }

    /// Saturates at `u64::MAX`; see [`Self::checked_total_seconds`].
    #[must_use]
    pub fn total_seconds(&self) -> u64 {
        self.checked_total_seconds().unwrap_or(u64::MAX)
    }

    /// `None` when the total does not fit in a `u64`. Fields are not assumed
    /// normalized, since a deserialized value may carry any count per unit.
    #[must_use]
    pub fn checked_total_seconds(&self) -> Option<u64> {
        self.days
            .checked_mul(SECONDS_PER_DAY)?
            .checked_add(self.hours.checked_mul(SECONDS_PER_HOUR)?)?
            .checked_add(self.minutes.checked_mul(SECONDS_PER_MINUTE)?)?
            .checked_add(self.seconds)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.total_seconds() == 0
    }

    /// Short form used by overlays, e.g. `"1h 2m 3s"`.
    #[must_use]
    pub fn compact(&self) -> String {
        let mut out = String::new();
        if self.days > 0 {
            out.push_str(&format!("{}d ", self.days));
        }
        if self.hours > 0 || self.days > 0 {
            out.push_str(&format!("{}h ", self.hours));
        }
        if self.minutes > 0 || self.hours > 0 || self.days > 0 {
            out.push_str(&format!("{}m ", self.minutes));
        }
        out.push_str(&format!("{}s", self.seconds));
        out
    }
}

fn plural(n: u64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

impl fmt::Display for Duration {
    /// Long form, e.g. `"1 day, 2 hours, 3 minutes, 1 second"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.days > 0 {
            write!(f, "{} day{}, ", self.days, plural(self.days))?;
        }
        if self.hours > 0 || self.days > 0 {
            write!(f, "{} hour{}, ", self.hours, plural(self.hours))?;
        }
        write!(
            f,
            "{} minute{}, {} second{}",
            self.minutes,
            plural(self.minutes),
            self.seconds,
            plural(self.seconds)
        )
    }
}

/// Sums every parseable timestamp in `timestamps`, in order.
///
/// Malformed entries are skipped.
pub fn aggregate_timestamps<I, S>(timestamps: I) -> Duration
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut total = Duration::ZERO;
    for raw in timestamps {
        match raw.as_ref().parse::<Timestamp>() {
            Ok(ts) => total.add_timestamp(ts),
            Err(e) => tracing::debug!(error = %e, "skipping malformed timestamp"),
        }
    }
    total
}

/// Number of `chunk_minutes`-long blocks needed to cover `duration`.
///
/// # Errors
///
/// Returns [`CoreError::InvalidChunkSize`] when `chunk_minutes <= 0`, and
/// [`CoreError::DurationOverflow`] when `duration` has no representable
/// total.
pub fn chunk_count(duration: &Duration, chunk_minutes: i64) -> Result<u64, CoreError> {
    let minutes = u64::try_from(chunk_minutes)
        .ok()
        .filter(|m| *m > 0)
        .ok_or(CoreError::InvalidChunkSize(chunk_minutes))?;
    let total = duration
        .checked_total_seconds()
        .ok_or(CoreError::DurationOverflow)?;
    let chunk_seconds = minutes.saturating_mul(SECONDS_PER_MINUTE);
    Ok(total.div_ceil(chunk_seconds))
}

/// Sentence reported to the user for a chunk calculation.
#[must_use]
pub fn chunk_message(chunks: u64, chunk_minutes: i64) -> String {
    let plural = if chunks == 1 { "" } else { "s" };
    format!("You need {chunks} chunk{plural} of {chunk_minutes} minutes each.")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkHint {
    pub chunk_minutes: i64,
    pub chunks: u64,
}

/// Chunk counts for the standard 15 and 30 minute blocks.
///
/// Empty for totals under an hour.
#[must_use]
pub fn chunk_hints(duration: &Duration) -> Vec<ChunkHint> {
    if duration.days == 0 && duration.hours == 0 {
        return Vec::new();
    }
    HINT_CHUNK_MINUTES
        .iter()
        .filter_map(|&chunk_minutes| {
            chunk_count(duration, chunk_minutes)
                .ok()
                .map(|chunks| ChunkHint {
                    chunk_minutes,
                    chunks,
                })
        })
        .collect()
}

#[cfg(test)]
#[path = "duration_test.rs"]
mod tests;
