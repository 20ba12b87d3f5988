//! # Brightness
//!
//! Relative recency of a post within the batch it is displayed with:
//! the oldest post scores 1, the newest 10.

use chrono::{DateTime, TimeDelta, Utc};

pub const MIN_BRIGHTNESS: u8 = 1;
pub const MAX_BRIGHTNESS: u8 = 10;

/// Oldest and newest timestamp of one batch of posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub oldest: DateTime<Utc>,
    pub newest: DateTime<Utc>,
}

impl TimeRange {
    /// Spans the given timestamps; `None` for an empty batch.
    pub fn of<I>(timestamps: I) -> Option<Self>
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        timestamps.into_iter().fold(None, |range, ts| {
            Some(match range {
                None => TimeRange { oldest: ts, newest: ts },
                Some(r) => TimeRange {
                    oldest: r.oldest.min(ts),
                    newest: r.newest.max(ts),
                },
            })
        })
    }

    pub fn brightness(&self, timestamp: DateTime<Utc>) -> u8 {
        brightness(timestamp, self.oldest, self.newest)
    }
}

/// Maps `timestamp` onto 1..=10 relative to `[oldest, newest]`.
///
/// Returns 10 when the range is empty (a single post, or every post written
/// at the same instant). Timestamps outside the range are clamped.
pub fn brightness(timestamp: DateTime<Utc>, oldest: DateTime<Utc>, newest: DateTime<Utc>) -> u8 {
    let span = seconds(newest - oldest);
    if span <= 0.0 {
        return MAX_BRIGHTNESS;
    }

    let ratio = (seconds(timestamp - oldest) / span).clamp(0.0, 1.0);
    let steps = f64::from(MAX_BRIGHTNESS - MIN_BRIGHTNESS);
    MIN_BRIGHTNESS + (ratio * steps).floor() as u8
}

fn seconds(delta: TimeDelta) -> f64 {
    delta.to_std().map(|d| d.as_secs_f64()).unwrap_or(0.0)
}
