//! Half-open time intervals and normalization of busy periods.
//!
//! Every interval is `[start, end)` with `start < end`. Two intervals that only
//! touch (one ends exactly when the other starts) do NOT overlap.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, SlotError};

/// An immutable `[start, end)` time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeInterval {
    /// Build an interval, rejecting empty or inverted ranges.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidRange` if `start >= end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(SlotError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    /// Two intervals overlap iff `a.start < b.end && b.start < a.end`.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The intersection with `window`, or `None` if they do not overlap.
    pub fn clip_to(&self, window: &TimeInterval) -> Option<TimeInterval> {
        if !self.overlaps(window) {
            return None;
        }
        Some(TimeInterval {
            start: self.start.max(window.start),
            end: self.end.min(window.end),
        })
    }
}

impl<'de> Deserialize<'de> for TimeInterval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        }

        let raw = Raw::deserialize(deserializer)?;
        TimeInterval::new(raw.start, raw.end).map_err(serde::de::Error::custom)
    }
}

/// Merge overlapping or adjacent intervals, clipped to the given window.
///
/// Returns a sorted, non-overlapping list. Intervals entirely outside the
/// window are dropped.
pub fn merge_intervals<I>(intervals: I, window: &TimeInterval) -> Vec<TimeInterval>
where
    I: IntoIterator<Item = TimeInterval>,
{
    let mut clipped: Vec<TimeInterval> = intervals
        .into_iter()
        .filter_map(|interval| interval.clip_to(window))
        .collect();

    if clipped.is_empty() {
        return Vec::new();
    }

    clipped.sort();

    let mut merged: Vec<TimeInterval> = Vec::with_capacity(clipped.len());
    for interval in clipped {
        if let Some(last) = merged.last_mut() {
            if interval.start <= last.end {
                // Overlapping or adjacent: extend the current interval.
                last.end = last.end.max(interval.end);
                continue;
            }
        }
        merged.push(interval);
    }

    merged
}
