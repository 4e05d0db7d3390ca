//! Discretization of a date range into fixed-length candidate slots.

use chrono::{DateTime, Duration, Utc};

use crate::error::{Result, SlotError};
use crate::interval::TimeInterval;

/// Lazily yields `[range.start + k * step, + duration)` for k = 0, 1, ... while
/// the slot still ends at or before `range.end`.
#[derive(Debug, Clone)]
pub struct SlotGrid {
    next_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    duration: Duration,
    step: Duration,
}

impl SlotGrid {
    /// # Errors
    /// Returns `SlotError::InvalidDuration` if `duration` or `step` is not positive.
    pub fn new(range: &TimeInterval, duration: Duration, step: Duration) -> Result<Self> {
        if duration <= Duration::zero() {
            return Err(SlotError::InvalidDuration(format!(
                "slot duration must be positive, got {} minutes",
                duration.num_minutes()
            )));
        }
        if step <= Duration::zero() {
            return Err(SlotError::InvalidDuration(format!(
                "slot step must be positive, got {} minutes",
                step.num_minutes()
            )));
        }
        Ok(Self {
            next_start: range.start(),
            range_end: range.end(),
            duration,
            step,
        })
    }

    /// Grid whose slots are back to back (step equals duration).
    pub fn contiguous(range: &TimeInterval, duration: Duration) -> Result<Self> {
        Self::new(range, duration, duration)
    }

    fn remaining(&self) -> usize {
        let room = self.range_end - self.next_start - self.duration;
        if room < Duration::zero() {
            return 0;
        }
        (room.num_milliseconds() / self.step.num_milliseconds().max(1)) as usize + 1
    }
}

impl Iterator for SlotGrid {
    type Item = TimeInterval;

    fn next(&mut self) -> Option<TimeInterval> {
        let end = self.next_start.checked_add_signed(self.duration)?;
        if end > self.range_end {
            return None;
        }
        let slot = TimeInterval::new(self.next_start, end).ok()?;
        // Past the representable range there is no next slot; park the cursor
        // at the range end so the grid is exhausted.
        self.next_start = self
            .next_start
            .checked_add_signed(self.step)
            .unwrap_or(self.range_end);
        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}
