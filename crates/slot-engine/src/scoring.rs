//! Candidate scoring and ranking order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::interval::TimeInterval;

/// Weights trading off "more people free" against "sooner".
///
/// `score = availability * (available / total) + earliness * (1 - offset / span)`
/// where `offset` is how far the slot starts after the range start and `span`
/// is the length of the range. Both terms lie in `[0, 1]` before weighting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub availability: f64,
    pub earliness: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            availability: 1.0,
            earliness: 0.0,
        }
    }
}

impl ScoringWeights {
    /// `availability` must be finite and positive so more free users always
    /// score higher; `earliness` must be finite and non-negative.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidWeights` naming the offending weight.
    pub fn validate(&self) -> Result<()> {
        if !self.availability.is_finite() || self.availability <= 0.0 {
            return Err(SlotError::InvalidWeights(format!(
                "availability must be finite and greater than 0, got {}",
                self.availability
            )));
        }
        if !self.earliness.is_finite() || self.earliness < 0.0 {
            return Err(SlotError::InvalidWeights(format!(
                "earliness must be finite and at least 0, got {}",
                self.earliness
            )));
        }
        Ok(())
    }

    pub fn score(
        &self,
        slot: &TimeInterval,
        range: &TimeInterval,
        available: usize,
        total: usize,
    ) -> f64 {
        let ratio = if total == 0 {
            0.0
        } else {
            available as f64 / total as f64
        };

        let span = range.duration().num_seconds() as f64;
        let offset = (slot.start() - range.start()).num_seconds() as f64;
        let earliness = if span > 0.0 {
            1.0 - (offset / span).clamp(0.0, 1.0)
        } else {
            0.0
        };

        self.availability * ratio + self.earliness * earliness
    }
}

/// Ranking order: higher score first, then earlier start.
pub fn rank_order(
    a_score: f64,
    a_slot: &TimeInterval,
    b_score: f64,
    b_slot: &TimeInterval,
) -> Ordering {
    b_score
        .total_cmp(&a_score)
        .then_with(|| a_slot.start().cmp(&b_slot.start()))
}
