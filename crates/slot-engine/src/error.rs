//! Error types for slot-engine operations.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlotError {
    #[error("Invalid range: start {start} is not before end {end}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid scoring weights: {0}")]
    InvalidWeights(String),

    #[error("No users to schedule")]
    EmptyUsers,

    /// A failure reported by the busy-window source, passed through as-is.
    #[error(transparent)]
    Source(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SlotError>;
