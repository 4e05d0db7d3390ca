//! Meeting slot finder.
//!
//! Loads each user's busy intervals, discretizes the query range into slots of
//! the requested duration, marks which users are free in each slot, and ranks
//! the survivors. [`find_available_slots`] keeps slots where at least one user
//! is free; [`find_all_available_slots`] keeps slots where everyone is.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::busy::{load_busy_windows, BusyWindowSource, UserBusyWindows, UserId};
use crate::error::{Result, SlotError};
use crate::grid::SlotGrid;
use crate::interval::TimeInterval;
use crate::scoring::{rank_order, ScoringWeights};

/// Shortest meeting a request may ask for.
pub const MIN_DURATION_MINUTES: u32 = 15;

/// A slot-finding request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Tenant scope used to filter which users and busy windows are loaded.
    pub organization_id: String,
    pub user_ids: BTreeSet<UserId>,
    pub date_range_start: DateTime<Utc>,
    pub date_range_end: DateTime<Utc>,
    pub duration_minutes: u32,
}

impl Query {
    /// Request-level validation: ordered range, minimum duration, at least one user.
    ///
    /// The finder itself only re-checks the range.
    pub fn validate(&self) -> Result<()> {
        self.range()?;
        if self.duration_minutes < MIN_DURATION_MINUTES {
            return Err(SlotError::InvalidDuration(format!(
                "meetings must be at least {} minutes, got {}",
                MIN_DURATION_MINUTES, self.duration_minutes
            )));
        }
        if self.user_ids.is_empty() {
            return Err(SlotError::EmptyUsers);
        }
        Ok(())
    }

    /// The query range as an interval.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidRange` if `date_range_start >= date_range_end`.
    pub fn range(&self) -> Result<TimeInterval> {
        TimeInterval::new(self.date_range_start, self.date_range_end)
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.duration_minutes))
    }
}

/// Which users must be free for a slot to be kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// At least one user free.
    Any,
    /// Every user free.
    All,
}

/// A proposed meeting window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub available_user_ids: BTreeSet<UserId>,
    pub score: f64,
}

impl CandidateSlot {
    pub fn interval(&self) -> Option<TimeInterval> {
        TimeInterval::new(self.start, self.end).ok()
    }
}

/// Tunables for discretization and scoring.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    /// Spacing between consecutive slot starts. `None` means back-to-back slots
    /// (spacing equal to the meeting duration).
    pub step_minutes: Option<u32>,
    pub scoring: ScoringWeights,
}

impl FinderConfig {
    fn step(&self, duration: Duration) -> Duration {
        self.step_minutes
            .map(|m| Duration::minutes(i64::from(m)))
            .unwrap_or(duration)
    }
}

/// Rank candidate slots for `users` against already-loaded busy windows.
///
/// Pure and deterministic: the same inputs always produce the same ordered
/// output. Users missing from `windows` are treated as free.
///
/// # Errors
/// Returns `SlotError::InvalidDuration` if `duration` or the configured step is
/// not positive, and `SlotError::InvalidWeights` if the scoring weights are
/// rejected by [`ScoringWeights::validate`].
pub fn rank_candidates(
    windows: &UserBusyWindows,
    users: &BTreeSet<UserId>,
    range: &TimeInterval,
    duration: Duration,
    mode: MatchMode,
    config: &FinderConfig,
) -> Result<Vec<CandidateSlot>> {
    config.scoring.validate()?;
    let grid = SlotGrid::new(range, duration, config.step(duration))?;

    if users.is_empty() {
        return Ok(Vec::new());
    }

    let total = users.len();
    let mut ranked: Vec<(TimeInterval, CandidateSlot)> = grid
        .filter_map(|slot| {
            let available: BTreeSet<UserId> = users
                .iter()
                .filter(|user| windows.is_free(user, &slot))
                .cloned()
                .collect();

            let keep = match mode {
                MatchMode::Any => !available.is_empty(),
                MatchMode::All => available.len() == total,
            };
            if !keep {
                return None;
            }

            let score = config.scoring.score(&slot, range, available.len(), total);
            Some((
                slot,
                CandidateSlot {
                    start: slot.start(),
                    end: slot.end(),
                    available_user_ids: available,
                    score,
                },
            ))
        })
        .collect();

    ranked.sort_by(|(a_slot, a), (b_slot, b)| rank_order(a.score, a_slot, b.score, b_slot));

    Ok(ranked.into_iter().map(|(_, candidate)| candidate).collect())
}

/// Slots where at least one queried user is free, best first.
///
/// # Errors
/// `SlotError::InvalidRange` if the query range is empty or inverted, or any
/// failure from `source`, unmodified.
pub async fn find_available_slots<S>(
    source: &S,
    query: &Query,
    config: &FinderConfig,
) -> Result<Vec<CandidateSlot>>
where
    S: BusyWindowSource + ?Sized,
{
    find_slots(source, query, MatchMode::Any, config).await
}

/// Slots where every queried user is free, best first.
///
/// # Errors
/// Same as [`find_available_slots`].
pub async fn find_all_available_slots<S>(
    source: &S,
    query: &Query,
    config: &FinderConfig,
) -> Result<Vec<CandidateSlot>>
where
    S: BusyWindowSource + ?Sized,
{
    find_slots(source, query, MatchMode::All, config).await
}

/// Shared body of the two entry points: validate, filter members, load, rank.
#[instrument(
    skip_all,
    fields(
        org = %query.organization_id,
        users = query.user_ids.len(),
        duration = query.duration_minutes,
        ?mode
    )
)]
pub async fn find_slots<S>(
    source: &S,
    query: &Query,
    mode: MatchMode,
    config: &FinderConfig,
) -> Result<Vec<CandidateSlot>>
where
    S: BusyWindowSource + ?Sized,
{
    let range = query.range()?;
    config.scoring.validate()?;

    // Only queried users may appear in results, whatever the source returns.
    let members: BTreeSet<UserId> = source
        .members(&query.organization_id, &query.user_ids)
        .await?
        .into_iter()
        .filter(|user| query.user_ids.contains(user))
        .collect();
    if members.is_empty() {
        debug!("no organization members among queried users");
        return Ok(Vec::new());
    }
    if members.len() < query.user_ids.len() {
        debug!(
            dropped = query.user_ids.len() - members.len(),
            "filtered out non-members"
        );
    }

    let windows = load_busy_windows(source, &query.organization_id, &members, &range).await?;
    let candidates = rank_candidates(&windows, &members, &range, query.duration(), mode, config)?;

    debug!(candidates = candidates.len(), "ranked candidate slots");
    Ok(candidates)
}
