//! Loading and normalizing per-user busy windows.
//!
//! The data store is reached through [`BusyWindowSource`]. Loads are fanned out
//! one read per user and awaited together; each read produces its own vector,
//! so nothing is shared between the in-flight futures. A single failed read
//! fails the whole load: a missing calendar cannot be told apart from a free one.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::interval::{merge_intervals, TimeInterval};

/// Opaque user identifier.
pub type UserId = String;

/// Read access to users' existing commitments.
#[async_trait]
pub trait BusyWindowSource: Send + Sync {
    /// Restrict `user_ids` to members of the organization.
    ///
    /// The default accepts every user.
    async fn members(
        &self,
        _organization_id: &str,
        user_ids: &BTreeSet<UserId>,
    ) -> anyhow::Result<BTreeSet<UserId>> {
        Ok(user_ids.clone())
    }

    /// The user's commitments overlapping `range`, in any order.
    async fn busy_intervals(
        &self,
        organization_id: &str,
        user_id: &str,
        range: &TimeInterval,
    ) -> anyhow::Result<Vec<TimeInterval>>;
}

/// Normalized busy intervals per user: sorted, non-overlapping, clipped to the
/// query range.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserBusyWindows {
    windows: BTreeMap<UserId, Vec<TimeInterval>>,
}

impl UserBusyWindows {
    /// Normalize raw per-user intervals against `range`.
    pub fn from_raw<I>(raw: I, range: &TimeInterval) -> Self
    where
        I: IntoIterator<Item = (UserId, Vec<TimeInterval>)>,
    {
        let mut windows: BTreeMap<UserId, Vec<TimeInterval>> = BTreeMap::new();
        for (user, intervals) in raw {
            let entry = windows.entry(user).or_default();
            entry.extend(intervals);
        }
        for intervals in windows.values_mut() {
            let raw = std::mem::take(intervals);
            *intervals = merge_intervals(raw, range);
        }
        Self { windows }
    }

    /// The normalized intervals for `user`; empty if unknown.
    pub fn get(&self, user: &str) -> &[TimeInterval] {
        self.windows.get(user).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `user` has no busy interval overlapping `slot`.
    ///
    /// Binary search for the first busy interval ending after the slot start;
    /// the user is busy iff that interval starts before the slot ends.
    pub fn is_free(&self, user: &str, slot: &TimeInterval) -> bool {
        let busy = self.get(user);
        let idx = busy.partition_point(|b| b.end() <= slot.start());
        match busy.get(idx) {
            Some(next) => !next.overlaps(slot),
            None => true,
        }
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

/// Load and normalize busy windows for `users`, one concurrent read per user.
///
/// # Errors
/// Propagates the first source failure unmodified as `SlotError::Source`.
pub async fn load_busy_windows<S>(
    source: &S,
    organization_id: &str,
    users: &BTreeSet<UserId>,
    range: &TimeInterval,
) -> Result<UserBusyWindows>
where
    S: BusyWindowSource + ?Sized,
{
    debug!(users = users.len(), "loading busy windows");

    let loads = users.iter().map(|user| async move {
        let intervals = source.busy_intervals(organization_id, user, range).await?;
        Ok::<_, anyhow::Error>((user.clone(), intervals))
    });
    let raw = try_join_all(loads).await?;

    Ok(UserBusyWindows::from_raw(raw, range))
}

/// A busy-window source backed by an in-memory map of organization → user →
/// commitments.
///
/// Users missing from an organization's map are not members of it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryBusySource {
    organizations: HashMap<String, BTreeMap<UserId, Vec<TimeInterval>>>,
}

impl InMemoryBusySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `user` as a member of `organization_id` with no commitments.
    pub fn add_member(&mut self, organization_id: &str, user_id: &str) -> &mut Self {
        self.organizations
            .entry(organization_id.to_string())
            .or_default()
            .entry(user_id.to_string())
            .or_default();
        self
    }

    /// Record a commitment, registering the user as a member if needed.
    pub fn add_busy(
        &mut self,
        organization_id: &str,
        user_id: &str,
        interval: TimeInterval,
    ) -> &mut Self {
        self.organizations
            .entry(organization_id.to_string())
            .or_default()
            .entry(user_id.to_string())
            .or_default()
            .push(interval);
        self
    }

    /// Parse the JSON form `{"organizations": {org: {user: [{start, end}]}}}`.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[async_trait]
impl BusyWindowSource for InMemoryBusySource {
    async fn members(
        &self,
        organization_id: &str,
        user_ids: &BTreeSet<UserId>,
    ) -> anyhow::Result<BTreeSet<UserId>> {
        let Some(org) = self.organizations.get(organization_id) else {
            return Ok(BTreeSet::new());
        };
        Ok(user_ids
            .iter()
            .filter(|user| org.contains_key(user.as_str()))
            .cloned()
            .collect())
    }

    async fn busy_intervals(
        &self,
        organization_id: &str,
        user_id: &str,
        range: &TimeInterval,
    ) -> anyhow::Result<Vec<TimeInterval>> {
        Ok(self
            .organizations
            .get(organization_id)
            .and_then(|org| org.get(user_id))
            .map(|intervals| {
                intervals
                    .iter()
                    .filter(|interval| interval.overlaps(range))
                    .copied()
                    .collect()
            })
            .unwrap_or_default())
    }
}
