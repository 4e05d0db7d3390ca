//! Property-based tests for slot finding using proptest.
//!
//! These check invariants that should hold for *any* busy data, not just the
//! hand-picked scenarios in `finder_tests.rs`. Ranking is exercised through the
//! synchronous `rank_candidates`, which is what the async entry points call
//! after loading.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use slot_engine::{rank_candidates, FinderConfig, MatchMode, TimeInterval, UserBusyWindows};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap()
}

/// A busy interval within the first 24 hours, on a 5-minute grid.
fn arb_interval() -> impl Strategy<Value = TimeInterval> {
    (0i64..288, 1i64..48).prop_map(|(start_step, len_steps)| {
        let start = base() + Duration::minutes(start_step * 5);
        TimeInterval::new(start, start + Duration::minutes(len_steps * 5)).unwrap()
    })
}

/// Up to 4 users, each with up to 6 raw (possibly overlapping) commitments.
fn arb_windows() -> impl Strategy<Value = Vec<(String, Vec<TimeInterval>)>> {
    prop::collection::vec(prop::collection::vec(arb_interval(), 0..6), 1..=4).prop_map(
        |per_user| {
            per_user
                .into_iter()
                .enumerate()
                .map(|(i, intervals)| (format!("user-{i}"), intervals))
                .collect()
        },
    )
}

/// A query range of 1-24 hours starting somewhere in the day.
fn arb_range() -> impl Strategy<Value = TimeInterval> {
    (0i64..48, 2i64..=48).prop_map(|(start_half_hours, len_half_hours)| {
        let start = base() + Duration::minutes(start_half_hours * 30);
        TimeInterval::new(start, start + Duration::minutes(len_half_hours * 30)).unwrap()
    })
}

fn arb_duration() -> impl Strategy<Value = i64> {
    prop_oneof![Just(15i64), Just(30), Just(45), Just(60), Just(90)]
}

fn arb_step() -> impl Strategy<Value = Option<u32>> {
    prop_oneof![Just(None), Just(Some(15u32)), Just(Some(30))]
}

fn setup(
    raw: Vec<(String, Vec<TimeInterval>)>,
    range: &TimeInterval,
) -> (UserBusyWindows, BTreeSet<String>) {
    let users: BTreeSet<String> = raw.iter().map(|(u, _)| u.clone()).collect();
    (UserBusyWindows::from_raw(raw, range), users)
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    /// Every slot has exactly the requested length and lies inside the range.
    #[test]
    fn slots_have_requested_length_and_fit_range(
        raw in arb_windows(),
        range in arb_range(),
        minutes in arb_duration(),
        step_minutes in arb_step(),
    ) {
        let (windows, users) = setup(raw, &range);
        let config = FinderConfig { step_minutes, ..FinderConfig::default() };
        let slots = rank_candidates(
            &windows, &users, &range, Duration::minutes(minutes), MatchMode::Any, &config,
        ).unwrap();

        for slot in &slots {
            prop_assert_eq!(slot.end - slot.start, Duration::minutes(minutes));
            prop_assert!(slot.start >= range.start());
            prop_assert!(slot.end <= range.end());
        }
    }

    /// "Everyone free" slots are a subset of "someone free" slots.
    #[test]
    fn all_mode_is_subset_of_any_mode(
        raw in arb_windows(),
        range in arb_range(),
        minutes in arb_duration(),
    ) {
        let (windows, users) = setup(raw, &range);
        let duration = Duration::minutes(minutes);
        let config = FinderConfig::default();

        let any = rank_candidates(&windows, &users, &range, duration, MatchMode::Any, &config).unwrap();
        let all = rank_candidates(&windows, &users, &range, duration, MatchMode::All, &config).unwrap();

        for slot in &all {
            prop_assert!(any.contains(slot), "all-mode slot {:?} missing from any-mode", slot);
            prop_assert_eq!(&slot.available_user_ids, &users);
        }
    }

    /// Same inputs, same ordered output.
    #[test]
    fn ranking_is_idempotent(
        raw in arb_windows(),
        range in arb_range(),
        minutes in arb_duration(),
    ) {
        let (windows, users) = setup(raw, &range);
        let duration = Duration::minutes(minutes);
        let config = FinderConfig::default();

        let first = rank_candidates(&windows, &users, &range, duration, MatchMode::Any, &config).unwrap();
        let second = rank_candidates(&windows, &users, &range, duration, MatchMode::Any, &config).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Output is sorted by descending score, then ascending start.
    #[test]
    fn output_is_ranked(
        raw in arb_windows(),
        range in arb_range(),
        minutes in arb_duration(),
    ) {
        let (windows, users) = setup(raw, &range);
        let slots = rank_candidates(
            &windows, &users, &range, Duration::minutes(minutes), MatchMode::Any, &FinderConfig::default(),
        ).unwrap();

        for pair in slots.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(a.score > b.score || (a.score == b.score && a.start < b.start));
        }
    }

    /// A user with no commitments is available in every discretized slot.
    #[test]
    fn idle_user_is_in_every_slot(
        raw in arb_windows(),
        range in arb_range(),
        minutes in arb_duration(),
    ) {
        let mut raw = raw;
        raw.push(("idle".to_string(), Vec::new()));
        let (windows, users) = setup(raw, &range);
        let duration = Duration::minutes(minutes);

        let slots = rank_candidates(
            &windows, &users, &range, duration, MatchMode::Any, &FinderConfig::default(),
        ).unwrap();

        let span = range.duration_minutes();
        let expected = if span < minutes { 0 } else { (span - minutes) / minutes + 1 };
        prop_assert_eq!(slots.len() as i64, expected);
        for slot in &slots {
            prop_assert!(slot.available_user_ids.contains("idle"));
        }
    }

    /// A user listed as available never has a busy interval overlapping the slot.
    #[test]
    fn available_users_have_no_overlapping_commitment(
        raw in arb_windows(),
        range in arb_range(),
        minutes in arb_duration(),
    ) {
        let raw_copy = raw.clone();
        let (windows, users) = setup(raw, &range);
        let slots = rank_candidates(
            &windows, &users, &range, Duration::minutes(minutes), MatchMode::Any, &FinderConfig::default(),
        ).unwrap();

        for slot in &slots {
            let slot_interval = slot.interval().unwrap();
            for (user, intervals) in &raw_copy {
                let busy = intervals.iter().any(|b| b.overlaps(&slot_interval));
                prop_assert_eq!(slot.available_user_ids.contains(user), !busy);
            }
        }
    }
}
