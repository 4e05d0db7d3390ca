//! # slot-engine
//!
//! Deterministic meeting slot finding over per-user busy intervals.
//!
//! Given a set of users, a date range and a meeting length, the engine loads
//! each user's commitments, cuts the range into fixed-length slots, and ranks
//! the slots where some (or all) of the users are free. It is a pure function
//! of the query and the current snapshot of busy data.
//!
//! ## Modules
//!
//! - [`interval`]: Half-open `TimeInterval` and busy-period merging
//! - [`busy`]: `BusyWindowSource` port, concurrent loading, normalized windows
//! - [`grid`]: Discretization of a range into candidate slots
//! - [`scoring`]: Configurable score and ranking order
//! - [`finder`]: `find_available_slots` / `find_all_available_slots`
//! - [`error`]: Error types

pub mod busy;
pub mod error;
pub mod finder;
pub mod grid;
pub mod interval;
pub mod scoring;

pub use busy::{
    load_busy_windows, BusyWindowSource, InMemoryBusySource, UserBusyWindows, UserId,
};
pub use error::SlotError;
pub use finder::{
    find_all_available_slots, find_available_slots, rank_candidates, CandidateSlot, FinderConfig,
    MatchMode, Query, MIN_DURATION_MINUTES,
};
pub use grid::SlotGrid;
pub use interval::{merge_intervals, TimeInterval};
pub use scoring::ScoringWeights;
