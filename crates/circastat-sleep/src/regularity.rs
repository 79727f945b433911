//! Sleep Regularity Index (SRI).
//!
//! Where the circular aggregates in [`crate::jetlag`] compare *timing*
//! summaries (mid-sleeps, durations), the SRI compares the raw sleep/wake
//! **state** of consecutive days minute by minute:
//!
//! 1. Rasterize every record onto a per-UTC-day grid of 1440 minutes;
//!    a record crossing midnight is cut at the day boundary and marks both
//!    days.
//! 2. For each pair of consecutive calendar days, the day score is the
//!    fraction of minutes in the same state on both days (1.0 = identical
//!    schedule, 0.0 = perfectly inverted).
//! 3. The index is the mean day score. Day pairs with a recording gap
//!    between them are skipped; scores on either side of a gap form
//!    separate runs.
//!
//! The modified index (mSRI) measures how much the day score itself moves:
//! the mean absolute difference of consecutive day scores within a run.
//! Both indexes are undefined (`None`) when there are not enough
//! consecutive recorded days.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use tracing::debug;

use crate::history::SleepHistory;
use crate::linear;

pub const MINUTES_PER_DAY: usize = 24 * 60;

/// Sleep state of one UTC calendar day, one flag per minute.
type DayStates = [bool; MINUTES_PER_DAY];

// ─────────────────────────────────────────────
// Indexes
// ─────────────────────────────────────────────

/// Mean same-state fraction over consecutive day pairs.
///
/// `None` with fewer than two recorded days, or when no two recorded days
/// are consecutive.
pub fn sleep_regularity_index(history: &SleepHistory) -> Option<f64> {
    let days = sleep_states_by_day(history);
    if days.len() < 2 {
        return None;
    }

    let scores: Vec<f64> = scores_by_run(&days).into_iter().flatten().collect();
    debug!(
        days = days.len(),
        scores = scores.len(),
        "computed sleep regularity index"
    );
    if scores.is_empty() {
        return None;
    }
    Some(linear::mean(&scores))
}

/// Mean absolute difference of consecutive day scores within a run.
///
/// `None` with fewer than three recorded days, or when no run holds two
/// consecutive scores.
pub fn modified_sleep_regularity_index(history: &SleepHistory) -> Option<f64> {
    let days = sleep_states_by_day(history);
    if days.len() < 3 {
        return None;
    }

    let mut diffs = Vec::new();
    for run in scores_by_run(&days) {
        for pair in run.windows(2) {
            diffs.push((pair[0] - pair[1]).abs());
        }
    }
    if diffs.is_empty() {
        return None;
    }
    Some(linear::mean(&diffs))
}

// ─────────────────────────────────────────────
// Rasterization
// ─────────────────────────────────────────────

/// Minute grids per UTC calendar day. The 20-hour span cap guarantees a
/// record ends on its start day or the next one, so one midnight cut is
/// always enough.
fn sleep_states_by_day(history: &SleepHistory) -> BTreeMap<NaiveDate, DayStates> {
    let mut days: BTreeMap<NaiveDate, DayStates> = BTreeMap::new();
    for record in history.records() {
        let start = record.start();
        let end = record.end();
        let start_day = start.date_naive();
        let end_day = end.date_naive();

        if start_day == end_day {
            mark(
                days.entry(start_day).or_insert([false; MINUTES_PER_DAY]),
                minute_of_day(start),
                minute_of_day(end),
            );
        } else {
            // the last minute of the cut day stays unmarked; both sides of
            // a day pair treat it the same way, so scores are unaffected
            mark(
                days.entry(start_day).or_insert([false; MINUTES_PER_DAY]),
                minute_of_day(start),
                MINUTES_PER_DAY - 1,
            );
            mark(
                days.entry(end_day).or_insert([false; MINUTES_PER_DAY]),
                0,
                minute_of_day(end),
            );
        }
    }
    days
}

fn mark(day: &mut DayStates, from: usize, to: usize) {
    for minute in &mut day[from..to] {
        *minute = true;
    }
}

fn minute_of_day(instant: DateTime<Utc>) -> usize {
    (instant.time().num_seconds_from_midnight() / 60) as usize
}

// ─────────────────────────────────────────────
// Scoring
// ─────────────────────────────────────────────

/// Fraction of minutes in the same sleep/wake state on both days.
fn sri_score(prev: &DayStates, next: &DayStates) -> f64 {
    let mismatched = prev.iter().zip(next).filter(|(a, b)| a != b).count();
    1.0 - mismatched as f64 / MINUTES_PER_DAY as f64
}

/// Day-pair scores grouped into runs of consecutive calendar days; a
/// recording gap closes the current run.
fn scores_by_run(days: &BTreeMap<NaiveDate, DayStates>) -> Vec<Vec<f64>> {
    let entries: Vec<_> = days.iter().collect();
    let mut runs = Vec::new();
    let mut current = Vec::new();

    for pair in entries.windows(2) {
        let (&prev_day, prev) = pair[0];
        let (&next_day, next) = pair[1];
        if prev_day.succ_opt() == Some(next_day) {
            current.push(sri_score(prev, next));
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
