//! Social jetlag and sleep irregularity.
//!
//! Social jetlag is the shift between the body clock and the social clock:
//! the distance between mid-sleep on free days and mid-sleep on busy days.
//! Sleep irregularity is the spread of the subject's own schedule, half
//! circular (mid-sleep on the 24-hour circle) and half linear (duration).
//!
//! ## Free/busy split
//!
//! The split is computed lazily, once, from the records themselves via
//! [`ClusteredSleep`]. Clustering output is only trusted when it passes a
//! set of plausibility checks; otherwise the split falls back to the
//! calendar (Saturday/Sunday wake-ups are free days).
//!
//! Every aggregate returns `None` below [`MIN_RECORDS_FOR_STATS`] records —
//! a number for a two-night history would be noise dressed up as insight.

use std::sync::OnceLock;

use chrono::{DateTime, Utc, Weekday};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use circastat_cyclic::{center, distance, stdev};

use crate::clustering::{ClusteredSleep, SleepLabel};
use crate::history::SleepHistory;
use crate::linear;
use crate::population;
use crate::record::{SleepInterval, HOURS_PER_DAY};

/// Below this many records every aggregate is `None`.
pub const MIN_RECORDS_FOR_STATS: usize = 5;

/// Minimum 1-cluster/2-cluster inertia ratio for a trustworthy clustering.
const MIN_CLUSTERING_STRENGTH: f64 = 2.75;

/// The free-day cluster must hold at least this share of all records.
const MIN_FREE_DAY_SHARE: f64 = 0.1;

/// How much shorter (in busy-day standard deviations) free-day sleep may be
/// before the clustering is rejected.
const MAX_FREE_SLEEP_DEFICIT: f64 = -0.5;

/// Fixed seed for the clustering RNG: repeated queries on the same history
/// must agree with each other.
const CLUSTERING_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

// ─────────────────────────────────────────────
// SocialJetlagStats
// ─────────────────────────────────────────────

/// All social-jetlag statistics of one history.
///
/// Construction is free; the free/busy split is computed on first use and
/// cached. With `use_utc_for_irregularity` the irregularity aggregates work
/// on UTC mid-sleeps, which makes a frequent traveller's records comparable
/// across timezones.
#[derive(Debug, Clone)]
pub struct SocialJetlagStats {
    records: SleepHistory,
    use_utc_for_irregularity: bool,
    split: OnceLock<DaySplit>,
}

#[derive(Debug, Clone)]
struct DaySplit {
    good_clustering: bool,
    free: SleepHistory,
    busy: SleepHistory,
    unclassified: SleepHistory,
}

impl SocialJetlagStats {
    pub fn new(records: SleepHistory, use_utc_for_irregularity: bool) -> Self {
        Self {
            records,
            use_utc_for_irregularity,
            split: OnceLock::new(),
        }
    }

    /// The statistics of the sub-history with wake-up in `[from, to)`.
    pub fn narrow(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self::new(self.records.narrow(from, to), self.use_utc_for_irregularity)
    }

    pub fn size(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &SleepHistory {
        &self.records
    }

    // ── Irregularity ───────────────────────────

    /// Spread of the subject's schedule: the mean of the circular standard
    /// deviation of mid-sleeps and the linear standard deviation of
    /// durations, in hours.
    pub fn sleep_irregularity(&self) -> Option<f64> {
        self.guarded(|| {
            let mid_spread = stdev(&self.midpoints_of(&self.records), HOURS_PER_DAY);
            let length_spread = linear::stdev(&self.records.durations());
            (mid_spread + length_spread) / 2.0
        })
    }

    /// How far one record sits from the subject's average schedule: the
    /// mean of its mid-sleep distance and its duration deviation, in hours.
    pub fn record_irregularity(&self, record: &SleepInterval) -> Option<f64> {
        let average_midpoint = self.average_midpoint()?;
        let average_duration = self.average_duration()?;
        let mid_dev = distance(average_midpoint, self.record_midpoint(record), HOURS_PER_DAY);
        let length_dev = (record.duration_hours() - average_duration).abs();
        Some((mid_dev + length_dev) / 2.0)
    }

    /// Circular center of all mid-sleeps, in `[0, 24)`.
    pub fn average_midpoint(&self) -> Option<f64> {
        self.guarded(|| center(&self.midpoints_of(&self.records), HOURS_PER_DAY))
    }

    /// Arithmetic mean of all durations, in hours.
    pub fn average_duration(&self) -> Option<f64> {
        self.guarded(|| linear::mean(&self.records.durations()))
    }

    // ── Social jetlag ──────────────────────────

    /// Mid-sleep on free days, as a linear fractional local hour.
    ///
    /// Linear mean of local mid-sleeps, not the circular center: the result
    /// is compared against the population reference table, which is
    /// expressed in plain early-morning hours.
    pub fn mid_sleep_free_days(&self) -> Option<f64> {
        Self::mid_sleep_of(&self.day_split().free)
    }

    /// Mid-sleep on busy days; see [`mid_sleep_free_days`](Self::mid_sleep_free_days).
    pub fn mid_sleep_busy_days(&self) -> Option<f64> {
        Self::mid_sleep_of(&self.day_split().busy)
    }

    /// The social jetlag itself: distance between free-day and busy-day
    /// mid-sleep, in hours.
    pub fn social_jetlag(&self) -> Option<f64> {
        let free = self.mid_sleep_free_days()?;
        let busy = self.mid_sleep_busy_days()?;
        Some((free - busy).abs())
    }

    /// Chronotype as a population quantile of mid-sleep on free days:
    /// 0.0 is an extreme early lark, 0.9 an extreme late owl.
    pub fn chronotype(&self) -> Option<f64> {
        self.mid_sleep_free_days()
            .map(population::chronotype_quantile)
    }

    /// Chronotype extremity rank 1–5; see [`population::chronotype_rank`].
    pub fn chronotype_rank(&self) -> Option<u8> {
        self.chronotype().map(population::chronotype_rank)
    }

    // ── Free/busy split ────────────────────────

    /// Whether the free/busy split comes from a trusted clustering (`true`)
    /// or from the weekend fallback (`false`).
    pub fn good_clustering(&self) -> bool {
        self.day_split().good_clustering
    }

    pub fn free_days(&self) -> &SleepHistory {
        &self.day_split().free
    }

    pub fn busy_days(&self) -> &SleepHistory {
        &self.day_split().busy
    }

    /// Records left out of the split (clustering outliers); empty under the
    /// weekend fallback.
    pub fn unclassified_days(&self) -> &SleepHistory {
        &self.day_split().unclassified
    }

    // ── Evolution over time ────────────────────

    /// Chronotype per calendar-month window, keyed by the window end.
    pub fn chronotype_history(
        &self,
        fragment_months: u32,
        step_months: u32,
    ) -> Vec<(DateTime<Utc>, Option<f64>)> {
        self.records
            .split_by_months(fragment_months, step_months)
            .into_iter()
            .map(|fragment| {
                let at = fragment.to();
                let stats = Self::new(fragment, self.use_utc_for_irregularity);
                (at, stats.chronotype())
            })
            .collect()
    }

    /// Sleep irregularity per day window, keyed by the window end.
    pub fn irregularity_history(
        &self,
        fragment_days: u32,
        step_days: u32,
    ) -> Vec<(DateTime<Utc>, Option<f64>)> {
        self.records
            .split_by_days(fragment_days, step_days)
            .into_iter()
            .map(|fragment| {
                let at = fragment.to();
                let stats = Self::new(fragment, self.use_utc_for_irregularity);
                (at, stats.sleep_irregularity())
            })
            .collect()
    }

    // ── Internals ──────────────────────────────

    fn guarded(&self, f: impl FnOnce() -> f64) -> Option<f64> {
        if self.records.len() < MIN_RECORDS_FOR_STATS {
            None
        } else {
            Some(f())
        }
    }

    fn midpoints_of(&self, history: &SleepHistory) -> Vec<f64> {
        if self.use_utc_for_irregularity {
            history.midpoints_utc()
        } else {
            history.midpoints_local()
        }
    }

    fn record_midpoint(&self, record: &SleepInterval) -> f64 {
        if self.use_utc_for_irregularity {
            record.midpoint_utc()
        } else {
            record.midpoint_local()
        }
    }

    fn mid_sleep_of(half: &SleepHistory) -> Option<f64> {
        if half.len() < MIN_RECORDS_FOR_STATS {
            return None;
        }
        Some(linear::mean(&half.midpoints_local()))
    }

    fn day_split(&self) -> &DaySplit {
        self.split.get_or_init(|| {
            let mut rng = StdRng::seed_from_u64(CLUSTERING_SEED);
            let clustered = ClusteredSleep::new(&self.records, &mut rng);

            let split = if Self::clustering_is_trustworthy(&clustered, self.records.len()) {
                DaySplit {
                    good_clustering: true,
                    free: clustered.labeled(SleepLabel::FreeDay),
                    busy: clustered.labeled(SleepLabel::BusyDay),
                    unclassified: clustered.labeled(SleepLabel::Outlier),
                }
            } else {
                let (free, busy) = self
                    .records
                    .split(|r| matches!(r.end_weekday(), Weekday::Sat | Weekday::Sun));
                DaySplit {
                    good_clustering: false,
                    free,
                    busy,
                    unclassified: SleepHistory::default(),
                }
            };

            debug!(
                good_clustering = split.good_clustering,
                free = split.free.len(),
                busy = split.busy.len(),
                unclassified = split.unclassified.len(),
                "split history into free and busy days"
            );
            split
        })
    }

    fn clustering_is_trustworthy(clustered: &ClusteredSleep, total: usize) -> bool {
        if clustered.strength() < MIN_CLUSTERING_STRENGTH {
            return false;
        }

        let free = clustered.labeled(SleepLabel::FreeDay);
        if free.len() < MIN_RECORDS_FOR_STATS
            || (free.len() as f64) < MIN_FREE_DAY_SHARE * total as f64
        {
            return false;
        }

        // People sleep longer on free days. A "free" cluster with markedly
        // shorter sleep than the busy one caught something else entirely.
        let busy = clustered.labeled(SleepLabel::BusyDay);
        let free_mean = linear::mean(&free.durations());
        let busy_mean = linear::mean(&busy.durations());
        let busy_spread = linear::stdev(&busy.durations());
        (free_mean - busy_mean) / busy_spread >= MAX_FREE_SLEEP_DEFICIT
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
