//! An ordered, immutable collection of sleep records.
//!
//! [`SleepHistory`] keys records by their `end` instant (the record
//! identity) and carries an explicit covered range `[from, to]`, so that a
//! window cut out of a longer history remembers the window it covers even
//! when the window caught few or no records.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Months, NaiveTime, TimeDelta, Utc, Weekday};

use crate::error::HistoryError;
use crate::record::SleepInterval;

// ─────────────────────────────────────────────
// SleepHistory
// ─────────────────────────────────────────────

/// Sleep records of one subject, ordered by wake-up instant.
#[derive(Debug, Clone, Default)]
pub struct SleepHistory {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    records: BTreeMap<DateTime<Utc>, SleepInterval>,
}

impl SleepHistory {
    /// Collect records; the covered range is derived from the records
    /// themselves (degenerate epoch range when empty). Records sharing an
    /// `end` instant collapse to the last one, matching record identity.
    pub fn new(records: impl IntoIterator<Item = SleepInterval>) -> Self {
        let records: BTreeMap<_, _> = records.into_iter().map(|r| (r.end(), r)).collect();
        let from = records
            .keys()
            .next()
            .copied()
            .unwrap_or(DateTime::UNIX_EPOCH);
        let to = records.keys().next_back().copied().unwrap_or(from);
        Self { from, to, records }
    }

    /// Collect records with an explicitly covered range. A `None` bound is
    /// derived from the records as in [`SleepHistory::new`].
    ///
    /// # Errors
    ///
    /// Fails when a record falls outside the explicit range, or the range
    /// is inverted.
    pub fn with_range(
        records: impl IntoIterator<Item = SleepInterval>,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Self, HistoryError> {
        let derived = Self::new(records);

        let from = match from {
            None => derived.from,
            Some(from) => {
                if let Some(&first) = derived.records.keys().next() {
                    if first < from {
                        return Err(HistoryError::RecordBeforeRange {
                            record_end: first,
                            from,
                        });
                    }
                }
                from
            }
        };

        let to = match to {
            None => {
                if derived.records.is_empty() {
                    from
                } else {
                    derived.to
                }
            }
            Some(to) => {
                if let Some(&last) = derived.records.keys().next_back() {
                    if last > to {
                        return Err(HistoryError::RecordAfterRange {
                            record_end: last,
                            to,
                        });
                    }
                }
                to
            }
        };

        if to < from {
            return Err(HistoryError::RangeInverted { from, to });
        }

        Ok(Self {
            from,
            to,
            records: derived.records,
        })
    }

    /// Internal constructor for subsets that are known to fit the range.
    fn subset(
        &self,
        records: impl IntoIterator<Item = SleepInterval>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Self {
        Self {
            from,
            to,
            records: records.into_iter().map(|r| (r.end(), r)).collect(),
        }
    }

    // ── Inspection ─────────────────────────────

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Start of the covered range.
    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    /// End of the covered range.
    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }

    /// Records in wake-up order.
    pub fn records(&self) -> impl Iterator<Item = &SleepInterval> {
        self.records.values()
    }

    // ── Projections ────────────────────────────

    /// Project every record to a number, in wake-up order.
    pub fn project(&self, f: impl Fn(&SleepInterval) -> f64) -> Vec<f64> {
        self.records.values().map(f).collect()
    }

    pub fn start_hours_local(&self) -> Vec<f64> {
        self.project(SleepInterval::start_hour_local)
    }

    pub fn end_hours_local(&self) -> Vec<f64> {
        self.project(SleepInterval::end_hour_local)
    }

    pub fn midpoints_local(&self) -> Vec<f64> {
        self.project(SleepInterval::midpoint_local)
    }

    pub fn midpoints_utc(&self) -> Vec<f64> {
        self.project(SleepInterval::midpoint_utc)
    }

    pub fn durations(&self) -> Vec<f64> {
        self.project(SleepInterval::duration_hours)
    }

    // ── Subsetting ─────────────────────────────

    /// Partition into (matching, rest); both halves keep the full covered
    /// range of `self`.
    pub fn split(&self, pred: impl Fn(&SleepInterval) -> bool) -> (Self, Self) {
        let (yes, no): (Vec<_>, Vec<_>) = self.records.values().cloned().partition(|r| pred(r));
        (
            self.subset(yes, self.from, self.to),
            self.subset(no, self.from, self.to),
        )
    }

    /// The records with `end` in `[from, to)`, covered range `[from, to]`.
    ///
    /// # Panics
    ///
    /// Panics on an inverted window (`from > to`).
    pub fn narrow(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        assert!(from <= to, "inverted window: {from} > {to}");
        let selected = self.records.range(from..to).map(|(_, r)| r.clone());
        self.subset(selected, from, to)
    }

    /// Only the records whose local wake-up weekday is `day`.
    pub fn filter_by_weekday(&self, day: Weekday) -> Self {
        Self::new(
            self.records
                .values()
                .filter(|r| r.end_weekday() == day)
                .cloned(),
        )
    }

    // ── Windowed splits ────────────────────────

    /// Cut the history into fragments of `fragment_days`, advancing by
    /// `step_days` (overlapping when `step_days < fragment_days`).
    /// Fragments are aligned to the UTC midnight of the first record's
    /// wake-up day. Empty history gives no fragments.
    ///
    /// # Panics
    ///
    /// Panics when `step_days == 0`.
    pub fn split_by_days(&self, fragment_days: u32, step_days: u32) -> Vec<Self> {
        assert!(step_days > 0, "step_days must be positive");
        let mut result = Vec::new();
        let Some(&last) = self.records.keys().next_back() else {
            return result;
        };
        let end_exclusive = last + TimeDelta::milliseconds(1);

        let mut cursor = self.first_midnight();
        loop {
            let fragment_end = cursor + TimeDelta::days(i64::from(fragment_days));
            result.push(self.narrow(cursor, fragment_end));
            cursor += TimeDelta::days(i64::from(step_days));
            if fragment_end >= end_exclusive {
                break;
            }
        }
        result
    }

    /// Like [`split_by_days`](Self::split_by_days) with calendar months,
    /// aligned to the first day of the first record's wake-up month.
    ///
    /// # Panics
    ///
    /// Panics when `step_months == 0`.
    pub fn split_by_months(&self, fragment_months: u32, step_months: u32) -> Vec<Self> {
        assert!(step_months > 0, "step_months must be positive");
        let mut result = Vec::new();
        let Some(&last) = self.records.keys().next_back() else {
            return result;
        };
        let end_exclusive = last + TimeDelta::milliseconds(1);

        let first_midnight = self.first_midnight();
        let month_start = first_midnight
            .date_naive()
            .with_day(1)
            .unwrap_or(first_midnight.date_naive())
            .and_time(NaiveTime::MIN)
            .and_utc();

        let mut cursor = month_start;
        loop {
            let Some(fragment_end) = cursor.checked_add_months(Months::new(fragment_months))
            else {
                break;
            };
            result.push(self.narrow(cursor, fragment_end));
            let Some(next) = cursor.checked_add_months(Months::new(step_months)) else {
                break;
            };
            cursor = next;
            if fragment_end >= end_exclusive {
                break;
            }
        }
        result
    }

    /// UTC midnight of the first record's wake-up day. Falls back to the
    /// range start for an empty history.
    fn first_midnight(&self) -> DateTime<Utc> {
        let anchor = self.records.keys().next().copied().unwrap_or(self.from);
        anchor.date_naive().and_time(NaiveTime::MIN).and_utc()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
