//! One validated sleep session.
//!
//! A [`SleepInterval`] couples the absolute instants of falling asleep and
//! waking up with the subject's *local* fractional hours for both, and
//! derives — once, at construction — the UTC fractional hours and the
//! circular midpoints that every downstream statistic consumes.
//!
//! ## Identity
//!
//! Records belong to a single subject, so the `end` instant uniquely
//! identifies a sleep session in that subject's history. Equality, ordering
//! and hashing all use the `end` instant alone.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use chrono::offset::Offset;
use chrono::{DateTime, Datelike, FixedOffset, TimeDelta, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use circastat_cyclic::weighted_center;

use crate::error::RecordError;

/// The cycle length for hour-of-day statistics.
pub const HOURS_PER_DAY: f64 = 24.0;

/// Maximum sleep span in hours. It needs to be under one day for the
/// midpoint calculation to work; the four spare hours are a buffer for a
/// DST change, a timezone change while travelling, etc.
pub const MAX_SPAN_HOURS: i64 = 20;

// ─────────────────────────────────────────────
// SleepInterval
// ─────────────────────────────────────────────

/// One sleep session: validated at construction, immutable after.
///
/// `end` carries the subject's UTC offset at the time of the record, which
/// is only used to resolve the local weekday of waking up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleepInterval {
    start: DateTime<Utc>,
    end: DateTime<FixedOffset>,
    start_hour_local: f64,
    end_hour_local: f64,
    duration_hours: f64,
    start_hour_utc: f64,
    end_hour_utc: f64,
    midpoint_local: f64,
    midpoint_utc: f64,
}

impl SleepInterval {
    /// Build a record from raw session fields.
    ///
    /// `start_hour_local` / `end_hour_local` are fractional local hours
    /// (22:30 is 22.5) already resolved by the caller; `duration_hours` is
    /// the net sleep length (span minus interior wake pauses) and is taken
    /// as-is. `zone` is the subject's UTC offset for the session; `None`
    /// means UTC.
    ///
    /// # Errors
    ///
    /// [`RecordError::EndBeforeStart`] when `start > end`,
    /// [`RecordError::SpanTooLong`] when the span exceeds
    /// [`MAX_SPAN_HOURS`], [`RecordError::HourOutOfRange`] when a local
    /// hour falls outside `[0, 24)`.
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        start_hour_local: f64,
        end_hour_local: f64,
        duration_hours: f64,
        zone: Option<FixedOffset>,
    ) -> Result<Self, RecordError> {
        if start > end {
            return Err(RecordError::EndBeforeStart { start, end });
        }
        let span = end - start;
        if span > TimeDelta::hours(MAX_SPAN_HOURS) {
            return Err(RecordError::SpanTooLong {
                hours: span.num_seconds() as f64 / 3600.0,
            });
        }
        if !(0.0..HOURS_PER_DAY).contains(&start_hour_local) {
            return Err(RecordError::HourOutOfRange {
                field: "start_hour_local",
                value: start_hour_local,
            });
        }
        if !(0.0..HOURS_PER_DAY).contains(&end_hour_local) {
            return Err(RecordError::HourOutOfRange {
                field: "end_hour_local",
                value: end_hour_local,
            });
        }

        let zone = zone.unwrap_or_else(|| Utc.fix());
        let start_hour_utc = fractional_hour_utc(start);
        let end_hour_utc = fractional_hour_utc(end);

        Ok(Self {
            start,
            end: end.with_timezone(&zone),
            start_hour_local,
            end_hour_local,
            duration_hours,
            start_hour_utc,
            end_hour_utc,
            midpoint_local: mid_sleep(start_hour_local, end_hour_local),
            midpoint_utc: mid_sleep(start_hour_utc, end_hour_utc),
        })
    }

    /// Best-effort construction from upstream data of unknown quality.
    ///
    /// Any validation failure yields `None` instead of an error: a single
    /// malformed upstream session must not abort batch processing of the
    /// rest, it is silently excluded from statistics.
    pub fn best_effort(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        start_hour_local: f64,
        end_hour_local: f64,
        duration_hours: f64,
        zone: Option<FixedOffset>,
    ) -> Option<Self> {
        Self::new(
            start,
            end,
            start_hour_local,
            end_hour_local,
            duration_hours,
            zone,
        )
        .ok()
    }

    // ── Accessors ──────────────────────────────

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// The wake-up instant, in UTC.
    pub fn end(&self) -> DateTime<Utc> {
        self.end.with_timezone(&Utc)
    }

    /// The subject's UTC offset for this session.
    pub fn zone(&self) -> FixedOffset {
        *self.end.offset()
    }

    pub fn start_hour_local(&self) -> f64 {
        self.start_hour_local
    }

    pub fn end_hour_local(&self) -> f64 {
        self.end_hour_local
    }

    pub fn start_hour_utc(&self) -> f64 {
        self.start_hour_utc
    }

    pub fn end_hour_utc(&self) -> f64 {
        self.end_hour_utc
    }

    /// Net sleep length in hours (span minus interior wake pauses).
    pub fn duration_hours(&self) -> f64 {
        self.duration_hours
    }

    /// Circular midpoint of the local start/end hours, in `[0, 24)`.
    pub fn midpoint_local(&self) -> f64 {
        self.midpoint_local
    }

    /// Circular midpoint of the UTC start/end hours, in `[0, 24)`.
    pub fn midpoint_utc(&self) -> f64 {
        self.midpoint_utc
    }

    /// Local weekday of waking up, under the record's UTC offset.
    ///
    /// Used for the weekend fallback when chronotype clustering is not
    /// trustworthy.
    pub fn end_weekday(&self) -> Weekday {
        self.end.weekday()
    }
}

/// Fractional UTC hour of an instant: 22:30:00Z is 22.5.
fn fractional_hour_utc(instant: DateTime<Utc>) -> f64 {
    f64::from(instant.time().num_seconds_from_midnight()) / 3600.0
}

/// Midpoint of a sleep interval on the 24-hour circle, equal weights.
fn mid_sleep(start_hour: f64, end_hour: f64) -> f64 {
    weighted_center(start_hour, 1.0, end_hour, 1.0, HOURS_PER_DAY)
}

// Identity is the end instant alone; see the module docs.

impl PartialEq for SleepInterval {
    fn eq(&self, other: &Self) -> bool {
        self.end == other.end
    }
}

impl Eq for SleepInterval {}

impl Hash for SleepInterval {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.end.timestamp().hash(state);
        self.end.timestamp_subsec_nanos().hash(state);
    }
}

impl PartialOrd for SleepInterval {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SleepInterval {
    fn cmp(&self, other: &Self) -> Ordering {
        self.end.cmp(&other.end)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
