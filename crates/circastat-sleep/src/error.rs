use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::record::MAX_SPAN_HOURS;

/// Validation failures at sleep-interval construction.
///
/// No partially constructed record is ever observable: construction either
/// yields a fully derived [`crate::SleepInterval`] or one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("interval ends before it starts: {start} > {end}")]
    EndBeforeStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("interval spans {hours:.2} h, over the {MAX_SPAN_HOURS} h cap")]
    SpanTooLong { hours: f64 },

    #[error("{field} must be in [0, 24): {value}")]
    HourOutOfRange { field: &'static str, value: f64 },
}

/// Range violations at history construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HistoryError {
    #[error("record ends at {record_end}, before the covered range start {from}")]
    RecordBeforeRange {
        record_end: DateTime<Utc>,
        from: DateTime<Utc>,
    },

    #[error("record ends at {record_end}, after the covered range end {to}")]
    RecordAfterRange {
        record_end: DateTime<Utc>,
        to: DateTime<Utc>,
    },

    #[error("inverted covered range: {from} > {to}")]
    RangeInverted {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}
