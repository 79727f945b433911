//! Sleep-timing statistics on top of `circastat-cyclic`.
//!
//! The crate turns a subject's validated sleep records into chronobiology
//! aggregates:
//!
//! | Module | Provides |
//! |--------|----------|
//! | [`record`] | [`SleepInterval`], one validated sleep session |
//! | [`history`] | [`SleepHistory`], an ordered record collection with windowed splits |
//! | [`clustering`] | cyclic k-means++ and the free/busy day regimes |
//! | [`jetlag`] | [`SocialJetlagStats`]: social jetlag, irregularity, chronotype |
//! | [`regularity`] | Sleep Regularity Index: minute-grid state overlap of consecutive days |
//! | [`outliers`] | quantile-gap outlier screening |
//! | [`population`] | population reference deciles for chronotype scoring |
//! | [`linear`] | plain statistics for the non-circular quantities |
//!
//! Hours of day are `f64` fractional hours on the 24-hour circle; all the
//! circular arithmetic is delegated to `circastat-cyclic`. Instants are
//! `chrono` UTC datetimes; a record additionally carries the subject's UTC
//! offset so that calendar questions ("was this a Saturday?") are answered
//! in the subject's local time.

pub mod clustering;
pub mod error;
pub mod history;
pub mod jetlag;
pub mod linear;
pub mod outliers;
pub mod population;
pub mod record;
pub mod regularity;

pub use clustering::{ClusteredSleep, CyclicKMeans, SleepLabel, MIN_RECORDS_FOR_CLUSTERING};
pub use error::{HistoryError, RecordError};
pub use history::SleepHistory;
pub use jetlag::{SocialJetlagStats, MIN_RECORDS_FOR_STATS};
pub use record::{SleepInterval, HOURS_PER_DAY, MAX_SPAN_HOURS};
pub use regularity::{modified_sleep_regularity_index, sleep_regularity_index};
