//! End-to-end checks of the social-jetlag pipeline, from raw session
//! fields to the final aggregates.

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};

use circastat_sleep::{SleepHistory, SleepInterval, SocialJetlagStats, HOURS_PER_DAY};

fn utc(s: &str) -> DateTime<Utc> {
    s.parse().expect("test timestamp")
}

fn record(
    start: &str,
    end: &str,
    start_hour_local: f64,
    end_hour_local: f64,
    duration: f64,
    zone_hours: i32,
) -> SleepInterval {
    let zone = (zone_hours != 0)
        .then(|| FixedOffset::east_opt(zone_hours * 3600))
        .flatten();
    SleepInterval::new(
        utc(start),
        utc(end),
        start_hour_local,
        end_hour_local,
        duration,
        zone,
    )
    .expect("valid record")
}

/// Two weeks of a traveller: three nights at home (UTC), then three nights
/// in a UTC+2 country. The expected aggregates were computed by hand.
fn traveller_history() -> SleepHistory {
    SleepHistory::new([
        record(
            "2018-11-11T01:30:10Z",
            "2018-11-11T10:00:10Z",
            1.5,
            10.0,
            7.0,
            0,
        ),
        record(
            "2018-11-12T01:00:10Z",
            "2018-11-12T10:00:10Z",
            1.0,
            10.0,
            7.0,
            0,
        ),
        record(
            "2018-11-13T02:00:10Z",
            "2018-11-13T10:00:10Z",
            2.0,
            10.0,
            6.0,
            0,
        ),
        record(
            "2018-11-24T01:00:10Z",
            "2018-11-24T10:00:10Z",
            3.0,
            12.0,
            7.0,
            2,
        ),
        record(
            "2018-11-25T02:00:10Z",
            "2018-11-25T10:00:10Z",
            4.0,
            12.0,
            6.0,
            2,
        ),
        record(
            "2018-11-26T01:00:10Z",
            "2018-11-26T09:00:10Z",
            3.0,
            11.0,
            6.0,
            2,
        ),
    ])
}

#[test]
fn average_schedule_of_the_traveller() {
    let stats = SocialJetlagStats::new(traveller_history(), false);

    let mid = stats.average_midpoint().expect("6 records are enough");
    assert!((mid - 6.625).abs() < 1e-9, "average midpoint = {mid}");

    let duration = stats.average_duration().expect("6 records are enough");
    assert_eq!(duration, 6.5);
}

#[test]
fn irregularity_in_local_hours() {
    let stats = SocialJetlagStats::new(traveller_history(), false);
    let irregularity = stats.sleep_irregularity().expect("6 records are enough");
    // circular spread of local mid-sleeps 0.9326262, duration spread 0.5
    assert!(
        (irregularity - 0.7163131).abs() < 1e-6,
        "local irregularity = {irregularity}"
    );
}

#[test]
fn irregularity_in_utc_hours_is_smaller_for_a_traveller() {
    // in UTC the traveller's schedule barely moved; the local-hour spread
    // is mostly the timezone change itself
    let stats = SocialJetlagStats::new(traveller_history(), true);
    let irregularity = stats.sleep_irregularity().expect("6 records are enough");
    assert!(
        (irregularity - 0.4230547).abs() < 1e-6,
        "utc irregularity = {irregularity}"
    );
}

#[test]
fn one_record_against_the_average_schedule() {
    let stats = SocialJetlagStats::new(traveller_history(), false);

    // local midpoint 3.5 (01:00 to 06:00), net sleep 8.5h
    let long_early_night = record(
        "2018-11-14T01:00:10Z",
        "2018-11-14T06:00:10Z",
        1.0,
        6.0,
        8.5,
        0,
    );
    let irregularity = stats
        .record_irregularity(&long_early_night)
        .expect("6 records are enough");
    // (|6.625 - 3.5| + |8.5 - 6.5|) / 2
    assert!(
        (irregularity - 2.5625).abs() < 1e-9,
        "record irregularity = {irregularity}"
    );
}

#[test]
fn six_records_fall_back_to_the_weekend_split() {
    let stats = SocialJetlagStats::new(traveller_history(), false);
    assert!(!stats.good_clustering());

    // wake-ups: Sun, Mon, Tue, Sat (local UTC+2), Sun, Mon
    assert_eq!(stats.free_days().len(), 3);
    assert_eq!(stats.busy_days().len(), 3);

    // three free days are under the per-side record minimum
    assert_eq!(stats.mid_sleep_free_days(), None);
    assert_eq!(stats.social_jetlag(), None);
    assert_eq!(stats.chronotype(), None);
}

// ─────────────────────────────────────────────
// A history long enough for clustering
// ─────────────────────────────────────────────

fn shift_worker_record(day: i64, end_hour: f64, duration: f64) -> SleepInterval {
    let end = utc("2024-01-01T00:00:00Z")
        + TimeDelta::days(day)
        + TimeDelta::minutes((end_hour * 60.0).round() as i64);
    let start = end - TimeDelta::minutes((duration * 60.0) as i64);
    SleepInterval::new(
        start,
        end,
        circastat_cyclic::normalize(end_hour - duration, HOURS_PER_DAY),
        end_hour,
        duration,
        None,
    )
    .expect("valid record")
}

/// 46 alarm-clock nights (wake ~07:00, ~7h) and 14 free nights
/// (wake ~11:00, ~9h). The regimes ignore the calendar on purpose: only
/// clustering can find this split.
fn two_regime_history() -> SleepHistory {
    let mut records = Vec::new();
    for day in 0..46 {
        let jitter = f64::from((day % 5) as u8) * 0.05;
        records.push(shift_worker_record(day, 7.0 + jitter, 7.0 + jitter));
    }
    for day in 46..60 {
        let jitter = f64::from((day % 3) as u8) * 0.05;
        records.push(shift_worker_record(day, 11.0 + jitter, 9.0 + jitter));
    }
    SleepHistory::new(records)
}

#[test]
fn clustering_recovers_the_two_regimes() {
    let stats = SocialJetlagStats::new(two_regime_history(), false);

    assert!(stats.good_clustering());
    assert_eq!(stats.free_days().len(), 14);
    assert_eq!(stats.busy_days().len(), 46);
    assert!(stats.unclassified_days().is_empty());
}

#[test]
fn social_jetlag_of_the_two_regime_subject() {
    let stats = SocialJetlagStats::new(two_regime_history(), false);

    // busy midpoints ~3.5, free midpoints ~6.5
    let jetlag = stats.social_jetlag().expect("both regimes are large");
    assert!(
        (2.5..3.5).contains(&jetlag),
        "social jetlag = {jetlag}"
    );

    // mid-sleep on free days just over 6.5 → ninth population decile
    assert_eq!(stats.chronotype(), Some(0.8));
    assert_eq!(stats.chronotype_rank(), Some(4));
}

#[test]
fn repeated_queries_agree() {
    let stats = SocialJetlagStats::new(two_regime_history(), false);
    assert_eq!(stats.social_jetlag(), stats.social_jetlag());
    assert_eq!(stats.free_days().len(), stats.free_days().len());

    // a fresh instance over the same records agrees too
    let again = SocialJetlagStats::new(two_regime_history(), false);
    assert_eq!(stats.social_jetlag(), again.social_jetlag());
}
