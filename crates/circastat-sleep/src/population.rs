//! Population reference statistics for chronotype scoring.
//!
//! The decile table below is the distribution of mid-sleep on free days
//! mined from a large anonymized sleep database; a subject's chronotype is
//! expressed as the population quantile of their own mid-sleep on free
//! days (0.0 = extreme early lark, 0.9 = extreme late owl).

/// Deciles of mid-sleep on free days (fractional hour, population-wide).
/// `(lower bound, quantile)`, lower bounds ascending.
const MID_SLEEP_FREE_DAYS_DECILES: [(f64, f64); 10] = [
    (f64::NEG_INFINITY, 0.0),
    (2.76, 0.1),
    (3.43, 0.2),
    (3.92, 0.3),
    (4.37, 0.4),
    (4.79, 0.5),
    (5.26, 0.6),
    (5.80, 0.7),
    (6.50, 0.8),
    (7.65, 0.9),
];

/// Population quantile of a mid-sleep-on-free-days value: the quantile of
/// the highest decile bound not exceeding `mid_sleep_free_days`.
pub fn chronotype_quantile(mid_sleep_free_days: f64) -> f64 {
    MID_SLEEP_FREE_DAYS_DECILES
        .iter()
        .rev()
        .find(|&&(bound, _)| bound <= mid_sleep_free_days)
        .map(|&(_, quantile)| quantile)
        .unwrap_or(0.0)
}

/// Map a chronotype quantile to a 1–5 extremity rank: 5 is an extreme
/// chronotype in either direction, 1 is dead average.
pub fn chronotype_rank(quantile: f64) -> u8 {
    if quantile <= 0.0 || quantile >= 1.0 {
        5
    } else if quantile < 0.5 {
        (10.0 * (0.5 - quantile)).round() as u8
    } else {
        1 + (10.0 * (quantile - 0.5)).round() as u8
    }
}
