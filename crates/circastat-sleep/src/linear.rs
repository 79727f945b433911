//! Plain (non-circular) statistics helpers.
//!
//! Sleep *length* lives on the real line, not on the clock face, so the
//! statistics layer mixes these with the circular aggregates from
//! `circastat-cyclic`. Empty-input results are `f64::NAN`, matching the
//! engine's undefined-statistic convention.

/// Arithmetic mean. `NAN` for an empty slice.
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Population standard deviation (÷ n, like the circular `stdev`).
/// `NAN` for an empty slice.
pub fn stdev(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    let m = mean(xs);
    let sq_dev_sum: f64 = xs
        .iter()
        .map(|&x| {
            let d = x - m;
            d * d
        })
        .sum();
    (sq_dev_sum / xs.len() as f64).sqrt()
}

/// Interpolated percentile, `p` in `[0, 100]`, with the `p·(n+1)/100`
/// position estimate. `NAN` for an empty slice.
///
/// # Panics
///
/// Panics when `p` is outside `[0, 100]`.
pub fn percentile(xs: &[f64], p: f64) -> f64 {
    assert!((0.0..=100.0).contains(&p), "percentile out of range: {p}");
    if xs.is_empty() {
        return f64::NAN;
    }

    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let pos = p / 100.0 * (n as f64 + 1.0);
    if pos < 1.0 {
        return sorted[0];
    }
    if pos >= n as f64 {
        return sorted[n - 1];
    }
    let lower = pos.floor() as usize; // 1-based
    let frac = pos - pos.floor();
    sorted[lower - 1] + frac * (sorted[lower] - sorted[lower - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_is_undefined() {
        assert!(mean(&[]).is_nan());
        assert_eq!(mean(&[2.0, 4.0]), 3.0);
    }

    #[test]
    fn stdev_is_population() {
        // mean 6.5, every deviation 0.5
        let xs = [7.0, 7.0, 6.0, 7.0, 6.0, 6.0];
        assert_eq!(stdev(&xs), 0.5);
        assert_eq!(stdev(&[3.0]), 0.0);
        assert!(stdev(&[]).is_nan());
    }

    #[test]
    fn percentile_interpolates() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&xs, 50.0), 2.5);
        assert_eq!(percentile(&xs, 0.0), 1.0);
        assert_eq!(percentile(&xs, 100.0), 4.0);
        let gaps = [1.0, 1.0, 1.0, 10.0];
        assert_eq!(percentile(&gaps, 80.0), 10.0);
    }

    #[test]
    #[should_panic(expected = "percentile out of range")]
    fn percentile_rejects_bad_fraction() {
        percentile(&[1.0], 101.0);
    }
}
