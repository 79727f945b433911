//! # circastat-cyclic
//!
//! Arithmetic and statistics on a **circular domain** — real values that wrap
//! around after a fixed cycle length (24 for hours of a day, 7 for days of a
//! week, 360 for degrees).
//!
//! This crate is the single source of truth for all wrap-around math in
//! circastat. Every crate that touches clock-face values imports from here —
//! no inline reimplementations allowed. Naive linear statistics break at the
//! wrap point: the average of 23:00 and 01:00 is midnight, not noon.
//!
//! ## Core operations
//!
//! | Function | Purpose |
//! |---|---|
//! | [`normalize`] | Map any real onto the canonical `[0, cycle)` representative |
//! | [`distance`] | Shortest-arc distance between two points |
//! | [`signed_distance`] | Shortest-arc distance with a direction sign |
//! | [`clockwise_distance`] | Directed arc length, fixed traversal direction |
//! | [`weighted_center`] | Weighted midpoint of two points along the shorter arc |
//! | [`center`] | Circular center of mass of a point set |
//! | [`median`] | Circular median, unrolled at the antipode of the center |
//! | [`stdev`] | Root-mean-square shortest-arc deviation from the center |
//!
//! ## Conventions
//!
//! Every function takes the cycle length explicitly and panics on
//! `cycle <= 0` — a non-positive cycle is caller misuse, not a recoverable
//! condition. Statistics of an **empty** point set are undefined and return
//! `f64::NAN`; callers must check before further arithmetic.
//!
//! All returned circular positions satisfy `0.0 <= p < cycle`.

// ─────────────────────────────────────────────
// Normalization
// ─────────────────────────────────────────────

/// Map `x` to the interval `[0, cycle)`. Like modulo arithmetic, but on a
/// continuous domain.
///
/// Already-canonical inputs are returned unchanged, which also avoids
/// accumulating floating-point error on repeated normalization. Inputs
/// outside the cycle are reduced by the appropriate multiple of `cycle`
/// and then snapped: a result that lands on `cycle` or an epsilon below
/// `0.0` due to floating-point drift becomes `0.0`, so callers never
/// observe a normalized value outside `[0, cycle)`.
///
/// # Panics
///
/// Panics if `cycle <= 0`.
pub fn normalize(x: f64, cycle: f64) -> f64 {
    assert!(cycle > 0.0, "cycle must be positive: {cycle}");
    if x >= 0.0 {
        if x < cycle {
            x
        } else {
            snap_into_cycle(x - (x / cycle).floor() * cycle, cycle)
        }
    } else if x > -cycle {
        snap_into_cycle(cycle + x, cycle)
    } else {
        snap_into_cycle(cycle + x - (x / cycle).ceil() * cycle, cycle)
    }
}

/// Clamp minor numeric errors, like `(1/3)*3 = 1.0000001`, back to `0.0`.
#[inline]
fn snap_into_cycle(x: f64, cycle: f64) -> f64 {
    if x < 0.0 || x >= cycle {
        0.0
    } else {
        x
    }
}

// ─────────────────────────────────────────────
// Distances
// ─────────────────────────────────────────────

/// Forward offset of `x` relative to `y`: `normalize(x - y, cycle)`.
///
/// Always in `[0, cycle)`.
///
/// # Panics
///
/// Panics if `cycle <= 0`.
pub fn sub(x: f64, y: f64, cycle: f64) -> f64 {
    normalize(x - y, cycle)
}

/// Shortest-arc distance between `x` and `y`: the smaller of the two arc
/// lengths connecting them.
///
/// Symmetric, non-negative, at most `cycle / 2`.
///
/// # Panics
///
/// Panics if `cycle <= 0`.
pub fn distance(x: f64, y: f64, cycle: f64) -> f64 {
    sub(x, y, cycle).min(sub(y, x, cycle))
}

/// Like [`distance`], but with a sign telling which direction from
/// `reference` is shorter to reach `x`: minus if `x` lies before `reference`
/// going clockwise (by less than half the cycle), plus otherwise.
///
/// The magnitude is at most `cycle / 2`. At the exact antipode neither
/// direction is shorter and the sign falls out of the tie-break: minus
/// when the normalized `x` is larger than the normalized `reference`,
/// plus otherwise — both endpoints `±cycle/2` are reachable.
///
/// # Panics
///
/// Panics if `cycle <= 0`.
pub fn signed_distance(x: f64, reference: f64, cycle: f64) -> f64 {
    let nx = normalize(x, cycle);
    let nref = normalize(reference, cycle);
    let d = distance(nx, nref, cycle);
    if nx < nref {
        if nref - nx < cycle / 2.0 {
            -d
        } else {
            d
        }
    } else if nx - nref < cycle / 2.0 {
        d
    } else {
        -d
    }
}

/// Arc length from `x` to `y` when traveling clockwise — the directed
/// distance, not the shorter one.
///
/// Inputs are expected to be canonical (`[0, cycle)`); the result is in
/// `[0, cycle)` and asymmetric: `clockwise_distance(x, y) +
/// clockwise_distance(y, x) == cycle` whenever `x != y`. This is the
/// primitive for ordering points around the circle relative to a reference.
///
/// # Panics
///
/// Panics if `cycle <= 0`.
pub fn clockwise_distance(x: f64, y: f64, cycle: f64) -> f64 {
    assert!(cycle > 0.0, "cycle must be positive: {cycle}");
    if x <= y {
        y - x
    } else {
        cycle - (x - y)
    }
}

// ─────────────────────────────────────────────
// Clockwise intervals
// ─────────────────────────────────────────────

/// Walking clockwise from `start`, do we reach `x` no later than `end`?
///
/// The interval is closed at `start` and at `end`.
///
/// # Panics
///
/// Panics if `cycle <= 0`.
pub fn is_between_clockwise(x: f64, start: f64, end: f64, cycle: f64) -> bool {
    assert!(cycle > 0.0, "cycle must be positive: {cycle}");
    clockwise_distance(start, x, cycle) <= clockwise_distance(start, end, cycle)
}

/// The subsequence of `xs` (order preserved) lying between `start` and `end`
/// clockwise.
///
/// # Panics
///
/// Panics if `cycle <= 0`.
pub fn filter_between_clockwise(xs: &[f64], start: f64, end: f64, cycle: f64) -> Vec<f64> {
    assert!(cycle > 0.0, "cycle must be positive: {cycle}");
    xs.iter()
        .copied()
        .filter(|&x| is_between_clockwise(x, start, end, cycle))
        .collect()
}

/// The antipodal point: exactly half a cycle away from `x`.
///
/// # Panics
///
/// Panics if `cycle <= 0`.
pub fn opposite(x: f64, cycle: f64) -> f64 {
    normalize(x + cycle / 2.0, cycle)
}

// ─────────────────────────────────────────────
// Center of mass
// ─────────────────────────────────────────────

/// Weighted center between two points on a circular interval (like a clock
/// face).
///
/// Moves from one point toward the other by the opposing weight's share of
/// their shortest-arc distance, choosing the direction so the move stays on
/// the **shorter arc**. Equal weights give the ordinary circular midpoint:
///
/// ```text
/// weighted_center(23, 1, 1, 1, 24) == 0      // 23:00 ↔ 01:00 → midnight
/// ```
///
/// # Panics
///
/// Panics if `cycle <= 0` or either weight is negative.
pub fn weighted_center(x: f64, weight_x: f64, y: f64, weight_y: f64, cycle: f64) -> f64 {
    assert!(weight_x >= 0.0, "weight_x must be non-negative: {weight_x}");
    assert!(weight_y >= 0.0, "weight_y must be non-negative: {weight_y}");
    let nx = normalize(x, cycle);
    let ny = normalize(y, cycle);
    let d = distance(nx, ny, cycle);
    let total = weight_x + weight_y;
    if nx < ny {
        if ny - nx < cycle / 2.0 {
            normalize(nx + d * weight_y / total, cycle)
        } else {
            normalize(nx - d * weight_y / total, cycle)
        }
    } else if nx - ny < cycle / 2.0 {
        normalize(ny + d * weight_x / total, cycle)
    } else {
        normalize(ny - d * weight_x / total, cycle)
    }
}

/// Circular center of mass of a point set.
///
/// Sequential fold: seed with the first point, then merge each next point
/// with weight 1 against the accumulated count:
///
/// ```text
/// acc₀ = xs[0]
/// accᵢ = weighted_center(accᵢ₋₁, i, xs[i], 1)
/// ```
///
/// In exact arithmetic the result is order-independent (each merge bisects
/// along the shorter arc with weight proportional to count); floating-point
/// rounding makes it very mildly order-sensitive in practice.
///
/// Returns `f64::NAN` for an empty slice.
///
/// # Panics
///
/// Panics if `cycle <= 0`.
pub fn center(xs: &[f64], cycle: f64) -> f64 {
    let Some(&first) = xs.first() else {
        return f64::NAN;
    };
    let mut acc = first;
    for (i, &x) in xs.iter().enumerate().skip(1) {
        acc = weighted_center(acc, i as f64, x, 1.0, cycle);
    }
    acc
}

// ─────────────────────────────────────────────
// Median
// ─────────────────────────────────────────────

/// Circular median of `xs`, using [`center`] as the reference point.
///
/// See [`median_from`] for the definition. Returns `f64::NAN` for an empty
/// slice.
///
/// # Panics
///
/// Panics if `cycle <= 0`.
pub fn median(xs: &[f64], cycle: f64) -> f64 {
    median_from(xs, center(xs, cycle), cycle)
}

/// Circular median of `xs` relative to a given `center`.
///
/// A circle has no beginning, end or middle element, so the median needs a
/// definition: take the point diametrically opposite the center of mass —
/// where clustered data typically has no points at all — sort the points by
/// clockwise distance from that antipode, and take the linear median of the
/// sorted sequence. For a tight cluster (e.g. wake-up hours) this unrolls
/// the circle where it is sparse and gives a meaningful middle value.
///
/// For an even count the two middle values are averaged **linearly**, not
/// re-normalized circularly. The two middle points of clustered data are
/// adjacent after the sort, where linear and circular averaging coincide;
/// if they straddle the antipode the average lands half a cycle off (see
/// the crate tests for the documented case).
///
/// Returns `f64::NAN` for an empty slice.
///
/// # Panics
///
/// Panics if `cycle <= 0`.
pub fn median_from(xs: &[f64], center: f64, cycle: f64) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }

    let unroll_at = opposite(center, cycle);
    let mut sorted: Vec<f64> = xs.to_vec();
    sorted.sort_by(|a, b| {
        let da = clockwise_distance(unroll_at, *a, cycle);
        let db = clockwise_distance(unroll_at, *b, cycle);
        da.total_cmp(&db)
    });

    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

// ─────────────────────────────────────────────
// Standard deviation
// ─────────────────────────────────────────────

/// Circular standard deviation of `xs`, using [`center`] (the center of
/// mass, not an arithmetic mean) as the reference.
///
/// Returns `f64::NAN` for an empty slice.
///
/// # Panics
///
/// Panics if `cycle <= 0`.
pub fn stdev(xs: &[f64], cycle: f64) -> f64 {
    stdev_from(xs, center(xs, cycle), cycle)
}

/// Circular standard deviation from a given `center`: the root mean square
/// of shortest-arc distances.
///
/// ```text
/// stdev = sqrt( Σ distance(x, center)² / n )
/// ```
///
/// Returns `f64::NAN` for an empty slice.
///
/// # Panics
///
/// Panics if `cycle <= 0`.
pub fn stdev_from(xs: &[f64], center: f64, cycle: f64) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    let sq_dev_sum: f64 = xs
        .iter()
        .map(|&x| {
            let d = distance(x, center, cycle);
            d * d
        })
        .sum();
    (sq_dev_sum / xs.len() as f64).sqrt()
}

/// [`stdev_from`] restricted to the points in the clockwise half-circle
/// `[center, opposite(center)]`.
///
/// Together with [`half_stdev_anticlockwise`] this detects asymmetric
/// spread, e.g. a skew toward later rather than earlier wake times.
///
/// Returns `f64::NAN` when no points fall in the half.
///
/// # Panics
///
/// Panics if `cycle <= 0`.
pub fn half_stdev_clockwise(xs: &[f64], center: f64, cycle: f64) -> f64 {
    let points = filter_between_clockwise(xs, center, opposite(center, cycle), cycle);
    stdev_from(&points, center, cycle)
}

/// [`stdev_from`] restricted to the points in the anticlockwise half-circle
/// `[opposite(center), center]`.
///
/// Returns `f64::NAN` when no points fall in the half.
///
/// # Panics
///
/// Panics if `cycle <= 0`.
pub fn half_stdev_anticlockwise(xs: &[f64], center: f64, cycle: f64) -> f64 {
    let points = filter_between_clockwise(xs, opposite(center, cycle), center, cycle);
    stdev_from(&points, center, cycle)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const HOURS: f64 = 24.0;

    // ── normalize ──────────────────────────────

    #[test]
    fn normalize_canonical_input_unchanged() {
        assert_eq!(normalize(0.0, HOURS), 0.0);
        assert_eq!(normalize(13.25, HOURS), 13.25);
        assert_eq!(normalize(23.999, HOURS), 23.999);
    }

    #[test]
    fn normalize_wraps_both_directions() {
        assert_eq!(normalize(-1.0, HOURS), 23.0);
        assert_eq!(normalize(25.0, HOURS), 1.0);
        assert_eq!(normalize(24.0, HOURS), 0.0);
        assert_eq!(normalize(-24.0, HOURS), 0.0);
        assert_eq!(normalize(-25.0, HOURS), 23.0);
        assert_eq!(normalize(49.0, HOURS), 1.0);
    }

    #[test]
    fn normalize_stays_in_range_and_is_idempotent() {
        for &x in &[-1000.3, -24.0, -23.9, -0.0001, 0.0, 11.5, 24.0, 24.0001, 97.75] {
            let n = normalize(x, HOURS);
            assert!((0.0..HOURS).contains(&n), "normalize({x}) = {n} out of range");
            assert_eq!(normalize(n, HOURS), n, "not idempotent for {x}");
        }
    }

    #[test]
    fn normalize_is_periodic() {
        for k in [-3i32, -1, 1, 2, 5] {
            let shifted = normalize(7.5 + f64::from(k) * HOURS, HOURS);
            assert!((shifted - 7.5).abs() < 1e-9, "k={k} gave {shifted}");
        }
    }

    #[test]
    fn normalize_snaps_rounding_noise_to_zero() {
        // (1/3)*3 style epsilon below the cycle must not escape [0, cycle)
        let n = normalize(HOURS - 1e-18 + HOURS, HOURS);
        assert!((0.0..HOURS).contains(&n));
    }

    #[test]
    #[should_panic(expected = "cycle must be positive")]
    fn normalize_rejects_non_positive_cycle() {
        normalize(1.0, 0.0);
    }

    // ── distances ──────────────────────────────

    #[test]
    fn sub_is_forward_offset() {
        assert_eq!(sub(1.0, 23.0, HOURS), 2.0);
        assert_eq!(sub(23.0, 1.0, HOURS), 22.0);
    }

    #[test]
    fn distance_wraps_through_midnight() {
        assert_eq!(distance(23.0, 1.0, HOURS), 2.0);
        assert_eq!(distance(1.0, 23.0, HOURS), 2.0);
    }

    #[test]
    fn distance_is_symmetric_zero_on_self_and_bounded() {
        let points = [0.0, 3.7, 11.9, 12.0, 18.5, 23.99];
        for &x in &points {
            assert_eq!(distance(x, x, HOURS), 0.0);
            for &y in &points {
                let d = distance(x, y, HOURS);
                assert_eq!(d, distance(y, x, HOURS));
                assert!(d <= HOURS / 2.0);
            }
        }
    }

    #[test]
    fn signed_distance_sign_tells_direction() {
        // 23:00 is 2h before 01:00 clockwise → negative
        assert_eq!(signed_distance(23.0, 1.0, HOURS), -2.0);
        // 03:00 is 2h after 01:00 clockwise → positive
        assert_eq!(signed_distance(3.0, 1.0, HOURS), 2.0);
        assert_eq!(signed_distance(5.0, 5.0, HOURS), 0.0);
    }

    #[test]
    fn signed_distance_at_the_exact_antipode() {
        // neither direction is shorter; the sign follows the normalized order
        assert_eq!(signed_distance(13.0, 1.0, HOURS), -12.0);
        assert_eq!(signed_distance(1.0, 13.0, HOURS), 12.0);
    }

    #[test]
    fn signed_distance_magnitude_matches_distance() {
        for &(x, r) in &[(23.5, 0.5), (6.0, 18.0), (0.0, 12.0), (2.0, 21.0)] {
            assert_eq!(signed_distance(x, r, HOURS).abs(), distance(x, r, HOURS));
        }
    }

    #[test]
    fn clockwise_distances_sum_to_cycle() {
        for &(x, y) in &[(1.0, 23.0), (0.0, 12.0), (5.5, 6.25), (20.0, 4.0)] {
            let sum = clockwise_distance(x, y, HOURS) + clockwise_distance(y, x, HOURS);
            assert!((sum - HOURS).abs() < 1e-12, "{x},{y} gave {sum}");
        }
    }

    #[test]
    fn clockwise_distance_is_directed() {
        assert_eq!(clockwise_distance(22.0, 2.0, HOURS), 4.0);
        assert_eq!(clockwise_distance(2.0, 22.0, HOURS), 20.0);
    }

    #[test]
    #[should_panic(expected = "cycle must be positive")]
    fn clockwise_distance_rejects_non_positive_cycle() {
        clockwise_distance(2.0, 5.0, -24.0);
    }

    // ── clockwise intervals ────────────────────

    #[test]
    fn is_between_clockwise_closed_at_both_ends() {
        assert!(is_between_clockwise(22.0, 22.0, 2.0, HOURS));
        assert!(is_between_clockwise(2.0, 22.0, 2.0, HOURS));
        assert!(is_between_clockwise(23.5, 22.0, 2.0, HOURS));
        assert!(!is_between_clockwise(10.0, 22.0, 2.0, HOURS));
    }

    #[test]
    fn filter_between_clockwise_preserves_order() {
        let xs = [23.0, 5.0, 1.0, 12.0, 0.0];
        assert_eq!(
            filter_between_clockwise(&xs, 22.0, 2.0, HOURS),
            vec![23.0, 1.0, 0.0]
        );
    }

    #[test]
    #[should_panic(expected = "cycle must be positive")]
    fn is_between_clockwise_rejects_non_positive_cycle() {
        is_between_clockwise(3.0, 2.0, 5.0, 0.0);
    }

    #[test]
    #[should_panic(expected = "cycle must be positive")]
    fn filter_between_clockwise_rejects_non_positive_cycle() {
        filter_between_clockwise(&[], 2.0, 5.0, -1.0);
    }

    #[test]
    fn opposite_is_half_a_cycle_away() {
        assert_eq!(opposite(1.0, HOURS), 13.0);
        assert_eq!(opposite(13.0, HOURS), 1.0);
        assert_eq!(opposite(23.0, HOURS), 11.0);
    }

    // ── weighted_center ────────────────────────

    #[test]
    fn midpoint_of_23_and_1_is_midnight() {
        assert_eq!(weighted_center(23.0, 1.0, 1.0, 1.0, 24.0), 0.0);
    }

    #[test]
    fn weighted_center_pulls_toward_heavier_point() {
        // 22:00 (w=1) vs 02:00 (w=3): three quarters of the 4h arc → 01:00
        assert_eq!(weighted_center(22.0, 1.0, 2.0, 3.0, HOURS), 1.0);
    }

    #[test]
    fn weighted_center_takes_shorter_arc() {
        // 04:00 ↔ 20:00: shorter arc goes through midnight → midpoint 0,
        // not the linear 12
        assert_eq!(weighted_center(4.0, 1.0, 20.0, 1.0, HOURS), 0.0);
    }

    #[test]
    fn weighted_center_normalizes_inputs() {
        assert_eq!(weighted_center(47.0, 1.0, 25.0, 1.0, HOURS), 0.0);
    }

    #[test]
    #[should_panic(expected = "non-negative")]
    fn weighted_center_rejects_negative_weight() {
        weighted_center(1.0, -1.0, 2.0, 1.0, HOURS);
    }

    // ── center ─────────────────────────────────

    #[test]
    fn center_of_single_point_is_the_point() {
        assert_eq!(center(&[5.5], HOURS), 5.5);
    }

    #[test]
    fn center_of_empty_is_undefined() {
        assert!(center(&[], HOURS).is_nan());
    }

    #[test]
    fn center_of_cluster_around_midnight() {
        assert_eq!(center(&[22.0, 23.0, 0.0, 1.0, 2.0], HOURS), 0.0);
    }

    #[test]
    fn center_matches_linear_mean_away_from_wrap() {
        let c = center(&[9.0, 10.0, 11.0], HOURS);
        assert!((c - 10.0).abs() < 1e-12, "got {c}");
    }

    // ── median ─────────────────────────────────

    #[test]
    fn median_of_single_point_is_the_point() {
        assert_eq!(median(&[7.25], HOURS), 7.25);
    }

    #[test]
    fn median_of_empty_is_undefined() {
        assert!(median(&[], HOURS).is_nan());
    }

    #[test]
    fn median_odd_count_crosses_midnight() {
        assert_eq!(median(&[23.0, 0.0, 1.0], HOURS), 0.0);
    }

    #[test]
    fn median_even_count_in_cluster() {
        assert_eq!(median(&[1.0, 2.0], HOURS), 1.5);
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0], HOURS), 2.5);
    }

    #[test]
    fn median_even_count_straddling_wrap_is_linear() {
        // Known limitation, kept on purpose: the two middle values 23 and 1
        // straddle the wrap point, and their LINEAR average lands on the
        // antipode of the true cluster middle.
        assert_eq!(median(&[23.0, 1.0], HOURS), 12.0);
    }

    // ── stdev ──────────────────────────────────

    #[test]
    fn stdev_of_single_point_is_zero() {
        assert_eq!(stdev(&[4.0], HOURS), 0.0);
    }

    #[test]
    fn stdev_of_empty_is_undefined() {
        assert!(stdev(&[], HOURS).is_nan());
    }

    #[test]
    fn stdev_wraps_through_midnight() {
        // center = 0, both points 1h away
        assert_eq!(stdev(&[23.0, 1.0], HOURS), 1.0);
    }

    #[test]
    fn stdev_from_given_center() {
        let s = stdev_from(&[23.0, 2.0], 0.0, HOURS);
        assert!((s - (2.5f64).sqrt()).abs() < 1e-12);
    }

    // ── half stdevs ────────────────────────────

    #[test]
    fn half_stdevs_split_the_circle() {
        let xs = [22.0, 23.0, 1.0, 2.0];
        // clockwise half [0, 12): points 1 and 2
        let cw = half_stdev_clockwise(&xs, 0.0, HOURS);
        assert!((cw - (2.5f64).sqrt()).abs() < 1e-12);
        // anticlockwise half [12, 0): points 22 and 23
        let acw = half_stdev_anticlockwise(&xs, 0.0, HOURS);
        assert!((acw - (2.5f64).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn half_stdevs_detect_asymmetric_spread() {
        let xs = [23.5, 1.0, 3.0, 5.0];
        let cw = half_stdev_clockwise(&xs, 0.0, HOURS);
        let acw = half_stdev_anticlockwise(&xs, 0.0, HOURS);
        assert!(cw > acw, "cw={cw} acw={acw}");
    }

    #[test]
    fn half_stdev_of_empty_half_is_undefined() {
        // all points in the clockwise half
        assert!(half_stdev_anticlockwise(&[1.0, 2.0], 0.0, HOURS).is_nan());
    }
}
