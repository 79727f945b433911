//! Quantile-gap outlier detection.
//!
//! ## Algorithm
//!
//! 1. Project the elements onto the real line and sort.
//! 2. Provisionally cut the extreme `quantile` share off each end; the
//!    remainder is a provisional outlier-free core.
//! 3. Take the 80th-percentile gap between consecutive core elements and
//!    multiply by `multiplier` — the gap threshold.
//! 4. Grow the core back outward while the gap to the next cut element
//!    stays within the threshold.
//!
//! What stays outside has too big a gap (relative to the typical in-core
//! gap) between itself and its neighbour in the direction of the center.
//! A compound variant unions outliers over several projections, so an
//! element is an outlier when it is extreme in *any* dimension.

use std::collections::BTreeSet;

use crate::linear::percentile;

/// Partition of element indices into a core and its outliers.
///
/// Indices refer to the caller's input slice; both sides preserve the
/// input order.
#[derive(Debug, Clone, Default)]
pub struct CoreAndOutliers {
    core: Vec<usize>,
    outliers: Vec<usize>,
}

impl CoreAndOutliers {
    pub fn core(&self) -> &[usize] {
        &self.core
    }

    pub fn outliers(&self) -> &[usize] {
        &self.outliers
    }
}

/// Union outlier detection over several projections of the same elements.
///
/// Each projection is screened independently over the **whole** input (not
/// the shrinking core), and the resulting outlier sets are unioned.
///
/// # Panics
///
/// Panics when `quantile` is outside `(0, 1)` or `multiplier` is negative.
pub fn compound_quantile_outliers<T>(
    items: &[T],
    quantile: f64,
    multiplier: f64,
    projections: &[&dyn Fn(&T) -> f64],
) -> CoreAndOutliers {
    let mut flagged = BTreeSet::new();
    for projection in projections {
        flagged.extend(quantile_gap_outliers(items, quantile, multiplier, projection));
    }

    let mut result = CoreAndOutliers::default();
    for i in 0..items.len() {
        if flagged.contains(&i) {
            result.outliers.push(i);
        } else {
            result.core.push(i);
        }
    }
    result
}

/// Outlier indices for a single projection; see the module docs.
///
/// # Panics
///
/// Panics when `quantile` is outside `(0, 1)` or `multiplier` is negative.
pub fn quantile_gap_outliers<T>(
    items: &[T],
    quantile: f64,
    multiplier: f64,
    projection: impl Fn(&T) -> f64,
) -> BTreeSet<usize> {
    assert!(
        quantile > 0.0 && quantile < 1.0,
        "quantile must be in (0, 1): {quantile}"
    );
    assert!(multiplier >= 0.0, "multiplier must be non-negative: {multiplier}");

    let n = items.len();
    let mut by_value: Vec<(f64, usize)> = items
        .iter()
        .enumerate()
        .map(|(i, item)| (projection(item), i))
        .collect();
    by_value.sort_by(|a, b| a.0.total_cmp(&b.0));

    let cut = ((quantile * n as f64).ceil() as usize).min(n.saturating_sub(1));
    let mut core_start = cut;
    let Some(mut core_end) = (n - cut).checked_sub(1) else {
        return BTreeSet::new();
    };
    if core_end < core_start + 3 {
        // Core too small to estimate a typical gap; flag nothing.
        return BTreeSet::new();
    }

    let core_gaps: Vec<f64> = (core_start..core_end)
        .map(|i| by_value[i + 1].0 - by_value[i].0)
        .collect();
    let threshold = percentile(&core_gaps, 80.0) * multiplier;

    while core_start > 0 && by_value[core_start].0 - by_value[core_start - 1].0 <= threshold {
        core_start -= 1;
    }
    while core_end < n - 1 && by_value[core_end + 1].0 - by_value[core_end].0 <= threshold {
        core_end += 1;
    }

    by_value[..core_start]
        .iter()
        .chain(&by_value[core_end + 1..])
        .map(|&(_, i)| i)
        .collect()
}
