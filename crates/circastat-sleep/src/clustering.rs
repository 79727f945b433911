//! Chronotype clustering: free days vs busy days.
//!
//! Subjects with a fixed work schedule show two timing regimes — alarm-clock
//! days and free days. This module recovers the two regimes from the records
//! themselves with k-means++ adapted to the circular topology:
//!
//! - the per-dimension distance is the shortest-arc [`cyclic::distance`],
//!   not `a - b`
//! - a cluster centroid is the per-dimension circular [`cyclic::center`],
//!   not the arithmetic mean
//!
//! The feature vector is `[local wake-up hour, sleep duration]`. Wake-up
//! hour wraps at 24; duration is not a cyclic quantity, so its cycle is set
//! artificially long (1000) and the cyclic arithmetic degenerates to plain
//! linear arithmetic on it.
//!
//! [`cyclic::distance`]: circastat_cyclic::distance
//! [`cyclic::center`]: circastat_cyclic::center

use std::collections::HashMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use circastat_cyclic::{center, distance, signed_distance};

use crate::history::SleepHistory;
use crate::outliers::{compound_quantile_outliers, CoreAndOutliers};
use crate::record::{SleepInterval, HOURS_PER_DAY};

/// Below this many records no clustering is attempted (strength stays 0).
pub const MIN_RECORDS_FOR_CLUSTERING: usize = 30;

/// Cycle lengths of the feature dimensions: wake-up hour wraps at 24,
/// duration is effectively linear.
const FEATURE_CYCLES: [f64; 2] = [24.0, 1000.0];

const OUTLIER_QUANTILE: f64 = 0.025;
const OUTLIER_GAP_MULTIPLIER: f64 = 5.0;
const MAX_KMEANS_ITERATIONS: usize = 300;

// ─────────────────────────────────────────────
// Cyclic k-means++
// ─────────────────────────────────────────────

/// Euclidean norm of per-dimension circular distances.
pub fn cyclic_euclidean_distance(a: &[f64], b: &[f64], cycles: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), cycles.len(), "dimension mismatch");
    debug_assert_eq!(b.len(), cycles.len(), "dimension mismatch");
    a.iter()
        .zip(b)
        .zip(cycles)
        .map(|((&x, &y), &cycle)| {
            let d = distance(x, y, cycle);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// One cluster: its centroid and the indices of its member points.
#[derive(Debug, Clone)]
pub struct Cluster {
    pub centroid: Vec<f64>,
    pub members: Vec<usize>,
}

/// K-means++ on a torus: every dimension wraps with its own cycle length.
///
/// The RNG drives the k-means++ seeding and the empty-cluster recovery;
/// inject a seeded one for reproducible clusterings.
#[derive(Debug, Clone)]
pub struct CyclicKMeans {
    k: usize,
    max_iterations: usize,
    cycles: Vec<f64>,
}

impl CyclicKMeans {
    /// # Panics
    ///
    /// Panics when `k == 0` or `cycles` is empty.
    pub fn new(k: usize, max_iterations: usize, cycles: Vec<f64>) -> Self {
        assert!(k > 0, "k must be positive");
        assert!(!cycles.is_empty(), "at least one dimension required");
        Self {
            k,
            max_iterations,
            cycles,
        }
    }

    /// Run the clustering.
    ///
    /// Iterates assignment/re-centering until no point changes cluster (and
    /// no cluster is empty) or `max_iterations` is reached.
    ///
    /// # Panics
    ///
    /// Panics when there are fewer points than clusters.
    pub fn cluster<R: Rng + ?Sized>(&self, points: &[Vec<f64>], rng: &mut R) -> Vec<Cluster> {
        assert!(
            points.len() >= self.k,
            "{} points cannot form {} clusters",
            points.len(),
            self.k
        );

        let mut clusters = self.choose_initial_centers(points, rng);
        let mut assignments = vec![usize::MAX; points.len()];
        self.assign_points(&mut clusters, points, &mut assignments);

        for _ in 0..self.max_iterations {
            let mut any_empty = false;
            let mut new_clusters: Vec<Cluster> = Vec::with_capacity(self.k);
            for i in 0..clusters.len() {
                let centroid = if clusters[i].members.is_empty() {
                    // Re-seed a dead cluster from the loosest live one.
                    any_empty = true;
                    match steal_from_loosest_cluster(&mut clusters, points, &self.cycles, rng) {
                        Some(p) => points[p].clone(),
                        None => clusters[i].centroid.clone(),
                    }
                } else {
                    self.centroid_of(&clusters[i].members, points)
                };
                new_clusters.push(Cluster {
                    centroid,
                    members: Vec::new(),
                });
            }

            let changes = self.assign_points(&mut new_clusters, points, &mut assignments);
            clusters = new_clusters;
            if changes == 0 && !any_empty {
                break;
            }
        }
        clusters
    }

    /// K-means++ seeding: first center uniform, every next one with
    /// probability proportional to the squared distance from the centers
    /// chosen so far.
    fn choose_initial_centers<R: Rng + ?Sized>(
        &self,
        points: &[Vec<f64>],
        rng: &mut R,
    ) -> Vec<Cluster> {
        let n = points.len();
        let mut taken = vec![false; n];

        let first = rng.gen_range(0..n);
        taken[first] = true;
        let mut centers = vec![Cluster {
            centroid: points[first].clone(),
            members: Vec::new(),
        }];

        let mut min_dist_sq: Vec<f64> = (0..n)
            .map(|i| {
                if i == first {
                    0.0
                } else {
                    let d = cyclic_euclidean_distance(&points[first], &points[i], &self.cycles);
                    d * d
                }
            })
            .collect();

        while centers.len() < self.k {
            let dist_sq_sum: f64 = (0..n).filter(|&i| !taken[i]).map(|i| min_dist_sq[i]).sum();
            let r = rng.gen::<f64>() * dist_sq_sum;

            let mut sum = 0.0;
            let mut next = None;
            for i in 0..n {
                if taken[i] {
                    continue;
                }
                sum += min_dist_sq[i];
                if sum >= r {
                    next = Some(i);
                    break;
                }
            }
            // All remaining distances may be ~0; fall back to the last free point.
            let next = next.or_else(|| (0..n).rev().find(|&i| !taken[i]));
            let Some(next) = next else {
                break;
            };

            taken[next] = true;
            centers.push(Cluster {
                centroid: points[next].clone(),
                members: Vec::new(),
            });

            if centers.len() < self.k {
                for j in 0..n {
                    if taken[j] {
                        continue;
                    }
                    let d = cyclic_euclidean_distance(&points[next], &points[j], &self.cycles);
                    if d * d < min_dist_sq[j] {
                        min_dist_sq[j] = d * d;
                    }
                }
            }
        }

        centers
    }

    /// Assign every point to its nearest cluster; returns how many points
    /// moved relative to the previous assignment.
    fn assign_points(
        &self,
        clusters: &mut [Cluster],
        points: &[Vec<f64>],
        assignments: &mut [usize],
    ) -> usize {
        let mut moved = 0;
        for (p, point) in points.iter().enumerate() {
            let mut nearest = 0;
            let mut nearest_dist = f64::MAX;
            for (c, cluster) in clusters.iter().enumerate() {
                let d = cyclic_euclidean_distance(point, &cluster.centroid, &self.cycles);
                if d < nearest_dist {
                    nearest_dist = d;
                    nearest = c;
                }
            }
            if assignments[p] != nearest {
                moved += 1;
                assignments[p] = nearest;
            }
            clusters[nearest].members.push(p);
        }
        moved
    }

    /// Per-dimension circular center of the member points.
    fn centroid_of(&self, members: &[usize], points: &[Vec<f64>]) -> Vec<f64> {
        self.cycles
            .iter()
            .enumerate()
            .map(|(d, &cycle)| {
                let projection: Vec<f64> = members.iter().map(|&i| points[i][d]).collect();
                center(&projection, cycle)
            })
            .collect()
    }
}

/// Remove and return a random member of the cluster whose member distances
/// have the largest variance. `None` when every cluster is empty.
fn steal_from_loosest_cluster<R: Rng + ?Sized>(
    clusters: &mut [Cluster],
    points: &[Vec<f64>],
    cycles: &[f64],
    rng: &mut R,
) -> Option<usize> {
    let mut loosest: Option<usize> = None;
    let mut max_variance = f64::NEG_INFINITY;

    for (c, cluster) in clusters.iter().enumerate() {
        if cluster.members.is_empty() {
            continue;
        }
        let dists: Vec<f64> = cluster
            .members
            .iter()
            .map(|&i| cyclic_euclidean_distance(&points[i], &cluster.centroid, cycles))
            .collect();
        let variance = sample_variance(&dists);
        if variance > max_variance {
            max_variance = variance;
            loosest = Some(c);
        }
    }

    let donor = &mut clusters[loosest?].members;
    let victim = rng.gen_range(0..donor.len());
    Some(donor.swap_remove(victim))
}

fn sample_variance(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let mean = xs.iter().sum::<f64>() / xs.len() as f64;
    xs.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / (xs.len() - 1) as f64
}

// ─────────────────────────────────────────────
// ClusteredSleep
// ─────────────────────────────────────────────

/// Regime label of one sleep record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SleepLabel {
    FreeDay,
    BusyDay,
    Outlier,
}

/// A history clustered into free-day / busy-day regimes.
///
/// `strength` is the 1-cluster vs 2-cluster inertia ratio: how much the
/// mean squared point-to-centroid distance shrinks when a second cluster
/// is allowed. Homogeneous data stays near 1; a genuinely bimodal schedule
/// scores well above it.
#[derive(Debug, Clone)]
pub struct ClusteredSleep {
    history: SleepHistory,
    strength: f64,
    labels: HashMap<DateTime<Utc>, SleepLabel>,
}

impl ClusteredSleep {
    /// Cluster a history. Under [`MIN_RECORDS_FOR_CLUSTERING`] records the
    /// strength is 0 and no record carries a label: [`Self::label`] reports
    /// [`SleepLabel::Outlier`] and every [`Self::labeled`] sub-history is
    /// empty.
    pub fn new<R: Rng + ?Sized>(history: &SleepHistory, rng: &mut R) -> Self {
        let started = Instant::now();

        let mut labels = HashMap::new();
        let mut strength = 0.0;

        if history.len() >= MIN_RECORDS_FOR_CLUSTERING {
            let records: Vec<SleepInterval> = history.records().cloned().collect();
            let split = find_outliers(&records);

            let core: Vec<&SleepInterval> =
                split.core().iter().map(|&i| &records[i]).collect();
            let features: Vec<Vec<f64>> = core
                .iter()
                .map(|r| vec![r.end_hour_local(), r.duration_hours()])
                .collect();

            let one_cluster = CyclicKMeans::new(1, MAX_KMEANS_ITERATIONS, FEATURE_CYCLES.to_vec())
                .cluster(&features, rng);
            let two_clusters = CyclicKMeans::new(2, MAX_KMEANS_ITERATIONS, FEATURE_CYCLES.to_vec())
                .cluster(&features, rng);
            strength = mean_square_distance(&one_cluster, &features)
                / mean_square_distance(&two_clusters, &features);

            // The smaller regime is the free-day one: most subjects have
            // more working days than free days.
            let (free, busy) = if two_clusters[0].members.len() < two_clusters[1].members.len() {
                (&two_clusters[0], &two_clusters[1])
            } else {
                (&two_clusters[1], &two_clusters[0])
            };
            for &m in &free.members {
                labels.insert(core[m].end(), SleepLabel::FreeDay);
            }
            for &m in &busy.members {
                labels.insert(core[m].end(), SleepLabel::BusyDay);
            }
            for &i in split.outliers() {
                labels.insert(records[i].end(), SleepLabel::Outlier);
            }
        }

        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            strength, "clustered sleep history"
        );

        Self {
            history: history.clone(),
            strength,
            labels,
        }
    }

    /// 1-cluster vs 2-cluster inertia ratio; 0 when clustering was skipped.
    pub fn strength(&self) -> f64 {
        self.strength
    }

    /// Label of a record; unlabeled records report [`SleepLabel::Outlier`].
    pub fn label(&self, record: &SleepInterval) -> SleepLabel {
        self.labels
            .get(&record.end())
            .copied()
            .unwrap_or(SleepLabel::Outlier)
    }

    /// The sub-history carrying the given label. Unlabeled records
    /// (clustering skipped) are in no sub-history, including the outlier
    /// one.
    pub fn labeled(&self, label: SleepLabel) -> SleepHistory {
        SleepHistory::new(
            self.history
                .records()
                .filter(|r| self.labels.get(&r.end()) == Some(&label))
                .cloned(),
        )
    }
}

/// Outlier pre-pass before clustering: flag records extreme in duration or
/// in wake-up hour (signed circular distance from the mean wake-up hour).
fn find_outliers(records: &[SleepInterval]) -> CoreAndOutliers {
    let end_hours: Vec<f64> = records.iter().map(SleepInterval::end_hour_local).collect();
    let mean_end_hour = center(&end_hours, HOURS_PER_DAY);

    compound_quantile_outliers(
        records,
        OUTLIER_QUANTILE,
        OUTLIER_GAP_MULTIPLIER,
        &[
            &|r: &SleepInterval| r.duration_hours(),
            &|r: &SleepInterval| {
                signed_distance(r.end_hour_local(), mean_end_hour, HOURS_PER_DAY)
            },
        ],
    )
}

/// Mean squared point-to-centroid distance over all clusters.
fn mean_square_distance(clusters: &[Cluster], points: &[Vec<f64>]) -> f64 {
    let mut total = 0.0;
    let mut count = 0usize;
    for cluster in clusters {
        for &i in &cluster.members {
            let d = cyclic_euclidean_distance(&points[i], &cluster.centroid, &FEATURE_CYCLES);
            total += d * d;
            count += 1;
        }
    }
    total / count as f64
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
