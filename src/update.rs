//! The two update strategies: k-means centroid averaging with a convergence
//! test, and PAM/k-medoids swap.

use crate::error::Result;
use crate::utils::canonical_pair;
use crate::vector::{Metric, Vector};
use fnv::FnvHashMap;

/// Synthetic centroid id used by k-means; distinguishes a mean-vector centroid
/// from a PAM medoid (which always carries an input vector's real id).
pub const KMEANS_CENTER_ID: &str = "k_means_center";

/// Recomputes each cluster's mean as a synthetic centroid, replaces the whole
/// centroid set if any cluster moved by more than `min_dist`, and reports
/// whether to continue iterating. A cluster with zero members yields the zero
/// vector rather than being treated as an error.
pub fn kmeans_update(
    input: &[Vector],
    centroids: &mut Vec<Vector>,
    metric: Metric,
    min_dist: f64,
) -> Result<bool> {
    let k = centroids.len();
    let dim = centroids.first().map(|c| c.dim()).unwrap_or(0);

    let mut sums: Vec<Vector> = (0..k)
        .map(|_| Vector::zero(KMEANS_CENTER_ID, dim))
        .collect();
    let mut counts = vec![0usize; k];

    for v in input {
        let ci = v.cluster_index();
        if ci < 0 {
            continue;
        }
        let ci = ci as usize;
        sums[ci].add_into(v)?;
        counts[ci] += 1;
    }
    for (sum, &count) in sums.iter_mut().zip(counts.iter()) {
        sum.div_by(count as f64);
    }

    for i in 0..k {
        let moved = metric.distance(&sums[i], &centroids[i])?;
        if moved > min_dist {
            *centroids = sums;
            return Ok(true);
        }
    }
    Ok(false)
}

/// For each cluster, swaps in the member minimising the sum of distances to
/// every other member of that cluster (the medoid), reusing a symmetric
/// pairwise-distance cache across the whole update call. Reports whether any
/// swap occurred.
pub fn pam_update(input: &[Vector], centroids: &mut [Vector], metric: Metric) -> Result<bool> {
    let k = centroids.len();
    let mut clusters: Vec<Vec<u32>> = vec![Vec::new(); k];
    for (idx, v) in input.iter().enumerate() {
        let ci = v.cluster_index();
        if ci >= 0 {
            clusters[ci as usize].push(idx as u32);
        }
    }

    let mut cache: FnvHashMap<(u32, u32), f64> = FnvHashMap::default();
    let mut any_swap = false;

    for (ci, members) in clusters.iter().enumerate() {
        if members.is_empty() {
            continue;
        }
        let mut best_idx = members[0];
        let mut best_sum = f64::INFINITY;
        for &m in members {
            let mut sum = 0.0;
            for &x in members {
                if m == x {
                    continue;
                }
                let key = canonical_pair(m, x);
                let d = match cache.get(&key) {
                    Some(&d) => d,
                    None => {
                        let d = metric.distance(&input[m as usize], &input[x as usize])?;
                        cache.insert(key, d);
                        d
                    }
                };
                sum += d;
            }
            if sum < best_sum {
                best_sum = sum;
                best_idx = m;
            }
        }
        let candidate = &input[best_idx as usize];
        if candidate.id() != centroids[ci].id() {
            centroids[ci] = candidate.clone();
            any_swap = true;
        }
    }
    Ok(any_swap)
}
