//! Cluster-quality evaluation: per-cluster and overall silhouette score.

use crate::error::Result;
use crate::utils::canonical_pair;
use crate::vector::{Metric, Vector};
use fnv::FnvHashMap;

fn cached_distance(
    cache: &mut FnvHashMap<(u32, u32), f64>,
    input: &[Vector],
    a: u32,
    b: u32,
    metric: Metric,
) -> Result<f64> {
    let key = canonical_pair(a, b);
    if let Some(&d) = cache.get(&key) {
        return Ok(d);
    }
    let d = metric.distance(&input[a as usize], &input[b as usize])?;
    cache.insert(key, d);
    Ok(d)
}

/// Computes `s(v) = (b(v) - a(v)) / max(a(v), b(v))` for every vector, grouped
/// per cluster, plus an overall average over every vector (not a per-cluster
/// weighted mean of the per-cluster averages, though the two are equal — see
/// DESIGN.md). Returns a vector of length `k+1`: per-cluster means at
/// `[0, k)`, overall at `[k]`.
///
/// `k == 1` is special-cased to `[0.0, 0.0]` by convention: there is no
/// neighbour cluster to compare against.
pub fn silhouette(
    clusters: &[Vec<u32>],
    centroids: &[Vector],
    input: &[Vector],
    metric: Metric,
) -> Result<Vec<f64>> {
    let k = centroids.len();
    if k <= 1 {
        return Ok(vec![0.0, 0.0]);
    }

    let mut neighbour = vec![0usize; k];
    for i in 0..k {
        let mut best_j = if i == 0 { 1 } else { 0 };
        let mut best_d = f64::INFINITY;
        for j in 0..k {
            if i == j {
                continue;
            }
            let d = metric.distance(&centroids[i], &centroids[j])?;
            if d < best_d {
                best_d = d;
                best_j = j;
            }
        }
        neighbour[i] = best_j;
    }

    let mut cache: FnvHashMap<(u32, u32), f64> = FnvHashMap::default();
    let mut per_cluster_mean = vec![0.0; k];
    let mut total_sum = 0.0;
    let mut total_n = 0usize;

    for i in 0..k {
        let members = &clusters[i];
        let neighbour_members = &clusters[neighbour[i]];
        let size = members.len();
        let mut cluster_sum = 0.0;
        for &vi in members {
            let a = if size <= 1 {
                0.0
            } else {
                let mut sum = 0.0;
                for &vj in members {
                    if vi == vj {
                        continue;
                    }
                    sum += cached_distance(&mut cache, input, vi, vj, metric)?;
                }
                sum / (size as f64 - 1.0)
            };
            let b = if neighbour_members.is_empty() {
                0.0
            } else {
                let mut sum = 0.0;
                for &vj in neighbour_members {
                    sum += cached_distance(&mut cache, input, vi, vj, metric)?;
                }
                sum / neighbour_members.len() as f64
            };
            let denom = a.max(b);
            let s = if denom == 0.0 { 0.0 } else { (b - a) / denom };
            cluster_sum += s;
            total_sum += s;
            total_n += 1;
        }
        per_cluster_mean[i] = if size == 0 { 0.0 } else { cluster_sum / size as f64 };
    }

    let overall = if total_n == 0 { 0.0 } else { total_sum / total_n as f64 };
    let mut out = per_cluster_mean;
    out.push(overall);
    Ok(out)
}

/// Derives the clustering partition (per-cluster arena index lists) from the
/// input's `cluster_index` slots.
pub fn partition(input: &[Vector], k: usize) -> Vec<Vec<u32>> {
    let mut clusters = vec![Vec::new(); k];
    for (idx, v) in input.iter().enumerate() {
        let ci = v.cluster_index();
        if ci >= 0 && (ci as usize) < k {
            clusters[ci as usize].push(idx as u32);
        }
    }
    clusters
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_k_equals_one_is_zero_by_convention() {
        let input = vec![Vector::new("a", vec![0.0, 0.0])];
        let centroids = vec![Vector::new("c0", vec![0.0, 0.0])];
        let clusters = vec![vec![0u32]];
        let result = silhouette(&clusters, &centroids, &input, Metric::Euclidean).unwrap();
        assert_eq!(result, vec![0.0, 0.0]);
    }

    #[test]
    fn test_scenario_two_clusters_approx_point_nine() {
        let input = vec![
            Vector::new("A", vec![0.0, 0.0]),
            Vector::new("B", vec![0.0, 1.0]),
            Vector::new("C", vec![10.0, 0.0]),
            Vector::new("D", vec![10.0, 1.0]),
        ];
        let centroids = vec![
            Vector::new("c0", vec![0.0, 0.5]),
            Vector::new("c1", vec![10.0, 0.5]),
        ];
        let clusters = vec![vec![0u32, 1], vec![2, 3]];
        let result = silhouette(&clusters, &centroids, &input, Metric::Euclidean).unwrap();
        assert!((result[0] - 0.9).abs() < 0.02);
        assert!((result[1] - 0.9).abs() < 0.02);
    }

    #[test]
    fn test_singleton_cluster_a_is_zero() {
        let input = vec![
            Vector::new("A", vec![0.0, 0.0]),
            Vector::new("B", vec![10.0, 0.0]),
            Vector::new("C", vec![20.0, 0.0]),
        ];
        let centroids = vec![
            Vector::new("c0", vec![0.0, 0.0]),
            Vector::new("c1", vec![10.0, 0.0]),
            Vector::new("c2", vec![20.0, 0.0]),
        ];
        let clusters = vec![vec![0u32], vec![1], vec![2]];
        let result = silhouette(&clusters, &centroids, &input, Metric::Euclidean).unwrap();
        // k = N: every point is its own centroid, a = 0, s = 1.
        assert!((result[0] - 1.0).abs() < 1e-9);
    }
}
