//! Centroid initialization: uniform random selection, or k-means++.

use crate::error::{Error, Result};
use crate::vector::{Metric, Vector};
use fnv::FnvHashMap;
use rand::rngs::SmallRng;
use rand::Rng;

/// Draws `k` distinct indices uniformly from `[0, N)` without replacement
/// (rejection sampling, matching the reference source), returning clones of the
/// chosen input vectors as the initial centroid set.
pub fn random_uniform(arena: &[Vector], k: usize, rng: &mut SmallRng) -> Result<Vec<Vector>> {
    let n = arena.len();
    if n == 0 {
        return Err(Error::EmptyInput);
    }
    let mut chosen: Vec<usize> = Vec::with_capacity(k);
    while chosen.len() < k {
        let candidate = rng.gen_range(0, n);
        if !chosen.contains(&candidate) {
            chosen.push(candidate);
        }
    }
    Ok(chosen.into_iter().map(|i| arena[i].clone()).collect())
}

/// k-means++ seeding: each subsequent centroid is drawn with probability
/// proportional to the squared distance to its nearest already-chosen centroid.
/// A `(vector index, centroid index)`-keyed cache avoids recomputing distances
/// across the outer loop.
pub fn kmeans_pp(
    arena: &[Vector],
    k: usize,
    metric: Metric,
    rng: &mut SmallRng,
) -> Result<Vec<Vector>> {
    let n = arena.len();
    if n == 0 {
        return Err(Error::EmptyInput);
    }
    let mut centroids: Vec<Vector> = Vec::with_capacity(k);
    let first = rng.gen_range(0, n);
    centroids.push(arena[first].clone());

    let mut cache: FnvHashMap<(u32, usize), f64> = FnvHashMap::default();

    for _ in 1..k {
        let mut dist_sq: Vec<f64> = Vec::with_capacity(n);
        for (vi, v) in arena.iter().enumerate() {
            let mut min_d = f64::INFINITY;
            for (ci, c) in centroids.iter().enumerate() {
                let key = (vi as u32, ci);
                let d = match cache.get(&key) {
                    Some(&d) => d,
                    None => {
                        let d = metric.distance(v, c)?;
                        cache.insert(key, d);
                        d
                    }
                };
                if d < min_d {
                    min_d = d;
                }
            }
            dist_sq.push(min_d * min_d);
        }
        let max_d = dist_sq.iter().cloned().fold(0.0_f64, f64::max);
        let weights: Vec<f64> = if max_d > 0.0 {
            dist_sq.iter().map(|d| d / max_d).collect()
        } else {
            vec![0.0; n]
        };
        let mut cumulative = Vec::with_capacity(n);
        let mut running = 0.0;
        for w in &weights {
            running += w;
            cumulative.push(running);
        }
        let total = *cumulative.last().unwrap_or(&0.0);
        let chosen_index = if total <= 0.0 {
            rng.gen_range(0, n)
        } else {
            let r: f64 = rng.gen_range(0.0, total);
            if r <= cumulative[0] {
                0
            } else {
                match cumulative.binary_search_by(|probe| probe.partial_cmp(&r).unwrap()) {
                    Ok(i) => i,
                    Err(i) => i.min(n - 1),
                }
            }
        };
        centroids.push(arena[chosen_index].clone());
    }
    Ok(centroids)
}
