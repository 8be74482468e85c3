//! Hypercube Index: a single Bucketed Index over a k-bit projection code, with
//! Hamming-neighbour probing around a query's home bucket.

use crate::error::Result;
use crate::hash::{Hasher, Hypercube};
use crate::table::BucketedIndex;
use crate::utils::create_rng;
use crate::vector::{Metric, Vector};

/// Enumerates, in descending-bit order, every code reachable from `code` by
/// flipping exactly `dist` of the bits at position `<= max_bit`. Recursive
/// bit-flip-via-XOR port of the reference implementation's combinatorial walk.
fn hamming_neighbours(code: i64, dist: usize, max_bit: i64, bits: usize) -> Vec<i64> {
    let _ = bits;
    if dist == 0 {
        return vec![code];
    }
    let mut out = Vec::new();
    let mut b = max_bit;
    while b >= 0 {
        let flipped = code ^ (1 << b);
        out.extend(hamming_neighbours(flipped, dist - 1, b - 1, bits));
        b -= 1;
    }
    out
}

pub struct HypercubeIndex {
    index: BucketedIndex,
    k: usize,
}

impl HypercubeIndex {
    pub fn build(arena: &[Vector], metric: Metric, k: usize, euclidean_h_w: f64, seed: u64) -> Result<Self> {
        let dim = arena.first().map(|v| v.dim()).unwrap_or(0);
        let mut rng = create_rng(seed);
        let hasher = match metric {
            Metric::Euclidean => {
                Hasher::Hypercube(Hypercube::new_euclidean(k, dim, euclidean_h_w, &mut rng))
            }
            Metric::Cosine => Hasher::Hypercube(Hypercube::new_cosine(k, dim, &mut rng)),
        };
        let m = 1usize << k;
        let mut index = BucketedIndex::new(hasher, m);
        for (i, v) in arena.iter().enumerate() {
            index.insert(i as u32, v)?;
        }
        Ok(HypercubeIndex { index, k })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Home bucket unconditionally, then Hamming-distance-ordered neighbour
    /// buckets consuming one unit of `probes` each. Duplicates across probes are
    /// not deduplicated here (see DESIGN.md).
    pub fn combined_buckets(&self, q: &Vector, probes: usize) -> Result<Vec<u32>> {
        let home = self.index.hash_of(q)? as i64;
        let mut out: Vec<u32> = self.index.bucket_at(home as usize).iter().copied().collect();
        let mut remaining = probes;
        let mut dist = 1usize;
        while remaining > 0 && dist <= self.k {
            let neighbours = hamming_neighbours(home, dist, self.k as i64 - 1, self.k);
            if neighbours.is_empty() {
                break;
            }
            for code in neighbours {
                if remaining == 0 {
                    break;
                }
                out.extend(self.index.bucket_at(code as usize).iter().copied());
                remaining -= 1;
            }
            dist += 1;
        }
        Ok(out)
    }
}
