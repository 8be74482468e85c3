//! LSH Ensemble: L independently-seeded Bucketed Indexes over the same vector set.

use crate::error::Result;
use crate::hash::{CosineG, EuclideanPhi, Hasher};
use crate::table::BucketedIndex;
use crate::utils::create_rng;
use crate::vector::{Metric, Vector};
use fnv::FnvHashSet;
use rand::Rng;

pub struct LshEnsemble {
    tables: Vec<BucketedIndex>,
}

impl LshEnsemble {
    /// Builds `l` independent tables, each with a freshly seeded generator, and
    /// inserts every vector of `arena` into every table.
    pub fn build(
        arena: &[Vector],
        metric: Metric,
        l: usize,
        k_hash: usize,
        bucket_div: usize,
        euclidean_h_w: f64,
        seed: u64,
    ) -> Result<Self> {
        let dim = arena.first().map(|v| v.dim()).unwrap_or(0);
        let n = arena.len();
        let mut rng = create_rng(seed);
        let mut tables = Vec::with_capacity(l);
        for _ in 0..l {
            let table_seed: u64 = rng.gen();
            let mut table_rng = create_rng(table_seed.max(1));
            let (hasher, m) = match metric {
                Metric::Euclidean => {
                    let m = ((n as f64) / (bucket_div.max(1) as f64)).ceil() as usize;
                    (
                        Hasher::EuclideanPhi(EuclideanPhi::new(
                            k_hash,
                            dim,
                            euclidean_h_w,
                            &mut table_rng,
                        )),
                        m.max(1),
                    )
                }
                Metric::Cosine => {
                    let m = 1usize << k_hash;
                    (Hasher::CosineG(CosineG::new(k_hash, dim, &mut table_rng)), m)
                }
            };
            let mut index = BucketedIndex::new(hasher, m);
            for (i, v) in arena.iter().enumerate() {
                index.insert(i as u32, v)?;
            }
            tables.push(index);
        }
        Ok(LshEnsemble { tables })
    }

    pub fn num_tables(&self) -> usize {
        self.tables.len()
    }

    /// Union (as a set of distinct arena indices) of each table's *filtered*
    /// bucket for `q`. Returns an ordered sequence with no duplicate indices.
    pub fn combined_buckets(&self, q: &Vector, arena: &[Vector]) -> Result<Vec<u32>> {
        let mut seen: FnvHashSet<u32> = FnvHashSet::default();
        let mut out = Vec::new();
        for table in &self.tables {
            for idx in table.filtered_bucket_for(q, arena)? {
                if seen.insert(idx) {
                    out.push(idx);
                }
            }
        }
        Ok(out)
    }

    pub fn tables(&self) -> &[BucketedIndex] {
        &self.tables
    }
}
