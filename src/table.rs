//! A single Bucketed Index: one hash generator plus `M` buckets of non-owning
//! (arena-index) references into the caller's vector arena.

use crate::error::Result;
use crate::hash::Hasher;
use crate::utils::modulo;
use crate::vector::Vector;
use fnv::FnvHashSet;

pub type Bucket = FnvHashSet<u32>;

pub struct BucketedIndex {
    hasher: Hasher,
    buckets: Vec<Bucket>,
}

impl BucketedIndex {
    pub fn new(hasher: Hasher, m: usize) -> Self {
        BucketedIndex {
            hasher,
            buckets: (0..m.max(1)).map(|_| FnvHashSet::default()).collect(),
        }
    }

    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// `mod(generator(q), M)`, always in `[0, M)`.
    pub fn hash_of(&self, q: &Vector) -> Result<usize> {
        let code = self.hasher.code(q)?;
        Ok(modulo(code, self.buckets.len() as i64) as usize)
    }

    pub fn insert(&mut self, idx: u32, v: &Vector) -> Result<()> {
        let pos = self.hash_of(v)?;
        self.buckets[pos].insert(idx);
        Ok(())
    }

    pub fn bucket_at(&self, index: usize) -> &Bucket {
        &self.buckets[index]
    }

    pub fn bucket_for(&self, q: &Vector) -> Result<&Bucket> {
        let pos = self.hash_of(q)?;
        Ok(&self.buckets[pos])
    }

    /// Raw bucket members filtered down to those whose detailed sub-code equals
    /// `q`'s, when the generator exposes one. Falls back to the raw bucket when
    /// the generator has no detailed code (or the query's code hasn't been
    /// recorded, which should not happen in normal use since `hash_of` always
    /// triggers recording as a side effect of computing the code).
    pub fn filtered_bucket_for(&self, q: &Vector, arena: &[Vector]) -> Result<Vec<u32>> {
        let pos = self.hash_of(q)?;
        let raw = &self.buckets[pos];
        if !self.hasher.has_detailed() {
            return Ok(raw.iter().copied().collect());
        }
        let q_detail = match self.hasher.detailed_code(q.id()) {
            Some(d) => d,
            None => return Ok(raw.iter().copied().collect()),
        };
        let mut out = Vec::new();
        for &idx in raw.iter() {
            let member = &arena[idx as usize];
            if self.hasher.detailed_code(member.id()).as_ref() == Some(&q_detail) {
                out.push(idx);
            }
        }
        Ok(out)
    }

    /// Bucket-length (avg, min, max), logged by the orchestrator for diagnostics.
    pub fn describe(&self) -> (f64, usize, usize) {
        let lens: Vec<usize> = self.buckets.iter().map(|b| b.len()).collect();
        let total: usize = lens.iter().sum();
        let avg = total as f64 / lens.len().max(1) as f64;
        let min = lens.iter().copied().min().unwrap_or(0);
        let max = lens.iter().copied().max().unwrap_or(0);
        (avg, min, max)
    }
}
