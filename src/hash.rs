//! The HashGenerator family: EuclideanH, EuclideanPhi, EuclideanF, CosineH, CosineG
//! and Hypercube, wrapped in a closed tagged-enum `Hasher` rather than dynamic
//! dispatch, since the variant set never grows (see DESIGN.md).

use crate::error::{Error, Result};
use crate::utils::modulo;
use crate::vector::Vector;
use ndarray::{aview1, Array1};
use ndarray_rand::rand_distr::{StandardNormal, Uniform};
use ndarray_rand::RandomExt;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::collections::HashMap;

/// `2^32 - 5`, the prime modulus EuclideanPhi reduces its amplified sum under.
const EUCLIDEAN_PHI_MODULUS: i64 = (1i64 << 32) - 5;

fn check_dim(expected: usize, v: &Vector) -> Result<()> {
    if v.dim() != expected {
        Err(Error::DimensionMismatch {
            expected,
            actual: v.dim(),
        })
    } else {
        Ok(())
    }
}

/// One normal-distributed projection `a` and uniform offset `t`; `h(v) = floor((a.v + t)/w)`.
/// No detailed sub-code of its own.
pub struct EuclideanH {
    a: Array1<f64>,
    t: f64,
    w: f64,
}

impl EuclideanH {
    pub fn new(dim: usize, w: f64, rng: &mut SmallRng) -> Self {
        let a: Array1<f64> = Array1::random_using(dim, StandardNormal, rng);
        let t: f64 = rng.sample(Uniform::new(0.0, w));
        EuclideanH { a, t, w }
    }

    pub fn hash(&self, v: &Vector) -> Result<i64> {
        check_dim(self.a.len(), v)?;
        let x = aview1(v.dims());
        let dot = self.a.dot(&x);
        Ok(((dot + self.t) / self.w).floor() as i64)
    }
}

/// k independent EuclideanH instances amplified by random coefficients `r_1..r_k`
/// drawn from `[0,100]`, combined under `mod(.., 2^32-5)`. Retains the per-call
/// detailed sub-code `(h_1,...,h_k)` keyed by vector id, used for bucket filtering.
pub struct EuclideanPhi {
    hs: Vec<EuclideanH>,
    rs: Vec<i64>,
    detailed: RefCell<HashMap<String, Vec<i64>>>,
}

impl EuclideanPhi {
    pub fn new(k: usize, dim: usize, w: f64, rng: &mut SmallRng) -> Self {
        let hs: Vec<EuclideanH> = (0..k).map(|_| EuclideanH::new(dim, w, rng)).collect();
        let rs: Vec<i64> = (0..k).map(|_| rng.gen_range(0, 101)).collect();
        EuclideanPhi {
            hs,
            rs,
            detailed: RefCell::new(HashMap::new()),
        }
    }

    pub fn generate(&self, v: &Vector) -> Result<i64> {
        let mut detailed = Vec::with_capacity(self.hs.len());
        let mut acc: i64 = 0;
        for (h, r) in self.hs.iter().zip(self.rs.iter()) {
            let hi = h.hash(v)?;
            detailed.push(hi);
            acc += modulo(hi * r, EUCLIDEAN_PHI_MODULUS);
        }
        let code = modulo(acc, EUCLIDEAN_PHI_MODULUS);
        self.detailed
            .borrow_mut()
            .insert(v.id().to_string(), detailed);
        Ok(code)
    }

    pub fn detailed_code(&self, id: &str) -> Option<Vec<i64>> {
        self.detailed.borrow().get(id).cloned()
    }

    pub fn k(&self) -> usize {
        self.hs.len()
    }
}

/// Wraps one EuclideanH and maps its integer output to a single bit via a random
/// but memoised assignment: the first time a raw hash value is seen, a divisor is
/// drawn uniformly from `{1,2}` and `mod(raw, divisor)` is stored and reused for
/// every later vector that happens to share that raw value.
pub struct EuclideanF {
    h: EuclideanH,
    memo: RefCell<HashMap<i64, i64>>,
    rng: RefCell<SmallRng>,
}

impl EuclideanF {
    pub fn new(dim: usize, w: f64, rng: &mut SmallRng) -> Self {
        let h = EuclideanH::new(dim, w, rng);
        let seed: u64 = rng.gen();
        EuclideanF {
            h,
            memo: RefCell::new(HashMap::new()),
            rng: RefCell::new(SmallRng::seed_from_u64(seed)),
        }
    }

    pub fn generate(&self, v: &Vector) -> Result<i64> {
        let raw = self.h.hash(v)?;
        if let Some(&bit) = self.memo.borrow().get(&raw) {
            return Ok(bit);
        }
        let divisor = self.rng.borrow_mut().gen_range(1, 3);
        let bit = modulo(raw, divisor);
        self.memo.borrow_mut().insert(raw, bit);
        Ok(bit)
    }
}

/// One normal-distributed `r`; `h(v) = 1` if `r.v >= 0`, else `0`.
pub struct CosineH {
    r: Array1<f64>,
}

impl CosineH {
    pub fn new(dim: usize, rng: &mut SmallRng) -> Self {
        let r: Array1<f64> = Array1::random_using(dim, StandardNormal, rng);
        CosineH { r }
    }

    pub fn generate(&self, v: &Vector) -> Result<i64> {
        check_dim(self.r.len(), v)?;
        let dot = self.r.dot(&aview1(v.dims()));
        Ok(if dot >= 0.0 { 1 } else { 0 })
    }
}

/// k independent CosineH instances, concatenated bit by bit into a k-bit integer.
pub struct CosineG {
    hs: Vec<CosineH>,
}

impl CosineG {
    pub fn new(k: usize, dim: usize, rng: &mut SmallRng) -> Self {
        let hs = (0..k).map(|_| CosineH::new(dim, rng)).collect();
        CosineG { hs }
    }

    pub fn generate(&self, v: &Vector) -> Result<i64> {
        let mut code: i64 = 0;
        for h in &self.hs {
            code = (code << 1) | h.generate(v)?;
        }
        Ok(code)
    }

    pub fn k(&self) -> usize {
        self.hs.len()
    }
}

/// One bit of a Hypercube code: EuclideanF under the Euclidean metric, CosineH
/// under Cosine.
enum CubeBit {
    EuclideanF(EuclideanF),
    CosineH(CosineH),
}

impl CubeBit {
    fn bit(&self, v: &Vector) -> Result<i64> {
        match self {
            CubeBit::EuclideanF(g) => g.generate(v),
            CubeBit::CosineH(g) => g.generate(v),
        }
    }
}

/// k sub-generators, each producing one bit, concatenated into a k-bit code.
/// The index built on this generator has exactly `2^k` buckets.
pub struct Hypercube {
    bits: Vec<CubeBit>,
}

impl Hypercube {
    pub fn new_euclidean(k: usize, dim: usize, w: f64, rng: &mut SmallRng) -> Self {
        let bits = (0..k)
            .map(|_| CubeBit::EuclideanF(EuclideanF::new(dim, w, rng)))
            .collect();
        Hypercube { bits }
    }

    pub fn new_cosine(k: usize, dim: usize, rng: &mut SmallRng) -> Self {
        let bits = (0..k).map(|_| CubeBit::CosineH(CosineH::new(dim, rng))).collect();
        Hypercube { bits }
    }

    pub fn generate(&self, v: &Vector) -> Result<i64> {
        let mut code: i64 = 0;
        for b in &self.bits {
            code = (code << 1) | b.bit(v)?;
        }
        Ok(code)
    }

    pub fn k(&self) -> usize {
        self.bits.len()
    }
}

/// Closed variant set of hash generators usable by a `BucketedIndex`.
pub enum Hasher {
    EuclideanPhi(EuclideanPhi),
    CosineG(CosineG),
    Hypercube(Hypercube),
}

impl Hasher {
    pub fn code(&self, v: &Vector) -> Result<i64> {
        match self {
            Hasher::EuclideanPhi(g) => g.generate(v),
            Hasher::CosineG(g) => g.generate(v),
            Hasher::Hypercube(g) => g.generate(v),
        }
    }

    /// Only EuclideanPhi retains a detailed sub-code; cube-style hashes have the
    /// code fully determine the bucket, so there is nothing to filter by.
    pub fn has_detailed(&self) -> bool {
        matches!(self, Hasher::EuclideanPhi(_))
    }

    pub fn detailed_code(&self, id: &str) -> Option<Vec<i64>> {
        match self {
            Hasher::EuclideanPhi(g) => g.detailed_code(id),
            _ => None,
        }
    }

    pub fn k(&self) -> usize {
        match self {
            Hasher::EuclideanPhi(g) => g.k(),
            Hasher::CosineG(g) => g.k(),
            Hasher::Hypercube(g) => g.k(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::create_rng;

    #[test]
    fn test_euclidean_h_close_vectors_collide() {
        let mut rng = create_rng(1);
        let h = EuclideanH::new(3, 4.0, &mut rng);
        let a = Vector::new("a", vec![1.0, 1.0, 1.0]);
        let b = Vector::new("b", vec![1.01, 1.0, 0.99]);
        let c = Vector::new("c", vec![500.0, -300.0, 40.0]);
        assert_eq!(h.hash(&a).unwrap(), h.hash(&b).unwrap());
        assert_ne!(h.hash(&a).unwrap(), h.hash(&c).unwrap());
    }

    #[test]
    fn test_cosine_g_bit_width() {
        let mut rng = create_rng(1);
        let g = CosineG::new(4, 3, &mut rng);
        let v = Vector::new("a", vec![1.0, 2.0, 3.0]);
        let code = g.generate(&v).unwrap();
        assert!((0..16).contains(&code));
    }

    #[test]
    fn test_euclidean_phi_detailed_code_recorded() {
        let mut rng = create_rng(7);
        let phi = EuclideanPhi::new(3, 2, 1.0, &mut rng);
        let v = Vector::new("a", vec![1.0, 2.0]);
        phi.generate(&v).unwrap();
        assert_eq!(phi.detailed_code("a").unwrap().len(), 3);
        assert!(phi.detailed_code("missing").is_none());
    }

    #[test]
    fn test_euclidean_f_memoises_bit_for_same_raw_hash() {
        let mut rng = create_rng(3);
        let f = EuclideanF::new(2, 10.0, &mut rng);
        let v = Vector::new("a", vec![1.0, 2.0]);
        let first = f.generate(&v).unwrap();
        let second = f.generate(&v).unwrap();
        assert_eq!(first, second);
        assert!(first == 0 || first == 1);
    }

    #[test]
    fn test_hasher_dispatch_has_detailed() {
        let mut rng = create_rng(1);
        let phi = Hasher::EuclideanPhi(EuclideanPhi::new(2, 2, 1.0, &mut rng));
        let cos = Hasher::CosineG(CosineG::new(2, 2, &mut rng));
        assert!(phi.has_detailed());
        assert!(!cos.has_detailed());
    }
}
