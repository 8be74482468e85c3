use crate::error::{Error, Result};
use ndarray::aview1;

/// Distance metric selected for a whole clustering run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Euclidean,
    Cosine,
}

impl Metric {
    pub fn distance(&self, a: &Vector, b: &Vector) -> Result<f64> {
        match self {
            Metric::Euclidean => a.euclidean_distance(b),
            Metric::Cosine => a.cosine_distance(b),
        }
    }
}

/// A point in the dataset, or a synthetic/medoid centroid derived from one.
///
/// `id` never changes after construction. `cluster_index == -1` iff
/// `dist_from_centroid == 0.0`, the "unassigned" convention.
#[derive(Debug, Clone)]
pub struct Vector {
    id: String,
    dims: Vec<f64>,
    cluster_index: i32,
    dist_from_centroid: f64,
    /// Coordinate indices this vector has no observation for (recommendation collaborator only).
    unknown_indexes: Vec<usize>,
    /// Mean of the *known* coordinates (recommendation collaborator only).
    known_mean: f64,
}

impl Vector {
    pub fn new(id: impl Into<String>, dims: Vec<f64>) -> Self {
        Vector {
            id: id.into(),
            dims,
            cluster_index: -1,
            dist_from_centroid: 0.0,
            unknown_indexes: Vec::new(),
            known_mean: 0.0,
        }
    }

    pub fn with_unknowns(
        id: impl Into<String>,
        dims: Vec<f64>,
        unknown_indexes: Vec<usize>,
        known_mean: f64,
    ) -> Self {
        Vector {
            id: id.into(),
            dims,
            cluster_index: -1,
            dist_from_centroid: 0.0,
            unknown_indexes,
            known_mean,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn dims(&self) -> &[f64] {
        &self.dims
    }

    pub fn dim(&self) -> usize {
        self.dims.len()
    }

    pub fn cluster_index(&self) -> i32 {
        self.cluster_index
    }

    pub fn is_assigned(&self) -> bool {
        self.cluster_index >= 0
    }

    pub fn dist_from_centroid(&self) -> f64 {
        self.dist_from_centroid
    }

    pub fn unknown_indexes(&self) -> &[usize] {
        &self.unknown_indexes
    }

    pub fn known_mean(&self) -> f64 {
        self.known_mean
    }

    pub fn assign(&mut self, cluster: usize, dist: f64) {
        self.cluster_index = cluster as i32;
        self.dist_from_centroid = dist;
    }

    pub fn unassign(&mut self) {
        self.cluster_index = -1;
        self.dist_from_centroid = 0.0;
    }

    fn check_dims(&self, other: &Vector) -> Result<()> {
        if self.dims.len() != other.dims.len() {
            Err(Error::DimensionMismatch {
                expected: self.dims.len(),
                actual: other.dims.len(),
            })
        } else {
            Ok(())
        }
    }

    /// Σ self[i]*other[i] + seed. Accumulated in `f64`, the widest coordinate type
    /// this crate carries (see DESIGN.md for why no wider accumulator is used).
    pub fn inner_product(&self, other: &Vector, seed: f64) -> Result<f64> {
        self.check_dims(other)?;
        let dot = aview1(&self.dims).dot(&aview1(&other.dims));
        Ok(dot + seed)
    }

    pub fn norm(&self) -> f64 {
        let x = aview1(&self.dims);
        x.dot(&x).sqrt()
    }

    pub fn euclidean_distance(&self, other: &Vector) -> Result<f64> {
        self.check_dims(other)?;
        let diff = &aview1(&self.dims) - &aview1(&other.dims);
        Ok(diff.dot(&diff).sqrt())
    }

    pub fn cosine_similarity(&self, other: &Vector) -> Result<f64> {
        self.check_dims(other)?;
        let na = self.norm();
        let nb = other.norm();
        if na == 0.0 || nb == 0.0 {
            return Err(Error::ZeroNorm);
        }
        let dot = self.inner_product(other, 0.0)?;
        Ok(dot / (na * nb))
    }

    pub fn cosine_distance(&self, other: &Vector) -> Result<f64> {
        Ok(1.0 - self.cosine_similarity(other)?)
    }

    /// Element-wise `self += other`. Used by k-means centroid accumulation.
    pub fn add_into(&mut self, other: &Vector) -> Result<()> {
        self.check_dims(other)?;
        for (a, b) in self.dims.iter_mut().zip(other.dims.iter()) {
            *a += b;
        }
        Ok(())
    }

    /// Element-wise `self /= d`, a no-op when `d == 0`.
    pub fn div_by(&mut self, d: f64) {
        if d == 0.0 {
            return;
        }
        for a in self.dims.iter_mut() {
            *a /= d;
        }
    }

    /// A zeroed vector of the given dimensionality and id, used to seed k-means
    /// centroid accumulation and as the centroid of an empty cluster.
    pub fn zero(id: impl Into<String>, dim: usize) -> Self {
        Vector::new(id, vec![0.0; dim])
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn v(id: &str, dims: &[f64]) -> Vector {
        Vector::new(id, dims.to_vec())
    }

    #[test]
    fn test_euclidean_distance() {
        let a = v("a", &[0.0, 0.0]);
        let b = v("b", &[3.0, 4.0]);
        assert_eq!(a.euclidean_distance(&b).unwrap(), 5.0);
    }

    #[test]
    fn test_cosine_opposite() {
        let a = v("a", &[1.0, 0.0]);
        let b = v("b", &[-1.0, 0.0]);
        assert!((a.cosine_distance(&b).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let a = v("a", &[1.0, 0.0]);
        let b = v("b", &[0.0, 1.0]);
        assert!((a.cosine_distance(&b).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_norm_errors() {
        let a = v("a", &[0.0, 0.0]);
        let b = v("b", &[1.0, 0.0]);
        assert!(matches!(a.cosine_distance(&b), Err(Error::ZeroNorm)));
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = v("a", &[1.0, 2.0]);
        let b = v("b", &[1.0, 2.0, 3.0]);
        assert!(matches!(
            a.euclidean_distance(&b),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_add_into_and_div_by() {
        let mut acc = Vector::zero("centroid", 2);
        acc.add_into(&v("a", &[1.0, 2.0])).unwrap();
        acc.add_into(&v("b", &[3.0, 4.0])).unwrap();
        acc.div_by(2.0);
        assert_eq!(acc.dims(), &[2.0, 3.0]);
    }

    #[test]
    fn test_div_by_zero_is_noop() {
        let mut acc = v("a", &[1.0, 2.0]);
        acc.div_by(0.0);
        assert_eq!(acc.dims(), &[1.0, 2.0]);
    }

    #[test]
    fn test_assign_unassign_convention() {
        let mut a = v("a", &[1.0]);
        assert_eq!(a.cluster_index(), -1);
        assert_eq!(a.dist_from_centroid(), 0.0);
        a.assign(2, 1.5);
        assert_eq!(a.cluster_index(), 2);
        assert_eq!(a.dist_from_centroid(), 1.5);
        a.unassign();
        assert_eq!(a.cluster_index(), -1);
        assert_eq!(a.dist_from_centroid(), 0.0);
    }
}
