use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Builds a deterministic RNG from a seed, or a non-deterministic one when `seed == 0`.
/// Mirrors the teacher library's `create_rng`: callers that need reproducible runs are
/// expected to pass a non-zero seed explicitly.
pub fn create_rng(seed: u64) -> SmallRng {
    if seed == 0 {
        SmallRng::from_entropy()
    } else {
        SmallRng::seed_from_u64(seed)
    }
}

/// Mathematical modulus, always in `[0, n)`, unlike Rust's `%` which keeps the sign
/// of the dividend.
pub fn modulo(x: i64, n: i64) -> i64 {
    ((x % n) + n) % n
}

/// Canonical (unordered) key for a pair of arena indices, smaller index first, so a
/// symmetric distance cache never double-stores `(a,b)` and `(b,a)`.
pub fn canonical_pair(a: u32, b: u32) -> (u32, u32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_modulo_negative() {
        assert_eq!(modulo(-1, 5), 4);
        assert_eq!(modulo(7, 5), 2);
        assert_eq!(modulo(-7, 5), 3);
    }

    #[test]
    fn test_canonical_pair() {
        assert_eq!(canonical_pair(3, 1), (1, 3));
        assert_eq!(canonical_pair(1, 3), (1, 3));
    }

    #[test]
    fn test_create_rng_reproducible() {
        use rand::Rng;
        let mut a = create_rng(42);
        let mut b = create_rng(42);
        let x: u32 = a.gen();
        let y: u32 = b.gen();
        assert_eq!(x, y);
    }
}
