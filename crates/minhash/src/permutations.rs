//! Seeded permutation family for MinHash.
//!
//! Each permutation is a universal hash `h -> (a * h + b) mod PRIME`, where the
//! coefficients are drawn from MT19937 seeded with `init_genrand(seed)`. A
//! bounded draw pulls 64 bits (high word first), masks them down to the
//! smallest power-of-two range covering the interval and rejects values past
//! its end. That is exactly what numpy's legacy
//! `RandomState(seed).randint(low, high, dtype=uint64)` does, so a given
//! `(seed, num_perm)` yields the same coefficients as signatures produced by
//! that reference.

use rand_mt::Mt;

use crate::{MAX_HASH, MERSENNE_PRIME};

/// Immutable `(a, b)` coefficient pairs derived from a seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutations {
    a: Vec<u64>,
    b: Vec<u64>,
}

impl Permutations {
    /// Draw `num_perm` coefficient pairs. The generator is seeded once and
    /// pairs are drawn in order `a_0, b_0, a_1, b_1, ...`.
    pub fn new(num_perm: usize, seed: u32) -> Self {
        let mut rng = Mt::new(seed);
        let mut a = Vec::with_capacity(num_perm);
        let mut b = Vec::with_capacity(num_perm);
        for _ in 0..num_perm {
            a.push(bounded_u64(&mut rng, 1, MERSENNE_PRIME));
            b.push(bounded_u64(&mut rng, 0, MERSENNE_PRIME));
        }
        Self { a, b }
    }

    pub fn len(&self) -> usize {
        self.a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }

    /// Coefficient pair of permutation `i`.
    pub fn get(&self, i: usize) -> Option<(u64, u64)> {
        Some((*self.a.get(i)?, *self.b.get(i)?))
    }

    /// The `a` and `b` coefficient columns.
    pub fn coefficients(&self) -> (&[u64], &[u64]) {
        (&self.a, &self.b)
    }

    /// Iterate over all `(a, b)` pairs in permutation order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.a.iter().copied().zip(self.b.iter().copied())
    }

    /// Apply permutation `(a, b)` to a base hash.
    ///
    /// Multiplication and addition wrap at 64 bits before the prime
    /// reduction, matching uint64 array arithmetic in the reference.
    #[inline]
    pub fn apply(a: u64, b: u64, hv: u32) -> u32 {
        let permuted = a.wrapping_mul(u64::from(hv)).wrapping_add(b) % MERSENNE_PRIME;
        (permuted & MAX_HASH) as u32
    }
}

/// Uniform draw from `[low, high)` using masked rejection sampling.
fn bounded_u64(rng: &mut Mt, low: u64, high: u64) -> u64 {
    let range = high - 1 - low;
    let mask = fill_mask(range);
    loop {
        let hi = u64::from(rng.next_u32());
        let lo = u64::from(rng.next_u32());
        let val = ((hi << 32) | lo) & mask;
        if val <= range {
            return low + val;
        }
    }
}

/// Smallest `2^k - 1` that is `>= max`.
#[inline]
fn fill_mask(max: u64) -> u64 {
    let mut mask = max;
    mask |= mask >> 1;
    mask |= mask >> 2;
    mask |= mask >> 4;
    mask |= mask >> 8;
    mask |= mask >> 16;
    mask |= mask >> 32;
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mt19937_reference_outputs() {
        let mut rng = Mt::new(5489);
        assert_eq!(rng.next_u32(), 3_499_211_612);
        for _ in 1..9_999 {
            rng.next_u32();
        }
        assert_eq!(rng.next_u32(), 4_123_659_995);

        let mut rng = Mt::new(1);
        assert_eq!(rng.next_u32(), 1_791_095_845);
    }

    #[test]
    fn seed_one_matches_reference_coefficients() {
        let perms = Permutations::new(2, 1);
        assert_eq!(
            perms.get(0),
            Some((775_169_054_918_279_404, 1_758_426_461_858_698_312))
        );
        assert_eq!(
            perms.get(1),
            Some((2_109_959_069_025_162, 965_365_488_286_768_773))
        );
        assert_eq!(perms.get(2), None);
    }

    #[test]
    fn prefix_is_stable_across_lengths() {
        let short = Permutations::new(4, 9);
        let long = Permutations::new(16, 9);
        assert!(short.iter().eq(long.iter().take(4)));
    }

    #[test]
    fn same_seed_same_family() {
        assert_eq!(Permutations::new(64, 42), Permutations::new(64, 42));
        assert_ne!(Permutations::new(64, 42), Permutations::new(64, 43));
    }

    #[test]
    fn coefficients_stay_in_range() {
        let perms = Permutations::new(512, 3);
        assert_eq!(perms.len(), 512);
        for (a, b) in perms.iter() {
            assert!((1..MERSENNE_PRIME).contains(&a));
            assert!(b < MERSENNE_PRIME);
        }
    }

    #[test]
    fn fill_mask_covers_range() {
        assert_eq!(fill_mask(0), 0);
        assert_eq!(fill_mask(1), 1);
        assert_eq!(fill_mask(5), 7);
        assert_eq!(fill_mask(MERSENNE_PRIME - 2), MERSENNE_PRIME);
        assert_eq!(fill_mask(u64::MAX), u64::MAX);
    }

    #[test]
    fn apply_wraps_before_reduction() {
        let a = MERSENNE_PRIME - 1;
        let b = MERSENNE_PRIME - 1;
        let hv = u32::MAX;
        let expected = (a.wrapping_mul(u64::from(hv)).wrapping_add(b) % MERSENNE_PRIME)
            & MAX_HASH;
        assert_eq!(u64::from(Permutations::apply(a, b, hv)), expected);
        assert_eq!(Permutations::apply(1, 0, 7), 7);
    }
}
