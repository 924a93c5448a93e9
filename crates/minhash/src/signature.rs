//! The MinHash signature type.
//!
//! A [`MinHash`] holds one running minimum per permutation. Feeding text
//! folds every shingle into those minima, so several `update` calls describe
//! the union of everything seen so far.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::{ConfigurationError, MinHashConfig};
use crate::permutations::Permutations;
use crate::shingles::{base_hash, shingles};
use crate::MAX_HASH;

/// Fixed-length MinHash signature of a document's shingle set.
#[derive(Debug, Clone)]
pub struct MinHash {
    seed: u32,
    hashvalues: Vec<u32>,
    permutations: Permutations,
    use_parallel: bool,
}

impl MinHash {
    /// Create an empty signature with `num_perm` permutations drawn from `seed`.
    pub fn new(num_perm: usize, seed: u32) -> Result<Self, ConfigurationError> {
        Self::with_config(&MinHashConfig::new().with_num_perm(num_perm).with_seed(seed))
    }

    /// Create an empty signature from a configuration.
    pub fn with_config(cfg: &MinHashConfig) -> Result<Self, ConfigurationError> {
        cfg.validate()?;
        debug!(
            num_perm = cfg.num_perm,
            seed = cfg.seed,
            use_parallel = cfg.use_parallel,
            "minhash_init"
        );
        Ok(Self {
            seed: cfg.seed,
            hashvalues: vec![MAX_HASH as u32; cfg.num_perm],
            permutations: Permutations::new(cfg.num_perm, cfg.seed),
            use_parallel: cfg.use_parallel,
        })
    }

    /// Fold the character shingles of `text` into the signature.
    pub fn update(&mut self, text: &str) {
        self.update_shingles(shingles(text));
    }

    /// Fold pre-built shingles into the signature.
    ///
    /// Every shingle is hashed with [`base_hash`], pushed through each
    /// permutation, and the per-permutation minimum is kept.
    pub fn update_shingles<I, B>(&mut self, shingles: I)
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let hashes: Vec<u32> = shingles
            .into_iter()
            .map(|s| base_hash(s.as_ref()))
            .collect();
        if hashes.is_empty() {
            return;
        }

        if self.use_parallel {
            let (a, b) = self.permutations.coefficients();
            self.hashvalues
                .par_iter_mut()
                .zip(a.par_iter().zip(b.par_iter()))
                .for_each(|(slot, (&a, &b))| *slot = permuted_min(&hashes, a, b, *slot));
        } else {
            for (slot, (a, b)) in self.hashvalues.iter_mut().zip(self.permutations.iter()) {
                *slot = permuted_min(&hashes, a, b, *slot);
            }
        }
    }

    /// Estimated Jaccard similarity: the fraction of positions where both
    /// signatures hold the same value.
    pub fn jaccard(&self, other: &MinHash) -> Result<f64, ConfigurationError> {
        self.check_compatible(other)?;
        let matches = self
            .hashvalues
            .iter()
            .zip(other.hashvalues.iter())
            .filter(|(a, b)| a == b)
            .count();
        Ok(matches as f64 / self.hashvalues.len() as f64)
    }

    /// Union `other` into this signature (element-wise minimum).
    pub fn merge(&mut self, other: &MinHash) -> Result<(), ConfigurationError> {
        self.check_compatible(other)?;
        for (mine, &theirs) in self.hashvalues.iter_mut().zip(other.hashvalues.iter()) {
            *mine = (*mine).min(theirs);
        }
        Ok(())
    }

    /// True until at least one shingle has been folded in.
    pub fn is_empty(&self) -> bool {
        self.hashvalues.iter().all(|&v| u64::from(v) == MAX_HASH)
    }

    /// Reset every slot to `MAX_HASH`, keeping the permutation family.
    pub fn clear(&mut self) {
        self.hashvalues.fill(MAX_HASH as u32);
    }

    pub fn hashvalues(&self) -> &[u32] {
        &self.hashvalues
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn num_perm(&self) -> usize {
        self.hashvalues.len()
    }

    pub fn permutations(&self) -> &Permutations {
        &self.permutations
    }

    fn check_compatible(&self, other: &MinHash) -> Result<(), ConfigurationError> {
        if self.seed != other.seed {
            warn!(left = self.seed, right = other.seed, "minhash_seed_mismatch");
            return Err(ConfigurationError::SeedMismatch {
                left: self.seed,
                right: other.seed,
            });
        }
        if self.hashvalues.len() != other.hashvalues.len() {
            warn!(
                left = self.hashvalues.len(),
                right = other.hashvalues.len(),
                "minhash_length_mismatch"
            );
            return Err(ConfigurationError::LengthMismatch {
                left: self.hashvalues.len(),
                right: other.hashvalues.len(),
            });
        }
        Ok(())
    }
}

impl PartialEq for MinHash {
    fn eq(&self, other: &Self) -> bool {
        self.seed == other.seed && self.hashvalues == other.hashvalues
    }
}

impl Eq for MinHash {}

impl AsRef<[u32]> for MinHash {
    fn as_ref(&self) -> &[u32] {
        &self.hashvalues
    }
}

#[inline]
fn permuted_min(hashes: &[u32], a: u64, b: u64, current: u32) -> u32 {
    hashes
        .iter()
        .map(|&hv| Permutations::apply(a, b, hv))
        .fold(current, u32::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature(text: &str) -> MinHash {
        let mut m = MinHash::new(128, 1).unwrap();
        m.update(text);
        m
    }

    #[test]
    fn new_signature_is_all_max() {
        let m = MinHash::new(16, 1).unwrap();
        assert_eq!(m.num_perm(), 16);
        assert!(m.hashvalues().iter().all(|&v| v == u32::MAX));
        assert!(m.is_empty());
    }

    #[test]
    fn new_rejects_zero_permutations() {
        assert_eq!(
            MinHash::new(0, 1).unwrap_err(),
            ConfigurationError::ZeroPermutations
        );
    }

    #[test]
    fn update_matches_reference_values() {
        let m = signature("there is an apple");
        assert_eq!(
            &m.hashvalues()[..4],
            &[1_831_284, 919_640_578, 125_093_396, 41_432_116]
        );
    }

    #[test]
    fn reference_jaccard_values() {
        let apple = signature("there is an apple");
        let apples = signature("there are apples");
        let challenger = signature("here comes the challenger");

        assert_eq!(apple.jaccard(&apples).unwrap(), 46.0 / 128.0);
        assert_eq!(apple.jaccard(&challenger).unwrap(), 8.0 / 128.0);
    }

    #[test]
    fn self_similarity_is_one() {
        let m = signature("the quick brown fox");
        assert_eq!(m.jaccard(&m).unwrap(), 1.0);
    }

    #[test]
    fn update_is_idempotent_for_same_text() {
        let once = signature("repeat me please");
        let mut twice = signature("repeat me please");
        twice.update("repeat me please");
        assert_eq!(once, twice);
    }

    #[test]
    fn update_accumulates_running_minimum() {
        let a = signature("first document text");
        let b = signature("something else entirely");
        let mut both = signature("first document text");
        both.update("something else entirely");

        for i in 0..both.num_perm() {
            assert!(both.hashvalues()[i] <= a.hashvalues()[i]);
            assert!(both.hashvalues()[i] <= b.hashvalues()[i]);
            assert_eq!(
                both.hashvalues()[i],
                a.hashvalues()[i].min(b.hashvalues()[i])
            );
        }
    }

    #[test]
    fn short_text_leaves_signature_untouched() {
        let mut m = MinHash::new(32, 1).unwrap();
        m.update("hi");
        m.update("");
        assert!(m.is_empty());
    }

    #[test]
    fn parallel_equals_sequential() {
        let text = "parallel and sequential updates must agree bit for bit";
        let mut seq = MinHash::with_config(&MinHashConfig::new().with_num_perm(256)).unwrap();
        let mut par = MinHash::with_config(
            &MinHashConfig::new()
                .with_num_perm(256)
                .with_parallel(true),
        )
        .unwrap();
        seq.update(text);
        par.update(text);
        assert_eq!(seq.hashvalues(), par.hashvalues());
    }

    #[test]
    fn update_shingles_matches_update() {
        let mut from_text = MinHash::new(64, 5).unwrap();
        from_text.update("Apple");
        let mut from_shingles = MinHash::new(64, 5).unwrap();
        from_shingles.update_shingles([b"a_p_p", b"p_p_l", b"p_l_e"]);
        assert_eq!(from_text, from_shingles);
    }

    #[test]
    fn jaccard_rejects_seed_mismatch() {
        let a = MinHash::new(64, 1).unwrap();
        let b = MinHash::new(64, 2).unwrap();
        assert_eq!(
            a.jaccard(&b),
            Err(ConfigurationError::SeedMismatch { left: 1, right: 2 })
        );
    }

    #[test]
    fn jaccard_rejects_length_mismatch() {
        let a = MinHash::new(64, 1).unwrap();
        let b = MinHash::new(128, 1).unwrap();
        assert_eq!(
            a.jaccard(&b),
            Err(ConfigurationError::LengthMismatch {
                left: 64,
                right: 128
            })
        );
    }

    #[test]
    fn jaccard_stays_in_unit_range() {
        let texts = ["alpha beta", "gamma delta", "alpha gamma", "zzz"];
        for x in texts {
            for y in texts {
                let j = signature(x).jaccard(&signature(y)).unwrap();
                assert!((0.0..=1.0).contains(&j), "{x} vs {y} gave {j}");
            }
        }
    }

    #[test]
    fn merge_equals_sequential_updates() {
        let mut merged = signature("left half");
        merged.merge(&signature("right half")).unwrap();

        let mut updated = signature("left half");
        updated.update("right half");

        assert_eq!(merged, updated);
    }

    #[test]
    fn merge_failure_does_not_mutate() {
        let mut a = signature("keep me");
        let before = a.clone();
        let b = MinHash::new(128, 99).unwrap();
        assert!(a.merge(&b).is_err());
        assert_eq!(a, before);
    }

    #[test]
    fn clear_resets_values_but_keeps_family() {
        let mut m = signature("some text here");
        let perms = m.permutations().clone();
        m.clear();
        assert!(m.is_empty());
        assert_eq!(m.permutations(), &perms);
    }

    #[test]
    fn same_seed_same_signature() {
        assert_eq!(signature("determinism"), signature("determinism"));
        assert_eq!(
            MinHash::new(32, 8).unwrap().permutations(),
            MinHash::new(32, 8).unwrap().permutations()
        );
    }
}
