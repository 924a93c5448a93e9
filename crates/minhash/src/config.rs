//! Configuration and error types for neardup MinHash signatures.
//!
//! This module defines the public configuration surface for the signature
//! layer. It is free of any I/O or environment-dependent behavior so that a
//! signature is a pure function of `(text, config)`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::HASH_RANGE;

/// Configuration for building [`crate::MinHash`] signatures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MinHashConfig {
    /// Number of permutations, which is also the signature length.
    ///
    /// The standard error of the Jaccard estimate shrinks with
    /// `1 / sqrt(num_perm)`.
    pub num_perm: usize,
    /// Seed of the permutation family.
    ///
    /// Signatures are only comparable when they share the same seed and the
    /// same `num_perm`.
    pub seed: u32,
    /// Compute the per-permutation minimum with rayon.
    pub use_parallel: bool,
}

impl MinHashConfig {
    /// Create a new configuration with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of permutations. Typical values: 64-256.
    pub fn with_num_perm(mut self, num_perm: usize) -> Self {
        self.num_perm = num_perm;
        self
    }

    /// Set the permutation seed.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable parallel updates.
    /// Only worth it for large `num_perm`; results are identical either way.
    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.num_perm == 0 {
            return Err(ConfigurationError::ZeroPermutations);
        }
        if self.num_perm as u64 > HASH_RANGE {
            return Err(ConfigurationError::NumPermOutOfRange {
                num_perm: self.num_perm,
            });
        }
        Ok(())
    }
}

impl Default for MinHashConfig {
    fn default() -> Self {
        Self {
            num_perm: 128,
            seed: 1,
            use_parallel: false,
        }
    }
}

/// Errors returned when signatures are built or compared with incompatible
/// parameters.
///
/// These are programming errors: the inputs are structurally wrong and
/// retrying cannot help.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("invalid config: num_perm={num_perm} exceeds the 2^32 hash range")]
    NumPermOutOfRange { num_perm: usize },

    #[error("invalid config: num_perm must be >= 1")]
    ZeroPermutations,

    #[error("cannot compare signatures with different seeds ({left} vs {right})")]
    SeedMismatch { left: u32, right: u32 },

    #[error("cannot compare signatures with different lengths ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },
}
