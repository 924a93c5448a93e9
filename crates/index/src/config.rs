//! Banding configuration and error types.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shape of a banded LSH index.
///
/// A signature of `num_perm` values is cut into `num_bands` contiguous bands
/// of `num_perm / num_bands` rows each. More bands raise recall and lower
/// precision; more rows per band do the opposite.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexConfig {
    /// Number of bands (`b`).
    pub num_bands: usize,
    /// Signature length every inserted or queried signature must have.
    pub num_perm: usize,
}

impl IndexConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_num_bands(mut self, num_bands: usize) -> Self {
        self.num_bands = num_bands;
        self
    }

    pub fn with_num_perm(mut self, num_perm: usize) -> Self {
        self.num_perm = num_perm;
        self
    }

    /// Validate the banding shape. `num_perm` must split evenly into bands;
    /// trailing signature values are never dropped silently.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.num_bands == 0 {
            return Err(ConfigurationError::ZeroBands);
        }
        if self.num_perm == 0 {
            return Err(ConfigurationError::ZeroPermutations);
        }
        if self.num_perm % self.num_bands != 0 {
            return Err(ConfigurationError::UnevenBands {
                num_perm: self.num_perm,
                num_bands: self.num_bands,
            });
        }
        Ok(())
    }

    /// Rows per band (`r`).
    pub fn rows_per_band(&self) -> usize {
        self.num_perm.checked_div(self.num_bands).unwrap_or(0)
    }

    /// Half-open signature ranges `[i*r, (i+1)*r)`, one per band.
    pub fn band_ranges(&self) -> Vec<Range<usize>> {
        let r = self.rows_per_band();
        (0..self.num_bands).map(|i| i * r..(i + 1) * r).collect()
    }

    /// Probability that two documents with Jaccard similarity `similarity`
    /// share at least one bucket: `1 - (1 - s^r)^b`.
    pub fn collision_probability(&self, similarity: f64) -> f64 {
        let s = similarity.clamp(0.0, 1.0);
        let band_match = s.powi(self.rows_per_band() as i32);
        1.0 - (1.0 - band_match).powi(self.num_bands as i32)
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            num_bands: 32,
            num_perm: 128,
        }
    }
}

/// Errors raised for an invalid banding shape or a signature that does not
/// fit it. Validation always happens before any table is touched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("invalid config: num_bands must be >= 1")]
    ZeroBands,

    #[error("invalid config: num_perm must be >= 1")]
    ZeroPermutations,

    #[error("invalid config: num_perm={num_perm} is not divisible into {num_bands} bands")]
    UnevenBands { num_perm: usize, num_bands: usize },

    #[error("signature has {actual} values, index expects {expected}")]
    SignatureLength { expected: usize, actual: usize },
}
