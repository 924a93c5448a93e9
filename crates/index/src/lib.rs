//! # neardup Index
//!
//! A banded locality-sensitive hashing index over MinHash signatures.
//!
//! ## Core Features
//!
//! - **Banding**: every signature is cut into `num_bands` contiguous bands of
//!   `num_perm / num_bands` rows. Each band is fingerprinted (big-endian bytes)
//!   and the document key is filed under that fingerprint in the band's own
//!   bucket table.
//! - **Candidate retrieval**: a query unions the keys found in the matching
//!   bucket of every band. Documents with high Jaccard similarity collide in
//!   at least one band with high probability; see
//!   [`IndexConfig::collision_probability`].
//! - **Opaque signatures**: the index only needs `&[u32]` of the configured
//!   length, so anything implementing `AsRef<[u32]>` (including
//!   `minhash::MinHash`) can be inserted or queried.
//!
//! Candidates are neither ranked nor filtered. False positives and false
//! negatives are inherent to banding; callers re-score candidates with the
//! full signatures when they need a threshold.
//!
//! ## Example Usage
//!
//! ```
//! use index::{IndexConfig, LshIndex};
//!
//! let cfg = IndexConfig::new().with_num_bands(4).with_num_perm(8);
//! let mut index = LshIndex::new(cfg).unwrap();
//!
//! index.insert("doc-1", &[1u32, 2, 3, 4, 5, 6, 7, 8]).unwrap();
//! index.insert("doc-2", &[9u32; 8]).unwrap();
//!
//! let hits = index.query(&[1u32, 2, 0, 0, 0, 0, 0, 0]).unwrap();
//! assert!(hits.contains("doc-1"));
//! assert!(!hits.contains("doc-2"));
//! ```

mod band;
mod config;

use std::collections::HashSet as StdHashSet;
use std::ops::Range;

use hashbrown::{HashMap, HashSet};
use tracing::{debug, warn};

pub use crate::band::{band_fingerprint, BandFingerprint};
pub use crate::config::{ConfigurationError, IndexConfig};

type Bucket = HashSet<String>;

/// Banded LSH index mapping band fingerprints to document keys.
#[derive(Debug, Clone)]
pub struct LshIndex {
    cfg: IndexConfig,
    ranges: Vec<Range<usize>>,
    /// One bucket table per band.
    tables: Vec<HashMap<BandFingerprint, Bucket>>,
    /// Fingerprints each key produced across all bands.
    keys: HashMap<String, HashSet<BandFingerprint>>,
}

impl LshIndex {
    /// Build an empty index for the given banding shape.
    pub fn new(cfg: IndexConfig) -> Result<Self, ConfigurationError> {
        cfg.validate()?;
        debug!(
            num_bands = cfg.num_bands,
            num_perm = cfg.num_perm,
            rows_per_band = cfg.rows_per_band(),
            "lsh_index_init"
        );
        Ok(Self {
            ranges: cfg.band_ranges(),
            tables: (0..cfg.num_bands).map(|_| HashMap::new()).collect(),
            keys: HashMap::new(),
            cfg,
        })
    }

    /// File `key` under every band fingerprint of `signature`.
    ///
    /// The signature length is checked before any table is touched. Inserting
    /// the same key again with another signature adds it under the new
    /// fingerprints as well; nothing is overwritten.
    pub fn insert<S>(
        &mut self,
        key: impl Into<String>,
        signature: &S,
    ) -> Result<(), ConfigurationError>
    where
        S: AsRef<[u32]> + ?Sized,
    {
        let signature = signature.as_ref();
        self.check_len(signature)?;
        let key = key.into();

        let fingerprints: Vec<BandFingerprint> = self.fingerprints_for(signature).collect();
        debug!(key = %key, num_bands = fingerprints.len(), "lsh_insert");

        self.keys
            .entry(key.clone())
            .or_default()
            .extend(fingerprints.iter().cloned());
        for (table, fp) in self.tables.iter_mut().zip(fingerprints) {
            table.entry(fp).or_default().insert(key.clone());
        }
        Ok(())
    }

    /// Keys sharing at least one band bucket with `signature`.
    pub fn query<S>(&self, signature: &S) -> Result<StdHashSet<String>, ConfigurationError>
    where
        S: AsRef<[u32]> + ?Sized,
    {
        let signature = signature.as_ref();
        self.check_len(signature)?;

        let mut candidates = StdHashSet::new();
        for (table, fp) in self.tables.iter().zip(self.fingerprints_for(signature)) {
            if let Some(bucket) = table.get(&fp) {
                candidates.extend(bucket.iter().cloned());
            }
        }
        Ok(candidates)
    }

    /// Number of distinct keys inserted.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    /// Every fingerprint recorded for `key`, across all bands and inserts.
    pub fn fingerprints(&self, key: &str) -> Option<impl Iterator<Item = &BandFingerprint>> {
        self.keys.get(key).map(|fps| fps.iter())
    }

    pub fn config(&self) -> &IndexConfig {
        &self.cfg
    }

    pub fn num_bands(&self) -> usize {
        self.cfg.num_bands
    }

    pub fn rows_per_band(&self) -> usize {
        self.cfg.rows_per_band()
    }

    pub fn band_ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    fn fingerprints_for<'a>(
        &'a self,
        signature: &'a [u32],
    ) -> impl Iterator<Item = BandFingerprint> + 'a {
        self.ranges
            .iter()
            .map(move |range| band_fingerprint(&signature[range.clone()]))
    }

    fn check_len(&self, signature: &[u32]) -> Result<(), ConfigurationError> {
        if signature.len() != self.cfg.num_perm {
            warn!(
                expected = self.cfg.num_perm,
                actual = signature.len(),
                "lsh_signature_length_mismatch"
            );
            return Err(ConfigurationError::SignatureLength {
                expected: self.cfg.num_perm,
                actual: signature.len(),
            });
        }
        Ok(())
    }
}
