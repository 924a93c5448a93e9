//! Workspace umbrella crate for neardup.
//!
//! This crate stitches the MinHash signature stage and the banded LSH index
//! together so callers can insert and query raw text through one API.
//!
//! ```
//! use neardup::{NearDuplicateIndex, NeardupConfig};
//!
//! let mut index = NearDuplicateIndex::new(&NeardupConfig::default()).unwrap();
//! index.insert_text("a", "the quick brown fox jumps over the lazy dog").unwrap();
//! index.insert_text("b", "an entirely unrelated sentence").unwrap();
//!
//! let hits = index.query_text("the quick brown fox jumps over the lazy dog").unwrap();
//! assert!(hits.contains("a"));
//! ```

pub mod config;

pub use crate::config::{ConfigLoadError, IndexYamlConfig, MinHashYamlConfig, NeardupConfig};
pub use index::{
    BandFingerprint, ConfigurationError as IndexConfigError, IndexConfig, LshIndex,
    band_fingerprint,
};
pub use minhash::{
    ConfigurationError as MinHashConfigError, HASH_RANGE, MAX_HASH, MERSENNE_PRIME, MinHash,
    MinHashConfig, Permutations, SHINGLE_SIZE, base_hash, shingles,
};

use std::collections::HashSet;
use std::error::Error;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{Level, info, warn};

/// Errors that can occur while moving text through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    MinHash(MinHashConfigError),
    Index(IndexConfigError),
    /// The signature stage and the index disagree on `num_perm`.
    ShapeMismatch { minhash: usize, index: usize },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::MinHash(err) => write!(f, "signature failure: {err}"),
            PipelineError::Index(err) => write!(f, "index failure: {err}"),
            PipelineError::ShapeMismatch { minhash, index } => write!(
                f,
                "shape mismatch: minhash num_perm={minhash}, index num_perm={index}"
            ),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::MinHash(err) => Some(err),
            PipelineError::Index(err) => Some(err),
            PipelineError::ShapeMismatch { .. } => None,
        }
    }
}

impl From<MinHashConfigError> for PipelineError {
    fn from(value: MinHashConfigError) -> Self {
        PipelineError::MinHash(value)
    }
}

impl From<IndexConfigError> for PipelineError {
    fn from(value: IndexConfigError) -> Self {
        PipelineError::Index(value)
    }
}

/// Metrics observer for pipeline stages.
pub trait PipelineMetrics: Send + Sync {
    fn record_signature(&self, latency: Duration, result: Result<(), MinHashConfigError>);
    fn record_insert(&self, latency: Duration, result: Result<(), PipelineError>);
    fn record_query(&self, latency: Duration, result: Result<usize, PipelineError>);
}

/// Install or clear the global pipeline metrics recorder.
pub fn set_pipeline_metrics(recorder: Option<Arc<dyn PipelineMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn PipelineMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn PipelineMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

fn metrics_recorder() -> Option<Arc<dyn PipelineMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

struct MetricsSpan {
    recorder: Arc<dyn PipelineMetrics>,
    start: Instant,
}

impl MetricsSpan {
    fn start() -> Option<Self> {
        metrics_recorder().map(|recorder| Self {
            recorder,
            start: Instant::now(),
        })
    }

    fn record_signature(self, result: Result<(), MinHashConfigError>) {
        self.recorder.record_signature(self.start.elapsed(), result);
    }

    fn record_insert(self, result: Result<(), PipelineError>) {
        self.recorder.record_insert(self.start.elapsed(), result);
    }

    fn record_query(self, result: Result<usize, PipelineError>) {
        self.recorder.record_query(self.start.elapsed(), result);
    }
}

/// Build the signature of a single text.
pub fn signature_for_text(text: &str, cfg: &MinHashConfig) -> Result<MinHash, PipelineError> {
    let span = MetricsSpan::start();
    let result = MinHash::with_config(cfg).map(|mut sig| {
        sig.update(text);
        sig
    });
    if let Some(span) = span {
        span.record_signature(result.as_ref().map(|_| ()).map_err(Clone::clone));
    }
    result.map_err(PipelineError::from)
}

/// MinHash signatures and a banded LSH index behind one text-level API.
///
/// Signatures are built with the owned [`MinHashConfig`]; the index is
/// shaped with the same `num_perm`, so every signature this type produces
/// fits the index.
#[derive(Debug, Clone)]
pub struct NearDuplicateIndex {
    minhash: MinHashConfig,
    index: LshIndex,
}

impl NearDuplicateIndex {
    pub fn new(cfg: &NeardupConfig) -> Result<Self, PipelineError> {
        Self::with_configs(cfg.minhash_config(), cfg.index_config())
    }

    /// Build from stage configs. `index_cfg.num_perm` must equal
    /// `minhash_cfg.num_perm`.
    pub fn with_configs(
        minhash_cfg: MinHashConfig,
        index_cfg: IndexConfig,
    ) -> Result<Self, PipelineError> {
        minhash_cfg.validate()?;
        if index_cfg.num_perm != minhash_cfg.num_perm {
            return Err(PipelineError::ShapeMismatch {
                minhash: minhash_cfg.num_perm,
                index: index_cfg.num_perm,
            });
        }
        Ok(Self {
            minhash: minhash_cfg,
            index: LshIndex::new(index_cfg)?,
        })
    }

    /// Signature of `text` under this index's configuration.
    pub fn signature(&self, text: &str) -> Result<MinHash, PipelineError> {
        signature_for_text(text, &self.minhash)
    }

    pub fn insert_text(
        &mut self,
        key: impl Into<String>,
        text: &str,
    ) -> Result<(), PipelineError> {
        let sig = self.signature(text)?;
        self.insert_signature(key, &sig)
    }

    /// Insert a pre-built signature.
    pub fn insert_signature(
        &mut self,
        key: impl Into<String>,
        sig: &MinHash,
    ) -> Result<(), PipelineError> {
        let span = MetricsSpan::start();
        let result = self
            .check_seed(sig)
            .and_then(|()| self.index.insert(key, sig).map_err(PipelineError::from));
        if let Some(span) = span {
            span.record_insert(result.clone());
        }
        result
    }

    /// Insert many documents. Signatures are built up front (in parallel
    /// when `use_parallel` is set) and inserted afterwards, so a failure
    /// leaves the index untouched.
    pub fn insert_batch<K, T>(&mut self, docs: &[(K, T)]) -> Result<(), PipelineError>
    where
        K: AsRef<str> + Sync,
        T: AsRef<str> + Sync,
    {
        let start = Instant::now();
        let span = tracing::span!(
            Level::INFO,
            "neardup.insert_batch",
            docs = docs.len(),
            use_parallel = self.minhash.use_parallel
        );
        let _guard = span.enter();

        let signatures: Result<Vec<MinHash>, PipelineError> = if self.minhash.use_parallel {
            docs.par_iter()
                .map(|(_, text)| self.signature(text.as_ref()))
                .collect()
        } else {
            docs.iter()
                .map(|(_, text)| self.signature(text.as_ref()))
                .collect()
        };
        let signatures = match signatures {
            Ok(signatures) => signatures,
            Err(err) => {
                warn!(error = %err, "insert_batch_failure");
                return Err(err);
            }
        };

        for ((key, _), sig) in docs.iter().zip(signatures.iter()) {
            self.insert_signature(key.as_ref(), sig)?;
        }

        info!(
            docs = docs.len(),
            keys = self.index.len(),
            elapsed_micros = start.elapsed().as_micros() as u64,
            "insert_batch_success"
        );
        Ok(())
    }

    /// Candidate keys for `text`. Unranked; re-score with
    /// [`MinHash::jaccard`] when a threshold is needed.
    pub fn query_text(&self, text: &str) -> Result<HashSet<String>, PipelineError> {
        let sig = self.signature(text)?;
        self.query_signature(&sig)
    }

    pub fn query_signature(&self, sig: &MinHash) -> Result<HashSet<String>, PipelineError> {
        let span = MetricsSpan::start();
        let result = self
            .check_seed(sig)
            .and_then(|()| self.index.query(sig).map_err(PipelineError::from));
        if let Some(span) = span {
            span.record_query(result.as_ref().map(HashSet::len).map_err(Clone::clone));
        }
        result
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn minhash_config(&self) -> &MinHashConfig {
        &self.minhash
    }

    pub fn index(&self) -> &LshIndex {
        &self.index
    }

    fn check_seed(&self, sig: &MinHash) -> Result<(), PipelineError> {
        if sig.seed() != self.minhash.seed {
            return Err(MinHashConfigError::SeedMismatch {
                left: self.minhash.seed,
                right: sig.seed(),
            }
            .into());
        }
        Ok(())
    }
}
