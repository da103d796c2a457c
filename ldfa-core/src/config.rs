//! Ambient configuration for a solving session (`SPEC_FULL.md` §10): where
//! temporary arrays and the content-addressed cache live, and the
//! thresholds that drive the out-of-core storage layer's sparse-to-dense
//! and in-memory-vs-spill decisions.
use std::path::{Path, PathBuf};

/// Cardinality at which an [`crate::storage::AdaptiveBitSet`] converts from
/// sparse (map-backed) to two-level dense (`spec.md` §4.6: "e.g. >= 2^20").
pub const DEFAULT_ADAPTIVE_THRESHOLD: usize = 1 << 20;

/// Byte size above which the spill-aware sort divides and recurses instead
/// of sorting in one parallel pass (`spec.md` §4.6: "e.g. 2^32 bytes").
pub const DEFAULT_SPILL_SORT_THRESHOLD_BYTES: u64 = 1 << 32;

#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Writable scratch directory for temporary memory-mapped arrays.
    pub scratch_dir: PathBuf,
    /// Content-addressed cache directory for persisted LDFAs.
    pub cache_dir: PathBuf,
    pub adaptive_threshold: usize,
    pub spill_sort_threshold_bytes: u64,
}

impl SolverConfig {
    pub fn new(scratch_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        SolverConfig {
            scratch_dir: scratch_dir.into(),
            cache_dir: cache_dir.into(),
            adaptive_threshold: DEFAULT_ADAPTIVE_THRESHOLD,
            spill_sort_threshold_bytes: DEFAULT_SPILL_SORT_THRESHOLD_BYTES,
        }
    }

    pub fn with_adaptive_threshold(mut self, n: usize) -> Self {
        self.adaptive_threshold = n;
        self
    }

    pub fn with_spill_sort_threshold_bytes(mut self, n: u64) -> Self {
        self.spill_sort_threshold_bytes = n;
        self
    }

    pub fn scratch_path(&self, name: &str) -> PathBuf {
        self.scratch_dir.join(name)
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_dir
    }
}
