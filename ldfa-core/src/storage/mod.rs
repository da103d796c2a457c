//! Out-of-core storage layer (`spec.md` §4.6, components A/B/C): the
//! memory-mapped array, the three bitset representations, external merge,
//! and the spill-aware sort that let the rest of the crate scale past RAM.
pub mod adaptive_bitset;
pub mod bitset;
pub mod merge;
pub mod mmap_array;
pub mod sort;
pub mod sparse_bitset;

pub use adaptive_bitset::AdaptiveBitSet;
pub use bitset::{Bitset, RankIndex};
pub use mmap_array::MmapArray;
pub use sparse_bitset::SparseBitset;
