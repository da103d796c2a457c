//! A bitset that starts sparse (map-backed) and converts to a two-level
//! dense representation once cardinality crosses a threshold (`spec.md`
//! §4.6, component B): "Starts as sparse; when cardinality exceeds a
//! threshold ... converts to a two-level dense bitset: a high-word bitset
//! of which 64-wide blocks contain any set bits, plus a compacted dense
//! bitset over just those blocks." Conversion is driven by a
//! `prepare`/`allocate` protocol: callers declare every intended insertion
//! with [`AdaptiveBitSet::prepare`] during a staging phase, then call
//! [`AdaptiveBitSet::allocate`] once, after which the set is read-only.
//!
//! Used by the binary set-algebra engine (`spec.md` §4.3) to track
//! reachable `(left, right)` pairs over a Cartesian product id space that
//! can be enormous but is usually sparsely populated.
const BLOCK_BITS: u64 = 64;

use crate::storage::bitset::{Bitset, RankIndex};

enum Phase {
    Staging(Vec<u64>),
    Finalized(Representation),
}

enum Representation {
    Sparse(Vec<u64>),
    Dense {
        block_occupancy: Bitset,
        block_rank: RankIndex,
        /// one 64-bit word per populated block, indexed by `block_rank`
        compact: Vec<u64>,
    },
}

pub struct AdaptiveBitSet {
    universe_size: u64,
    threshold: usize,
    phase: Phase,
}

impl AdaptiveBitSet {
    pub fn new(universe_size: u64, threshold: usize) -> Self {
        AdaptiveBitSet {
            universe_size,
            threshold,
            phase: Phase::Staging(Vec::new()),
        }
    }

    /// Declares an intended insertion. Valid only before [`allocate`] is
    /// called.
    ///
    /// [`allocate`]: AdaptiveBitSet::allocate
    pub fn prepare(&mut self, i: u64) {
        assert!(i < self.universe_size, "index {i} out of universe");
        match &mut self.phase {
            Phase::Staging(buf) => buf.push(i),
            Phase::Finalized(_) => panic!("AdaptiveBitSet::prepare called after allocate()"),
        }
    }

    /// Finalizes the set, choosing sparse or dense representation based on
    /// how many *distinct* indices were prepared relative to the
    /// threshold. Idempotent: calling twice is a no-op after the first.
    pub fn allocate(&mut self) {
        let buf = match &mut self.phase {
            Phase::Staging(buf) => std::mem::take(buf),
            Phase::Finalized(_) => return,
        };
        let mut sorted = buf;
        sorted.sort_unstable();
        sorted.dedup();

        let representation = if sorted.len() < self.threshold {
            Representation::Sparse(sorted)
        } else {
            let block_count = self.universe_size.div_ceil(BLOCK_BITS) as usize;
            let mut block_occupancy = Bitset::new(block_count);
            for &i in &sorted {
                block_occupancy.add((i / BLOCK_BITS) as usize);
            }
            let block_rank = block_occupancy.rank_index();
            let populated_blocks = block_occupancy.count();
            let mut compact = vec![0u64; populated_blocks];
            for &i in &sorted {
                let block = (i / BLOCK_BITS) as usize;
                let compact_idx = block_rank.rank(block) as usize;
                compact[compact_idx] |= 1u64 << (i % BLOCK_BITS);
            }
            Representation::Dense {
                block_occupancy,
                block_rank,
                compact,
            }
        };
        self.phase = Phase::Finalized(representation);
    }

    fn finalized(&self) -> &Representation {
        match &self.phase {
            Phase::Finalized(r) => r,
            Phase::Staging(_) => panic!("AdaptiveBitSet read before allocate()"),
        }
    }

    pub fn check(&self, i: u64) -> bool {
        match self.finalized() {
            Representation::Sparse(v) => v.binary_search(&i).is_ok(),
            Representation::Dense {
                block_occupancy,
                block_rank,
                compact,
            } => {
                let block = (i / BLOCK_BITS) as usize;
                if !block_occupancy.check(block) {
                    return false;
                }
                let compact_idx = block_rank.rank(block) as usize;
                (compact[compact_idx] >> (i % BLOCK_BITS)) & 1 == 1
            }
        }
    }

    /// `rank(i)` = number of set elements strictly less than `i`.
    pub fn rank(&self, i: u64) -> u64 {
        match self.finalized() {
            Representation::Sparse(v) => v.partition_point(|&x| x < i) as u64,
            Representation::Dense {
                block_occupancy,
                block_rank,
                compact,
            } => {
                let block = (i / BLOCK_BITS) as usize;
                let bit_in_block = i % BLOCK_BITS;
                // `compact` is ordered by block rank, so the popcount of every
                // populated block strictly before `block` is just the prefix
                // sum over compact[..block_rank.rank(block)].
                let mut rank: u64 = compact[..block_rank.rank(block) as usize]
                    .iter()
                    .map(|w| w.count_ones() as u64)
                    .sum();
                if block_occupancy.check(block) {
                    let compact_idx = block_rank.rank(block) as usize;
                    let mask = if bit_in_block == 0 {
                        0
                    } else {
                        (1u64 << bit_in_block) - 1
                    };
                    rank += (compact[compact_idx] & mask).count_ones() as u64;
                }
                rank
            }
        }
    }

    pub fn count(&self) -> u64 {
        match self.finalized() {
            Representation::Sparse(v) => v.len() as u64,
            Representation::Dense { compact, .. } => {
                compact.iter().map(|w| w.count_ones() as u64).sum()
            }
        }
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = u64> + '_> {
        match self.finalized() {
            Representation::Sparse(v) => Box::new(v.iter().copied()),
            Representation::Dense {
                block_occupancy,
                block_rank,
                compact,
            } => Box::new(block_occupancy.iter().flat_map(move |block| {
                let compact_idx = block_rank.rank(block) as usize;
                let word = compact[compact_idx];
                let base = (block as u64) * BLOCK_BITS;
                BitsWords(word).map(move |bit| base + bit as u64)
            })),
        }
    }
}

struct BitsWords(u64);

impl Iterator for BitsWords {
    type Item = u32;
    fn next(&mut self) -> Option<u32> {
        if self.0 == 0 {
            return None;
        }
        let bit = self.0.trailing_zeros();
        self.0 &= self.0 - 1;
        Some(bit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(universe: u64, threshold: usize, items: &[u64]) -> AdaptiveBitSet {
        let mut b = AdaptiveBitSet::new(universe, threshold);
        for &i in items {
            b.prepare(i);
        }
        b.allocate();
        b
    }

    #[test]
    fn sparse_path_matches_naive() {
        let items = [3u64, 70, 1000, 3, 999999];
        let b = build(2_000_000, 1_000_000, &items);
        for i in 0..1_100_000u64 {
            let expect = items.contains(&i);
            assert_eq!(b.check(i), expect, "mismatch at {i}");
        }
    }

    #[test]
    fn dense_path_matches_naive() {
        let items: Vec<u64> = (0..5000).map(|i| i * 3).collect();
        let b = build(20000, 10, &items);
        for i in 0..20000u64 {
            let expect = items.contains(&i);
            assert_eq!(b.check(i), expect, "mismatch at {i}");
        }
    }

    #[test]
    fn rank_matches_naive() {
        let items: Vec<u64> = (0..500).map(|i| i * 5).collect();
        let b = build(3000, 10, &items);
        for i in 0..3000u64 {
            let naive = items.iter().filter(|&&x| x < i).count() as u64;
            assert_eq!(b.rank(i), naive, "mismatch at {i}");
        }
    }
}
