//! External merge of sorted runs via a min-heap priority queue (`spec.md`
//! §4.6, component C), with optional adjacent-duplicate dropping.
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::error::Result;
use crate::storage::mmap_array::MmapArray;

/// Merges `n` sorted slices into one sorted `Vec`, optionally dropping
/// adjacent duplicates. This operates on in-memory slices; callers with
/// memory-mapped runs pass [`MmapArray::as_slice`] views.
pub fn merge_sorted<T: Ord + Copy>(runs: &[&[T]], dedup: bool) -> Vec<T> {
    let total: usize = runs.iter().map(|r| r.len()).sum();
    let mut out = Vec::with_capacity(total);
    let mut heap: BinaryHeap<Reverse<(T, usize, usize)>> = BinaryHeap::new();
    for (run_idx, run) in runs.iter().enumerate() {
        if !run.is_empty() {
            heap.push(Reverse((run[0], run_idx, 0)));
        }
    }
    while let Some(Reverse((value, run_idx, elem_idx))) = heap.pop() {
        let keep = !dedup || out.last().map_or(true, |&last| last != value);
        if keep {
            out.push(value);
        }
        let next_idx = elem_idx + 1;
        if next_idx < runs[run_idx].len() {
            heap.push(Reverse((runs[run_idx][next_idx], run_idx, next_idx)));
        }
    }
    out
}

/// Merges `n` sorted memory-mapped arrays into a freshly created,
/// memory-mapped output array sized as the sum of input sizes (or fewer if
/// `dedup`), truncated to the exact result size at the end.
pub fn merge_sorted_mmap(
    runs: &[MmapArray<u32>],
    output_path: &std::path::Path,
    dedup: bool,
) -> Result<MmapArray<u32>> {
    let slices: Vec<&[u32]> = runs.iter().map(|r| r.as_slice()).collect();
    let merged = merge_sorted(&slices, dedup);
    let mut out = MmapArray::<u32>::create(output_path, merged.len().max(1))?;
    out.extend_from_slice(&merged)?;
    out.truncate(merged.len())?;
    Ok(out)
}
