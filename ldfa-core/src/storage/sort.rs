//! Spill-aware sort (`spec.md` §4.6, component C): for arrays whose byte
//! size exceeds a threshold, divide-and-conquer by median partitioning into
//! halves and recurse, sorting each half below the threshold with a
//! parallel policy. This avoids the O(n) extra working set a naive
//! parallel sort would need on memory-mapped files.
use rayon::slice::ParallelSliceMut;

use crate::config::SolverConfig;

/// Sorts `data` in place, using [`rayon`]'s parallel unstable sort directly
/// when `data` is small enough, otherwise partitioning around the median
/// (`slice::select_nth_unstable`, the Rust analog of `nth_element`) and
/// recursing on each half.
pub fn spill_aware_sort<T>(data: &mut [T], config: &SolverConfig)
where
    T: Ord + Send,
{
    let bytes = (data.len() * std::mem::size_of::<T>()) as u64;
    if bytes <= config.spill_sort_threshold_bytes || data.len() < 2 {
        data.par_sort_unstable();
        return;
    }
    let mid = data.len() / 2;
    data.select_nth_unstable(mid);
    let (left, right) = data.split_at_mut(mid);
    rayon::join(
        || spill_aware_sort(left, config),
        || spill_aware_sort(right, config),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_naive_sort_for_small_threshold() {
        let config = SolverConfig::new("/tmp/ldfa-scratch-test", "/tmp/ldfa-cache-test")
            .with_spill_sort_threshold_bytes(64);
        let mut data: Vec<i32> = (0..500).rev().collect();
        let mut expected = data.clone();
        expected.sort();
        spill_aware_sort(&mut data, &config);
        assert_eq!(data, expected);
    }

    #[test]
    fn matches_naive_sort_for_large_threshold() {
        let config = SolverConfig::new("/tmp/ldfa-scratch-test", "/tmp/ldfa-cache-test");
        let mut data: Vec<i32> = (0..500).rev().collect();
        let mut expected = data.clone();
        expected.sort();
        spill_aware_sort(&mut data, &config);
        assert_eq!(data, expected);
    }
}
