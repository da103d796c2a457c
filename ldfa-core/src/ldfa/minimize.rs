//! Layerwise canonicalization (`spec.md` §4.2): runs from the terminal
//! layer backward, building each layer's new-id assignment from the
//! already-finished assignment of the layer after it.
use rayon::slice::ParallelSliceMut;

use crate::hash::{hash_image_128, pack_image_128};
use crate::ldfa::builder::LdfaBuilder;
use crate::ldfa::{Ldfa, StateId, ACCEPT, FIRST_REAL_STATE, REJECT};

struct Entry {
    hash: u128,
    old_id: StateId,
    image: Vec<StateId>,
}

/// Returns a new, canonical `Ldfa` accepting the same language as `ldfa`:
/// layer-wise, two states are equal iff they accept the same suffix set.
pub fn minimize(ldfa: &Ldfa) -> Ldfa {
    let n = ldfa.dimension();
    let mut builder =
        LdfaBuilder::new(ldfa.shape().clone()).expect("failed to allocate minimization scratch");

    // `next_id_map[old_id]` is the new id of `old_id` in the layer after
    // the one currently being processed; it starts as the identity on the
    // terminal layer's two sinks.
    let mut next_id_map: Vec<StateId> = vec![REJECT, ACCEPT];

    for layer in (0..n).rev() {
        let width = ldfa.shape().layer_width(layer);
        let old_count = ldfa.state_count(layer);

        let mut layer_id_map = vec![0u32; old_count as usize];
        layer_id_map[REJECT as usize] = REJECT;
        layer_id_map[ACCEPT as usize] = ACCEPT;

        let mut entries: Vec<Entry> = Vec::new();
        for old_id in FIRST_REAL_STATE..old_count {
            let image: Vec<StateId> = (0..width)
                .map(|c| next_id_map[ldfa.transition(layer, old_id, c) as usize])
                .collect();

            if image.iter().all(|&v| v == REJECT) {
                layer_id_map[old_id as usize] = REJECT;
                continue;
            }
            if image.iter().all(|&v| v == ACCEPT) {
                layer_id_map[old_id as usize] = ACCEPT;
                continue;
            }

            let hash = pack_image_128(&image).unwrap_or_else(|| hash_image_128(&image));
            entries.push(Entry { hash, old_id, image });
        }

        // Sorting on `(hash, image, old_id)` rather than `(hash, old_id)`
        // alone keeps every equal-image run contiguous even when a hash
        // collision interleaves it with a different image, so the
        // adjacent-pair scan below never has to look further back than
        // its immediate predecessor.
        entries.par_sort_unstable_by(|a, b| {
            (a.hash, &a.image, a.old_id).cmp(&(b.hash, &b.image, b.old_id))
        });

        let mut prev: Option<(u128, Vec<StateId>)> = None;
        let mut group_id: Option<StateId> = None;
        for entry in &entries {
            let same_as_prev = prev
                .as_ref()
                .is_some_and(|(h, img)| *h == entry.hash && img == &entry.image);
            if !same_as_prev {
                let id = builder
                    .add_state(layer, &entry.image)
                    .expect("minimization produced an out-of-range transition");
                group_id = Some(id);
            }
            layer_id_map[entry.old_id as usize] = group_id.unwrap();
            prev = Some((entry.hash, entry.image.clone()));
        }

        next_id_map = layer_id_map;
    }

    let new_initial = next_id_map[ldfa.initial_state() as usize];
    builder
        .finalize(new_initial)
        .expect("minimization produced an invalid initial state")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;

    fn two_layer_shape() -> Shape {
        Shape::new(vec![2, 2])
    }

    #[test]
    fn collapses_equivalent_states() {
        // Two layer-0 states with identical behavior (both route every
        // character to accept) must minimize to a single state.
        let shape = two_layer_shape();
        let mut builder = LdfaBuilder::new(shape).unwrap();
        let s1 = builder.add_state(1, &[ACCEPT, ACCEPT]).unwrap();
        let s2 = builder.add_state(1, &[ACCEPT, ACCEPT]).unwrap();
        assert_eq!(s1, s2, "builder already dedups identical rows");
        let l0 = builder.add_state(0, &[s1, s2]).unwrap();
        let ldfa = builder.finalize(l0).unwrap();

        let minimized = ldfa.minimize();
        assert_eq!(minimized.state_count(0), FIRST_REAL_STATE + 1);
        assert!(minimized.has_reachable_accepting_state());
    }

    #[test]
    fn preserves_language() {
        let shape = Shape::new(vec![2, 2]);
        let mut builder = LdfaBuilder::new(shape).unwrap();
        let a = builder.add_state(1, &[ACCEPT, REJECT]).unwrap();
        let b = builder.add_state(1, &[REJECT, ACCEPT]).unwrap();
        let l0 = builder.add_state(0, &[a, b]).unwrap();
        let ldfa = builder.finalize(l0).unwrap();

        let minimized = ldfa.minimize();
        for c0 in 0..2u32 {
            for c1 in 0..2u32 {
                let s = crate::shape::PositionString::from(vec![c0, c1]);
                assert_eq!(ldfa.contains(&s), minimized.contains(&s));
            }
        }
    }
}
