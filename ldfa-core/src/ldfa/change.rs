//! Change operator (`spec.md` §4.4): rewrites one or more symbolic layers of
//! an LDFA, producing the LDFA of positions reachable by substituting
//! `before` with `after` at each constrained layer and leaving wildcard
//! layers untouched. Used as the primitive move step composed by the move
//! graph evaluator (`spec.md` §4.5).
use crate::error::Result;
use crate::ldfa::builder::LdfaBuilder;
use crate::ldfa::constructors;
use crate::ldfa::{Ldfa, StateId, REJECT};
use crate::storage::AdaptiveBitSet;

/// `None` means "no change at this layer" (wildcard); `Some((before, after))`
/// means "this layer must equal `before` in the input and becomes `after`
/// in the output".
pub type ChangeDescriptor = Option<(u32, u32)>;

/// One descriptor per variable layer.
pub type ChangeVector = Vec<ChangeDescriptor>;

pub fn apply_change(ldfa: &Ldfa, change: &ChangeVector) -> Result<Ldfa> {
    let n = ldfa.dimension();
    assert_eq!(change.len(), n, "change vector must have one entry per layer");

    let reachable = forward_reachable_states(ldfa);
    let result = rewrite_backward(ldfa, change, &reachable)?;

    if result.has_reachable_accepting_state() {
        Ok(result)
    } else {
        constructors::reject(ldfa.shape().clone())
    }
}

/// `reachable[k]` holds the old state ids of `ldfa` reachable from its
/// initial state by a walk of exactly `k` characters.
fn forward_reachable_states(ldfa: &Ldfa) -> Vec<AdaptiveBitSet> {
    let n = ldfa.dimension();
    let mut reachable = Vec::with_capacity(n + 1);

    let mut first = AdaptiveBitSet::new(ldfa.state_count(0) as u64, 1 << 20);
    first.prepare(ldfa.initial_state() as u64);
    first.allocate();
    reachable.push(first);

    for layer in 0..n {
        let width = ldfa.shape().layer_width(layer);
        let mut next_set = AdaptiveBitSet::new(ldfa.state_count(layer + 1) as u64, 1 << 20);
        for old_id in reachable[layer].iter() {
            for c in 0..width {
                let next = ldfa.transition(layer, old_id as StateId, c);
                next_set.prepare(next as u64);
            }
        }
        next_set.allocate();
        reachable.push(next_set);
    }
    reachable
}

fn rewrite_backward(
    ldfa: &Ldfa,
    change: &ChangeVector,
    reachable: &[AdaptiveBitSet],
) -> Result<Ldfa> {
    let n = ldfa.dimension();
    let mut builder = LdfaBuilder::new(ldfa.shape().clone())?;

    // `new_id_map[rank]` is the rewritten id of the rank-th reachable old
    // state in the layer just finished. At the terminal layer the old
    // sinks carry over unchanged: reject stays reject, accept stays
    // accept.
    let mut new_id_map: Vec<StateId> = reachable[n].iter().map(|old_id| old_id as StateId).collect();

    for layer in (0..n).rev() {
        let width = ldfa.shape().layer_width(layer);
        let descriptor = change[layer];

        let mut cur_map = Vec::with_capacity(reachable[layer].count() as usize);
        for old_id in reachable[layer].iter() {
            let old_id = old_id as StateId;
            let rewritten_child = |target_char: u32| -> StateId {
                let child_old = ldfa.transition(layer, old_id, target_char);
                let rank = reachable[layer + 1].rank(child_old as u64) as usize;
                new_id_map[rank]
            };

            let row: Vec<StateId> = match descriptor {
                Some((before, after)) => {
                    let mut row = vec![REJECT; width as usize];
                    row[after as usize] = rewritten_child(before);
                    row
                }
                None => (0..width).map(rewritten_child).collect(),
            };

            let id = builder.add_state(layer, &row)?;
            cur_map.push(id);
        }
        new_id_map = cur_map;
    }

    let initial = new_id_map[0];
    builder.finalize(initial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{PositionString, Shape};

    #[test]
    fn single_layer_change_matches_definition() {
        // spec.md §8 property 5: change(A, c).contains(y) iff y_k = a and
        // A.contains(y with y_k replaced by b), for a single-layer (b, a).
        let shape = Shape::new(vec![3, 3]);
        let a = constructors::from_strings(
            &shape,
            &[
                PositionString::from(vec![0, 0]),
                PositionString::from(vec![0, 2]),
                PositionString::from(vec![1, 1]),
            ],
        )
        .unwrap();

        let mut change: ChangeVector = vec![None; 2];
        change[0] = Some((0, 2));
        let changed = apply_change(&a, &change).unwrap();

        for c0 in 0..3u32 {
            for c1 in 0..3u32 {
                let y = PositionString::from(vec![c0, c1]);
                let expected = if c0 == 2 {
                    a.contains(&PositionString::from(vec![0, c1]))
                } else {
                    false
                };
                assert_eq!(changed.contains(&y), expected, "y=({c0},{c1})");
            }
        }
    }

    #[test]
    fn all_wildcard_change_is_identity() {
        let shape = Shape::new(vec![2, 2]);
        let a = constructors::from_strings(&shape, &[PositionString::from(vec![1, 0])]).unwrap();
        let change: ChangeVector = vec![None; 2];
        let changed = apply_change(&a, &change).unwrap();
        for c0 in 0..2u32 {
            for c1 in 0..2u32 {
                let s = PositionString::from(vec![c0, c1]);
                assert_eq!(changed.contains(&s), a.contains(&s));
            }
        }
    }
}
