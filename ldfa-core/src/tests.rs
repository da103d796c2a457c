//! Crate-level property tests (`spec.md` §8): the per-module unit tests
//! in `ldfa::algebra`,
//! `ldfa::minimize`, `ldfa::constructors`, and `ldfa::change` cover the
//! mechanics of each component; these exercise the properties that cut
//! across several of them at once.
use crate::ldfa::constructors;
use crate::shape::{PositionString, Shape};

fn all_strings(shape: &Shape) -> Vec<PositionString> {
    fn go(shape: &Shape, layer: usize, acc: &mut Vec<u32>, out: &mut Vec<PositionString>) {
        if layer == shape.dimension() {
            out.push(PositionString::from(acc.clone()));
            return;
        }
        for c in 0..shape.layer_width(layer) {
            acc.push(c);
            go(shape, layer + 1, acc, out);
            acc.pop();
        }
    }
    let mut out = Vec::new();
    go(shape, 0, &mut Vec::new(), &mut out);
    out
}

#[test]
fn constants_match_their_definition() {
    // spec.md §8 property 1.
    let shape = Shape::new(vec![2, 3]);
    let accept = constructors::accept(shape.clone()).unwrap();
    let reject = constructors::reject(shape.clone()).unwrap();
    for s in all_strings(&shape) {
        assert!(accept.contains(&s));
        assert!(!reject.contains(&s));
    }
    assert_eq!(accept.size_exact_u128(), Some(6));
    assert_eq!(reject.size_exact_u128(), Some(0));
}

#[test]
fn boolean_algebra_matches_pointwise_definition() {
    // spec.md §8 property 2.
    let shape = Shape::new(vec![2, 2, 2]);
    let a = constructors::from_strings(
        &shape,
        &[
            PositionString::from(vec![0, 0, 0]),
            PositionString::from(vec![1, 0, 1]),
        ],
    )
    .unwrap();
    let b = constructors::from_strings(
        &shape,
        &[
            PositionString::from(vec![1, 0, 1]),
            PositionString::from(vec![0, 1, 1]),
        ],
    )
    .unwrap();

    let strings = all_strings(&shape);
    for s in &strings {
        assert_eq!(a.union(&b).unwrap().contains(s), a.contains(s) || b.contains(s));
        assert_eq!(
            a.intersection(&b).unwrap().contains(s),
            a.contains(s) && b.contains(s)
        );
        assert_eq!(
            a.difference(&b).unwrap().contains(s),
            a.contains(s) && !b.contains(s)
        );
        assert_eq!(a.complement().contains(s), !a.contains(s));
    }
}

#[test]
fn boolean_algebra_idempotence_and_identity() {
    // spec.md §8 property 2: idempotence and identity laws.
    let shape = Shape::new(vec![2, 2]);
    let reject = constructors::reject(shape.clone()).unwrap();
    let accept = constructors::accept(shape.clone()).unwrap();
    let a = constructors::from_strings(&shape, &[PositionString::from(vec![0, 1])]).unwrap();

    let strings = all_strings(&shape);
    for s in &strings {
        assert_eq!(a.union(&a).unwrap().contains(s), a.contains(s));
        assert_eq!(a.intersection(&a).unwrap().contains(s), a.contains(s));
        assert_eq!(a.union(&reject).unwrap().contains(s), a.contains(s));
        assert_eq!(a.intersection(&accept).unwrap().contains(s), a.contains(s));
        assert_eq!(a.complement().complement().contains(s), a.contains(s));
    }
}

#[test]
fn minimization_is_a_normal_form() {
    // spec.md §8 property 4: two LDFAs accepting the same language minimize
    // to the same per-layer state counts and content hash, regardless of
    // how each was originally built.
    let shape = Shape::new(vec![3, 3]);
    let strings = vec![
        PositionString::from(vec![0, 1]),
        PositionString::from(vec![1, 2]),
        PositionString::from(vec![2, 0]),
    ];

    let built_directly = constructors::from_strings(&shape, &strings).unwrap();
    let built_via_union = strings
        .iter()
        .map(|s| constructors::from_strings(&shape, std::slice::from_ref(s)).unwrap())
        .reduce(|a, b| a.union(&b).unwrap())
        .unwrap();

    let a = built_directly.minimize();
    let b = built_via_union.minimize();
    assert_eq!(a.content_hash(), b.content_hash());
    for layer in 0..=shape.dimension() {
        assert_eq!(a.state_count(layer), b.state_count(layer));
    }
}

#[test]
fn round_trip_string_construction_counts_distinct_inputs() {
    // spec.md §8 property 3.
    let shape = Shape::new(vec![4]);
    let strings: Vec<PositionString> = (0..4).map(|c| PositionString::from(vec![c])).collect();
    let ldfa = constructors::from_strings(&shape, &strings).unwrap();
    for s in &strings {
        assert!(ldfa.contains(s));
    }
    assert_eq!(ldfa.size_exact_u128(), Some(4));
}
