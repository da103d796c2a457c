//! Base LDFA constructors (`spec.md` §4, component I): accept, reject, an
//! exact finite set of strings, a partially-fixed position, and a counting
//! predicate. Game encoders build guard and position LDFAs out of these.
use std::collections::HashMap;

use crate::error::Result;
use crate::ldfa::{Ldfa, LdfaBuilder, StateId, ACCEPT, REJECT};
use crate::shape::{PositionString, Shape};

/// The LDFA accepting every string over `shape`.
pub fn accept(shape: Shape) -> Result<Ldfa> {
    LdfaBuilder::new(shape)?.finalize(ACCEPT)
}

/// The LDFA accepting no string over `shape`.
pub fn reject(shape: Shape) -> Result<Ldfa> {
    LdfaBuilder::new(shape)?.finalize(REJECT)
}

/// The LDFA accepting exactly `strings` (`spec.md` §8, property 3): one
/// state per distinct prefix, built bottom-up so siblings that diverge at a
/// later layer still share their common-prefix state.
pub fn from_strings(shape: &Shape, strings: &[PositionString]) -> Result<Ldfa> {
    for s in strings {
        assert!(s.fits(shape), "string does not fit this shape");
    }
    if strings.is_empty() {
        return reject(shape.clone());
    }

    let n = shape.dimension();
    let mut builder = LdfaBuilder::new(shape.clone())?;

    // `next_map[prefix]` is the id representing having consumed exactly
    // `prefix` (length `layer + 1` on the first iteration, shrinking by one
    // each pass); starts as the terminal layer, where a full-length prefix
    // (a complete input string) maps straight to `ACCEPT`.
    let mut next_map: HashMap<Vec<u32>, StateId> = strings
        .iter()
        .map(|s| (s.chars().to_vec(), ACCEPT))
        .collect();

    for layer in (0..n).rev() {
        let width = shape.layer_width(layer);
        let mut prefixes: Vec<Vec<u32>> =
            strings.iter().map(|s| s.chars()[..layer].to_vec()).collect();
        prefixes.sort_unstable();
        prefixes.dedup();

        let mut cur_map = HashMap::with_capacity(prefixes.len());
        for prefix in prefixes {
            let row: Vec<StateId> = (0..width)
                .map(|c| {
                    let mut extended = prefix.clone();
                    extended.push(c);
                    next_map.get(&extended).copied().unwrap_or(REJECT)
                })
                .collect();
            let id = builder.add_state(layer, &row)?;
            cur_map.insert(prefix, id);
        }
        next_map = cur_map;
    }

    let initial = *next_map
        .get(&Vec::new())
        .expect("the empty prefix is always present");
    builder.finalize(initial)
}

/// The LDFA accepting every string whose character at `layer` equals `value`
/// for each `(layer, value)` in `constraints`; layers absent from
/// `constraints` are unconstrained. A single linear chain of states, one per
/// layer: constrained layers branch on one character, free layers route
/// every character to the same next state.
pub fn fixed(shape: Shape, constraints: &[(usize, u32)]) -> Result<Ldfa> {
    let n = shape.dimension();
    let constraint_map: HashMap<usize, u32> = constraints.iter().copied().collect();
    let mut builder = LdfaBuilder::new(shape.clone())?;

    let mut next = ACCEPT;
    for layer in (0..n).rev() {
        let width = shape.layer_width(layer);
        let row: Vec<StateId> = match constraint_map.get(&layer) {
            Some(&v) => (0..width).map(|c| if c == v { next } else { REJECT }).collect(),
            None => vec![next; width as usize],
        };
        next = builder.add_state(layer, &row)?;
    }
    builder.finalize(next)
}

/// The LDFA accepting every string with exactly `target_count` characters
/// equal to `target_char` (`spec.md` §8, "Counting constructor"). States are
/// keyed by `(layer, running_count)`; counts that already exceed
/// `target_count` are routed straight to `REJECT` rather than built, since
/// the count only ever increases.
pub fn count(shape: Shape, target_char: u32, target_count: usize) -> Result<Ldfa> {
    let n = shape.dimension();
    if target_count > n {
        return reject(shape);
    }
    let mut builder = LdfaBuilder::new(shape.clone())?;

    // `next_states[c]` is the state at the layer after the one currently
    // being processed, for `running_count == c`, `c` in `0..=target_count`.
    let mut next_states: HashMap<usize, StateId> = HashMap::new();
    next_states.insert(target_count, ACCEPT);
    for c in 0..target_count {
        next_states.insert(c, REJECT);
    }

    for layer in (0..n).rev() {
        let width = shape.layer_width(layer);
        let max_count = target_count.min(layer);
        let mut cur_states = HashMap::with_capacity(max_count + 1);
        for c in 0..=max_count {
            let row: Vec<StateId> = (0..width)
                .map(|ch| {
                    let next_count = if ch == target_char { c + 1 } else { c };
                    if next_count > target_count {
                        REJECT
                    } else {
                        next_states[&next_count]
                    }
                })
                .collect();
            let id = builder.add_state(layer, &row)?;
            cur_states.insert(c, id);
        }
        next_states = cur_states;
    }

    let initial = next_states[&0];
    builder.finalize(initial)
}
