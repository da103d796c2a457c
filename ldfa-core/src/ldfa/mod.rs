//! # Layered Deterministic Finite Automaton
//!
//! An [`Ldfa`] accepts fixed-length strings over a [`Shape`]: it has one
//! variable layer per character position plus a terminal layer containing
//! exactly two constant states, reject (id 0) and accept (id 1). See
//! `spec.md` §3–§4.1.
//!
//! Mutation happens through [`builder::LdfaBuilder`]: a builder is built
//! layer-by-layer from the terminal layer backward (mirroring both
//! minimization and the binary set-algebra engine's backward rebuild, which
//! both need a state's children to already have ids before the state
//! itself can be added), and becomes an immutable, shareable `Ldfa` once
//! its initial state is published.
use std::rc::Rc;

use crate::error::{LdfaError, Result};
use crate::hash::{ContentHasher, Hash256};
use crate::shape::{PositionString, Shape};

pub mod algebra;
pub mod builder;
pub mod change;
pub mod constructors;
pub mod eval;
pub mod iter;
pub mod minimize;

pub use builder::LdfaBuilder;
pub use eval::LdfaEvaluator;
pub use iter::LdfaIter;

pub type StateId = u32;

/// The reject sink: accepts no string.
pub const REJECT: StateId = 0;
/// The accept sink: accepts any completion.
pub const ACCEPT: StateId = 1;
/// Non-sink states begin here.
pub const FIRST_REAL_STATE: StateId = 2;

/// A finalized, immutable layered DFA. Cheap to clone: the shape and
/// per-layer transition tables are reference-counted, nothing is deep
/// copied.
#[derive(Clone, Debug)]
pub struct Ldfa {
    pub(crate) shape: Rc<Shape>,
    /// `transitions[k]` is the flattened transition table of layer `k`
    /// (`k` in `0..dimension()`), row-major: the transitions of state `s`
    /// (`s >= FIRST_REAL_STATE`) on character `c` live at
    /// `transitions[k][(s - FIRST_REAL_STATE) as usize * width + c as usize]`.
    /// Rows for `REJECT`/`ACCEPT` are not stored; they route every
    /// character back to themselves.
    pub(crate) transitions: Rc<Vec<Rc<[StateId]>>>,
    /// `state_counts[k]` is the number of states in layer `k`, for `k` in
    /// `0..=dimension()`. `state_counts[dimension()]` is always 2 (just the
    /// terminal reject/accept states).
    pub(crate) state_counts: Rc<Vec<u32>>,
    pub(crate) initial_state: StateId,
}

impl Ldfa {
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn dimension(&self) -> usize {
        self.shape.dimension()
    }

    pub fn initial_state(&self) -> StateId {
        self.initial_state
    }

    /// Number of states in `layer` (including the two reserved sink ids).
    pub fn state_count(&self, layer: usize) -> u32 {
        self.state_counts[layer]
    }

    /// The transition of `state` (in `layer`) on character `c`. `layer`
    /// must be `< dimension()`; sinks route every character to themselves.
    pub fn transition(&self, layer: usize, state: StateId, c: u32) -> StateId {
        debug_assert!(layer < self.dimension(), "layer {layer} has no outgoing transitions");
        debug_assert!(
            c < self.shape.layer_width(layer),
            "character {c} out of bounds for layer {layer}"
        );
        match state {
            REJECT => REJECT,
            ACCEPT => ACCEPT,
            s => {
                let width = self.shape.layer_width(layer) as usize;
                let row = (s - FIRST_REAL_STATE) as usize;
                self.transitions[layer][row * width + c as usize]
            }
        }
    }

    /// The full transition row of `state` in `layer`.
    pub fn transitions_of(&self, layer: usize, state: StateId) -> Vec<StateId> {
        let width = self.shape.layer_width(layer);
        (0..width).map(|c| self.transition(layer, state, c)).collect()
    }

    pub fn is_reject(&self) -> bool {
        self.initial_state == REJECT
    }

    pub fn is_accept(&self) -> bool {
        self.initial_state == ACCEPT
    }

    /// Walks `string` from the initial state; accepts iff the walk ends at
    /// `ACCEPT` in the terminal layer (`spec.md` §4.1).
    pub fn contains(&self, string: &PositionString) -> bool {
        assert!(
            string.fits(&self.shape),
            "string does not fit this LDFA's shape"
        );
        let mut state = self.initial_state;
        for (layer, &c) in string.chars().iter().enumerate() {
            state = self.transition(layer, state, c);
        }
        state == ACCEPT
    }

    /// Whether some string reaches `ACCEPT` from the initial state
    /// (equivalent to `size() > 0.0`, but doesn't need floating point).
    pub fn has_reachable_accepting_state(&self) -> bool {
        let n = self.dimension();
        let mut memo: Vec<Vec<Option<bool>>> = (0..=n)
            .map(|k| vec![None; self.state_count(k) as usize])
            .collect();
        reachable_accept(self, 0, self.initial_state, &mut memo)
    }

    /// Language size, computed by dynamic programming along layers with
    /// `f64`s (`spec.md` §4.1): `size(state, layer) = sum over characters
    /// of size(next_state, layer+1)`, with `size(ACCEPT, N) = 1`,
    /// `size(REJECT, N) = 0`. Acceptable because callers only need a
    /// comparable total (`spec.md` §9, open question); see
    /// [`Ldfa::size_exact_u128`] for an exact alternative on small shapes.
    pub fn size(&self) -> f64 {
        let n = self.dimension();
        let mut memo: Vec<Vec<Option<f64>>> = (0..=n)
            .map(|k| vec![None; self.state_count(k) as usize])
            .collect();
        size_f64(self, n, self.initial_state, &mut memo)
    }

    /// Exact language size as a `u128`, for shapes small enough that the
    /// total does not overflow. Returns `None` on overflow.
    pub fn size_exact_u128(&self) -> Option<u128> {
        let n = self.dimension();
        let mut memo: Vec<Vec<Option<u128>>> = (0..=n)
            .map(|k| vec![None; self.state_count(k) as usize])
            .collect();
        size_u128(self, n, self.initial_state, &mut memo)
    }

    /// Accepted strings in colexicographic order (`spec.md` §4.1).
    pub fn iter(&self) -> LdfaIter<'_> {
        LdfaIter::new(self)
    }

    pub fn evaluator(&self) -> LdfaEvaluator<'_> {
        LdfaEvaluator::new(self)
    }

    /// The stable 256-bit content hash identifying this LDFA's accepted
    /// set up to state ordering (`spec.md` §4.1, invariant 5). Hashes the
    /// shape, then each layer's transition array in layer order, then the
    /// initial state — so two LDFAs with this hash equal are guaranteed to
    /// accept the same language only if both are already in canonical
    /// (minimized) form; call [`Ldfa::minimize`] first if that is not
    /// already known.
    pub fn content_hash(&self) -> Hash256 {
        let mut hasher = ContentHasher::new();
        hasher.update_u32_slice(self.shape.widths());
        for layer in 0..self.dimension() {
            hasher.update_u32_slice(&self.transitions[layer]);
        }
        hasher.update_u32_slice(&[self.initial_state]);
        hasher.finish()
    }

    pub fn minimize(&self) -> Ldfa {
        minimize::minimize(self)
    }

    pub fn union(&self, other: &Ldfa) -> Result<Ldfa> {
        algebra::binary_op(self, other, |a, b| a || b)
    }

    pub fn intersection(&self, other: &Ldfa) -> Result<Ldfa> {
        algebra::binary_op(self, other, |a, b| a && b)
    }

    pub fn difference(&self, other: &Ldfa) -> Result<Ldfa> {
        algebra::binary_op(self, other, |a, b| a && !b)
    }

    pub fn symmetric_difference(&self, other: &Ldfa) -> Result<Ldfa> {
        algebra::binary_op(self, other, |a, b| a != b)
    }

    pub fn complement(&self) -> Ldfa {
        algebra::complement(self)
    }

    pub fn apply_change(&self, change: &change::ChangeVector) -> Result<Ldfa> {
        change::apply_change(self, change)
    }

    pub(crate) fn check_shape_matches(&self, other: &Ldfa) -> Result<()> {
        if self.shape != other.shape {
            Err(LdfaError::ShapeMismatch(
                self.shape.widths().to_vec(),
                other.shape.widths().to_vec(),
            ))
        } else {
            Ok(())
        }
    }
}

impl PartialEq for Ldfa {
    /// Two LDFAs compare equal iff they accept the same language *and* are
    /// already in canonical (minimized) form — comparing raw, unminimized
    /// state tables for equality would reject accidentally-equivalent but
    /// differently-built automata. Minimize both sides first if that
    /// matters to the caller.
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.content_hash() == other.content_hash()
    }
}
impl Eq for Ldfa {}

fn size_f64(ldfa: &Ldfa, layer: usize, state: StateId, memo: &mut [Vec<Option<f64>>]) -> f64 {
    if layer == ldfa.dimension() {
        return if state == ACCEPT { 1.0 } else { 0.0 };
    }
    let idx = state as usize;
    if let Some(v) = memo[layer][idx] {
        return v;
    }
    let width = ldfa.shape.layer_width(layer);
    let total: f64 = (0..width)
        .map(|c| {
            let next = ldfa.transition(layer, state, c);
            size_f64(ldfa, layer + 1, next, memo)
        })
        .sum();
    memo[layer][idx] = Some(total);
    total
}

fn size_u128(
    ldfa: &Ldfa,
    layer: usize,
    state: StateId,
    memo: &mut [Vec<Option<u128>>],
) -> Option<u128> {
    if layer == ldfa.dimension() {
        return Some(if state == ACCEPT { 1 } else { 0 });
    }
    let idx = state as usize;
    if let Some(v) = memo[layer][idx] {
        return Some(v);
    }
    let width = ldfa.shape.layer_width(layer);
    let mut total: u128 = 0;
    for c in 0..width {
        let next = ldfa.transition(layer, state, c);
        total = total.checked_add(size_u128(ldfa, layer + 1, next, memo)?)?;
    }
    memo[layer][idx] = Some(total);
    Some(total)
}

fn reachable_accept(
    ldfa: &Ldfa,
    layer: usize,
    state: StateId,
    memo: &mut [Vec<Option<bool>>],
) -> bool {
    if layer == ldfa.dimension() {
        return state == ACCEPT;
    }
    if state == REJECT {
        return false;
    }
    if state == ACCEPT {
        return true;
    }
    let idx = state as usize;
    if let Some(v) = memo[layer][idx] {
        return v;
    }
    let width = ldfa.shape.layer_width(layer);
    let result = (0..width).any(|c| {
        let next = ldfa.transition(layer, state, c);
        reachable_accept(ldfa, layer + 1, next, memo)
    });
    memo[layer][idx] = Some(result);
    result
}
