//! Step-by-step evaluator, mirroring the `DfaEvaluator` pattern: a small
//! struct that walks one layer at a time and exposes the current state.
use crate::ldfa::{Ldfa, StateId, ACCEPT};

#[derive(Clone, Debug)]
pub struct LdfaEvaluator<'a> {
    ldfa: &'a Ldfa,
    layer: usize,
    current_state: StateId,
}

impl<'a> LdfaEvaluator<'a> {
    pub fn new(ldfa: &'a Ldfa) -> Self {
        LdfaEvaluator {
            ldfa,
            layer: 0,
            current_state: ldfa.initial_state(),
        }
    }

    pub fn current_state(&self) -> StateId {
        self.current_state
    }

    pub fn layer(&self) -> usize {
        self.layer
    }

    pub fn is_accepting(&self) -> bool {
        self.layer == self.ldfa.dimension() && self.current_state == ACCEPT
    }

    /// Steps on character `c` at the current layer, advancing to the next
    /// layer. Panics if already at the terminal layer (the caller should
    /// stop stepping once `layer() == ldfa.dimension()`), mirroring the
    /// walk-off-the-end-is-a-bug stance the rest of the crate takes.
    pub fn step(&mut self, c: u32) -> StateId {
        assert!(
            self.layer < self.ldfa.dimension(),
            "stepped an evaluator past the terminal layer"
        );
        self.current_state = self.ldfa.transition(self.layer, self.current_state, c);
        self.layer += 1;
        self.current_state
    }

    pub fn step_all(&mut self, chars: &[u32]) -> StateId {
        for &c in chars {
            self.step(c);
        }
        self.current_state
    }
}
