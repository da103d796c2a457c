//! Enumerates accepted strings in colexicographic order (`spec.md` §4.1):
//! the last character varies fastest. Built on a reachability memo so that
//! dead branches (states that can never reach `ACCEPT`) are skipped rather
//! than walked and rejected one string at a time.
use crate::ldfa::{Ldfa, StateId, ACCEPT, REJECT};
use crate::shape::PositionString;

/// Iterator over the accepted strings of an [`Ldfa`], colexicographic order.
pub struct LdfaIter<'a> {
    ldfa: &'a Ldfa,
    /// `reach[layer][state]` memoizes whether `state` at `layer` can reach
    /// `ACCEPT` in the terminal layer. Computed once, up front.
    reach: Vec<Vec<bool>>,
    /// `None` once exhausted. Otherwise the states visited along the
    /// current candidate, `path[k]` being the state entered at layer `k`
    /// (so `path[0] == initial_state`, `path[dimension()]` is the final
    /// state), and `chars[k]` the character taken out of layer `k`.
    path: Option<Vec<StateId>>,
    chars: Vec<u32>,
    done: bool,
}

impl<'a> LdfaIter<'a> {
    pub fn new(ldfa: &'a Ldfa) -> Self {
        let n = ldfa.dimension();
        // Built from the terminal layer backward: layer `k`'s reachability
        // only needs layer `k+1`'s, already-finished table.
        let mut reach: Vec<Vec<bool>> = vec![Vec::new(); n + 1];
        reach[n] = vec![false; ldfa.state_count(n) as usize];
        reach[n][ACCEPT as usize] = true;
        for layer in (0..n).rev() {
            let width = ldfa.shape().layer_width(layer);
            reach[layer] = (0..ldfa.state_count(layer))
                .map(|s| match s {
                    REJECT => false,
                    ACCEPT => reach[layer + 1][ACCEPT as usize],
                    s => (0..width).any(|c| reach[layer + 1][ldfa.transition(layer, s, c) as usize]),
                })
                .collect();
        }

        let done = !reach[0][ldfa.initial_state() as usize];
        let mut it = LdfaIter {
            ldfa,
            reach,
            path: None,
            chars: vec![0; n],
            done,
        };
        if !it.done {
            let mut path = vec![0; n + 1];
            path[0] = ldfa.initial_state();
            it.path = Some(path);
            if !it.try_complete_from(0) {
                it.done = true;
            }
        }
        it
    }

    fn is_reachable(&self, layer: usize, state: StateId) -> bool {
        self.reach[layer][state as usize]
    }

    /// Greedily fills `path[layer+1..]` and `chars[layer..]` by picking, at
    /// each remaining layer, the smallest character whose target can still
    /// reach `ACCEPT`. Returns `false` if no such completion exists (the
    /// state at `layer` is, despite the top-level reachability check,
    /// already a dead end — only happens when called with a path that
    /// needs to be abandoned).
    fn try_complete_from(&mut self, layer: usize) -> bool {
        let n = self.ldfa.dimension();
        let path = self.path.as_mut().unwrap();
        for k in layer..n {
            let state = path[k];
            let width = self.ldfa.shape().layer_width(k);
            let mut found = None;
            for c in 0..width {
                let next = self.ldfa.transition(k, state, c);
                if self.reach[k + 1][next as usize] {
                    found = Some((c, next));
                    break;
                }
            }
            match found {
                Some((c, next)) => {
                    self.chars[k] = c;
                    path[k + 1] = next;
                }
                None => return false,
            }
        }
        path[n] == ACCEPT
    }

    /// Advances `path`/`chars` to the next candidate in colexicographic
    /// order: tries to increment the character at the deepest layer first,
    /// backtracking toward layer 0 on overflow, then re-fills forward.
    fn advance(&mut self) -> bool {
        let n = self.ldfa.dimension();
        let mut layer = n;
        loop {
            if layer == 0 {
                return false;
            }
            layer -= 1;
            let state = self.path.as_ref().unwrap()[layer];
            let width = self.ldfa.shape().layer_width(layer);
            let mut next_char = self.chars[layer] + 1;
            let mut advanced = false;
            while next_char < width {
                let next = self.ldfa.transition(layer, state, next_char);
                if self.is_reachable(layer + 1, next) {
                    self.chars[layer] = next_char;
                    self.path.as_mut().unwrap()[layer + 1] = next;
                    advanced = true;
                    break;
                }
                next_char += 1;
            }
            if advanced {
                let completed = self.try_complete_from(layer + 1);
                debug_assert!(completed, "reach table said a completion exists");
                return true;
            }
        }
    }

    /// Reconstructs the current candidate as a [`PositionString`].
    fn current(&self) -> PositionString {
        PositionString::from(self.chars.clone())
    }
}

impl<'a> Iterator for LdfaIter<'a> {
    type Item = PositionString;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = self.current();
        if !self.advance() {
            self.done = true;
        }
        Some(result)
    }
}
