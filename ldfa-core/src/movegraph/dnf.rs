//! Disjunctive-normal accumulator (`spec.md` §4.5.1): a per-node lazy
//! union-of-intersections builder. Clauses are ordered sequences of LDFAs
//! to be intersected; the accumulator as a whole represents their union.
//! Appending maintains a prefix invariant (clauses sharing a long common
//! prefix of LDFAs stay adjacent and get compacted toward that shared
//! length) and a logarithmic bound (equal-length adjacent clauses with a
//! shrinking tail get merged), so the clause list never grows linearly in
//! the number of sibling edges explored.
use crate::error::Result;
use crate::ldfa::constructors;
use crate::ldfa::Ldfa;
use crate::shape::Shape;

fn total_states(ldfa: &Ldfa) -> u64 {
    (0..=ldfa.dimension()).map(|k| ldfa.state_count(k) as u64).sum()
}

/// Length of the longest common prefix of `a` and `b`, comparing LDFAs by
/// content hash. Guards pushed into an accumulator are expected to already
/// be in canonical (minimized) form, since `Ldfa`'s `PartialEq` is only
/// reliable between minimized automata.
fn common_prefix_len(a: &[Ldfa], b: &[Ldfa]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| *x == *y).count()
}

pub struct DnfAccumulator {
    shape: Shape,
    clauses: Vec<Vec<Ldfa>>,
}

impl DnfAccumulator {
    pub fn new(shape: Shape) -> Self {
        DnfAccumulator {
            shape,
            clauses: Vec::new(),
        }
    }

    /// Appends an AND-clause (a non-empty ordered list of LDFAs).
    pub fn push_clause(&mut self, clause: Vec<Ldfa>) -> Result<()> {
        assert!(!clause.is_empty(), "a clause must have at least one LDFA");

        // Prefix invariant: walk backward, compacting any clause whose
        // `length - 1` prefix diverges from the new one, until a clause
        // shares nothing with it.
        for i in (0..self.clauses.len()).rev() {
            let shared = common_prefix_len(&self.clauses[i], &clause);
            while self.clauses[i].len() > shared + 1 {
                let last = self.clauses[i].len() - 1;
                let merged = self.clauses[i][last].intersection(&self.clauses[i][last - 1])?;
                self.clauses[i].truncate(last - 1);
                self.clauses[i].push(merged);
            }
            if shared == 0 {
                break;
            }
        }

        self.clauses.push(clause);
        self.apply_logarithmic_bound()
    }

    fn apply_logarithmic_bound(&mut self) -> Result<()> {
        loop {
            let len = self.clauses.len();
            if len < 2 || self.clauses[len - 1].len() != self.clauses[len - 2].len() {
                return Ok(());
            }
            let last_tail = self.clauses[len - 1].last().unwrap();
            let prev_tail = self.clauses[len - 2].last().unwrap();
            if total_states(last_tail) > total_states(prev_tail) {
                return Ok(());
            }
            let merged_tail = last_tail.union(prev_tail)?;
            let last_clause = self.clauses.pop().unwrap();
            let mut prev_clause = self.clauses.pop().unwrap();
            debug_assert_eq!(last_clause.len(), prev_clause.len());
            *prev_clause.last_mut().unwrap() = merged_tail;
            self.clauses.push(prev_clause);
        }
    }

    /// Compacts every clause to a single LDFA (intersecting its elements in
    /// order), then unions all clauses together.
    pub fn to_dfa(&self) -> Result<Ldfa> {
        if self.clauses.is_empty() {
            return constructors::reject(self.shape.clone());
        }
        let mut result: Option<Ldfa> = None;
        for clause in &self.clauses {
            let mut parts = clause.iter();
            let mut acc = parts.next().unwrap().clone();
            for guard in parts {
                acc = acc.intersection(guard)?;
            }
            result = Some(match result {
                Some(r) => r.union(&acc)?,
                None => acc,
            });
        }
        Ok(result.unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::PositionString;

    #[test]
    fn single_clause_round_trips() {
        let shape = Shape::new(vec![3, 3]);
        let a = constructors::from_strings(&shape, &[PositionString::from(vec![1, 2])])
            .unwrap()
            .minimize();
        let mut acc = DnfAccumulator::new(shape);
        acc.push_clause(vec![a.clone()]).unwrap();
        let realized = acc.to_dfa().unwrap();
        assert_eq!(realized.minimize(), a);
    }

    #[test]
    fn union_of_two_clauses() {
        let shape = Shape::new(vec![3, 3]);
        let a = constructors::from_strings(&shape, &[PositionString::from(vec![0, 0])])
            .unwrap()
            .minimize();
        let b = constructors::from_strings(&shape, &[PositionString::from(vec![1, 1])])
            .unwrap()
            .minimize();
        let mut acc = DnfAccumulator::new(shape);
        acc.push_clause(vec![a.clone()]).unwrap();
        acc.push_clause(vec![b.clone()]).unwrap();
        let realized = acc.to_dfa().unwrap();
        for c0 in 0..3u32 {
            for c1 in 0..3u32 {
                let s = PositionString::from(vec![c0, c1]);
                assert_eq!(realized.contains(&s), a.contains(&s) || b.contains(&s));
            }
        }
    }

    #[test]
    fn empty_accumulator_is_reject() {
        let shape = Shape::new(vec![2, 2]);
        let acc = DnfAccumulator::new(shape.clone());
        let realized = acc.to_dfa().unwrap();
        assert!(realized.is_reject() || !realized.has_reachable_accepting_state());
    }
}
