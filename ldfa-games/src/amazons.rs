//! Amazons on a `width x height` board (`SPEC_FULL.md` §8: Amazons 4x5).
//! Each cell is a layer of width 4: `0` empty, `1`/`2` a side-0/side-1
//! queen, `3` a burned arrow square. A move is two composed sub-moves
//! chained through an intermediate move-graph node (`spec.md` §4.5): a
//! queen slides like a chess queen to an empty square, then shoots an arrow
//! (same movement rule) from its new square to another empty square.
use ldfa_core::ldfa::constructors;
use ldfa_core::{GameEncoder, MoveGraph, PositionString, Result, Shape};

use crate::grid::{all_equal_guard, cell, ray, value_guard, DIRECTIONS_8};

const EMPTY: u32 = 0;
const ARROW: u32 = 3;

pub struct Amazons {
    width: usize,
    height: usize,
}

impl Amazons {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width >= 2 && height >= 2, "amazons needs at least a 2x2 board");
        Amazons { width, height }
    }

    fn cells(&self) -> usize {
        self.width * self.height
    }

    fn mark(side: u8) -> u32 {
        if side == 0 {
            1
        } else {
            2
        }
    }

    /// `(queen_cell, path_to_clear, landing_cell)` for every queen-like
    /// slide from every cell: `path_to_clear` is the ray prefix strictly
    /// between the two, which must be empty for the slide to be legal.
    fn slides(&self) -> Vec<(usize, Vec<usize>, usize)> {
        let mut out = Vec::new();
        for row in 0..self.height {
            for col in 0..self.width {
                let from = cell(self.width, row, col);
                for dir in DIRECTIONS_8 {
                    let r = ray(self.width, self.height, row, col, dir);
                    for (i, &landing) in r.iter().enumerate() {
                        out.push((from, r[..i].to_vec(), landing));
                    }
                }
            }
        }
        out
    }
}

impl GameEncoder for Amazons {
    fn shape(&self) -> Shape {
        Shape::new(vec![4; self.cells()])
    }

    /// Two queens per side, at the board's four corners.
    fn initial_position(&self) -> PositionString {
        let mut chars = vec![0u32; self.cells()];
        let (w, h) = (self.width, self.height);
        chars[cell(w, 0, 0)] = 1;
        chars[cell(w, 0, w - 1)] = 1;
        chars[cell(w, h - 1, 0)] = 2;
        chars[cell(w, h - 1, w - 1)] = 2;
        PositionString::from(chars)
    }

    fn move_graph(&self, side_to_move: u8) -> Result<MoveGraph> {
        let mark = Self::mark(side_to_move);
        let n = self.cells();
        let shape = self.shape();

        let mut graph = MoveGraph::new();
        let begin = graph.add_node("begin")?;
        let mid = graph.add_node("mid")?;
        let end = graph.add_node("end")?;

        for (i, (from, path, to)) in self.slides().into_iter().enumerate() {
            let mut pre_guards = Vec::with_capacity(1);
            if !path.is_empty() {
                pre_guards.push(all_equal_guard(&shape, &path, EMPTY)?);
            }
            let mut change = vec![None; n];
            change[from] = Some((mark, EMPTY));
            change[to] = Some((EMPTY, mark));
            graph.add_edge(format!("queen_{i}"), begin, mid, pre_guards, change, vec![])?;
        }

        for (i, (from, path, to)) in self.slides().into_iter().enumerate() {
            let mut pre_guards = vec![value_guard(&shape, from, mark)?];
            if !path.is_empty() {
                pre_guards.push(all_equal_guard(&shape, &path, EMPTY)?);
            }
            let mut change = vec![None; n];
            change[to] = Some((EMPTY, ARROW));
            graph.add_edge(format!("shoot_{i}"), mid, end, pre_guards, change, vec![])?;
        }

        Ok(graph)
    }

    fn position_to_string(&self, position: &PositionString) -> String {
        let mut s = String::with_capacity(self.cells() + self.height);
        for r in 0..self.height {
            for c in 0..self.width {
                s.push(match position.chars()[cell(self.width, r, c)] {
                    1 => 'o',
                    2 => 'x',
                    3 => '*',
                    _ => '.',
                });
            }
            s.push('\n');
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_position_has_two_queens_per_side() {
        let game = Amazons::new(4, 5);
        let initial = game.initial_position();
        let (ones, twos) = initial
            .chars()
            .iter()
            .fold((0, 0), |(o, t), &c| match c {
                1 => (o + 1, t),
                2 => (o, t + 1),
                _ => (o, t),
            });
        assert_eq!(ones, 2);
        assert_eq!(twos, 2);
    }

    #[test]
    fn forward_and_backward_moves_are_adjoint() {
        // spec.md §8 property 7: A ∩ backward(side, B) nonempty iff
        // forward(side, A) ∩ B nonempty, exercised on the queen-move /
        // arrow-shoot composed move graph.
        let game = Amazons::new(4, 5);
        let forward_graph = game.move_graph(0).unwrap();
        let backward_graph = forward_graph.reverse();

        let a = constructors::from_strings(&game.shape(), &[game.initial_position()]).unwrap();
        let forward_image = ldfa_core::movegraph::evaluate(&forward_graph, &a).unwrap();
        assert!(forward_image.has_reachable_accepting_state());

        let b = forward_image.clone();
        let backward_image = ldfa_core::movegraph::evaluate(&backward_graph, &b).unwrap();
        let lhs = a.intersection(&backward_image).unwrap().has_reachable_accepting_state();
        let rhs = ldfa_core::movegraph::evaluate(&forward_graph, &a)
            .unwrap()
            .intersection(&b)
            .unwrap()
            .has_reachable_accepting_state();
        assert_eq!(lhs, rhs);
    }
}
