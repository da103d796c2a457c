//! Tic-tac-toe on a `size x size` board (`SPEC_FULL.md` §8 seed scenarios:
//! TicTacToe 2x2, TicTacToe 3x3). Each cell is a layer of width 3: `0` empty,
//! `1` side 0's mark, `2` side 1's mark.
use ldfa_core::ldfa::constructors;
use ldfa_core::{GameEncoder, Ldfa, MoveGraph, PositionString, Result, Shape};

use crate::grid::cell;

pub struct TicTacToe {
    size: usize,
}

impl TicTacToe {
    pub fn new(size: usize) -> Self {
        assert!(size >= 2, "tic-tac-toe needs at least a 2x2 board");
        TicTacToe { size }
    }

    fn cells(&self) -> usize {
        self.size * self.size
    }

    /// Every winning line: each row, each column, and the two diagonals, as
    /// a list of cell indices.
    fn lines(&self) -> Vec<Vec<usize>> {
        let n = self.size;
        let mut lines = Vec::with_capacity(2 * n + 2);
        for r in 0..n {
            lines.push((0..n).map(|c| cell(n, r, c)).collect());
        }
        for c in 0..n {
            lines.push((0..n).map(|r| cell(n, r, c)).collect());
        }
        lines.push((0..n).map(|i| cell(n, i, i)).collect());
        lines.push((0..n).map(|i| cell(n, i, n - 1 - i)).collect());
        lines
    }

    fn has_line(&self, mark: u32) -> Result<Ldfa> {
        let shape = self.shape();
        let mut acc = constructors::reject(shape.clone())?;
        for line in self.lines() {
            let constraints: Vec<(usize, u32)> = line.iter().map(|&c| (c, mark)).collect();
            acc = acc.union(&constructors::fixed(shape.clone(), &constraints)?)?;
        }
        Ok(acc)
    }
}

impl GameEncoder for TicTacToe {
    fn shape(&self) -> Shape {
        Shape::new(vec![3; self.cells()])
    }

    fn initial_position(&self) -> PositionString {
        PositionString::from(vec![0; self.cells()])
    }

    /// One node, one edge per empty cell: place the side-to-move's mark in
    /// that cell. `before = 0` bakes in "must currently be empty"; no
    /// separate guard is needed (`spec.md` §4.4).
    fn move_graph(&self, side_to_move: u8) -> Result<MoveGraph> {
        let mark = if side_to_move == 0 { 1 } else { 2 };
        let n = self.shape().dimension();
        let mut graph = MoveGraph::new();
        let begin = graph.add_node("begin")?;
        let end = graph.add_node("end")?;
        for c in 0..self.cells() {
            let mut change = vec![None; n];
            change[c] = Some((0, mark));
            graph.add_edge(format!("place_{c}"), begin, end, vec![], change, vec![])?;
        }
        Ok(graph)
    }

    fn position_to_string(&self, position: &PositionString) -> String {
        let n = self.size;
        let mut s = String::with_capacity(n * (n + 1));
        for r in 0..n {
            for c in 0..n {
                s.push(match position.chars()[cell(n, r, c)] {
                    1 => 'X',
                    2 => 'O',
                    _ => '.',
                });
            }
            s.push('\n');
        }
        s
    }

    fn won(&self, side: u8) -> Option<Ldfa> {
        let mark = if side == 0 { 1 } else { 2 };
        self.has_line(mark).ok()
    }

    fn lost(&self, side: u8) -> Option<Ldfa> {
        self.won(1 - side)
    }
}
