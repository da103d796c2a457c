//! Breakthrough on a `width x height` board (`SPEC_FULL.md` §8: Breakthrough
//! 4x4). Each cell is a layer of width 3: `0` empty, `1` side 0's pawn, `2`
//! side 1's pawn. Two back rows per side, so on a 4-row board the starting
//! position is fully packed and only the front row's diagonal captures are
//! legal on the first ply.
use ldfa_core::ldfa::constructors;
use ldfa_core::{GameEncoder, Ldfa, MoveGraph, PositionString, Result, Shape};

use crate::grid::cell;

const ROWS_PER_SIDE: usize = 2;

pub struct Breakthrough {
    width: usize,
    height: usize,
}

impl Breakthrough {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(
            height >= 2 * ROWS_PER_SIDE,
            "board must be tall enough for both sides' starting rows"
        );
        Breakthrough { width, height }
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

    /// The row delta a pawn of `side` advances by: side 0 moves toward
    /// increasing rows, side 1 toward decreasing rows.
    fn forward(side: u8) -> i32 {
        if side == 0 {
            1
        } else {
            -1
        }
    }
}

impl GameEncoder for Breakthrough {
    fn shape(&self) -> Shape {
        Shape::new(vec![3; self.cells()])
    }

    fn initial_position(&self) -> PositionString {
        let mut chars = vec![0u32; self.cells()];
        for r in 0..ROWS_PER_SIDE {
            for c in 0..self.width {
                chars[cell(self.width, r, c)] = 1;
                chars[cell(self.width, self.height - 1 - r, c)] = 2;
            }
        }
        PositionString::from(chars)
    }

    /// One node; for every pawn square and every forward direction (straight,
    /// diagonal-left, diagonal-right), one edge per admissible landing
    /// value: `0` (move) for all three directions, the opponent's mark
    /// (capture) for the two diagonals only. The `(before, after)` change
    /// pair on both the source and target layer bakes in "source holds my
    /// pawn" and "target holds the assumed value" with no separate guard
    /// (`spec.md` §4.4); squares where that assumption is false simply never
    /// match the position set.
    fn move_graph(&self, side_to_move: u8) -> Result<MoveGraph> {
        let mark = Self::mark(side_to_move);
        let opponent_mark = Self::mark(1 - side_to_move);
        let dr = Self::forward(side_to_move);
        let n = self.cells();

        let mut graph = MoveGraph::new();
        let begin = graph.add_node("begin")?;
        let end = graph.add_node("end")?;

        for row in 0..self.height {
            let target_row = row as i32 + dr;
            if target_row < 0 || target_row as usize >= self.height {
                continue;
            }
            let target_row = target_row as usize;
            for col in 0..self.width {
                let from = cell(self.width, row, col);
                for dc in [-1i32, 0, 1] {
                    let target_col = col as i32 + dc;
                    if target_col < 0 || target_col as usize >= self.width {
                        continue;
                    }
                    let to = cell(self.width, target_row, target_col as usize);

                    let mut move_change = vec![None; n];
                    move_change[from] = Some((mark, 0));
                    move_change[to] = Some((0, mark));
                    graph.add_edge(
                        format!("move_{from}_{to}"),
                        begin,
                        end,
                        vec![],
                        move_change,
                        vec![],
                    )?;

                    if dc != 0 {
                        let mut capture_change = vec![None; n];
                        capture_change[from] = Some((mark, 0));
                        capture_change[to] = Some((opponent_mark, mark));
                        graph.add_edge(
                            format!("capture_{from}_{to}"),
                            begin,
                            end,
                            vec![],
                            capture_change,
                            vec![],
                        )?;
                    }
                }
            }
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
                    _ => '.',
                });
            }
            s.push('\n');
        }
        s
    }

    fn won(&self, side: u8) -> Option<Ldfa> {
        // side wins by landing a pawn anywhere on the opponent's back row.
        let shape = self.shape();
        let target_row = if side == 0 { self.height - 1 } else { 0 };
        let mark = Self::mark(side);
        let mut acc = constructors::reject(shape.clone()).ok()?;
        for c in 0..self.width {
            let guard = constructors::fixed(shape.clone(), &[(cell(self.width, target_row, c), mark)]).ok()?;
            acc = acc.union(&guard).ok()?;
        }
        Some(acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_by_four_first_ply_has_six_reachable_positions() {
        let game = Breakthrough::new(4, 4);
        let graph = game.move_graph(0).unwrap();
        let initial =
            constructors::from_strings(&game.shape(), &[game.initial_position()]).unwrap();
        let reachable = ldfa_core::movegraph::evaluate(&graph, &initial).unwrap();
        assert_eq!(reachable.size_exact_u128(), Some(6));
    }

    #[test]
    fn back_row_pawns_cannot_move_on_the_first_ply() {
        // every reachable position still has a side-0 pawn at row 0
        // (the back-row pawns never moved, since both of their landing
        // squares on row 1 hold friendly pawns).
        let game = Breakthrough::new(4, 4);
        let graph = game.move_graph(0).unwrap();
        let initial =
            constructors::from_strings(&game.shape(), &[game.initial_position()]).unwrap();
        let reachable = ldfa_core::movegraph::evaluate(&graph, &initial).unwrap();
        let row0_has_pawn =
            constructors::fixed(game.shape(), &[(cell(4, 0, 0), 1)]).unwrap();
        assert!(reachable.intersection(&row0_has_pawn).unwrap().has_reachable_accepting_state());
    }
}
