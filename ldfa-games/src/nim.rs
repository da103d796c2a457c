//! Normal-play Nim over a fixed set of heaps (`SPEC_FULL.md` §8: heaps
//! `[5,5,5]`). Each heap is a layer whose width is one more than its
//! starting size, so the position value doubles as the remaining stone
//! count. Either side may reduce any one heap; the game has no concept of
//! which side owns a heap, so `move_graph` ignores `side_to_move`.
use ldfa_core::ldfa::constructors;
use ldfa_core::{GameEncoder, Ldfa, MoveGraph, PositionString, Result, Shape};

pub struct Nim {
    heaps: Vec<u32>,
}

impl Nim {
    pub fn new(heaps: Vec<u32>) -> Self {
        assert!(!heaps.is_empty(), "nim needs at least one heap");
        Nim { heaps }
    }
}

impl GameEncoder for Nim {
    fn shape(&self) -> Shape {
        Shape::new(self.heaps.iter().map(|h| h + 1).collect())
    }

    fn initial_position(&self) -> PositionString {
        PositionString::from(self.heaps.clone())
    }

    /// One node; one edge per `(heap, before, after)` with `after < before`:
    /// take any positive number of stones from one heap.
    fn move_graph(&self, _side_to_move: u8) -> Result<MoveGraph> {
        let n = self.heaps.len();
        let mut graph = MoveGraph::new();
        let begin = graph.add_node("begin")?;
        let end = graph.add_node("end")?;
        for (heap, &size) in self.heaps.iter().enumerate() {
            for before in 1..=size {
                for after in 0..before {
                    let mut change = vec![None; n];
                    change[heap] = Some((before, after));
                    graph.add_edge(
                        format!("heap{heap}_{before}to{after}"),
                        begin,
                        end,
                        vec![],
                        change,
                        vec![],
                    )?;
                }
            }
        }
        Ok(graph)
    }

    fn position_to_string(&self, position: &PositionString) -> String {
        position
            .chars()
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Normal play: the side to move loses iff every heap is already empty
    /// (no move is available).
    fn lost(&self, _side: u8) -> Option<Ldfa> {
        let shape = self.shape();
        let constraints: Vec<(usize, u32)> = (0..self.heaps.len()).map(|h| (h, 0)).collect();
        constructors::fixed(shape, &constraints).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_heap_move_reduces_exactly_that_heap() {
        let game = Nim::new(vec![3]);
        let graph = game.move_graph(0).unwrap();
        let initial = constructors::from_strings(&game.shape(), &[PositionString::from(vec![3])]).unwrap();
        let reachable = ldfa_core::movegraph::evaluate(&graph, &initial).unwrap();
        assert!(reachable.contains(&PositionString::from(vec![0])));
        assert!(reachable.contains(&PositionString::from(vec![1])));
        assert!(reachable.contains(&PositionString::from(vec![2])));
        assert_eq!(reachable.size_exact_u128(), Some(3));
    }

    #[test]
    fn all_zero_heaps_is_the_lost_position() {
        let game = Nim::new(vec![2, 2]);
        let lost = game.lost(0).unwrap();
        assert!(lost.contains(&PositionString::from(vec![0, 0])));
        assert!(!lost.contains(&PositionString::from(vec![1, 0])));
    }
}
