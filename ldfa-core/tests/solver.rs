//! Integration tests over the public `ldfa-core` API (`SPEC_FULL.md` §8):
//! the counting-constructor scenario, and `Solver` mechanics exercised
//! through a tiny ad-hoc encoder kept local to this crate (the real game
//! encoders live in `ldfa-games`, a downstream crate that cannot be a
//! dev-dependency of its own dependency).
use ldfa_core::ldfa::change::ChangeVector;
use ldfa_core::ldfa::constructors;
use ldfa_core::{GameEncoder, Ldfa, MoveGraph, PositionString, Result, Shape, Solver, SolverConfig};

#[test]
fn counting_constructor_matches_binomial_times_power() {
    // SPEC_FULL.md §8 "Counting constructor": shape [3]^64, size =
    // C(64, k) * 2^(64-k).
    let shape = Shape::new(vec![3; 64]);
    for k in [0usize, 1, 2, 63, 64] {
        let ldfa = constructors::count(shape.clone(), 0, k).unwrap();
        let binom = (1..=k as u128).fold(1u128, |acc, i| acc * (65 - i) / i);
        let expected = binom * 2u128.checked_pow((64 - k) as u32).unwrap();
        assert_eq!(ldfa.size_exact_u128(), Some(expected), "k={k}");
    }
}

/// A 2-layer counter game: one shared pile of `max` tokens split across two
/// piles (shape `[max+1, max+1]`, invariant `pile0 + pile1 == max`). Side 0
/// moves a token from pile 0 to pile 1; side 1 moves the other way. Side 0
/// wins when pile1 == max.
struct CounterGame {
    max: u32,
}

impl GameEncoder for CounterGame {
    fn shape(&self) -> Shape {
        Shape::new(vec![self.max + 1, self.max + 1])
    }

    fn initial_position(&self) -> PositionString {
        PositionString::from(vec![self.max, 0])
    }

    fn move_graph(&self, side_to_move: u8) -> Result<MoveGraph> {
        let mut graph = MoveGraph::new();
        let begin = graph.add_node("begin")?;
        let end = graph.add_node("end")?;
        for p0 in 0..=self.max {
            let p1 = self.max - p0;
            if side_to_move == 0 && p0 >= 1 {
                let mut change: ChangeVector = vec![None; 2];
                change[0] = Some((p0, p0 - 1));
                change[1] = Some((p1, p1 + 1));
                graph.add_edge(format!("give_{p0}"), begin, end, vec![], change, vec![])?;
            } else if side_to_move == 1 && p1 >= 1 {
                let mut change: ChangeVector = vec![None; 2];
                change[0] = Some((p0, p0 + 1));
                change[1] = Some((p1, p1 - 1));
                graph.add_edge(format!("take_{p0}"), begin, end, vec![], change, vec![])?;
            }
        }
        Ok(graph)
    }

    fn position_to_string(&self, position: &PositionString) -> String {
        format!("{}/{}", position.chars()[0], position.chars()[1])
    }

    fn won(&self, side: u8) -> Option<Ldfa> {
        let shape = self.shape();
        if side == 0 {
            constructors::fixed(shape, &[(1, self.max)]).ok()
        } else {
            constructors::fixed(shape, &[(0, self.max)]).ok()
        }
    }
}

fn scratch_config() -> (tempfile::TempDir, SolverConfig) {
    let dir = tempfile::tempdir().unwrap();
    let config = SolverConfig::new(dir.path().join("scratch"), dir.path().join("cache"));
    (dir, config)
}

#[test]
fn counter_game_forward_and_backward_agree_on_reachability() {
    let (_guard, config) = scratch_config();
    let solver = Solver::new(CounterGame { max: 4 }, config).unwrap();

    let initial = solver.get_positions_initial().unwrap();
    let after_one = solver.get_moves_forward(0, &initial).unwrap();
    assert!(after_one.contains(&PositionString::from(vec![3, 1])));

    let predecessors = solver.get_moves_backward(0, &after_one).unwrap();
    assert!(predecessors.intersection(&initial).unwrap().has_reachable_accepting_state());
}

#[test]
fn counter_game_side_zero_forces_the_pile_to_empty() {
    let (_guard, config) = scratch_config();
    let solver = Solver::new(CounterGame { max: 4 }, config).unwrap();

    let winning = solver.get_positions_winning(0, 4).unwrap();
    let initial = solver.get_positions_initial().unwrap();
    assert!(winning.intersection(&initial).unwrap().has_reachable_accepting_state());
}

#[test]
fn persisted_ldfa_round_trips_through_the_solver_store() {
    let (_guard, config) = scratch_config();
    let solver = Solver::new(CounterGame { max: 3 }, config).unwrap();

    let initial = solver.get_positions_initial().unwrap();
    let hash = solver.save(&initial).unwrap();
    let reloaded = solver.load_by_hash(hash).unwrap();
    assert_eq!(reloaded.content_hash(), initial.content_hash());

    let built = solver
        .load_or_build("initial", || solver.get_positions_initial())
        .unwrap();
    assert_eq!(built.content_hash(), initial.content_hash());
}
