//! Game encoder interface and solver (`spec.md` §6). A [`GameEncoder`] gives
//! the core a shape, an initial position, and a move graph per side to move;
//! [`Solver`] composes those into forward/backward ply operators and bounded
//! retrograde win/loss analysis. Reference encoders (TicTacToe, Nim,
//! Breakthrough, Amazons) live in the separate `ldfa-games` crate
//! (`SPEC_FULL.md` §6), kept out of the core per the Non-goals.
use log::debug;

use crate::error::Result;
use crate::ldfa::constructors;
use crate::ldfa::Ldfa;
use crate::movegraph::{self, MoveGraph};
use crate::shape::{PositionString, Shape};
use crate::store::Store;
use crate::config::SolverConfig;
use crate::hash::Hash256;

/// What a game contributes to the core: a shape, a starting position, a
/// move graph per side to move, and a debug pretty-printer. `won`/`lost`
/// are optional terminal-position sets used by [`Solver::get_positions_winning`]
/// and [`Solver::get_positions_losing`].
pub trait GameEncoder {
    fn shape(&self) -> Shape;
    fn initial_position(&self) -> PositionString;
    fn move_graph(&self, side_to_move: u8) -> Result<MoveGraph>;
    fn position_to_string(&self, position: &PositionString) -> String;

    fn won(&self, _side: u8) -> Option<Ldfa> {
        None
    }
    fn lost(&self, _side: u8) -> Option<Ldfa> {
        None
    }
}

fn other_side(side: u8) -> u8 {
    1 - side
}

/// Drives a [`GameEncoder`] through the operations of `spec.md` §6: forward
/// and backward ply application, bounded reachability, bounded retrograde
/// win/loss analysis, and persistence via [`Store`].
pub struct Solver<G: GameEncoder> {
    encoder: G,
    shape: Shape,
    forward_graphs: [MoveGraph; 2],
    backward_graphs: [MoveGraph; 2],
    store: Store,
}

impl<G: GameEncoder> Solver<G> {
    pub fn new(encoder: G, config: SolverConfig) -> Result<Self> {
        let shape = encoder.shape();
        let forward = [encoder.move_graph(0)?, encoder.move_graph(1)?];
        let backward = [forward[0].reverse(), forward[1].reverse()];
        let store = Store::new(config);
        Ok(Solver {
            encoder,
            shape,
            forward_graphs: forward,
            backward_graphs: backward,
            store,
        })
    }

    pub fn encoder(&self) -> &G {
        &self.encoder
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The LDFA containing exactly the encoder's initial position.
    pub fn get_positions_initial(&self) -> Result<Ldfa> {
        constructors::from_strings(&self.shape, &[self.encoder.initial_position()])
    }

    /// All positions reachable by one ply of `side` from any position in
    /// `positions`.
    pub fn get_moves_forward(&self, side: u8, positions: &Ldfa) -> Result<Ldfa> {
        movegraph::evaluate(&self.forward_graphs[side as usize], positions)
    }

    /// All positions from which at least one ply of `side` lands inside
    /// `positions` (`spec.md` §8, property 7: the adjoint of
    /// [`Solver::get_moves_forward`]).
    pub fn get_moves_backward(&self, side: u8, positions: &Ldfa) -> Result<Ldfa> {
        movegraph::evaluate(&self.backward_graphs[side as usize], positions)
    }

    /// Positions reachable after exactly `ply` plies from the initial
    /// position, alternating the side to move starting with side 0.
    pub fn get_positions_reachable(&self, ply: usize) -> Result<Ldfa> {
        let mut positions = self.get_positions_initial()?;
        for p in 0..ply {
            let side = (p % 2) as u8;
            positions = self.get_moves_forward(side, &positions)?;
            debug!("ply {}: {} states in layer 0", p + 1, positions.state_count(0));
        }
        Ok(positions)
    }

    /// Positions where `side` is to move and can force a win within
    /// `ply_max` plies, by bounded backward induction: `side` wins
    /// immediately at a `won(side)` position, or by any move landing in a
    /// position where the opponent is forced to lose with fewer plies
    /// remaining.
    pub fn get_positions_winning(&self, side: u8, ply_max: usize) -> Result<Ldfa> {
        Ok(self.retrograde(ply_max)?[side as usize].0.clone())
    }

    /// Positions where `side` is to move and cannot avoid losing within
    /// `ply_max` plies: `side` is already in `lost(side)`, or every move
    /// available to `side` lands in a position winning for the opponent.
    pub fn get_positions_losing(&self, side: u8, ply_max: usize) -> Result<Ldfa> {
        Ok(self.retrograde(ply_max)?[side as usize].1.clone())
    }

    fn retrograde(&self, ply_max: usize) -> Result<[(Ldfa, Ldfa); 2]> {
        let reject = constructors::reject(self.shape.clone())?;
        let accept = constructors::accept(self.shape.clone())?;
        let mut win = [
            self.encoder.won(0).unwrap_or_else(|| reject.clone()),
            self.encoder.won(1).unwrap_or_else(|| reject.clone()),
        ];
        let mut lose = [
            self.encoder.lost(0).unwrap_or_else(|| reject.clone()),
            self.encoder.lost(1).unwrap_or_else(|| reject.clone()),
        ];

        for depth in 0..ply_max {
            let mut next_win = win.clone();
            let mut next_lose = lose.clone();
            for side in 0..2u8 {
                let opp = other_side(side);

                // side wins now if it already won, or some move lands
                // where the opponent is forced to lose with one fewer ply.
                let forces_opp_to_lose = self.get_moves_backward(side, &lose[opp as usize])?;
                next_win[side as usize] = win[side as usize].union(&forces_opp_to_lose)?;

                // side loses now if it already lost, or it has at least
                // one move available and every move lands in a position
                // winning for the opponent.
                let has_a_move = self.get_moves_backward(side, &accept)?;
                let escapes_loss = self.get_moves_backward(side, &win[opp as usize].complement())?;
                let forced_into_opp_win = has_a_move.difference(&escapes_loss)?;
                next_lose[side as usize] = lose[side as usize].union(&forced_into_opp_win)?;
            }
            win = next_win;
            lose = next_lose;
            debug!("retrograde depth {}", depth + 1);
        }

        Ok([(win[0].clone(), lose[0].clone()), (win[1].clone(), lose[1].clone())])
    }

    pub fn load(&self, name: &str) -> Result<Ldfa> {
        self.store.load(name)
    }

    pub fn load_by_hash(&self, hash: Hash256) -> Result<Ldfa> {
        self.store.load_by_hash(hash)
    }

    pub fn load_or_build(&self, name: &str, build_fn: impl FnOnce() -> Result<Ldfa>) -> Result<Ldfa> {
        self.store.load_or_build(name, build_fn)
    }

    pub fn save(&self, ldfa: &Ldfa) -> Result<Hash256> {
        self.store.save(ldfa)
    }
}
