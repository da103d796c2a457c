//! # ldfa-core
//!
//! Layered deterministic finite automata for symbolic game-position solving
//! (`spec.md` §1). This crate is the solver core: the LDFA data structure
//! and builder (`ldfa`), minimization and the binary set-algebra engine
//! (`ldfa::minimize`, `ldfa::algebra`), the change operator and move graph
//! evaluator (`ldfa::change`, `movegraph`), the out-of-core storage layer
//! (`storage`), content-addressed persistence (`store`), and the
//! `GameEncoder`/`Solver` interface consumed by game implementations
//! (`game`).
//!
//! Game rule encoders live in the separate `ldfa-games` crate; a thin CLI
//! driver lives in `ldfa-cli`.
pub mod config;
pub mod error;
pub mod game;
pub mod hash;
pub mod ldfa;
pub mod movegraph;
pub mod shape;
pub mod storage;
pub mod store;

pub use config::SolverConfig;
pub use error::{LdfaError, Result};
pub use game::{GameEncoder, Solver};
pub use ldfa::{Ldfa, LdfaBuilder, StateId};
pub use movegraph::MoveGraph;
pub use shape::{PositionString, Shape};

#[cfg(test)]
mod tests;
