//! Reference `GameEncoder` implementations over `ldfa-core`
//! (`SPEC_FULL.md` §2, §10): TicTacToe, Nim, Breakthrough, and Amazons, used
//! by `ldfa-core`'s and this crate's integration tests and by `ldfa-cli`.
//! Kept deliberately minimal — these exist to exercise the solver core
//! end-to-end, not to be competitive game implementations.
pub mod amazons;
pub mod breakthrough;
pub mod grid;
pub mod nim;
pub mod tictactoe;

pub use amazons::Amazons;
pub use breakthrough::Breakthrough;
pub use nim::Nim;
pub use tictactoe::TicTacToe;
