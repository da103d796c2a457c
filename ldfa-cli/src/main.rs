//! Thin command-line driver over `ldfa-core` and `ldfa-games`
//! (`SPEC_FULL.md` §10): `info`, `build`, `solve`, and `query` subcommands
//! over a chosen reference game.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;

use ldfa_core::store::Store;
use ldfa_core::{GameEncoder, Ldfa, Result, Shape, Solver, SolverConfig};
use ldfa_games::{Amazons, Breakthrough, Nim, TicTacToe};

#[derive(Parser)]
#[command(name = "ldfa", about = "Symbolic solver over layered deterministic finite automata")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the shape and initial position of a game.
    Info(GameArgs),
    /// Compute the positions reachable after a fixed number of plies.
    Build {
        #[command(flatten)]
        game: GameArgs,
        #[arg(long, default_value_t = 1)]
        ply: usize,
    },
    /// Compute bounded retrograde win/loss sets for one side.
    Solve {
        #[command(flatten)]
        game: GameArgs,
        #[arg(long, default_value_t = 0)]
        side: u8,
        #[arg(long)]
        ply_max: usize,
    },
    /// Load a previously persisted LDFA by its alias name and print its size.
    Query {
        #[arg(long, default_value = "./ldfa-cache")]
        cache_dir: PathBuf,
        #[arg(long)]
        name: String,
    },
}

#[derive(Args)]
struct GameArgs {
    #[arg(long, value_enum)]
    game: GameKind,
    /// Board side length, for `tic-tac-toe`.
    #[arg(long, default_value_t = 3)]
    size: usize,
    /// Starting heap sizes, for `nim`.
    #[arg(long, value_delimiter = ',', default_value = "5,5,5")]
    heaps: Vec<u32>,
    /// Board width, for `breakthrough` and `amazons`.
    #[arg(long, default_value_t = 4)]
    width: usize,
    /// Board height, for `breakthrough` and `amazons`.
    #[arg(long, default_value_t = 4)]
    height: usize,
    #[arg(long, default_value = "./ldfa-scratch")]
    scratch_dir: PathBuf,
    #[arg(long, default_value = "./ldfa-cache")]
    cache_dir: PathBuf,
}

impl GameArgs {
    fn config(&self) -> SolverConfig {
        SolverConfig::new(self.scratch_dir.clone(), self.cache_dir.clone())
    }
}

#[derive(Clone, ValueEnum)]
enum GameKind {
    TicTacToe,
    Nim,
    Breakthrough,
    Amazons,
}

/// The subset of `Solver`'s API the CLI needs, kept game-type-erased so one
/// `match` on [`GameKind`] produces a uniform handle regardless of which
/// concrete `GameEncoder` backs it.
trait SolverOps {
    fn shape(&self) -> &Shape;
    fn get_positions_initial(&self) -> Result<Ldfa>;
    fn get_positions_reachable(&self, ply: usize) -> Result<Ldfa>;
    fn get_positions_winning(&self, side: u8, ply_max: usize) -> Result<Ldfa>;
    fn get_positions_losing(&self, side: u8, ply_max: usize) -> Result<Ldfa>;
}

impl<G: GameEncoder> SolverOps for Solver<G> {
    fn shape(&self) -> &Shape {
        Solver::shape(self)
    }

    fn get_positions_initial(&self) -> Result<Ldfa> {
        Solver::get_positions_initial(self)
    }

    fn get_positions_reachable(&self, ply: usize) -> Result<Ldfa> {
        Solver::get_positions_reachable(self, ply)
    }

    fn get_positions_winning(&self, side: u8, ply_max: usize) -> Result<Ldfa> {
        Solver::get_positions_winning(self, side, ply_max)
    }

    fn get_positions_losing(&self, side: u8, ply_max: usize) -> Result<Ldfa> {
        Solver::get_positions_losing(self, side, ply_max)
    }
}

fn build_solver(game: &GameArgs) -> Result<Box<dyn SolverOps>> {
    let config = game.config();
    let solver: Box<dyn SolverOps> = match game.game {
        GameKind::TicTacToe => Box::new(Solver::new(TicTacToe::new(game.size), config)?),
        GameKind::Nim => Box::new(Solver::new(Nim::new(game.heaps.clone()), config)?),
        GameKind::Breakthrough => {
            Box::new(Solver::new(Breakthrough::new(game.width, game.height), config)?)
        }
        GameKind::Amazons => Box::new(Solver::new(Amazons::new(game.width, game.height), config)?),
    };
    Ok(solver)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Command::Info(game) => {
            let solver = build_solver(game)?;
            println!("shape: {:?}", solver.shape().widths());
            let initial = solver.get_positions_initial()?;
            println!("initial position size: {:?}", initial.size_exact_u128());
        }
        Command::Build { game, ply } => {
            let solver = build_solver(game)?;
            let reachable = solver.get_positions_reachable(*ply)?;
            info!("reachable after {ply} ply: {} states in layer 0", reachable.state_count(0));
            println!("positions after {ply} ply: {:?}", reachable.size_exact_u128());
        }
        Command::Solve {
            game,
            side,
            ply_max,
        } => {
            let solver = build_solver(game)?;
            let initial = solver.get_positions_initial()?;
            let winning = solver.get_positions_winning(*side, *ply_max)?;
            let losing = solver.get_positions_losing(*side, *ply_max)?;
            let forces_win = winning
                .intersection(&initial)?
                .has_reachable_accepting_state();
            let forced_to_lose = losing
                .intersection(&initial)?
                .has_reachable_accepting_state();
            println!("side {side} forces a win from the initial position: {forces_win}");
            println!("side {side} is forced to lose from the initial position: {forced_to_lose}");
        }
        Command::Query { cache_dir, name } => {
            let config = SolverConfig::new(cache_dir.clone(), cache_dir.clone());
            let store = Store::new(config);
            let ldfa = store.load(name)?;
            println!(
                "{name}: {} states in layer 0, size {:?}",
                ldfa.state_count(0),
                ldfa.size_exact_u128()
            );
        }
    }

    Ok(())
}
