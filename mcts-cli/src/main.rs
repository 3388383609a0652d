//! mcts-cli - command-line demo harness for the batched PUCT engine
//!
//! This crate plays no part in the search algorithm itself; it exists only
//! so the engine can be exercised end to end with a toy evaluator (no real
//! policy/value network ships with this repo).
//!
//! Commands:
//! - play: self-play a game, printing the board after every move
//! - bench: compare wall-clock time across a few batch sizes

use clap::{Parser, Subcommand};
use mcts_core::{Board, CHESSBOARD_SIZE, IN_A_ROW, NUM_CELLS};
use mcts_search::{Engine, Evaluator};
use rand::{Rng, SeedableRng};
use tracing::info;

#[derive(Parser)]
#[command(name = "mcts-cli")]
#[command(about = "Batched PUCT engine demo")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Self-play a full game with a toy evaluator
    Play {
        #[arg(long, default_value = "200")]
        simulations: usize,
        #[arg(long, default_value = "3.0")]
        cpuct: f64,
        #[arg(long, default_value = "0.3")]
        dirichlet_alpha: f64,
        #[arg(long, default_value = "1.0")]
        vloss: f64,
        #[arg(long, default_value = "8")]
        batch_size: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Compare wall-clock time across a few batch sizes
    Bench {
        #[arg(long, default_value = "500")]
        simulations: usize,
        #[arg(long, value_delimiter = ',', default_value = "1,8,32")]
        batch_sizes: Vec<usize>,
    },
}

/// A deterministic-given-seed stand-in for a real policy/value network:
/// near-uniform priors with a small random perturbation, zero value. Good
/// enough to drive the search loop's mechanics; nothing about its output
/// should be trusted as game-playing strength.
struct TinyRandomEvaluator {
    rng: rand_chacha::ChaCha8Rng,
}

impl TinyRandomEvaluator {
    fn new(seed: u64) -> Self {
        Self {
            rng: rand_chacha::ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Evaluator for TinyRandomEvaluator {
    fn evaluate(&mut self, boards: &[Board], out_p: &mut [[f64; NUM_CELLS]], out_v: &mut [f64]) {
        for i in 0..boards.len() {
            let mut p = [0.0; NUM_CELLS];
            let mut sum = 0.0;
            for slot in p.iter_mut() {
                *slot = 1.0 + self.rng.gen::<f64>();
                sum += *slot;
            }
            for slot in p.iter_mut() {
                *slot /= sum;
            }
            out_p[i] = p;
            out_v[i] = self.rng.gen_range(-0.1..0.1);
        }
    }
}

fn print_board(board: &Board) {
    for x in 0..CHESSBOARD_SIZE {
        let mut row = String::new();
        for y in 0..CHESSBOARD_SIZE {
            if board.at(0, x, y) > 0 {
                row.push('X');
            } else if board.at(1, x, y) > 0 {
                row.push('O');
            } else {
                row.push('.');
            }
            row.push(' ');
        }
        println!("{row}");
    }
}

fn play(simulations: usize, cpuct: f64, dirichlet_alpha: f64, vloss: f64, batch_size: usize, seed: Option<u64>) {
    let seed = seed.unwrap_or(42);
    let mut engine = Engine::new(Board::empty(), vloss, batch_size, TinyRandomEvaluator::new(seed));

    let mut move_count = 0usize;
    loop {
        if engine.terminated() {
            info!(moves = move_count, value = engine.value(), "game over");
            print_board(&Board::from_bytes(&engine.chessboard()));
            break;
        }

        engine.search(simulations, cpuct, dirichlet_alpha);

        let mut pi = [0.0; NUM_CELLS];
        engine.get_pi(0.0, &mut pi);
        let best_idx = pi
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(idx, _)| idx)
            .expect("GetPi returned an all-zero vector on a non-terminal root");

        let x = best_idx / CHESSBOARD_SIZE;
        let y = best_idx % CHESSBOARD_SIZE;
        engine.step_forward(x, y);
        move_count += 1;
        info!(move_count, x, y, "played move");
    }
}

fn bench(simulations: usize, batch_sizes: &[usize]) {
    for &batch_size in batch_sizes {
        let mut engine = Engine::new(Board::empty(), 1.0, batch_size, TinyRandomEvaluator::new(7));
        let start = std::time::Instant::now();
        engine.search(simulations, 3.0, 0.0);
        let elapsed = start.elapsed();
        info!(batch_size, simulations, ?elapsed, "bench run complete");
        println!("batch_size={batch_size:>4}  simulations={simulations:>6}  elapsed={elapsed:?}");
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    info!(chessboard_size = CHESSBOARD_SIZE, in_a_row = IN_A_ROW, "mcts-cli starting");

    match cli.command {
        Commands::Play {
            simulations,
            cpuct,
            dirichlet_alpha,
            vloss,
            batch_size,
            seed,
        } => play(simulations, cpuct, dirichlet_alpha, vloss, batch_size, seed),
        Commands::Bench { simulations, batch_sizes } => bench(simulations, &batch_sizes),
    }

    Ok(())
}
