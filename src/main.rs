use std::fs;
use std::path::PathBuf;
use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use potlife::{export, literal, Universe};

/// Run a one-dimensional pot automaton and print its score.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
  /// Puzzle file: an `initial state:` line followed by `PPPPP => R` rules.
  input: PathBuf,

  /// Number of generations to simulate before scoring.
  #[arg(short, long, default_value_t = 20)]
  generations: u64,

  /// Also print the score after this many generations, extrapolated once
  /// the pattern starts repeating.
  #[arg(short, long)]
  forecast: Option<u64>,

  /// Save a space-time diagram of the simulated generations.
  #[arg(long)]
  image: Option<PathBuf>,

  /// Log at debug level unless `RUST_LOG` is set.
  #[arg(short, long)]
  verbose: bool,
}

fn main() -> anyhow::Result<()> {
  let args = Args::parse();

  let level = if args.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
    .with_writer(std::io::stderr)
    .init();

  let src = fs::read_to_string(&args.input)
    .with_context(|| format!("failed to read {}", args.input.display()))?;
  let (tape, rules) = literal::read_puzzle(&src)
    .with_context(|| format!("failed to parse {}", args.input.display()))?;
  let mut uni = Universe::new(tape.iter().copied(), rules)?;
  info!(cells = tape.len(), births = uni.rules().births().count(), "loaded puzzle");

  match &args.image {
    Some(path) => export::save_image(&mut uni, args.generations, path)
      .with_context(|| format!("failed to save {}", path.display()))?,
    None => uni.simulate(args.generations),
  }
  info!(generation = uni.generation(), cells = uni.real_cells(), "simulated");
  println!("{}", uni.score());

  if let Some(num_gen) = args.forecast {
    let mut uni = Universe::new(tape, rules)?;
    let score = uni.forecast(num_gen)
      .with_context(|| format!("failed to forecast generation {}", num_gen))?;
    println!("{}", score);
  }

  Ok(())
}
