use std::path::PathBuf;

use clap::Parser;
use guardbot::config::{Selection, SelectorConfig};
use guardbot::search::safety::RuleSet;
use guardbot::selfplay::{generate_games_with, write_jsonl, SelfPlayParams, Termination};
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Parser, Debug)]
#[command(name = "guardbot-selfplay", about = "Play GuardBot against itself and write JSONL game records")]
struct Args {
    #[arg(long, default_value_t = 100)]
    games: usize,
    #[arg(long, default_value_t = 200)]
    max_plies: usize,
    #[arg(long, default_value_t = 1)]
    threads: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value = "out/selfplay.jsonl")]
    out: PathBuf,
    /// JSON selector config; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    rules: Option<RuleSet>,
    #[arg(long, value_enum)]
    selection: Option<Selection>,
    /// Optional FEN/EPD list to start games from
    #[arg(long)]
    openings: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let a = Args::parse();
    let mut selector = match &a.config {
        Some(p) => SelectorConfig::load(p)?,
        None => SelectorConfig::default(),
    };
    if let Some(r) = a.rules { selector.rules = r; }
    if let Some(s) = a.selection { selector.selection = s; }
    let params = SelfPlayParams {
        games: a.games,
        max_plies: a.max_plies,
        seed: a.seed,
        selector,
        openings_path: a.openings,
    };

    let pb = ProgressBar::new(a.games as u64);
    pb.set_style(ProgressStyle::with_template("{bar:40} {pos}/{len} games {elapsed_precise}")?);
    let pool = rayon::ThreadPoolBuilder::new().num_threads(a.threads.max(1)).build()?;
    let games = pool.install(|| generate_games_with(&params, |_| pb.inc(1)))?;
    pb.finish();

    let mates = games.iter().filter(|g| g.termination == Termination::Checkmate).count();
    let white = games.iter().filter(|g| g.result > 0).count();
    let black = games.iter().filter(|g| g.result < 0).count();
    eprintln!("{} games: {} mates (white {}, black {}), {} undecided", games.len(), mates, white, black, games.len() - mates);
    write_jsonl(&games, &a.out)?;
    eprintln!("Wrote {}", a.out.display());
    Ok(())
}
