use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use guardbot::config::{Selection, SelectorConfig};
use guardbot::search::safety::RuleSet;
use guardbot::uci::UciEngine;
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "GuardBot: a cautious chess opponent speaking UCI", long_about = None)]
struct Args {
    /// JSON selector config; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Hazard rule set
    #[arg(long, value_enum)]
    rules: Option<RuleSet>,

    /// How to pick among equally safe moves
    #[arg(long, value_enum)]
    selection: Option<Selection>,

    /// Seed for move shuffling and random picks
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Evaluate moves in generation order instead of shuffling
    #[arg(long)]
    no_shuffle: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SelectorConfig::load(path)?,
        None => SelectorConfig::default(),
    };
    if let Some(rules) = args.rules { config.rules = rules; }
    if let Some(selection) = args.selection { config.selection = selection; }
    if args.no_shuffle { config.shuffle = false; }
    info!("starting UCI loop with {:?}, seed {}", config, args.seed);

    let mut engine = UciEngine::new(config, args.seed);
    engine.run_loop(io::stdin().lock(), io::stdout().lock())?;
    Ok(())
}
