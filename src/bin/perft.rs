use std::time::Instant;

use clap::Parser;
use guardbot::perft::perft;
use guardbot::Position;

#[derive(Parser, Debug)]
#[command(name = "perft", about = "Perft driver for GuardBot's position stack")]
struct Args {
    /// Search depth
    #[arg(value_name = "DEPTH")]
    depth: u32,
    /// FEN string or "startpos"
    #[arg(value_name = "FEN", default_value = "startpos")]
    fen: String,
    /// Report elapsed time and NPS
    #[arg(long, default_value_t = false)]
    nps: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut pos = if args.fen == "startpos" { Position::startpos() } else { Position::from_fen(&args.fen)? };

    let t0 = Instant::now();
    let nodes = perft(&mut pos, args.depth)?;
    let dt = t0.elapsed().as_secs_f64();

    if args.nps { println!("nodes: {nodes} elapsed: {:.3}s nps: {:.1}", dt, nodes as f64 / dt.max(f64::EPSILON)); }
    else { println!("nodes: {nodes}"); }
    Ok(())
}
