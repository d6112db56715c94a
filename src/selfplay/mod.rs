use std::fs::{create_dir_all, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use cozy_chess::Color;
use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::board::Position;
use crate::config::SelectorConfig;
use crate::error::{EngineError, Result};
use crate::search::MoveSelector;

#[derive(Clone, Debug)]
pub struct SelfPlayParams {
    pub games: usize,
    pub max_plies: usize,
    pub seed: u64,
    pub selector: SelectorConfig,
    pub openings_path: Option<PathBuf>, // optional FEN/EPD list, one per line
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    Checkmate,
    Stalemate,
    FiftyMoves,
    MaxPlies,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub index: usize,
    pub start_fen: String,
    pub moves: Vec<String>,
    pub result: i8, // 1 white win, 0 draw, -1 black win
    pub termination: Termination,
}

/// Plays `params.games` games of the guard engine against itself.
///
/// Game `i` is seeded with `seed ^ i`, so results do not depend on how rayon
/// schedules the games.
pub fn generate_games(params: &SelfPlayParams) -> Result<Vec<GameRecord>> {
    generate_games_with(params, |_| {})
}

/// Like [`generate_games`], calling `on_game` as each game finishes.
pub fn generate_games_with<F>(params: &SelfPlayParams, on_game: F) -> Result<Vec<GameRecord>>
where
    F: Fn(&GameRecord) + Sync,
{
    let openings = load_openings(params)?;
    let games: Result<Vec<GameRecord>> = (0..params.games)
        .into_par_iter()
        .map(|gi| {
            let start = if openings.is_empty() { Position::startpos() } else { openings[gi % openings.len()].clone() };
            let record = play_game(params, gi, start)?;
            on_game(&record);
            Ok(record)
        })
        .collect();
    let games = games?;
    info!("played {} self-play games", games.len());
    Ok(games)
}

fn play_game(params: &SelfPlayParams, index: usize, mut pos: Position) -> Result<GameRecord> {
    let mut selector = MoveSelector::seeded(params.selector.clone(), params.seed ^ index as u64);
    let start_fen = pos.fen();
    let termination = loop {
        if pos.is_checkmate() { break Termination::Checkmate; }
        if pos.is_stalemate() { break Termination::Stalemate; }
        if pos.is_fifty_move_draw() { break Termination::FiftyMoves; }
        if pos.ply_count() >= params.max_plies { break Termination::MaxPlies; }
        let mv = selector.choose_move(&mut pos)?;
        pos.apply(mv)?;
    };
    let result = match termination {
        Termination::Checkmate if pos.side_to_move() == Color::White => -1,
        Termination::Checkmate => 1,
        _ => 0,
    };
    Ok(GameRecord { index, start_fen, moves: pos.history_uci(), result, termination })
}

fn load_openings(params: &SelfPlayParams) -> Result<Vec<Position>> {
    let mut out = Vec::new();
    let Some(ref p) = params.openings_path else { return Ok(out) };
    let unreadable = |source: std::io::Error| EngineError::Openings { path: p.display().to_string(), source };
    let f = File::open(p).map_err(unreadable)?;
    for (n, line) in BufReader::new(f).lines().enumerate() {
        let line = line.map_err(unreadable)?;
        let raw = line.trim();
        if raw.is_empty() || raw.starts_with('#') { continue; }
        // Support EPD (4 fields) by padding halfmove/fullmove
        let parts: Vec<&str> = raw.split_whitespace().collect();
        let fen = if parts.len() >= 6 {
            parts[0..6].join(" ")
        } else if parts.len() >= 4 {
            let mut v = parts[0..4].to_vec();
            v.push("0"); v.push("1"); v.join(" ")
        } else { raw.to_string() };
        match Position::from_fen(&fen) {
            Ok(pos) => out.push(pos),
            Err(e) => warn!("{}:{}: skipping opening: {e}", p.display(), n + 1),
        }
    }
    if out.is_empty() {
        warn!("no usable openings in {}, starting from the initial position", p.display());
    }
    Ok(out)
}

/// Writes one JSON record per line.
pub fn write_jsonl<P: AsRef<Path>>(games: &[GameRecord], path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        create_dir_all(dir).with_context(|| format!("create output dir: {}", dir.display()))?;
    }
    let mut w = BufWriter::new(File::create(path).with_context(|| format!("create {}", path.display()))?);
    for g in games {
        serde_json::to_writer(&mut w, g).context("serialize game record")?;
        w.write_all(b"\n")?;
    }
    w.flush()?;
    Ok(())
}

pub fn read_jsonl<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<GameRecord>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut out = Vec::new();
    for (n, line) in BufReader::new(f).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        out.push(serde_json::from_str(&line).with_context(|| format!("{}:{}", path.display(), n + 1))?);
    }
    Ok(out)
}
