use std::io::{self, BufRead, Write};

use clap::ValueEnum;
use log::warn;

use crate::board::Position;
use crate::config::{Selection, SelectorConfig};
use crate::search::safety::RuleSet;
use crate::search::MoveSelector;

pub struct UciEngine {
    pos: Position,
    selector: MoveSelector,
}

impl UciEngine {
    pub fn new(config: SelectorConfig, seed: u64) -> Self {
        Self { pos: Position::startpos(), selector: MoveSelector::seeded(config, seed) }
    }

    pub fn position(&self) -> &Position { &self.pos }

    pub fn config(&self) -> &SelectorConfig { self.selector.config() }

    fn cmd_uci(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "id name GuardBot")?;
        writeln!(out, "id author GuardBot Team")?;
        writeln!(out, "option name Rules type combo default simple var simple var elaborate")?;
        writeln!(out, "option name Selection type combo default rated var rated var random")?;
        writeln!(out, "option name Seed type string default 0")?;
        writeln!(out, "uciok")
    }

    fn cmd_ucinewgame(&mut self) { self.pos = Position::startpos(); }

    fn cmd_position(&mut self, args: &str) {
        // Supports: 'position startpos [moves ...]' and 'position fen <fen> [moves ...]'
        let mut tokens = args.split_whitespace();
        let parsed = match tokens.next() {
            Some("startpos") => {
                let moves = moves_after_keyword(&mut tokens);
                Position::set_from_start_and_moves(&moves)
            }
            Some("fen") => {
                // FEN runs up to the moves keyword; pad EPD-style 4 fields
                let mut fields: Vec<&str> = tokens.by_ref().take_while(|t| *t != "moves").collect();
                match fields.len() {
                    6 => {}
                    4 => fields.extend(["0", "1"]),
                    n => {
                        warn!("position fen needs 4 or 6 fields, got {n}");
                        return;
                    }
                }
                let moves: Vec<String> = tokens.map(str::to_string).collect();
                Position::set_from_fen_and_moves(&fields.join(" "), &moves)
            }
            other => {
                warn!("ignoring position command: {:?}", other);
                return;
            }
        };
        match parsed {
            Ok(p) => self.pos = p,
            Err(e) => warn!("bad position command: {e}"),
        }
    }

    fn cmd_go(&mut self, out: &mut impl Write) -> io::Result<()> {
        // Search limits are accepted but irrelevant: the choice is one-ply.
        match self.selector.choose_move(&mut self.pos) {
            Ok(mv) => writeln!(out, "bestmove {}", self.pos.to_uci(mv)),
            Err(e) => {
                warn!("no move: {e}");
                writeln!(out, "bestmove 0000")
            }
        }
    }

    fn cmd_setoption(&mut self, args: &str) {
        // setoption name <id> value <x>
        let Some(rest) = args.strip_prefix("name ") else { return };
        let (name, value) = match rest.split_once(" value ") {
            Some((n, v)) => (n.trim(), v.trim()),
            None => (rest.trim(), ""),
        };
        match name.to_ascii_lowercase().as_str() {
            "rules" => match RuleSet::from_str(value, true) {
                Ok(r) => self.selector.config_mut().rules = r,
                Err(e) => warn!("Rules: {e}"),
            },
            "selection" => match Selection::from_str(value, true) {
                Ok(s) => self.selector.config_mut().selection = s,
                Err(e) => warn!("Selection: {e}"),
            },
            "seed" => match value.parse::<u64>() {
                Ok(seed) => self.selector.reseed(seed),
                Err(e) => warn!("Seed: {e}"),
            },
            _ => warn!("unknown option {name}"),
        }
    }

    /// Handles one command line. Returns false on `quit`.
    pub fn handle_line(&mut self, line: &str, out: &mut impl Write) -> io::Result<bool> {
        let line = line.trim();
        match line {
            "" => {}
            "uci" => self.cmd_uci(out)?,
            "isready" => writeln!(out, "readyok")?,
            "ucinewgame" => self.cmd_ucinewgame(),
            "quit" => return Ok(false),
            "stop" => {}
            "go" => self.cmd_go(out)?,
            _ => {
                if let Some(rest) = line.strip_prefix("position ") {
                    self.cmd_position(rest);
                } else if line.starts_with("go ") {
                    self.cmd_go(out)?;
                } else if let Some(rest) = line.strip_prefix("setoption ") {
                    self.cmd_setoption(rest);
                } else {
                    warn!("unknown command: {line}");
                }
            }
        }
        out.flush()?;
        Ok(true)
    }

    pub fn run_loop(&mut self, input: impl BufRead, mut out: impl Write) -> io::Result<()> {
        for line in input.lines() {
            if !self.handle_line(&line?, &mut out)? { break; }
        }
        Ok(())
    }
}

fn moves_after_keyword<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Vec<String> {
    match tokens.next() {
        Some("moves") => tokens.map(|s| s.to_string()).collect(),
        _ => Vec::new(),
    }
}
