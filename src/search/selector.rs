use cozy_chess::{Move, Piece};
use log::{debug, trace};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::board::Position;
use crate::config::{Selection, SelectorConfig};
use crate::error::{EngineError, Result};
use crate::search::mate::find_mate_among;
use crate::search::rating::{rate, Rating};
use crate::search::safety::{assess, HazardReport, Severity};

/// Why a move was chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Mate,
    QueenCapture,
    Safe,
    LeastBad(Severity),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Choice {
    pub mv: Move,
    pub verdict: Verdict,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub mv: Move,
    pub report: HazardReport,
    pub rating: Rating,
}

impl Candidate {
    pub fn severity(&self) -> Option<Severity> { self.report.worst() }
}

/// Candidates split by whether any hazard fired.
#[derive(Clone, Debug, Default)]
pub struct Classification {
    pub safe: Vec<Candidate>,
    pub unsafe_moves: Vec<Candidate>,
}

impl Classification {
    /// The least severe tag among unsafe moves.
    pub fn least_severity(&self) -> Option<Severity> {
        self.unsafe_moves.iter().filter_map(Candidate::severity).min()
    }
}

/// Picks one move per turn: mates first, then queen grabs, then the safest
/// candidate. Holds no game state besides its random source.
pub struct MoveSelector<R = SmallRng> {
    config: SelectorConfig,
    rng: R,
}

impl MoveSelector<SmallRng> {
    pub fn seeded(config: SelectorConfig, seed: u64) -> Self { Self::new(config, SmallRng::seed_from_u64(seed)) }

    pub fn reseed(&mut self, seed: u64) { self.rng = SmallRng::seed_from_u64(seed); }
}

impl<R: Rng> MoveSelector<R> {
    pub fn new(config: SelectorConfig, rng: R) -> Self { Self { config, rng } }

    pub fn config(&self) -> &SelectorConfig { &self.config }

    pub fn config_mut(&mut self) -> &mut SelectorConfig { &mut self.config }

    /// Chooses a legal move. `pos` is left exactly as it was passed in.
    pub fn choose_move(&mut self, pos: &mut Position) -> Result<Move> { Ok(self.decide(pos)?.mv) }

    pub fn decide(&mut self, pos: &mut Position) -> Result<Choice> {
        let mut moves = pos.legal_moves();
        if moves.is_empty() {
            return Err(EngineError::NoLegalMoves { fen: pos.fen() });
        }
        if self.config.shuffle {
            moves.shuffle(&mut self.rng);
        }

        if let Some(mv) = find_mate_among(pos, &moves)? {
            debug!("mating with {}", pos.to_uci(mv));
            return Ok(Choice { mv, verdict: Verdict::Mate });
        }

        if let Some(&mv) = moves.iter().find(|&&m| pos.captured_piece(m) == Some(Piece::Queen)) {
            debug!("taking the queen with {}", pos.to_uci(mv));
            return Ok(Choice { mv, verdict: Verdict::QueenCapture });
        }

        let classes = self.classify(pos, &moves)?;
        debug!("{} safe / {} unsafe of {} legal", classes.safe.len(), classes.unsafe_moves.len(), moves.len());
        let choice = self.pick(classes).ok_or_else(|| EngineError::NoLegalMoves { fen: pos.fen() })?;
        if let Verdict::LeastBad(severity) = choice.verdict {
            debug!("no safe moves, playing {} ({:?})", pos.to_uci(choice.mv), severity);
        }
        Ok(choice)
    }

    /// Runs the configured hazards and the rating on every move in `moves`.
    pub fn classify(&self, pos: &mut Position, moves: &[Move]) -> Result<Classification> {
        let mut out = Classification::default();
        for &mv in moves {
            let report = assess(pos, mv, &self.config.hazards, self.config.rules)?;
            let rating = rate(pos, mv)?;
            trace!("{} hazards={:?} rating={:?}", pos.to_uci(mv), report, rating);
            let candidate = Candidate { mv, report, rating };
            if report.is_empty() {
                out.safe.push(candidate);
            } else {
                out.unsafe_moves.push(candidate);
            }
        }
        Ok(out)
    }

    fn pick(&mut self, classes: Classification) -> Option<Choice> {
        if !classes.safe.is_empty() {
            let c = self.pick_among(&classes.safe)?;
            return Some(Choice { mv: c.mv, verdict: Verdict::Safe });
        }
        let least = classes.least_severity()?;
        let pool: Vec<Candidate> =
            classes.unsafe_moves.into_iter().filter(|c| c.severity() == Some(least)).collect();
        let c = self.pick_among(&pool)?;
        Some(Choice { mv: c.mv, verdict: Verdict::LeastBad(least) })
    }

    fn pick_among<'c>(&mut self, pool: &'c [Candidate]) -> Option<&'c Candidate> {
        match self.config.selection {
            Selection::Random => pool.choose(&mut self.rng),
            // max_by_key keeps the last maximum; reversing keeps the first.
            Selection::Rated => pool.iter().rev().max_by_key(|c| c.rating),
        }
    }
}
