use cozy_chess::{Color, Move, Piece, Square};
use serde::{Deserialize, Serialize};

use crate::board::Position;
use crate::error::Result;
use crate::search::mate::has_mate_in_one;

/// Which version of the attacker/defender rules the piece and queen checks use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RuleSet {
    /// Plain "more attackers than defenders" tests.
    #[default]
    Simple,
    /// Count tests with overrides for even trades and cheap attackers.
    Elaborate,
}

/// How bad an unsafe move is, least severe first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    UndefendedPawn = 1,
    UndefendedPiece = 2,
    ExposedToPawn = 3,
    UndefendedQueen = 4,
    MateAllowed = 5,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hazard {
    AllowsMateInOne,
    LeavesUndefendedQueen,
    ExposesPiecesToPawn,
    LeavesPieceExposedToPawn,
    LeavesUndefendedPiece,
    LeavesTakeablePiece,
    LeavesUndefendedPawn,
}

impl Hazard {
    pub const ALL: [Hazard; 7] = [
        Hazard::AllowsMateInOne,
        Hazard::LeavesUndefendedQueen,
        Hazard::ExposesPiecesToPawn,
        Hazard::LeavesPieceExposedToPawn,
        Hazard::LeavesUndefendedPiece,
        Hazard::LeavesTakeablePiece,
        Hazard::LeavesUndefendedPawn,
    ];

    pub fn severity(self) -> Severity {
        match self {
            Hazard::AllowsMateInOne => Severity::MateAllowed,
            Hazard::LeavesUndefendedQueen => Severity::UndefendedQueen,
            Hazard::ExposesPiecesToPawn | Hazard::LeavesPieceExposedToPawn => Severity::ExposedToPawn,
            Hazard::LeavesUndefendedPiece | Hazard::LeavesTakeablePiece => Severity::UndefendedPiece,
            Hazard::LeavesUndefendedPawn => Severity::UndefendedPawn,
        }
    }

    /// Runs this hazard's predicate for `mv`. The position is restored on return.
    pub fn check(self, pos: &mut Position, mv: Move, rules: RuleSet) -> Result<bool> {
        match self {
            Hazard::AllowsMateInOne => allows_mate_in_one(pos, mv),
            Hazard::LeavesUndefendedQueen => leaves_undefended_queen(pos, mv, rules),
            Hazard::ExposesPiecesToPawn => exposes_pieces_to_pawn(pos, mv),
            Hazard::LeavesPieceExposedToPawn => leaves_piece_exposed_to_pawn(pos, mv),
            Hazard::LeavesUndefendedPiece => leaves_undefended_piece(pos, mv, rules),
            Hazard::LeavesTakeablePiece => leaves_takeable_piece(pos, mv),
            Hazard::LeavesUndefendedPawn => leaves_undefended_pawn(pos, mv),
        }
    }

    fn bit(self) -> u8 { 1 << (self as u8) }
}

/// The set of hazards one candidate move triggered.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HazardReport {
    bits: u8,
}

impl HazardReport {
    pub fn insert(&mut self, hazard: Hazard) { self.bits |= hazard.bit(); }

    pub fn contains(&self, hazard: Hazard) -> bool { self.bits & hazard.bit() != 0 }

    pub fn is_empty(&self) -> bool { self.bits == 0 }

    pub fn len(&self) -> usize { self.bits.count_ones() as usize }

    pub fn iter(&self) -> impl Iterator<Item = Hazard> + '_ {
        Hazard::ALL.into_iter().filter(move |h| self.contains(*h))
    }

    /// Severity of the worst hazard triggered, `None` for a safe move.
    pub fn worst(&self) -> Option<Severity> { self.iter().map(Hazard::severity).max() }
}

impl std::fmt::Debug for HazardReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Runs every hazard in `hazards` against `mv`.
pub fn assess(pos: &mut Position, mv: Move, hazards: &[Hazard], rules: RuleSet) -> Result<HazardReport> {
    let mut report = HazardReport::default();
    for &hazard in hazards {
        if hazard.check(pos, mv, rules)? {
            report.insert(hazard);
        }
    }
    Ok(report)
}

// Pawn < knight < bishop < rook < queen < king.
fn rank_of(piece: Piece) -> u8 { piece as u8 }

/// More enemy attackers than friendly defenders on `sq`.
fn outnumbered(pos: &Position, owner: Color, sq: Square) -> bool {
    pos.attackers(!owner, sq).len() > pos.attackers(owner, sq).len()
}

/// After `mv`, the opponent has a reply that mates.
pub fn allows_mate_in_one(pos: &mut Position, mv: Move) -> Result<bool> {
    let mut child = pos.probe(mv)?;
    has_mate_in_one(&mut child)
}

/// After `mv`, one of the mover's non-pawn pieces is outnumbered.
///
/// Under [`RuleSet::Elaborate`] an even-or-better capture suppresses the count
/// test, while any piece attacked by something cheaper than the mover counts
/// as hanging regardless of defenders.
pub fn leaves_undefended_piece(pos: &mut Position, mv: Move, rules: RuleSet) -> Result<bool> {
    let us = pos.side_to_move();
    let mover_rank = pos.board().piece_on(mv.from).map_or(0, rank_of);
    // En passant lands on an empty square and never counts as a trade.
    let fair_trade = !pos.is_en_passant(mv) && pos.captured_piece(mv).is_some_and(|p| rank_of(p) >= mover_rank);
    let child = pos.probe(mv)?;
    let hanging = child
        .piece_map()
        .filter(|(_, p)| p.color == us && p.piece != Piece::Pawn)
        .any(|(sq, _)| match rules {
            RuleSet::Simple => outnumbered(&child, us, sq),
            RuleSet::Elaborate => {
                let attacked_by_lower = child
                    .attackers(!us, sq)
                    .into_iter()
                    .filter_map(|a| child.board().piece_on(a))
                    .any(|a| rank_of(a) < mover_rank);
                (outnumbered(&child, us, sq) && !fair_trade) || attacked_by_lower
            }
        });
    Ok(hanging)
}

/// After `mv`, the mover's queen is outnumbered.
///
/// Under [`RuleSet::Elaborate`] any attack on the queen counts, unless `mv`
/// took the enemy queen or the only attacker is the enemy queen and ours is
/// defended.
pub fn leaves_undefended_queen(pos: &mut Position, mv: Move, rules: RuleSet) -> Result<bool> {
    let us = pos.side_to_move();
    let took_queen = pos.captured_piece(mv) == Some(Piece::Queen);
    let child = pos.probe(mv)?;
    let queens = child.board().colors(us) & child.board().pieces(Piece::Queen);
    let hanging = queens.into_iter().any(|sq| match rules {
        RuleSet::Simple => outnumbered(&child, us, sq),
        RuleSet::Elaborate => {
            let attackers = child.attackers(!us, sq);
            let defenders = child.attackers(us, sq);
            let queen_trade = attackers.len() == 1
                && !defenders.is_empty()
                && !(attackers & child.board().pieces(Piece::Queen)).is_empty();
            !attackers.is_empty() && !took_queen && !queen_trade
        }
    });
    Ok(hanging)
}

/// After a non-capturing `mv`, one of the mover's pawns is outnumbered.
pub fn leaves_undefended_pawn(pos: &mut Position, mv: Move) -> Result<bool> {
    if pos.is_capture(mv) {
        return Ok(false);
    }
    let us = pos.side_to_move();
    let child = pos.probe(mv)?;
    let pawns = child.board().colors(us) & child.board().pieces(Piece::Pawn);
    Ok(pawns.into_iter().any(|sq| outnumbered(&child, us, sq)))
}

/// After `mv`, some piece of the mover's is attacked and has no defender at all.
pub fn leaves_takeable_piece(pos: &mut Position, mv: Move) -> Result<bool> {
    let us = pos.side_to_move();
    let child = pos.probe(mv)?;
    let takeable = child
        .piece_map()
        .filter(|(_, p)| p.color == us)
        .any(|(sq, _)| !child.attackers(!us, sq).is_empty() && child.attackers(us, sq).is_empty());
    Ok(takeable)
}

/// After `mv`, one of the mover's pawns attacks an enemy non-pawn piece.
pub fn exposes_pieces_to_pawn(pos: &mut Position, mv: Move) -> Result<bool> {
    let us = pos.side_to_move();
    let child = pos.probe(mv)?;
    let forked = child
        .piece_map()
        .filter(|(_, p)| p.color != us && p.piece != Piece::Pawn)
        .any(|(sq, _)| !child.pawn_attackers(us, sq).is_empty());
    Ok(forked)
}

/// After `mv`, an enemy pawn attacks one of the mover's non-pawn pieces.
pub fn leaves_piece_exposed_to_pawn(pos: &mut Position, mv: Move) -> Result<bool> {
    let us = pos.side_to_move();
    let child = pos.probe(mv)?;
    let exposed = child
        .piece_map()
        .filter(|(_, p)| p.color == us && p.piece != Piece::Pawn)
        .any(|(sq, _)| !child.pawn_attackers(!us, sq).is_empty());
    Ok(exposed)
}

/// True when the moved piece's landing square is not hit by an enemy pawn.
pub fn is_safe_from_pawn(pos: &mut Position, mv: Move) -> Result<bool> {
    let us = pos.side_to_move();
    let landing = pos.landing_square(mv);
    let child = pos.probe(mv)?;
    Ok(child.pawn_attackers(!us, landing).is_empty())
}
