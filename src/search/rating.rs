use cozy_chess::{Color, Move, Piece};
use serde::Serialize;

use crate::board::Position;
use crate::error::Result;

/// Tie-break features for a candidate move. Field order is the comparison
/// order; larger compares better.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Rating {
    pub en_passant: bool,
    pub captures_piece: bool,
    pub capture: bool,
    pub check: bool,
    pub castling: bool,
    /// Ranks gained toward the opponent's side.
    pub advance: i8,
    pub zeroing: bool,
}

pub fn rate(pos: &mut Position, mv: Move) -> Result<Rating> {
    let sign: i8 = if pos.side_to_move() == Color::White { 1 } else { -1 };
    let en_passant = pos.is_en_passant(mv);
    let captured = pos.captured_piece(mv);
    Ok(Rating {
        en_passant,
        captures_piece: !en_passant && captured.is_some_and(|p| p != Piece::Pawn),
        capture: captured.is_some(),
        check: pos.gives_check(mv)?,
        castling: pos.is_castling(mv),
        advance: (mv.to.rank() as i8 - mv.from.rank() as i8) * sign,
        zeroing: pos.is_zeroing(mv),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rated(pos: &mut Position, uci: &str) -> Rating {
        let mv = pos.find_move(uci).unwrap();
        rate(pos, mv).unwrap()
    }

    #[test]
    fn double_push_beats_knight_development() {
        let mut pos = Position::startpos();
        let e4 = rated(&mut pos, "e2e4");
        let nf3 = rated(&mut pos, "g1f3");
        assert_eq!(e4.advance, 2);
        assert_eq!(nf3.advance, 2);
        assert!(e4.zeroing && !nf3.zeroing);
        assert!(e4 > nf3);
        assert!(e4 > rated(&mut pos, "e2e3"));
    }

    #[test]
    fn advance_is_signed_for_black() {
        let moves = vec!["e2e4".to_string()];
        let mut pos = Position::set_from_start_and_moves(&moves).unwrap();
        assert_eq!(rated(&mut pos, "e7e5").advance, 2);
        assert_eq!(rated(&mut pos, "b8c6").advance, 2);
    }

    #[test]
    fn piece_capture_outranks_pawn_capture() {
        // Rxd4 takes a knight, Rxa5 takes a pawn.
        let mut pos = Position::from_fen("4k3/8/8/p7/3n4/8/8/R2RK3 w - - 0 1").unwrap();
        let rxd4 = rated(&mut pos, "d1d4");
        let rxa5 = rated(&mut pos, "a1a5");
        let quiet = rated(&mut pos, "d1d2");
        assert!(rxd4.captures_piece && rxd4.capture);
        assert!(!rxa5.captures_piece && rxa5.capture);
        assert!(rxd4 > rxa5);
        assert!(rxa5 > quiet);
    }

    #[test]
    fn checks_are_detected_without_moving() {
        let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let before = pos.fen();
        assert!(rated(&mut pos, "a1a8").check);
        assert!(!rated(&mut pos, "a1a7").check);
        assert_eq!(pos.fen(), before);
    }

    #[test]
    fn en_passant_ranks_first() {
        let mut pos = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
        let ep = rated(&mut pos, "e5d6");
        let push = rated(&mut pos, "e5e6");
        assert!(ep.en_passant && ep.capture && !ep.captures_piece);
        assert!(ep > push);
    }
}
