use cozy_chess::Move;

use crate::board::Position;
use crate::error::Result;

/// Returns the first of `moves` that checkmates, trying them in order.
pub fn find_mate_among(pos: &mut Position, moves: &[Move]) -> Result<Option<Move>> {
    for &mv in moves {
        if pos.with_move(mv, |p| p.is_checkmate())? {
            return Ok(Some(mv));
        }
    }
    Ok(None)
}

/// Returns the first reply for the side to move that checkmates its opponent.
pub fn find_mate_in_one(pos: &mut Position) -> Result<Option<Move>> {
    let replies = pos.legal_moves();
    find_mate_among(pos, &replies)
}

/// True if the side to move has a mating reply.
pub fn has_mate_in_one(pos: &mut Position) -> Result<bool> {
    Ok(find_mate_in_one(pos)?.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_back_rank_mate() {
        // Ra1-a8 is mate against the boxed-in king.
        let mut pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let before = pos.fen();
        let mv = find_mate_in_one(&mut pos).unwrap().expect("mate exists");
        assert_eq!(pos.to_uci(mv), "a1a8");
        assert_eq!(pos.fen(), before);
    }

    #[test]
    fn startpos_has_no_mate() {
        let mut pos = Position::startpos();
        assert!(!has_mate_in_one(&mut pos).unwrap());
        assert_eq!(pos.ply_count(), 0);
    }
}
