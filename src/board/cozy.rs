use std::ops::{Deref, DerefMut};

use cozy_chess::{
    get_bishop_moves, get_king_moves, get_knight_moves, get_pawn_attacks, get_rook_moves, BitBoard,
    Board as CozyBoard, Color, File, Move, Piece, Square,
};

use crate::error::{EngineError, Result};

/// A piece together with its owner, as found on a square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColoredPiece {
    pub color: Color,
    pub piece: Piece,
}

/// Live game state: the current cozy board plus a make/unmake stack.
///
/// cozy boards are copy-make only, so `apply` snapshots the parent board and
/// `undo` restores it. This gives exact round trips, including castling
/// rights, en passant and clocks.
#[derive(Clone, Debug)]
pub struct Position {
    board: CozyBoard,
    stack: Vec<(CozyBoard, Move)>,
}

impl Default for Position {
    fn default() -> Self { Self::startpos() }
}

impl Position {
    pub fn startpos() -> Self {
        Self { board: CozyBoard::default(), stack: Vec::with_capacity(128) }
    }

    pub fn from_fen(fen: &str) -> Result<Self> {
        CozyBoard::from_fen(fen.trim(), false)
            .map(|b| Self { board: b, stack: Vec::with_capacity(128) })
            .map_err(|e| EngineError::InvalidFen { fen: fen.to_string(), reason: format!("{e:?}") })
    }

    pub fn board(&self) -> &CozyBoard { &self.board }

    pub fn fen(&self) -> String { format!("{}", self.board) }

    pub fn side_to_move(&self) -> Color { self.board.side_to_move() }

    /// Number of moves currently on the undo stack.
    pub fn ply_count(&self) -> usize { self.stack.len() }

    pub fn last_move(&self) -> Option<Move> { self.stack.last().map(|(_, m)| *m) }

    pub fn history(&self) -> impl Iterator<Item = Move> + '_ { self.stack.iter().map(|(_, m)| *m) }

    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        self.board.generate_moves(|ml| {
            moves.extend(ml);
            false
        });
        moves
    }

    pub fn has_legal_moves(&self) -> bool {
        let mut any = false;
        self.board.generate_moves(|ml| {
            any = !ml.is_empty();
            any
        });
        any
    }

    pub fn apply(&mut self, mv: Move) -> Result<()> {
        if !self.board.is_legal(mv) {
            return Err(EngineError::IllegalMove { mv: format!("{}", mv), fen: self.fen() });
        }
        let parent = self.board.clone();
        self.board.play_unchecked(mv);
        self.stack.push((parent, mv));
        Ok(())
    }

    pub fn undo(&mut self) -> Option<Move> {
        let (parent, mv) = self.stack.pop()?;
        self.board = parent;
        Some(mv)
    }

    /// Applies `mv` for the lifetime of the returned guard. Dropping the guard
    /// undoes the move, including while unwinding.
    pub fn probe(&mut self, mv: Move) -> Result<Probe<'_>> {
        self.apply(mv)?;
        Ok(Probe { pos: self, mv })
    }

    /// Runs `f` on the position after `mv`, then undoes `mv`.
    pub fn with_move<T>(&mut self, mv: Move, f: impl FnOnce(&mut Position) -> T) -> Result<T> {
        let mut probe = self.probe(mv)?;
        Ok(f(&mut *probe))
    }

    pub fn is_check(&self) -> bool { !self.board.checkers().is_empty() }

    /// The side to move has been mated.
    pub fn is_checkmate(&self) -> bool { self.is_check() && !self.has_legal_moves() }

    pub fn is_stalemate(&self) -> bool { !self.is_check() && !self.has_legal_moves() }

    pub fn is_fifty_move_draw(&self) -> bool { self.board.halfmove_clock() >= 100 }

    pub fn piece_at(&self, sq: Square) -> Option<ColoredPiece> {
        let piece = self.board.piece_on(sq)?;
        let color = self.board.color_on(sq)?;
        Some(ColoredPiece { color, piece })
    }

    pub fn piece_map(&self) -> impl Iterator<Item = (Square, ColoredPiece)> + '_ {
        self.board.occupied().into_iter().filter_map(move |sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    /// Squares holding `color` pieces that attack `sq`, pinned pieces included.
    pub fn attackers(&self, color: Color, sq: Square) -> BitBoard {
        let b = &self.board;
        let occupied = b.occupied();
        let diagonal = b.pieces(Piece::Bishop) | b.pieces(Piece::Queen);
        let orthogonal = b.pieces(Piece::Rook) | b.pieces(Piece::Queen);
        let attackers = (get_pawn_attacks(sq, !color) & b.pieces(Piece::Pawn))
            | (get_knight_moves(sq) & b.pieces(Piece::Knight))
            | (get_king_moves(sq) & b.pieces(Piece::King))
            | (get_bishop_moves(sq, occupied) & diagonal)
            | (get_rook_moves(sq, occupied) & orthogonal);
        attackers & b.colors(color)
    }

    pub fn pawn_attackers(&self, color: Color, sq: Square) -> BitBoard {
        self.attackers(color, sq) & self.board.pieces(Piece::Pawn)
    }

    pub fn is_castling(&self, mv: Move) -> bool { is_castling_on(&self.board, mv) }

    pub fn is_en_passant(&self, mv: Move) -> bool {
        self.board.piece_on(mv.from) == Some(Piece::Pawn)
            && mv.from.file() != mv.to.file()
            && self.board.piece_on(mv.to).is_none()
    }

    /// The kind of piece `mv` removes from the board, if any.
    pub fn captured_piece(&self, mv: Move) -> Option<Piece> {
        if self.is_en_passant(mv) {
            return Some(Piece::Pawn);
        }
        if self.board.color_on(mv.to) == Some(!self.side_to_move()) {
            self.board.piece_on(mv.to)
        } else {
            None
        }
    }

    pub fn is_capture(&self, mv: Move) -> bool { self.captured_piece(mv).is_some() }

    /// Captures and pawn moves reset the fifty-move counter.
    pub fn is_zeroing(&self, mv: Move) -> bool {
        self.is_capture(mv) || self.board.piece_on(mv.from) == Some(Piece::Pawn)
    }

    pub fn gives_check(&mut self, mv: Move) -> Result<bool> { self.with_move(mv, |p| p.is_check()) }

    /// Where the moving piece ends up. Differs from `mv.to` only for castling.
    pub fn landing_square(&self, mv: Move) -> Square { landing_square_on(&self.board, mv) }

    /// Standard UCI text, with castling written as the king's two-square step.
    pub fn to_uci(&self, mv: Move) -> String { uci_on(&self.board, mv) }

    /// The moves on the undo stack, oldest first, as standard UCI text.
    pub fn history_uci(&self) -> Vec<String> {
        self.stack.iter().map(|(parent, mv)| uci_on(parent, *mv)).collect()
    }

    /// Looks up a legal move by UCI text. Accepts both `e1g1` and `e1h1` castling.
    pub fn find_move(&self, uci: &str) -> Option<Move> {
        let uci = uci.trim().to_ascii_lowercase();
        self.legal_moves().into_iter().find(|&m| self.to_uci(m) == uci || format!("{}", m) == uci)
    }

    pub fn make_move_uci(&mut self, mv_uci: &str) -> Result<Move> {
        let mv = self.find_move(mv_uci).ok_or_else(|| EngineError::UnknownMove { text: mv_uci.to_string() })?;
        self.apply(mv)?;
        Ok(mv)
    }

    pub fn set_from_start_and_moves(moves: &[String]) -> Result<Self> {
        let mut pos = Self::startpos();
        for m in moves { pos.make_move_uci(m)?; }
        Ok(pos)
    }

    pub fn set_from_fen_and_moves(fen: &str, moves: &[String]) -> Result<Self> {
        let mut pos = Self::from_fen(fen)?;
        for m in moves { pos.make_move_uci(m)?; }
        Ok(pos)
    }
}

// cozy encodes castling as the king capturing its own rook.
fn is_castling_on(board: &CozyBoard, mv: Move) -> bool {
    board.piece_on(mv.from) == Some(Piece::King) && board.color_on(mv.to) == Some(board.side_to_move())
}

fn landing_square_on(board: &CozyBoard, mv: Move) -> Square {
    if is_castling_on(board, mv) {
        let file = if (mv.to.file() as u8) > (mv.from.file() as u8) { File::G } else { File::C };
        Square::new(file, mv.from.rank())
    } else {
        mv.to
    }
}

fn uci_on(board: &CozyBoard, mv: Move) -> String {
    if is_castling_on(board, mv) {
        format!("{}{}", mv.from, landing_square_on(board, mv))
    } else {
        format!("{}", mv)
    }
}

/// Scoped apply/undo of a single move. See [`Position::probe`].
pub struct Probe<'a> {
    pos: &'a mut Position,
    mv: Move,
}

impl Probe<'_> {
    pub fn probed_move(&self) -> Move { self.mv }
}

impl Deref for Probe<'_> {
    type Target = Position;
    fn deref(&self) -> &Position { self.pos }
}

impl DerefMut for Probe<'_> {
    fn deref_mut(&mut self) -> &mut Position { self.pos }
}

impl Drop for Probe<'_> {
    fn drop(&mut self) {
        self.pos.undo();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn startpos_has_twenty_moves_and_f3_attackers() {
        let pos = Position::startpos();
        assert_eq!(pos.legal_moves().len(), 20);
        // Ng1, e2 and g2 all cover f3.
        assert_eq!(pos.attackers(Color::White, Square::F3).len(), 3);
        assert!(pos.attackers(Color::Black, Square::F3).is_empty());
        assert_eq!(pos.piece_map().count(), 32);
    }

    #[test]
    fn probe_undoes_on_drop_and_nests() {
        let mut pos = Position::startpos();
        let before = pos.fen();
        let e4 = pos.find_move("e2e4").unwrap();
        {
            let mut child = pos.probe(e4).unwrap();
            assert_eq!(child.side_to_move(), Color::Black);
            let e5 = child.find_move("e7e5").unwrap();
            let grandchild = child.probe(e5).unwrap();
            assert_eq!(grandchild.ply_count(), 2);
        }
        assert_eq!(pos.fen(), before);
        assert_eq!(pos.ply_count(), 0);
    }

    #[test]
    fn probe_undoes_while_unwinding() {
        let mut pos = Position::startpos();
        let before = pos.fen();
        let e4 = pos.find_move("e2e4").unwrap();
        let res = catch_unwind(AssertUnwindSafe(|| {
            let _child = pos.probe(e4).unwrap();
            panic!("boom");
        }));
        assert!(res.is_err());
        assert_eq!(pos.fen(), before);
    }

    #[test]
    fn illegal_apply_is_rejected_without_mutation() {
        let mut pos = Position::startpos();
        let before = pos.fen();
        let bogus: Move = "e2e5".parse().unwrap();
        assert!(matches!(pos.apply(bogus), Err(EngineError::IllegalMove { .. })));
        assert_eq!(pos.fen(), before);
        assert_eq!(pos.undo(), None);
    }

    #[test]
    fn castling_uses_standard_uci_text() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let short = pos.find_move("e1g1").expect("O-O legal");
        assert!(pos.is_castling(short));
        assert!(!pos.is_capture(short));
        assert_eq!(pos.landing_square(short), Square::G1);
        assert_eq!(pos.to_uci(short), "e1g1");
        let long = pos.find_move("e1c1").expect("O-O-O legal");
        assert_eq!(pos.to_uci(long), "e1c1");
        let mut pos = pos;
        pos.apply(short).unwrap();
        assert_eq!(pos.history_uci(), vec!["e1g1".to_string()]);
    }

    #[test]
    fn en_passant_is_a_zeroing_pawn_capture() {
        let pos = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
        let ep = pos.find_move("e5d6").expect("en passant legal");
        assert!(pos.is_en_passant(ep));
        assert_eq!(pos.captured_piece(ep), Some(Piece::Pawn));
        assert!(pos.is_zeroing(ep));
    }

    #[test]
    fn fools_mate_is_checkmate() {
        let moves: Vec<String> = ["f2f3", "e7e5", "g2g4", "d8h4"].iter().map(|s| s.to_string()).collect();
        let pos = Position::set_from_start_and_moves(&moves).unwrap();
        assert!(pos.is_checkmate());
        assert!(!pos.is_stalemate());
        assert_eq!(pos.ply_count(), 4);
    }
}
