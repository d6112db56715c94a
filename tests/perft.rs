use guardbot::perft::perft;
use guardbot::Position;

#[test]
fn perft_startpos_small_depths() {
    let mut pos = Position::startpos();
    assert_eq!(perft(&mut pos, 1).unwrap(), 20);
    assert_eq!(perft(&mut pos, 2).unwrap(), 400);
    assert_eq!(perft(&mut pos, 3).unwrap(), 8902);
    assert_eq!(pos.ply_count(), 0);
}

#[test]
fn perft_kiwipete_exercises_castling_and_en_passant() {
    let mut pos = Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1").unwrap();
    let before = pos.fen();
    assert_eq!(perft(&mut pos, 1).unwrap(), 48);
    assert_eq!(perft(&mut pos, 2).unwrap(), 2039);
    assert_eq!(pos.fen(), before);
}
