use crate::board::Position;
use crate::error::Result;

/// Leaf count at `depth`, walking the tree with apply/undo on one position.
pub fn perft(pos: &mut Position, depth: u32) -> Result<u64> {
    if depth == 0 { return Ok(1); }
    let moves = pos.legal_moves();
    if depth == 1 { return Ok(moves.len() as u64); }
    let mut nodes = 0u64;
    for mv in moves {
        let mut child = pos.probe(mv)?;
        nodes += perft(&mut child, depth - 1)?;
    }
    Ok(nodes)
}
