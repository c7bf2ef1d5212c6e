//! Thin seam over the `shakmaty` position engine.
//!
//! The codec and the tree never generate moves themselves: they ask the
//! engine for the legal moves of a position and pick the one whose squares
//! match.

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::{CastlingMode, Chess, File, Move, Position, Role, Square};

use crate::error::{Error, Result};

/// Square for a 0-63 index, `None` when off the board.
pub fn square(index: i32) -> Option<Square> {
    if (0..64).contains(&index) {
        Some(Square::new(index as u32))
    } else {
        None
    }
}

/// Origin and destination of a move. Castling reports the king's
/// destination square, not the rook's.
pub fn endpoints(mv: &Move) -> (Square, Square) {
    match *mv {
        Move::Normal { from, to, .. } => (from, to),
        Move::EnPassant { from, to } => (from, to),
        Move::Castle { king, rook } => {
            let file = if rook.file() as u8 > king.file() as u8 { File::G } else { File::C };
            (king, Square::from_coords(file, king.rank()))
        }
        Move::Put { to, .. } => (to, to),
    }
}

/// Find the legal move with the given squares and promotion piece.
pub fn resolve(pos: &Chess, from: Square, to: Square, promotion: Option<Role>) -> Option<Move> {
    pos.legal_moves()
        .into_iter()
        .find(|m| endpoints(m) == (from, to) && m.promotion() == promotion)
}

/// SAN text including the `+`/`#` suffix, computed in the position the
/// move is played from.
pub fn san(pos: &Chess, mv: &Move) -> String {
    SanPlus::from_move(pos.clone(), mv).to_string()
}

pub fn fen_of(pos: &Chess) -> String {
    Fen::from_position(pos.clone(), shakmaty::EnPassantMode::Legal).to_string()
}

/// Parse a FEN and set up the position it describes.
pub fn setup(fen: &str) -> Result<(Fen, Chess)> {
    let parsed: Fen = fen.trim().parse().map_err(|e| Error::InvalidFen {
        fen: fen.to_string(),
        reason: format!("{}", e),
    })?;
    let pos: Chess = parsed
        .clone()
        .into_position(CastlingMode::Standard)
        .map_err(|e| Error::InvalidFen {
            fen: fen.to_string(),
            reason: format!("{}", e),
        })?;
    Ok((parsed, pos))
}

/// Apply `mv`, which must be legal in `pos`.
pub fn play(pos: &mut Chess, mv: &Move) {
    pos.play_unchecked(mv);
}
