//! SCID move encoding.
//!
//! Each side keeps a piece list of at most 16 squares with the king always
//! at index 0. A move is one byte, `piece_index << 4 | value`, where the
//! meaning of `value` depends on the kind of piece standing on the square:
//!
//! | piece  | value                                                        |
//! |--------|--------------------------------------------------------------|
//! | king   | index into [`KING_OFFSETS`]; 9 and 10 are castling           |
//! | knight | index into [`KNIGHT_OFFSETS`]                                |
//! | rook   | `0..8` target file on the same rank, `8..16` target rank + 8 |
//! | bishop | target file, + 8 for the a8-h1 direction                     |
//! | queen  | as a rook; its own file means diagonal, next byte `64 + to`  |
//! | pawn   | index into [`PAWN_OFFSETS`] with promotion piece ranges      |
//!
//! The decoded squares are matched against the legal moves of the position,
//! so a byte that does not name a legal move is reported as malformed.

use shakmaty::{Chess, Color, File, Move, Position, Role, Square};

use super::buffer::{ByteReader, ByteWriter};
use crate::error::{Error, MalformedKind, Result};
use crate::game::position;

const KING_OFFSETS: [i32; 11] = [0, -9, -8, -7, -1, 1, 7, 8, 9, -2, 2];
const KNIGHT_OFFSETS: [i32; 9] = [0, -17, -15, -10, -6, 6, 10, 15, 17];
const PAWN_OFFSETS: [i32; 16] = [7, 8, 9, 7, 8, 9, 7, 8, 9, 7, 8, 9, 7, 8, 9, 16];

const QUEEN_DIAGONAL_BASE: u8 = 64;
const PAWN_DOUBLE_PUSH: u8 = 15;

/// Piece-list order of the standard start, from White's side.
const STANDARD_PIECES: [Square; 16] = [
    Square::E1,
    Square::A1,
    Square::B1,
    Square::C1,
    Square::D1,
    Square::F1,
    Square::G1,
    Square::H1,
    Square::A2,
    Square::B2,
    Square::C2,
    Square::D2,
    Square::E2,
    Square::F2,
    Square::G2,
    Square::H2,
];

/// A position together with SCID's piece lists for both sides.
#[derive(Debug, Clone)]
pub struct ScidBoard {
    pos: Chess,
    white: Vec<Square>,
    black: Vec<Square>,
}

impl ScidBoard {
    pub fn standard() -> Self {
        ScidBoard {
            pos: Chess::default(),
            white: STANDARD_PIECES.to_vec(),
            black: STANDARD_PIECES.iter().map(|sq| sq.flip_vertical()).collect(),
        }
    }

    /// Piece lists for a set-up position: board order from a8 to h1, with
    /// the king swapped to the front.
    pub fn from_position(pos: Chess) -> Self {
        let white = scan_pieces(&pos, Color::White);
        let black = scan_pieces(&pos, Color::Black);
        ScidBoard { pos, white, black }
    }

    pub fn position(&self) -> &Chess {
        &self.pos
    }

    fn pieces(&self, color: Color) -> &[Square] {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    fn pieces_mut(&mut self, color: Color) -> &mut Vec<Square> {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    /// Decode the move starting with `byte`. A queen's diagonal move reads
    /// its second byte from `buf`.
    pub fn decode_move(&self, byte: u8, buf: &mut ByteReader) -> Result<Move> {
        let offset = buf.position().saturating_sub(1);
        let malformed = |kind| Error::Malformed { offset, kind };
        let illegal = || malformed(MalformedKind::IllegalMove(byte));

        let pieces = self.pieces(self.pos.turn());
        let index = byte >> 4;
        let value = byte & 0x0F;
        let from = *pieces.get(index as usize).ok_or_else(|| {
            malformed(MalformedKind::PieceOutOfRange { piece: index, count: pieces.len() })
        })?;
        let role = self.pos.board().role_at(from).ok_or_else(illegal)?;

        let from_index = from as i32;
        let from_file = from.file() as u8;
        let (to, promotion) = match role {
            Role::King => {
                let delta = match value {
                    1..=10 => KING_OFFSETS[value as usize],
                    _ => return Err(illegal()),
                };
                (position::square(from_index + delta), None)
            }
            Role::Knight => {
                let delta = match value {
                    1..=8 => KNIGHT_OFFSETS[value as usize],
                    _ => return Err(illegal()),
                };
                (position::square(from_index + delta), None)
            }
            Role::Rook => (Some(rook_target(from, value)), None),
            Role::Bishop => (position::square(bishop_target(from, value)), None),
            Role::Queen if value == from_file => {
                let second = buf.get_byte()?;
                let target = second.checked_sub(QUEEN_DIAGONAL_BASE).ok_or_else(illegal)?;
                (position::square(target as i32), None)
            }
            Role::Queen => (Some(rook_target(from, value)), None),
            Role::Pawn => {
                let delta = PAWN_OFFSETS[value as usize];
                let delta = if self.pos.turn() == Color::White { delta } else { -delta };
                (position::square(from_index + delta), pawn_promotion(value))
            }
        };

        let to = to.ok_or_else(illegal)?;
        position::resolve(&self.pos, from, to, promotion).ok_or_else(illegal)
    }

    /// Append the encoding of `mv`, which must be legal in this position.
    pub fn encode_move(&self, mv: &Move, out: &mut ByteWriter) -> Result<()> {
        let (from, to) = position::endpoints(mv);
        let pieces = self.pieces(self.pos.turn());
        let index = pieces.iter().position(|&sq| sq == from).ok_or_else(|| Error::IllegalMove {
            mv: format!("{}{}", from, to),
            fen: position::fen_of(&self.pos),
        })? as u8;

        let delta = to as i32 - from as i32;
        let file_delta = to.file() as i32 - from.file() as i32;
        let rank_delta = to.rank() as i32 - from.rank() as i32;

        let value = match mv.role() {
            Role::King => offset_index(&KING_OFFSETS, delta),
            Role::Knight => offset_index(&KNIGHT_OFFSETS, delta),
            Role::Rook => rook_value(to, rank_delta),
            Role::Bishop => bishop_value(to, file_delta, rank_delta),
            Role::Queen if file_delta != 0 && rank_delta != 0 => {
                out.put_byte(index << 4 | from.file() as u8);
                out.put_byte(QUEEN_DIAGONAL_BASE + to as u8);
                return Ok(());
            }
            Role::Queen => rook_value(to, rank_delta),
            Role::Pawn => {
                let forward = if self.pos.turn() == Color::White { delta } else { -delta };
                pawn_value(forward, mv.promotion())
            }
        };

        out.put_byte(index << 4 | value);
        Ok(())
    }

    /// Play `mv`, keeping both piece lists in step with the board.
    pub fn play(&mut self, mv: &Move) {
        let us = self.pos.turn();
        match *mv {
            Move::Normal { from, to, .. } => {
                if self.pos.board().color_at(to) == Some(!us) {
                    self.remove_piece(!us, to);
                }
                self.move_piece(us, from, to);
            }
            Move::EnPassant { from, to } => {
                let captured = Square::from_coords(to.file(), from.rank());
                self.remove_piece(!us, captured);
                self.move_piece(us, from, to);
            }
            Move::Castle { king, rook } => {
                let (_, king_dest) = position::endpoints(mv);
                let rook_file = if king_dest.file() as u8 > king.file() as u8 { File::F } else { File::D };
                self.move_piece(us, king, king_dest);
                self.move_piece(us, rook, Square::from_coords(rook_file, king.rank()));
            }
            Move::Put { .. } => {}
        }
        position::play(&mut self.pos, mv);
    }

    fn move_piece(&mut self, color: Color, from: Square, to: Square) {
        if let Some(slot) = self.pieces_mut(color).iter_mut().find(|sq| **sq == from) {
            *slot = to;
        }
    }

    /// Captured pieces are replaced by the last entry of the list.
    fn remove_piece(&mut self, color: Color, square: Square) {
        let pieces = self.pieces_mut(color);
        if let Some(index) = pieces.iter().position(|&sq| sq == square) {
            pieces.swap_remove(index);
        }
    }
}

fn scan_pieces(pos: &Chess, color: Color) -> Vec<Square> {
    let board = pos.board();
    let mut pieces = Vec::with_capacity(16);
    for rank in (0..8u32).rev() {
        for file in 0..8u32 {
            let sq = Square::new(rank * 8 + file);
            let Some(piece) = board.piece_at(sq) else { continue };
            if piece.color != color {
                continue;
            }
            if piece.role == Role::King && !pieces.is_empty() {
                let first = pieces[0];
                pieces[0] = sq;
                pieces.push(first);
            } else {
                pieces.push(sq);
            }
        }
    }
    pieces
}

fn rook_target(from: Square, value: u8) -> Square {
    let index = if value < 8 {
        from.rank() as u32 * 8 + value as u32
    } else {
        (value as u32 - 8) * 8 + from.file() as u32
    };
    Square::new(index)
}

fn bishop_target(from: Square, value: u8) -> i32 {
    let file_delta = (value & 7) as i32 - from.file() as i32;
    if value < 8 {
        from as i32 + 9 * file_delta
    } else {
        from as i32 - 7 * file_delta
    }
}

fn pawn_promotion(value: u8) -> Option<Role> {
    match value {
        3..=5 => Some(Role::Queen),
        6..=8 => Some(Role::Rook),
        9..=11 => Some(Role::Bishop),
        12..=14 => Some(Role::Knight),
        _ => None,
    }
}

fn offset_index(offsets: &[i32], delta: i32) -> u8 {
    offsets.iter().skip(1).position(|&d| d == delta).map_or(0, |i| i as u8 + 1)
}

fn rook_value(to: Square, rank_delta: i32) -> u8 {
    if rank_delta == 0 {
        to.file() as u8
    } else {
        8 + to.rank() as u8
    }
}

fn bishop_value(to: Square, file_delta: i32, rank_delta: i32) -> u8 {
    if file_delta == rank_delta {
        to.file() as u8
    } else {
        8 + to.file() as u8
    }
}

fn pawn_value(forward: i32, promotion: Option<Role>) -> u8 {
    if forward == 16 {
        return PAWN_DOUBLE_PUSH;
    }
    let base = match promotion {
        None => 0,
        Some(Role::Queen) => 3,
        Some(Role::Rook) => 6,
        Some(Role::Bishop) => 9,
        Some(_) => 12,
    };
    base + (forward - 7) as u8
}
