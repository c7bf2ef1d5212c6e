use std::fmt;
use std::io;

use thiserror::Error;

use crate::game::NodeId;

/// Errors surfaced by the codec, the game tree and the renderer.
///
/// Every failure is scoped to a single game: a batch driver can report one
/// and keep going with the next.
#[derive(Debug, Error)]
pub enum Error {
    /// Corrupt, truncated or misaligned binary game data.
    #[error("malformed game data at byte {offset}: {kind}")]
    Malformed { offset: usize, kind: MalformedKind },

    /// A move that is not legal in the position it is played from.
    #[error("illegal move {mv} in position {fen}")]
    IllegalMove { mv: String, fen: String },

    /// Cursor navigation past the bounds of the current line.
    #[error("{0} is out of range")]
    OutOfRange(String),

    /// A node or header that cannot be written as PGN.
    #[error("cannot render {}: {reason}", render_target(.node))]
    Render { node: Option<NodeId>, reason: String },

    /// A start position that could not be set up.
    #[error("invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

fn render_target(node: &Option<NodeId>) -> String {
    match node {
        Some(id) => format!("move node {}", id.index()),
        None => "header".to_string(),
    }
}

/// What exactly was wrong with a malformed game record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedKind {
    /// The buffer ended before the end-of-game marker.
    Truncated,
    /// A tag entry started with a reserved length byte.
    BadTagMarker(u8),
    /// Tag or comment text that is not UTF-8.
    BadUtf8,
    /// The stored start position could not be parsed.
    BadFen(String),
    /// A move byte names a piece the side to move does not have.
    PieceOutOfRange { piece: u8, count: usize },
    /// A move byte that does not resolve to a legal move.
    IllegalMove(u8),
    /// A variation start with no move for it to replace.
    OrphanVariation,
    /// A variation end with no open variation.
    UnmatchedVariationEnd,
    /// The game ended while a variation was still open.
    UnterminatedVariation,
    /// A comment or NAG with no move to attach to.
    OrphanComment,
    /// A comment placement byte other than before/after.
    BadCommentPlacement(u8),
}

impl fmt::Display for MalformedKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MalformedKind::Truncated => write!(f, "unexpected end of data"),
            MalformedKind::BadTagMarker(b) => write!(f, "invalid tag marker {}", b),
            MalformedKind::BadUtf8 => write!(f, "text is not valid UTF-8"),
            MalformedKind::BadFen(fen) => write!(f, "invalid start position '{}'", fen),
            MalformedKind::PieceOutOfRange { piece, count } => {
                write!(f, "piece number {} out of range (list size: {})", piece, count)
            }
            MalformedKind::IllegalMove(b) => write!(f, "move byte 0x{:02x} is not a legal move", b),
            MalformedKind::OrphanVariation => write!(f, "variation start without a preceding move"),
            MalformedKind::UnmatchedVariationEnd => write!(f, "variation end without a matching start"),
            MalformedKind::UnterminatedVariation => write!(f, "game ends inside a variation"),
            MalformedKind::OrphanComment => write!(f, "annotation without a move to attach to"),
            MalformedKind::BadCommentPlacement(b) => write!(f, "invalid comment placement {}", b),
        }
    }
}
