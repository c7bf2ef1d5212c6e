//! Game record codec: SCID game bytes to and from a [`GameTree`].
//!
//! A record is the extra tag section, a flags byte, the start FEN when the
//! game does not start from the standard position, and then a stream of
//! movetext tokens closed by [`END_GAME`].

use shakmaty::Role;
use tracing::{debug, trace};

use super::buffer::{ByteReader, ByteWriter};
use super::moves::ScidBoard;
use super::tags::{decode_tags, encode_tags};
use crate::error::{Error, MalformedKind, Result};
use crate::game::{position, GameTree, HeaderTags, LineId, StartPosition};

pub const NAG: u8 = 0x0B;
pub const COMMENT: u8 = 0x0C;
pub const START_VARIATION: u8 = 0x0D;
pub const END_VARIATION: u8 = 0x0E;
pub const END_GAME: u8 = 0x0F;

pub const FLAG_NON_STANDARD_START: u8 = 1;
pub const FLAG_PROMOTIONS: u8 = 1 << 1;
pub const FLAG_UNDER_PROMOTIONS: u8 = 1 << 2;

const COMMENT_AFTER: u8 = 0;
const COMMENT_BEFORE: u8 = 1;

/// Which parts of a record end up in the decoded tree. Parts that are left
/// out are still read and checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeMode {
    pub movetext: bool,
    pub variations: bool,
    pub comments: bool,
    pub nags: bool,
}

impl DecodeMode {
    /// Tags and start position only; the movetext is not read.
    pub const HEADERS_ONLY: DecodeMode = DecodeMode {
        movetext: false,
        variations: false,
        comments: false,
        nags: false,
    };

    /// The mainline with its comments and NAGs, no variations.
    pub const MAINLINE: DecodeMode = DecodeMode {
        movetext: true,
        variations: false,
        comments: true,
        nags: true,
    };

    pub const FULL: DecodeMode = DecodeMode {
        movetext: true,
        variations: true,
        comments: true,
        nags: true,
    };
}

impl Default for DecodeMode {
    fn default() -> Self {
        DecodeMode::FULL
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedGame {
    pub tags: HeaderTags,
    pub tree: GameTree,
}

/// One open line of play while decoding.
struct Level {
    board: ScidBoard,
    /// Board before the last move of this line, where a variation of that
    /// move starts.
    before: Option<ScidBoard>,
    /// Whether this line is being added to the tree.
    live: bool,
}

/// Decode a complete game record.
pub fn decode(data: &[u8], mode: DecodeMode) -> Result<DecodedGame> {
    let mut buf = ByteReader::new(data);

    let mut tags = HeaderTags::new();
    decode_tags(&mut buf, &mut tags)?;

    let flags = buf.get_byte()?;
    let start = if flags & FLAG_NON_STANDARD_START != 0 {
        let offset = buf.position();
        let fen = buf.get_cstring()?;
        StartPosition::from_fen(&fen).map_err(|_| Error::Malformed {
            offset,
            kind: MalformedKind::BadFen(fen.clone()),
        })?
    } else {
        StartPosition::standard()
    };

    let board = if start.is_standard() {
        ScidBoard::standard()
    } else {
        ScidBoard::from_position(start.position().clone())
    };
    let mut tree = GameTree::with_start(start);

    if mode.movetext {
        decode_movetext(&mut buf, &mut tree, board, mode)?;
    }

    debug!(
        "decoded game: {} tags, {} plies, {} variations, {} bytes",
        tags.len(),
        tree.num_plies(),
        tree.num_variations(),
        buf.position()
    );
    Ok(DecodedGame { tags, tree })
}

fn decode_movetext(buf: &mut ByteReader, tree: &mut GameTree, board: ScidBoard, mode: DecodeMode) -> Result<()> {
    let mut cursor = tree.cursor_mut();
    let mut levels = vec![Level { board, before: None, live: true }];
    // A comment stored before the move that comes next.
    let mut pending: Option<String> = None;

    loop {
        let offset = buf.position();
        let orphan = || Error::Malformed { offset, kind: MalformedKind::OrphanComment };
        let byte = buf.get_byte()?;
        let top = levels.len() - 1;

        // A comment stored before a move must be followed by that move.
        if pending.is_some() && matches!(byte, NAG | START_VARIATION | END_VARIATION | END_GAME) {
            return Err(orphan());
        }

        match byte {
            NAG => {
                let code = buf.get_byte()?;
                trace!("nag {} at {}", code, offset);
                if levels[top].before.is_none() {
                    return Err(orphan());
                }
                if levels[top].live && mode.nags {
                    cursor.add_nag(code)?;
                }
            }
            COMMENT => {
                let placement = buf.get_byte()?;
                let len = buf.get_varint()?;
                let text = buf.get_text(len)?;
                trace!("comment ({} bytes) at {}", len, offset);
                match placement {
                    COMMENT_AFTER => {
                        if levels[top].before.is_none() || pending.is_some() {
                            return Err(orphan());
                        }
                        if levels[top].live && mode.comments {
                            cursor.set_move_comment(&text)?;
                        }
                    }
                    COMMENT_BEFORE => {
                        if pending.is_some() {
                            return Err(orphan());
                        }
                        pending = Some(text);
                    }
                    other => {
                        return Err(Error::Malformed {
                            offset: offset + 1,
                            kind: MalformedKind::BadCommentPlacement(other),
                        })
                    }
                }
            }
            START_VARIATION => {
                trace!("variation start at {}", offset);
                let board = levels[top].before.clone().ok_or(Error::Malformed {
                    offset,
                    kind: MalformedKind::OrphanVariation,
                })?;
                let live = levels[top].live && mode.variations;
                if live {
                    cursor.add_variation()?;
                }
                levels.push(Level { board, before: None, live });
            }
            END_VARIATION => {
                trace!("variation end at {}", offset);
                if levels.len() == 1 {
                    return Err(Error::Malformed { offset, kind: MalformedKind::UnmatchedVariationEnd });
                }
                if let Some(Level { live: true, .. }) = levels.pop() {
                    cursor.exit_variation()?;
                }
            }
            END_GAME => {
                if levels.len() > 1 {
                    return Err(Error::Malformed { offset, kind: MalformedKind::UnterminatedVariation });
                }
                return Ok(());
            }
            _ => {
                let level = &mut levels[top];
                let mv = level.board.decode_move(byte, buf)?;
                let pre_comment = pending.take();
                if level.live {
                    let san = position::san(level.board.position(), &mv);
                    trace!("move {} at {}", san, offset);
                    cursor.push_move(mv.clone(), san);
                    if let Some(text) = pre_comment.filter(|_| mode.comments) {
                        cursor.set_pre_comment(&text)?;
                    }
                }
                level.before = Some(level.board.clone());
                level.board.play(&mv);
            }
        }
    }
}

/// Encode a game record. Roster tags are left to the index and not
/// written.
///
/// Fails only if the tree holds a move that is not legal from its
/// position, which the tree's own operations never allow.
pub fn encode(tree: &GameTree, tags: &HeaderTags) -> Result<Vec<u8>> {
    let mut out = ByteWriter::new();
    encode_tags(&mut out, tags);

    let start = tree.start();
    let mut flags = promotion_flags(tree);
    if !start.is_standard() {
        flags |= FLAG_NON_STANDARD_START;
    }
    out.put_byte(flags);

    let board = match start.fen() {
        Some(fen) => {
            out.put_cstring(&fen.to_string());
            ScidBoard::from_position(start.position().clone())
        }
        None => ScidBoard::standard(),
    };

    encode_line(&mut out, tree, LineId::MAIN, board)?;
    out.put_byte(END_GAME);

    debug!(
        "encoded game: {} plies, {} variations, {} bytes",
        tree.num_plies(),
        tree.num_variations(),
        out.len()
    );
    Ok(out.into_bytes())
}

fn encode_line(out: &mut ByteWriter, tree: &GameTree, line: LineId, mut board: ScidBoard) -> Result<()> {
    for &id in tree.line(line).nodes() {
        let node = tree.node(id);
        if let Some(text) = node.pre_comment() {
            put_comment(out, COMMENT_BEFORE, text);
        }

        let before = board.clone();
        board.encode_move(node.chess_move(), out)?;
        board.play(node.chess_move());

        for &code in node.nags() {
            out.put_byte(NAG);
            out.put_byte(code);
        }
        if let Some(text) = node.post_comment() {
            put_comment(out, COMMENT_AFTER, text);
        }
        for &variation in node.variations() {
            out.put_byte(START_VARIATION);
            encode_line(out, tree, variation, before.clone())?;
            out.put_byte(END_VARIATION);
        }
    }
    Ok(())
}

fn put_comment(out: &mut ByteWriter, placement: u8, text: &str) {
    out.put_byte(COMMENT);
    out.put_byte(placement);
    out.put_varint(text.len());
    out.put_bytes(text.as_bytes());
}

fn promotion_flags(tree: &GameTree) -> u8 {
    let mut flags = 0;
    let mut stack = vec![LineId::MAIN];
    while let Some(line) = stack.pop() {
        for &id in tree.line(line).nodes() {
            let node = tree.node(id);
            match node.promotion() {
                Some(Role::Queen) => flags |= FLAG_PROMOTIONS,
                Some(_) => flags |= FLAG_PROMOTIONS | FLAG_UNDER_PROMOTIONS,
                None => {}
            }
            stack.extend_from_slice(node.variations());
        }
    }
    flags
}
