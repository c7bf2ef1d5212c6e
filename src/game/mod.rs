//! In-memory game tree.
//!
//! Moves live in an arena and are addressed by [`NodeId`]; every line of
//! play (the mainline or a variation) is an ordered list of node ids
//! addressed by [`LineId`]. A node lists the variations that replace it, so
//! the recursive structure needs no parent pointers: the path back up is
//! carried by the cursors in [`cursor`].

pub mod cursor;
pub mod headers;
pub mod position;

use shakmaty::fen::Fen;
use shakmaty::{Chess, Move, Role, Square};

use crate::error::Result;

pub use cursor::{Cursor, CursorMut};
pub use headers::{GameResult, HeaderTags, PgnDate, TagValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineId(usize);

impl LineId {
    /// The mainline of every tree.
    pub const MAIN: LineId = LineId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// One ply: the move, its cached SAN and the annotations attached to it.
#[derive(Debug, Clone)]
pub struct MoveNode {
    mv: Move,
    san: String,
    nags: Vec<u8>,
    pre_comment: Option<String>,
    post_comment: Option<String>,
    variations: Vec<LineId>,
}

impl MoveNode {
    pub(crate) fn new(mv: Move, san: String) -> Self {
        MoveNode {
            mv,
            san,
            nags: Vec::new(),
            pre_comment: None,
            post_comment: None,
            variations: Vec::new(),
        }
    }

    pub fn chess_move(&self) -> &Move {
        &self.mv
    }

    pub fn from(&self) -> Square {
        position::endpoints(&self.mv).0
    }

    pub fn to(&self) -> Square {
        position::endpoints(&self.mv).1
    }

    pub fn promotion(&self) -> Option<Role> {
        self.mv.promotion()
    }

    pub fn san(&self) -> &str {
        &self.san
    }

    /// NAG codes in attachment order.
    pub fn nags(&self) -> &[u8] {
        &self.nags
    }

    /// Comment shown before the move.
    pub fn pre_comment(&self) -> Option<&str> {
        self.pre_comment.as_deref()
    }

    /// Comment shown after the move and its NAGs.
    pub fn post_comment(&self) -> Option<&str> {
        self.post_comment.as_deref()
    }

    /// Variations that replace this move, in display order.
    pub fn variations(&self) -> &[LineId] {
        &self.variations
    }
}

#[derive(Debug, Clone, Default)]
pub struct Line {
    nodes: Vec<NodeId>,
}

impl Line {
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// The position a game starts from.
#[derive(Debug, Clone, Default)]
pub struct StartPosition {
    fen: Option<Fen>,
    position: Chess,
}

impl StartPosition {
    pub fn standard() -> Self {
        StartPosition::default()
    }

    pub fn from_fen(fen: &str) -> Result<Self> {
        let (fen, position) = position::setup(fen)?;
        Ok(StartPosition { fen: Some(fen), position })
    }

    /// The setup FEN, `None` for the standard start.
    pub fn fen(&self) -> Option<&Fen> {
        self.fen.as_ref()
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn is_standard(&self) -> bool {
        self.fen.is_none()
    }
}

/// A game's moves, variations and annotations.
///
/// Structural changes go through a [`CursorMut`], which borrows the tree
/// exclusively for as long as it lives.
#[derive(Debug, Clone)]
pub struct GameTree {
    start: StartPosition,
    nodes: Vec<MoveNode>,
    lines: Vec<Line>,
}

impl Default for GameTree {
    fn default() -> Self {
        Self::new()
    }
}

impl GameTree {
    pub fn new() -> Self {
        Self::with_start(StartPosition::standard())
    }

    pub fn with_start(start: StartPosition) -> Self {
        GameTree {
            start,
            nodes: Vec::new(),
            lines: vec![Line::default()],
        }
    }

    pub fn with_start_fen(fen: &str) -> Result<Self> {
        Ok(Self::with_start(StartPosition::from_fen(fen)?))
    }

    /// Reset to an empty mainline from the standard start.
    pub fn clear(&mut self) {
        *self = GameTree::new();
    }

    pub fn start(&self) -> &StartPosition {
        &self.start
    }

    pub fn mainline(&self) -> &Line {
        &self.lines[LineId::MAIN.0]
    }

    pub fn line(&self, id: LineId) -> &Line {
        &self.lines[id.0]
    }

    pub fn node(&self, id: NodeId) -> &MoveNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut MoveNode {
        &mut self.nodes[id.0]
    }

    /// Number of plies in the mainline.
    pub fn num_plies(&self) -> usize {
        self.mainline().len()
    }

    pub fn is_empty(&self) -> bool {
        self.mainline().is_empty()
    }

    /// Total number of variations reachable from the mainline. Lines cut
    /// off by a replaced continuation stay in the arena but are not counted.
    pub fn num_variations(&self) -> usize {
        self.count_variations(LineId::MAIN)
    }

    fn count_variations(&self, line: LineId) -> usize {
        self.line(line)
            .nodes()
            .iter()
            .flat_map(|&id| self.node(id).variations.iter())
            .map(|&variation| 1 + self.count_variations(variation))
            .sum()
    }

    /// Read-only cursor at the start of the mainline.
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(self)
    }

    /// The single writing cursor, at the start of the mainline.
    pub fn cursor_mut(&mut self) -> CursorMut<'_> {
        CursorMut::new(self)
    }

    pub(crate) fn push_node(&mut self, line: LineId, node: MoveNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.lines[line.0].nodes.push(id);
        id
    }

    pub(crate) fn truncate_line(&mut self, line: LineId, len: usize) {
        self.lines[line.0].nodes.truncate(len);
    }

    pub(crate) fn push_variation(&mut self, node: NodeId) -> LineId {
        let id = LineId(self.lines.len());
        self.lines.push(Line::default());
        self.nodes[node.0].variations.push(id);
        id
    }

    fn lines_match(&self, a: LineId, other: &GameTree, b: LineId) -> bool {
        let left = self.line(a).nodes();
        let right = other.line(b).nodes();
        left.len() == right.len()
            && left.iter().zip(right).all(|(&x, &y)| {
                let (x, y) = (self.node(x), other.node(y));
                x.mv == y.mv
                    && x.san == y.san
                    && x.nags == y.nags
                    && x.pre_comment == y.pre_comment
                    && x.post_comment == y.post_comment
                    && x.variations.len() == y.variations.len()
                    && x.variations
                        .iter()
                        .zip(&y.variations)
                        .all(|(&va, &vb)| self.lines_match(va, other, vb))
            })
    }
}

/// Observational equality: same start, moves, annotations and variations
/// in the same order. Arena layout is not compared.
impl PartialEq for GameTree {
    fn eq(&self, other: &Self) -> bool {
        self.start.fen.as_ref().map(|f| f.to_string()) == other.start.fen.as_ref().map(|f| f.to_string())
            && self.lines_match(LineId::MAIN, other, LineId::MAIN)
    }
}
