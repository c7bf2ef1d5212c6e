//! Navigation over a [`GameTree`].
//!
//! A cursor's location is an explicit stack of `(line, ply)` frames: the
//! bottom frame is on the mainline, each frame above it is inside a
//! variation of the move just before the frame below's ply. `ply` counts
//! the moves of that line already played, so ply 0 is the line's start.
//!
//! [`Cursor`] borrows the tree shared and can be cloned freely.
//! [`CursorMut`] borrows it exclusively and is the only way to change the
//! tree's structure.

use shakmaty::san::SanPlus;
use shakmaty::{Chess, Move, Role, Square};

use super::position;
use super::{GameTree, LineId, MoveNode, NodeId};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frame {
    line: LineId,
    ply: usize,
}

#[derive(Debug, Clone)]
struct Path {
    frames: Vec<Frame>,
}

impl Path {
    fn root() -> Self {
        Path {
            frames: vec![Frame { line: LineId::MAIN, ply: 0 }],
        }
    }

    fn top(&self) -> Frame {
        self.frames[self.frames.len() - 1]
    }

    fn top_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// The move just played in the current line.
    fn current_node(&self, tree: &GameTree) -> Option<NodeId> {
        let top = self.top();
        top.ply
            .checked_sub(1)
            .map(|i| tree.line(top.line).nodes()[i])
    }

    fn next_node(&self, tree: &GameTree) -> Option<NodeId> {
        let top = self.top();
        tree.line(top.line).nodes().get(top.ply).copied()
    }

    fn forward(&mut self, tree: &GameTree) -> Result<NodeId> {
        let next = self
            .next_node(tree)
            .ok_or_else(|| Error::OutOfRange("move past the end of the line".to_string()))?;
        self.top_mut().ply += 1;
        Ok(next)
    }

    fn backup(&mut self) -> Result<()> {
        let top = self.top_mut();
        if top.ply == 0 {
            return Err(Error::OutOfRange("move before the start of the line".to_string()));
        }
        top.ply -= 1;
        Ok(())
    }

    fn to_ply(&mut self, tree: &GameTree, ply: usize) -> Result<()> {
        let len = tree.line(self.top().line).len();
        if ply > len {
            return Err(Error::OutOfRange(format!("ply {} (line has {} moves)", ply, len)));
        }
        self.top_mut().ply = ply;
        Ok(())
    }

    fn enter(&mut self, tree: &GameTree, index: usize) -> Result<LineId> {
        let node = self
            .current_node(tree)
            .ok_or_else(|| Error::OutOfRange("variation of the line start".to_string()))?;
        let variations = tree.node(node).variations();
        let line = *variations.get(index).ok_or_else(|| {
            Error::OutOfRange(format!("variation {} (move has {})", index, variations.len()))
        })?;
        self.frames.push(Frame { line, ply: 0 });
        Ok(line)
    }

    fn exit(&mut self) -> Result<()> {
        if self.frames.len() == 1 {
            return Err(Error::OutOfRange("exit from the mainline".to_string()));
        }
        self.frames.pop();
        Ok(())
    }

    /// Replay from the start position along the path.
    fn position(&self, tree: &GameTree) -> Chess {
        let mut pos = tree.start().position().clone();
        let depth = self.frames.len();
        for (i, frame) in self.frames.iter().enumerate() {
            // A variation starts from the position before the move it replaces.
            let upto = if i + 1 < depth { frame.ply - 1 } else { frame.ply };
            for &id in &tree.line(frame.line).nodes()[..upto] {
                position::play(&mut pos, tree.node(id).chess_move());
            }
        }
        pos
    }
}

/// Read-only view of a location in a game tree.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    tree: &'a GameTree,
    path: Path,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(tree: &'a GameTree) -> Self {
        Cursor { tree, path: Path::root() }
    }

    pub fn tree(&self) -> &'a GameTree {
        self.tree
    }

    /// Moves played in the current line.
    pub fn ply(&self) -> usize {
        self.path.top().ply
    }

    /// 0 on the mainline, 1 inside a variation, and so on.
    pub fn depth(&self) -> usize {
        self.path.frames.len() - 1
    }

    pub fn line(&self) -> LineId {
        self.path.top().line
    }

    /// The move just played, `None` at the start of a line.
    pub fn current_move(&self) -> Option<&'a MoveNode> {
        self.path.current_node(self.tree).map(|id| self.tree.node(id))
    }

    pub fn next_move(&self) -> Option<&'a MoveNode> {
        self.path.next_node(self.tree).map(|id| self.tree.node(id))
    }

    pub fn position(&self) -> Chess {
        self.path.position(self.tree)
    }

    pub fn move_forward(&mut self) -> Result<&'a MoveNode> {
        let id = self.path.forward(self.tree)?;
        Ok(self.tree.node(id))
    }

    pub fn move_backup(&mut self) -> Result<()> {
        self.path.backup()
    }

    pub fn move_to_ply(&mut self, ply: usize) -> Result<()> {
        self.path.to_ply(self.tree, ply)
    }

    /// Enter the `index`-th variation of the move just played.
    pub fn move_into_variation(&mut self, index: usize) -> Result<LineId> {
        self.path.enter(self.tree, index)
    }

    pub fn exit_variation(&mut self) -> Result<()> {
        self.path.exit()
    }
}

/// The writing cursor. Holding one borrows the tree exclusively.
#[derive(Debug)]
pub struct CursorMut<'a> {
    tree: &'a mut GameTree,
    path: Path,
}

impl<'a> CursorMut<'a> {
    pub(crate) fn new(tree: &'a mut GameTree) -> Self {
        CursorMut { tree, path: Path::root() }
    }

    pub fn tree(&self) -> &GameTree {
        self.tree
    }

    pub fn ply(&self) -> usize {
        self.path.top().ply
    }

    pub fn depth(&self) -> usize {
        self.path.frames.len() - 1
    }

    pub fn line(&self) -> LineId {
        self.path.top().line
    }

    pub fn current_move(&self) -> Option<&MoveNode> {
        self.path.current_node(self.tree).map(|id| self.tree.node(id))
    }

    pub fn position(&self) -> Chess {
        self.path.position(self.tree)
    }

    pub fn move_forward(&mut self) -> Result<()> {
        self.path.forward(self.tree).map(|_| ())
    }

    pub fn move_backup(&mut self) -> Result<()> {
        self.path.backup()
    }

    pub fn move_to_ply(&mut self, ply: usize) -> Result<()> {
        self.path.to_ply(self.tree, ply)
    }

    pub fn move_into_variation(&mut self, index: usize) -> Result<LineId> {
        self.path.enter(self.tree, index)
    }

    pub fn exit_variation(&mut self) -> Result<()> {
        self.path.exit()
    }

    /// Play a move given by its squares. Moves after the cursor in the
    /// current line are discarded first.
    pub fn add_move(&mut self, from: Square, to: Square, promotion: Option<Role>) -> Result<NodeId> {
        let pos = self.position();
        let mv = position::resolve(&pos, from, to, promotion).ok_or_else(|| Error::IllegalMove {
            mv: match promotion {
                Some(role) => format!("{}{}{}", from, to, role.char()),
                None => format!("{}{}", from, to),
            },
            fen: position::fen_of(&pos),
        })?;
        let san = position::san(&pos, &mv);
        Ok(self.push_move(mv, san))
    }

    /// Play a move given in SAN, e.g. `Nf3` or `exd8=Q+`.
    pub fn add_san(&mut self, text: &str) -> Result<NodeId> {
        let pos = self.position();
        let illegal = || Error::IllegalMove {
            mv: text.to_string(),
            fen: position::fen_of(&pos),
        };
        let parsed: SanPlus = text.trim().parse().map_err(|_| illegal())?;
        let mv = parsed.san.to_move(&pos).map_err(|_| illegal())?;
        let san = position::san(&pos, &mv);
        Ok(self.push_move(mv, san))
    }

    /// Append an already legal move with its SAN.
    pub(crate) fn push_move(&mut self, mv: Move, san: String) -> NodeId {
        let top = self.path.top();
        self.tree.truncate_line(top.line, top.ply);
        let id = self.tree.push_node(top.line, MoveNode::new(mv, san));
        self.path.top_mut().ply += 1;
        id
    }

    /// Open a variation replacing the move just played and move into it.
    pub fn add_variation(&mut self) -> Result<LineId> {
        let node = self.path.current_node(self.tree).ok_or_else(|| {
            Error::OutOfRange("variation before the first move of the line".to_string())
        })?;
        let line = self.tree.push_variation(node);
        self.path.frames.push(Frame { line, ply: 0 });
        Ok(line)
    }

    /// Set the comment shown after the move just played. An empty text
    /// removes it.
    pub fn set_move_comment(&mut self, text: &str) -> Result<()> {
        let node = self.annotated_node("comment")?;
        node.post_comment = non_empty(text);
        Ok(())
    }

    /// Set the comment shown before the move just played.
    pub fn set_pre_comment(&mut self, text: &str) -> Result<()> {
        let node = self.annotated_node("comment")?;
        node.pre_comment = non_empty(text);
        Ok(())
    }

    pub fn add_nag(&mut self, code: u8) -> Result<()> {
        let node = self.annotated_node("NAG")?;
        node.nags.push(code);
        Ok(())
    }

    fn annotated_node(&mut self, what: &str) -> Result<&mut MoveNode> {
        let id = self
            .path
            .current_node(self.tree)
            .ok_or_else(|| Error::OutOfRange(format!("{} before the first move of the line", what)))?;
        Ok(self.tree.node_mut(id))
    }
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::Position;

    fn scholars_mate() -> GameTree {
        let mut tree = GameTree::new();
        let mut cursor = tree.cursor_mut();
        for san in ["e4", "e5", "Bc4", "Nc6", "Qh5", "Nf6", "Qxf7#"] {
            cursor.add_san(san).unwrap();
        }
        tree
    }

    #[test]
    fn test_add_move_caches_san_with_suffix() {
        let tree = scholars_mate();
        let last = tree.mainline().nodes()[6];
        assert_eq!(tree.node(last).san(), "Qxf7#");
        assert_eq!(tree.node(last).from(), Square::H5);
        assert_eq!(tree.node(last).to(), Square::F7);
    }

    #[test]
    fn test_illegal_move_leaves_tree_unchanged() {
        let mut tree = GameTree::new();
        let mut cursor = tree.cursor_mut();
        cursor.add_move(Square::E2, Square::E4, None).unwrap();
        let err = cursor.add_move(Square::E2, Square::E3, None).unwrap_err();
        assert!(matches!(err, Error::IllegalMove { .. }));
        assert_eq!(cursor.ply(), 1);
        assert!(matches!(cursor.add_san("Ke3"), Err(Error::IllegalMove { .. })));
        assert_eq!(tree.num_plies(), 1);
    }

    #[test]
    fn test_promotion_move() {
        let mut tree = GameTree::with_start_fen("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();
        let mut cursor = tree.cursor_mut();
        let id = cursor.add_move(Square::E7, Square::E8, Some(Role::Knight)).unwrap();
        assert_eq!(tree.node(id).san(), "e8=N");
        assert_eq!(tree.node(id).promotion(), Some(Role::Knight));
    }

    #[test]
    fn test_navigation_bounds() {
        let tree = scholars_mate();
        let mut cursor = tree.cursor();
        assert!(matches!(cursor.move_backup(), Err(Error::OutOfRange(_))));
        cursor.move_to_ply(7).unwrap();
        assert!(cursor.move_forward().is_err());
        assert_eq!(cursor.ply(), 7);
        assert!(cursor.position().is_checkmate());

        assert!(matches!(cursor.move_to_ply(8), Err(Error::OutOfRange(_))));
        assert_eq!(cursor.ply(), 7, "failed seek must not move the cursor");

        cursor.move_to_ply(2).unwrap();
        assert_eq!(cursor.current_move().unwrap().san(), "e5");
        assert_eq!(cursor.move_forward().unwrap().san(), "Bc4");
    }

    #[test]
    fn test_variation_branches_from_position_before_move() {
        let mut tree = scholars_mate();
        {
            let mut cursor = tree.cursor_mut();
            cursor.move_to_ply(4).unwrap(); // after 2... Nc6
            cursor.add_variation().unwrap();
            assert_eq!(cursor.depth(), 1);
            cursor.add_san("Nh6").unwrap();
            cursor.add_san("Qh5").unwrap();
            cursor.exit_variation().unwrap();
            assert_eq!(cursor.depth(), 0);
            assert_eq!(cursor.ply(), 4);
        }
        let nc6 = tree.node(tree.mainline().nodes()[3]);
        assert_eq!(nc6.variations().len(), 1);
        let line = tree.line(nc6.variations()[0]);
        let sans: Vec<&str> = line.nodes().iter().map(|&id| tree.node(id).san()).collect();
        assert_eq!(sans, vec!["Nh6", "Qh5"]);
        assert_eq!(tree.num_plies(), 7, "mainline is untouched");
    }

    #[test]
    fn test_nested_variation_position() {
        let mut tree = GameTree::new();
        let mut cursor = tree.cursor_mut();
        cursor.add_san("e4").unwrap();
        cursor.add_san("e5").unwrap();
        cursor.add_variation().unwrap();
        cursor.add_san("c5").unwrap();
        cursor.add_san("Nf3").unwrap();
        cursor.add_variation().unwrap();
        // Alternative to 2. Nf3 inside the Sicilian.
        cursor.add_san("c3").unwrap();
        assert_eq!(cursor.depth(), 2);
        let pos = cursor.position();
        assert!(pos.board().piece_at(Square::C5).is_some());
        assert!(pos.board().piece_at(Square::E5).is_none());
        assert!(pos.board().piece_at(Square::C3).is_some());
    }

    #[test]
    fn test_annotations_need_a_move() {
        let mut tree = GameTree::new();
        let mut cursor = tree.cursor_mut();
        assert!(matches!(cursor.add_nag(1), Err(Error::OutOfRange(_))));
        assert!(matches!(cursor.set_move_comment("x"), Err(Error::OutOfRange(_))));
        assert!(matches!(cursor.add_variation(), Err(Error::OutOfRange(_))));
        assert!(matches!(cursor.exit_variation(), Err(Error::OutOfRange(_))));

        cursor.add_san("d4").unwrap();
        cursor.add_nag(1).unwrap();
        cursor.add_nag(146).unwrap();
        cursor.add_nag(1).unwrap();
        cursor.set_move_comment("Queen's pawn").unwrap();
        cursor.set_pre_comment("A classic").unwrap();
        let node = cursor.current_move().unwrap();
        assert_eq!(node.nags(), &[1, 146, 1]);
        assert_eq!(node.post_comment(), Some("Queen's pawn"));
        assert_eq!(node.pre_comment(), Some("A classic"));
    }

    #[test]
    fn test_read_cursors_coexist() {
        let tree = scholars_mate();
        let mut a = tree.cursor();
        let b = a.clone();
        a.move_to_ply(3).unwrap();
        assert_eq!(a.ply(), 3);
        assert_eq!(b.ply(), 0);
        assert_eq!(b.next_move().unwrap().san(), "e4");
    }
}
