//! PGN text from a game tree and its header tags.
//!
//! Movetext is built as a flat list of tokens first (move numbers, SAN,
//! glyphs, comment words, parentheses glued to their neighbours) and then
//! filled into lines no wider than the wrap column.

use std::mem;

use shakmaty::{Chess, Color, Position};
use tracing::trace;

use super::nags::{self, html_escape, latex_escape};
use super::{Format, RenderStyle};
use crate::error::{Error, Result};
use crate::game::headers::SEVEN_TAG_ROSTER;
use crate::game::{position, GameResult, GameTree, HeaderTags, LineId, NodeId};

/// Renders games as PGN in a fixed [`RenderStyle`].
#[derive(Debug, Clone, Default)]
pub struct PgnWriter {
    style: RenderStyle,
}

impl PgnWriter {
    pub fn new(style: RenderStyle) -> Self {
        PgnWriter { style }
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Header block, a blank line, then the movetext.
    pub fn write(&self, tree: &GameTree, tags: &HeaderTags) -> Result<String> {
        let mut text = if self.style.short_header {
            self.short_header(tags)
        } else {
            self.long_header(tags)?
        };
        text.push('\n');
        text.push_str(&self.write_movetext(tree, tags.result())?);
        Ok(text)
    }

    /// Wrapped movetext ending with the result token and a newline.
    pub fn write_movetext(&self, tree: &GameTree, result: GameResult) -> Result<String> {
        let mut tokens = TokenStream::default();
        self.push_line(tree, LineId::MAIN, tree.start().position().clone(), &mut tokens)?;
        tokens.push(result.as_str());
        trace!("movetext has {} tokens", tokens.tokens.len());

        let mut text = fill(&tokens.tokens, self.style.wrap_column);
        text.push('\n');
        Ok(text)
    }

    /// Tokens for one line of play. Black's moves get a `N...` number only
    /// as the first move of the line or right after a variation.
    fn push_line(&self, tree: &GameTree, line: LineId, mut pos: Chess, out: &mut TokenStream) -> Result<()> {
        let style = &self.style;
        let mut show_number = true;

        for &id in tree.line(line).nodes() {
            let node = tree.node(id);

            if style.include_comments {
                if let Some(text) = node.pre_comment() {
                    self.push_comment(text, id, out)?;
                }
            }

            let number = pos.fullmoves().get();
            match pos.turn() {
                Color::White => out.push(&format!("{}.", number)),
                Color::Black if show_number => out.push(&format!("{}...", number)),
                Color::Black => {}
            }

            if node.san().is_empty() {
                return Err(Error::Render {
                    node: Some(id),
                    reason: "move has no SAN".to_string(),
                });
            }
            out.push(node.san());
            show_number = false;

            if style.include_nags {
                for &code in node.nags() {
                    let glyph = nags::lookup(code, style.format);
                    if nags::is_move_suffix(code) {
                        out.append(&glyph);
                        continue;
                    }
                    let glyph = glyph.trim();
                    if !glyph.is_empty() {
                        out.push(glyph);
                    }
                }
            }

            if style.include_comments {
                if let Some(text) = node.post_comment() {
                    self.push_comment(text, id, out)?;
                }
            }

            if style.include_variations {
                for &variation in node.variations() {
                    out.open();
                    self.push_line(tree, variation, pos.clone(), out)?;
                    out.close();
                    show_number = true;
                }
            }

            position::play(&mut pos, node.chess_move());
        }
        Ok(())
    }

    fn push_comment(&self, text: &str, id: NodeId, out: &mut TokenStream) -> Result<()> {
        if text.contains('}') {
            return Err(Error::Render {
                node: Some(id),
                reason: "comment contains '}'".to_string(),
            });
        }
        let text = match self.style.format {
            Format::Html => html_escape(text),
            Format::Latex => latex_escape(text),
            _ => text.into(),
        };
        let words: Vec<&str> = text.split_whitespace().collect();
        match words.as_slice() {
            [] => out.push("{}"),
            [only] => out.push(&format!("{{{}}}", only)),
            [first, middle @ .., last] => {
                out.push(&format!("{{{}", first));
                for word in middle {
                    out.push(word);
                }
                out.push(&format!("{}}}", last));
            }
        }
        Ok(())
    }

    /// Seven-tag roster in PGN order, then the other tags as stored.
    fn long_header(&self, tags: &HeaderTags) -> Result<String> {
        let mut text = String::new();
        for name in SEVEN_TAG_ROSTER {
            let value = match name {
                "Result" => tags.result().to_string(),
                _ => tags.roster_value(name),
            };
            text.push_str(&self.tag_line(name, &value));
        }
        for (name, value) in tags.extra_tags() {
            if !is_pgn_symbol(name) {
                return Err(Error::Render {
                    node: None,
                    reason: format!("tag name '{}' is not a PGN symbol", name),
                });
            }
            text.push_str(&self.tag_line(name, &value.to_string()));
        }
        Ok(text)
    }

    fn tag_line(&self, name: &str, value: &str) -> String {
        let value = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("[{} \"{}\"]\n", name, self.escape(&value))
    }

    /// Two-line summary:
    ///
    /// ```text
    /// White  (elo)  --  Black  (elo)
    /// Event  (Round r)  Site  Date  Result  ECO
    /// ```
    fn short_header(&self, tags: &HeaderTags) -> String {
        let player = |name: &str, elo: &str| match tags.elo(elo) {
            Some(rating) => format!("{}  ({})", tags.roster_value(name), rating),
            None => tags.roster_value(name),
        };
        let players = format!("{}  --  {}", player("White", "WhiteElo"), player("Black", "BlackElo"));

        let mut event = vec![tags.roster_value("Event")];
        if let Some(round) = tags.text("Round") {
            event.push(format!("(Round {})", round));
        }
        event.push(tags.roster_value("Site"));
        event.push(tags.roster_value("Date"));
        event.push(tags.result().to_string());
        if let Some(eco) = tags.text("ECO") {
            event.push(eco);
        }

        format!("{}\n{}\n", self.escape(&players), self.escape(&event.join("  ")))
    }

    fn escape(&self, text: &str) -> String {
        match self.style.format {
            Format::Html => html_escape(text).into_owned(),
            _ => text.to_string(),
        }
    }
}

/// PGN symbol: a letter or digit followed by letters, digits and `_+#=:-`.
fn is_pgn_symbol(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphanumeric())
        && chars.all(|c| c.is_ascii_alphanumeric() || "_+#=:-".contains(c))
}

/// Movetext tokens. An opening parenthesis waits for the next token, a
/// closing one sticks to the previous token.
#[derive(Debug, Default)]
struct TokenStream {
    tokens: Vec<String>,
    prefix: String,
}

impl TokenStream {
    fn push(&mut self, text: &str) {
        let mut token = mem::take(&mut self.prefix);
        token.push_str(text);
        self.tokens.push(token);
    }

    /// Glue `text` to the end of the previous token.
    fn append(&mut self, text: &str) {
        if self.prefix.is_empty() {
            if let Some(last) = self.tokens.last_mut() {
                last.push_str(text);
                return;
            }
        }
        self.push(text);
    }

    fn open(&mut self) {
        self.prefix.push('(');
    }

    fn close(&mut self) {
        if self.prefix.is_empty() {
            self.append(")");
        } else {
            self.prefix.push(')');
            let token = mem::take(&mut self.prefix);
            self.tokens.push(token);
        }
    }
}

/// Greedy fill. A token wider than `width` gets a line to itself; width 0
/// puts everything on one line.
fn fill(tokens: &[String], width: usize) -> String {
    let mut text = String::new();
    let mut column = 0;
    for token in tokens {
        let len = token.chars().count();
        if column == 0 {
            text.push_str(token);
            column = len;
        } else if width == 0 || column + 1 + len <= width {
            text.push(' ');
            text.push_str(token);
            column += 1 + len;
        } else {
            text.push('\n');
            text.push_str(token);
            column = len;
        }
    }
    text
}
