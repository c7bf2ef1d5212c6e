//! SCID game records to PGN.
//!
//! [`scid::decode`] turns the bytes of one stored game into a [`GameTree`]
//! plus the tags kept in the record, [`scid::encode`] does the reverse, and
//! [`PgnWriter`] renders a tree as wrapped PGN in plain, HTML, LaTeX or
//! colour markup.

pub mod error;
pub mod game;
pub mod pgn;
pub mod scid;

pub use error::{Error, MalformedKind, Result};
pub use game::{GameResult, GameTree, HeaderTags, PgnDate, TagValue};
pub use pgn::{ExportSummary, Format, GameLocation, PgnExporter, PgnWriter, RenderStyle};
pub use scid::{DecodeMode, DecodedGame, GameFile};
