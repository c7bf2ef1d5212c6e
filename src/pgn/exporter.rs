use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use super::{PgnWriter, RenderStyle};
use crate::error::Result;
use crate::game::HeaderTags;
use crate::scid::{decode, DecodeMode, GameFile};

/// Where one game's record sits in the game file, plus the tags kept
/// outside the record (the seven-tag roster, ratings, ECO).
#[derive(Debug, Clone, Default)]
pub struct GameLocation {
    pub offset: u32,
    pub length: u32,
    pub tags: HeaderTags,
}

impl GameLocation {
    pub fn new(offset: u32, length: u32) -> Self {
        GameLocation { offset, length, tags: HeaderTags::new() }
    }

    pub fn with_tags(mut self, tags: HeaderTags) -> Self {
        self.tags = tags;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub exported: usize,
    pub failed: usize,
}

/// Batch driver: reads, decodes and renders games one after another. A game
/// that fails is logged and counted, and the export carries on.
pub struct PgnExporter {
    style: RenderStyle,
    max_games: Option<usize>,
}

impl PgnExporter {
    pub fn new() -> Self {
        PgnExporter {
            style: RenderStyle::default(),
            max_games: None,
        }
    }

    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_max_games(mut self, max: usize) -> Self {
        self.max_games = Some(max);
        self
    }

    /// Decode only what the style is going to print.
    pub fn decode_mode(&self) -> DecodeMode {
        DecodeMode {
            movetext: true,
            variations: self.style.include_variations,
            comments: self.style.include_comments,
            nags: self.style.include_nags,
        }
    }

    /// Export to a new file at `output_path`.
    pub fn export_to_file<R: Read + Seek>(
        &self,
        games: &mut GameFile<R>,
        locations: &[GameLocation],
        output_path: &Path,
    ) -> Result<ExportSummary> {
        let file = File::create(output_path)?;
        let mut writer = BufWriter::new(file);
        self.export(games, locations, &mut writer)
    }

    /// Write every game in `locations` to `writer`, separated by blank
    /// lines. Only failures of `writer` itself abort the export.
    pub fn export<R: Read + Seek, W: Write>(
        &self,
        games: &mut GameFile<R>,
        locations: &[GameLocation],
        writer: &mut W,
    ) -> Result<ExportSummary> {
        let count = self.max_games.map_or(locations.len(), |max| max.min(locations.len()));
        let mut summary = ExportSummary::default();

        for (game_num, location) in locations.iter().take(count).enumerate() {
            match self.export_game(games, location) {
                Ok(text) => {
                    writer.write_all(text.as_bytes())?;
                    writer.write_all(b"\n")?;
                    summary.exported += 1;
                }
                Err(e) => {
                    warn!(game = game_num + 1, offset = location.offset, "skipping game: {}", e);
                    summary.failed += 1;
                }
            }

            if summary.exported > 0 && summary.exported % 1000 == 0 {
                info!("exported {} games...", summary.exported);
            }
        }

        writer.flush()?;
        info!("exported {} games, {} failed", summary.exported, summary.failed);
        Ok(summary)
    }

    /// PGN text of one game. Tags stored in the record override those
    /// given with the location.
    pub fn export_game<R: Read + Seek>(&self, games: &mut GameFile<R>, location: &GameLocation) -> Result<String> {
        let data = games.game_data(location.offset, location.length)?;
        let game = decode(&data, self.decode_mode())?;
        debug!("game at {} has {} plies", location.offset, game.tree.num_plies());

        let mut tags = location.tags.clone();
        for (name, value) in game.tags.iter() {
            tags.set(name, value.clone());
        }
        PgnWriter::new(self.style.clone()).write(&game.tree, &tags)
    }
}

impl Default for PgnExporter {
    fn default() -> Self {
        Self::new()
    }
}
