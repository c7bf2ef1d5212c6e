use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process;

use tracing_subscriber::EnvFilter;

use scidpgn::{Format, GameFile, GameLocation, GameResult, HeaderTags, PgnExporter, RenderStyle};

/// Decode one game from a SCID game file (.sg4) and print it as PGN.
///
/// The record is located by its byte offset and length, as listed in the
/// database index. Set `RUST_LOG=debug` to trace decoding.
#[derive(Parser)]
#[command(name = "scidpgn")]
#[command(about = "Convert a SCID game record to PGN")]
#[command(version)]
struct Args {
    /// Path to the SCID game file
    #[arg(value_name = "GAMEFILE")]
    game_file: PathBuf,

    /// Byte offset of the game record
    #[arg(long, default_value = "0")]
    offset: u32,

    /// Length of the game record in bytes (default: up to the end of the file)
    #[arg(long)]
    length: Option<u32>,

    /// Output PGN file (default: standard output)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Markup for annotation glyphs: plain, html, latex or color
    #[arg(long, default_value = "plain")]
    format: Format,

    /// Leave out comments
    #[arg(long)]
    no_comments: bool,

    /// Leave out variations
    #[arg(long)]
    no_variations: bool,

    /// Leave out NAG glyphs
    #[arg(long)]
    no_nags: bool,

    /// Print SCID's two-line summary instead of the tag roster
    #[arg(long)]
    short_header: bool,

    /// Wrap movetext at this column (0 = no wrapping)
    #[arg(long, default_value = "80")]
    wrap: usize,

    /// Game result, which SCID keeps in the index rather than the record
    #[arg(long, default_value = "*")]
    result: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> scidpgn::Result<()> {
    let length = match args.length {
        Some(length) => length,
        None => {
            let size = std::fs::metadata(&args.game_file)?.len();
            u32::try_from(size.saturating_sub(args.offset as u64)).unwrap_or(u32::MAX)
        }
    };

    let style = RenderStyle::new()
        .with_format(args.format)
        .with_comments(!args.no_comments)
        .with_variations(!args.no_variations)
        .with_nags(!args.no_nags)
        .with_short_header(args.short_header)
        .with_wrap_column(args.wrap);

    let mut tags = HeaderTags::new();
    tags.set_result(GameResult::from_pgn(&args.result));
    let location = GameLocation::new(args.offset, length).with_tags(tags);

    let mut games = GameFile::load(&args.game_file)?;
    let exporter = PgnExporter::new().with_style(style);

    let summary = match &args.output {
        Some(path) => exporter.export_to_file(&mut games, &[location], path)?,
        None => exporter.export(&mut games, &[location], &mut io::stdout().lock())?,
    };

    if summary.failed > 0 {
        process::exit(1);
    }
    Ok(())
}
