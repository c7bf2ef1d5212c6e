use std::fs;

use scidpgn::scid::{decode, encode};
use scidpgn::{
    DecodeMode, Error, Format, GameFile, GameLocation, GameResult, GameTree, HeaderTags, MalformedKind, PgnDate,
    PgnExporter, PgnWriter, RenderStyle,
};

// End-to-end tests: trees built through the cursor API, stored as SCID
// records, read back and rendered as PGN.

fn build_mainline(moves: &[&str]) -> GameTree {
    let mut tree = GameTree::new();
    let mut cursor = tree.cursor_mut();
    for san in moves {
        cursor.add_san(san).unwrap_or_else(|e| panic!("{} should be legal: {}", san, e));
    }
    tree
}

/// The Opera game with a few annotations and nested variations.
fn opera_game() -> GameTree {
    let mut tree = build_mainline(&["e4", "e5", "Nf3", "d6", "d4", "Bg4", "dxe5", "Bxf3", "Qxf3", "dxe5"]);
    {
        let mut cursor = tree.cursor_mut();
        cursor.move_to_ply(6).unwrap();
        cursor.add_nag(6).unwrap();
        cursor.set_move_comment("This pin is a mistake").unwrap();
        cursor.add_variation().unwrap();
        cursor.add_san("exd4").unwrap();
        cursor.add_san("Nxd4").unwrap();
        cursor.add_variation().unwrap();
        cursor.add_san("Qxd4").unwrap();
        cursor.add_nag(10).unwrap();
        cursor.exit_variation().unwrap();
        cursor.exit_variation().unwrap();

        cursor.move_to_ply(10).unwrap();
        for san in ["Bc4", "Nf6", "Qb3", "Qe7", "Nc3", "c6", "Bg5", "b5", "Nxb5", "cxb5", "Bxb5+", "Nbd7"] {
            cursor.add_san(san).unwrap();
        }
        cursor.set_pre_comment("Forced").unwrap();
        for san in ["O-O-O", "Rd8", "Rxd7", "Rxd7", "Rd1", "Qe6", "Bxd7+", "Nxd7", "Qb8+", "Nxb8", "Rd8#"] {
            cursor.add_san(san).unwrap();
        }
        cursor.add_nag(3).unwrap();
    }
    tree
}

fn opera_tags() -> HeaderTags {
    HeaderTags::new()
        .with("Event", "Paris")
        .with("Site", "Paris FRA")
        .with("Date", PgnDate::new(1858, 0, 0))
        .with("Round", "?")
        .with("White", "Morphy, Paul")
        .with("Black", "Duke Karl / Count Isouard")
        .with("Result", "1-0")
        .with("ECO", "C41")
        .with("Annotator", "Test")
}

/// Encoding then decoding gives back the same tree and non-roster tags.
#[test]
fn test_round_trip_annotated_game() {
    let tree = opera_game();
    let tags = opera_tags();
    let bytes = encode(&tree, &tags).expect("tree built through the cursor encodes");

    let game = decode(&bytes, DecodeMode::FULL).expect("encoded game decodes");
    assert_eq!(game.tree, tree, "decoded tree differs from the original");
    assert_eq!(game.tree.num_plies(), 33);
    assert_eq!(game.tree.num_variations(), 2);
    assert_eq!(game.tags.text("ECO").as_deref(), Some("C41"));
    assert_eq!(game.tags.text("Annotator").as_deref(), Some("Test"));
    assert!(game.tags.get("White").is_none(), "roster tags live in the index");
}

/// Rendering a decoded copy gives exactly the same text as the original.
#[test]
fn test_render_after_round_trip_is_identical() {
    let tree = opera_game();
    let tags = opera_tags();
    let decoded = decode(&encode(&tree, &tags).unwrap(), DecodeMode::FULL).unwrap();

    for format in [Format::Plain, Format::Html, Format::Latex, Format::Color] {
        let writer = PgnWriter::new(RenderStyle::default().with_format(format));
        assert_eq!(
            writer.write(&decoded.tree, &tags).unwrap(),
            writer.write(&tree, &tags).unwrap(),
            "{} output changed after a round trip",
            format
        );
    }
}

#[test]
fn test_opera_game_pgn() {
    let pgn = PgnWriter::default().write(&opera_game(), &opera_tags()).unwrap();
    let (header, movetext) = pgn.split_once("\n\n").expect("blank line after the header");

    let tag_names: Vec<&str> = header
        .lines()
        .map(|line| line.trim_start_matches('[').split(' ').next().unwrap())
        .collect();
    assert_eq!(
        tag_names,
        vec!["Event", "Site", "Date", "Round", "White", "Black", "Result", "ECO", "Annotator"]
    );
    assert!(header.contains("[Date \"1858.??.??\"]"));

    let flat = movetext.split_whitespace().collect::<Vec<_>>().join(" ");
    assert!(flat.starts_with(
        "1. e4 e5 2. Nf3 d6 3. d4 Bg4?! {This pin is a mistake} (3... exd4 4. Nxd4 (4. Qxd4)) 4. dxe5"
    ));
    assert!(flat.contains("11. Bxb5+ {Forced} Nbd7 12. O-O-O"));
    assert!(flat.ends_with("17. Rd8#!! 1-0"));
    assert!(movetext.lines().all(|line| line.chars().count() <= 80));
}

/// A record written out byte by byte decodes to the expected moves.
#[test]
fn test_hand_assembled_record() {
    let data = [
        3, b'E', b'C', b'O', 3, b'C', b'2', b'0', // extra tag ECO "C20"
        0,    // end of tags
        0,    // flags: standard start
        0xCF, // e4
        0xCF, // e5
        0x5A, // Bc4
        0x0B, 5, // !?
        0x0F,
    ];
    let game = decode(&data, DecodeMode::FULL).unwrap();
    let writer = PgnWriter::new(RenderStyle::default().with_short_header(true));
    let pgn = writer.write(&game.tree, &game.tags).unwrap();
    assert!(pgn.ends_with("\n\n1. e4 e5 2. Bc4!? *\n"), "got {}", pgn);
    assert!(pgn.lines().nth(1).unwrap().ends_with("C20"));
}

/// Decoding any corrupted copy of a record either succeeds or reports a
/// malformed record; it never panics.
#[test]
fn test_corrupted_records_fail_cleanly() {
    let bytes = encode(&opera_game(), &opera_tags()).unwrap();
    for i in 0..bytes.len() {
        for replacement in [0x00, 0x0D, 0x0E, 0x0F, 0x7F, 0xFF] {
            let mut corrupt = bytes.clone();
            corrupt[i] = replacement;
            match decode(&corrupt, DecodeMode::FULL) {
                Ok(_) | Err(Error::Malformed { .. }) => {}
                Err(other) => panic!("byte {} = {:#x}: unexpected error {}", i, replacement, other),
            }
        }
    }
    assert!(matches!(
        decode(&bytes[..bytes.len() - 1], DecodeMode::FULL),
        Err(Error::Malformed { kind: MalformedKind::Truncated, .. })
    ));
}

/// Games written to a file one after another export through a GameFile.
#[test]
fn test_export_from_game_file() {
    let first = encode(&opera_game(), &HeaderTags::new()).unwrap();
    let second = encode(&build_mainline(&["d4", "Nf6", "c4", "g6"]), &HeaderTags::new()).unwrap();
    let mut data = first.clone();
    data.extend_from_slice(&second);

    let dir = std::env::temp_dir().join(format!("scidpgn-test-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let game_path = dir.join("games.sg4");
    let pgn_path = dir.join("games.pgn");
    fs::write(&game_path, &data).unwrap();

    let mut kings_indian = HeaderTags::new().with("White", "Anon");
    kings_indian.set_result(GameResult::Draw);
    let locations = vec![
        GameLocation::new(0, first.len() as u32).with_tags(opera_tags()),
        GameLocation::new(first.len() as u32, second.len() as u32).with_tags(kings_indian),
    ];

    let mut games = GameFile::load(&game_path).unwrap();
    let exporter = PgnExporter::new().with_style(RenderStyle::default().with_variations(false).with_comments(false));
    let summary = exporter.export_to_file(&mut games, &locations, &pgn_path).unwrap();
    assert_eq!(summary.exported, 2);
    assert_eq!(summary.failed, 0);

    let pgn = fs::read_to_string(&pgn_path).unwrap();
    assert!(pgn.contains("[White \"Morphy, Paul\"]"));
    assert!(pgn.contains("1. d4 Nf6 2. c4 g6 1/2-1/2\n"));
    assert!(!pgn.contains('('), "variations were not requested");
    assert!(!pgn.contains('{'), "comments were not requested");

    fs::remove_dir_all(&dir).ok();
}
