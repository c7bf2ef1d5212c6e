//! The extra tag section at the front of a game record.
//!
//! The seven-tag roster, Elo ratings and ECO live in the index file; any
//! other PGN tag is stored here. Each entry starts with a marker byte:
//!
//! - `1..=240`: length of the tag name that follows
//! - `241..=250`: one of [`COMMON_TAGS`], no name bytes
//! - `255`: EventDate packed in 3 bytes, no value bytes
//!
//! then, except for `255`, a value length byte and the value. A `0` marker
//! ends the section.

use tracing::warn;

use super::buffer::{ByteReader, ByteWriter};
use crate::error::{MalformedKind, Result};
use crate::game::{HeaderTags, PgnDate, TagValue};

pub const MAX_TAG_LEN: u8 = 240;

const BINARY_EVENT_DATE: u8 = 255;

/// Tag names stored as a single marker byte, starting at 241.
pub const COMMON_TAGS: [&str; 10] = [
    "WhiteCountry",
    "BlackCountry",
    "Annotator",
    "PlyCount",
    "EventDate",
    "Opening",
    "Variation",
    "Setup",
    "Source",
    "SetUp",
];

pub fn decode_tags(buf: &mut ByteReader, tags: &mut HeaderTags) -> Result<()> {
    loop {
        let marker = buf.get_byte()?;
        let name = match marker {
            0 => return Ok(()),
            BINARY_EVENT_DATE => {
                let date = PgnDate::from_packed(buf.get_u24()?);
                tags.set("EventDate", date);
                continue;
            }
            1..=MAX_TAG_LEN => buf.get_text(marker as usize)?,
            241..=250 => COMMON_TAGS[(marker - 241) as usize].to_string(),
            _ => return Err(buf.malformed(MalformedKind::BadTagMarker(marker))),
        };
        let len = buf.get_byte()? as usize;
        let value = buf.get_text(len)?;
        tags.set(&name, value);
    }
}

pub fn encode_tags(out: &mut ByteWriter, tags: &HeaderTags) {
    for (name, value) in tags.extra_tags() {
        // Dates the packed field cannot hold fall through to text.
        if let ("EventDate", TagValue::Date(date)) = (name, value) {
            if date.fits_packed() {
                out.put_byte(BINARY_EVENT_DATE);
                out.put_u24(date.packed());
                continue;
            }
        }

        if let Some(i) = COMMON_TAGS.iter().position(|&t| t == name) {
            out.put_byte(241 + i as u8);
        } else if name.is_empty() || name.len() > MAX_TAG_LEN as usize {
            warn!("skipping tag with unstorable name '{}'", name);
            continue;
        } else {
            out.put_byte(name.len() as u8);
            out.put_bytes(name.as_bytes());
        }

        let text = value.to_string();
        let stored = truncate_at_char(&text, u8::MAX as usize);
        if stored.len() < text.len() {
            warn!("tag {} truncated to {} bytes", name, stored.len());
        }
        out.put_byte(stored.len() as u8);
        out.put_bytes(stored.as_bytes());
    }
    out.put_byte(0);
}

fn truncate_at_char(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_decode_empty_tags() {
        let data = [0];
        let mut buf = ByteReader::new(&data);
        let mut tags = HeaderTags::new();
        decode_tags(&mut buf, &mut tags).unwrap();
        assert!(tags.is_empty());
        assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn test_decode_named_and_common_tags() {
        let mut data = vec![3];
        data.extend_from_slice(b"ECO");
        data.push(3);
        data.extend_from_slice(b"B12");
        data.push(243); // Annotator
        data.push(5);
        data.extend_from_slice(b"Shane");
        data.push(0);

        let mut buf = ByteReader::new(&data);
        let mut tags = HeaderTags::new();
        decode_tags(&mut buf, &mut tags).unwrap();
        assert_eq!(tags.get("ECO"), Some(&TagValue::from("B12")));
        assert_eq!(tags.get("Annotator"), Some(&TagValue::from("Shane")));
    }

    #[test]
    fn test_binary_event_date() {
        let date = PgnDate::new(1985, 9, 3);
        let tags = HeaderTags::new().with("EventDate", date);
        let mut out = ByteWriter::new();
        encode_tags(&mut out, &tags);
        let bytes = out.into_bytes();
        assert_eq!(bytes[0], 255);
        assert_eq!(bytes.len(), 5);

        let mut decoded = HeaderTags::new();
        decode_tags(&mut ByteReader::new(&bytes), &mut decoded).unwrap();
        assert_eq!(decoded.get("EventDate"), Some(&TagValue::Date(date)));
    }

    #[test]
    fn test_event_date_beyond_packed_range_kept_as_text() {
        let date = PgnDate::new(3000, 5, 0);
        let tags = HeaderTags::new().with("EventDate", date);
        let mut out = ByteWriter::new();
        encode_tags(&mut out, &tags);
        let bytes = out.into_bytes();
        assert_eq!(bytes[0], 245, "stored under the common EventDate marker");

        let mut decoded = HeaderTags::new();
        decode_tags(&mut ByteReader::new(&bytes), &mut decoded).unwrap();
        assert_eq!(decoded.get("EventDate"), Some(&TagValue::from("3000.05.??")));
    }

    #[test]
    fn test_roster_tags_are_not_stored() {
        let tags = HeaderTags::new()
            .with("White", "Tal")
            .with("Opening", "Sicilian")
            .with("Result", "1-0");
        let mut out = ByteWriter::new();
        encode_tags(&mut out, &tags);
        let bytes = out.into_bytes();
        assert_eq!(bytes[0], 241 + 5);

        let mut decoded = HeaderTags::new();
        decode_tags(&mut ByteReader::new(&bytes), &mut decoded).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.text("Opening").as_deref(), Some("Sicilian"));
    }

    #[test]
    fn test_reserved_marker_is_malformed() {
        let data = [251, 0];
        let err = decode_tags(&mut ByteReader::new(&data), &mut HeaderTags::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::Malformed { offset: 1, kind: MalformedKind::BadTagMarker(251) }
        ));
    }

    #[test]
    fn test_long_value_truncated_on_char_boundary() {
        let long = "é".repeat(200);
        let tags = HeaderTags::new().with("Source", long.as_str());
        let mut out = ByteWriter::new();
        encode_tags(&mut out, &tags);
        let mut decoded = HeaderTags::new();
        decode_tags(&mut ByteReader::new(&out.into_bytes()), &mut decoded).unwrap();
        assert_eq!(decoded.text("Source").unwrap().chars().count(), 127);
    }
}
