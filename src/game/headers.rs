use std::fmt;

/// The seven-tag roster, in the order PGN requires.
pub const SEVEN_TAG_ROSTER: [&str; 7] = ["Event", "Site", "Date", "Round", "White", "Black", "Result"];

/// Game result as written in the Result tag and after the movetext.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    #[default]
    Unknown,
}

impl GameResult {
    pub fn as_str(self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::Unknown => "*",
        }
    }

    /// Parse a PGN result token; anything unrecognised is `Unknown`.
    pub fn from_pgn(token: &str) -> Self {
        match token.trim() {
            "1-0" => GameResult::WhiteWins,
            "0-1" => GameResult::BlackWins,
            "1/2-1/2" | "=-=" => GameResult::Draw,
            _ => GameResult::Unknown,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A PGN date where any part may be unknown (stored as 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PgnDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl PgnDate {
    /// Largest year the packed form can hold.
    pub const MAX_YEAR: u16 = 2047;

    pub fn new(year: u16, month: u8, day: u8) -> Self {
        PgnDate { year, month, day }
    }

    /// Unpack SCID's `year * 512 + month * 32 + day` date field.
    pub fn from_packed(packed: u32) -> Self {
        PgnDate {
            year: ((packed >> 9) & 0x7FF) as u16,
            month: ((packed >> 5) & 0x0F) as u8,
            day: (packed & 0x1F) as u8,
        }
    }

    /// Whether [`packed`](Self::packed) keeps every field intact.
    pub fn fits_packed(self) -> bool {
        self.year <= Self::MAX_YEAR && self.month <= 15 && self.day <= 31
    }

    pub fn packed(self) -> u32 {
        ((self.year as u32 & 0x7FF) << 9) | ((self.month as u32 & 0x0F) << 5) | (self.day as u32 & 0x1F)
    }

    /// Parse `YYYY.MM.DD` with `?` for unknown parts.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.trim().split('.');
        let mut field = |max: u32| -> Option<u32> {
            let part = parts.next()?;
            if part.chars().all(|c| c == '?') {
                return Some(0);
            }
            let value: u32 = part.parse().ok()?;
            (value <= max).then_some(value)
        };
        let year = field(PgnDate::MAX_YEAR as u32)?;
        let month = field(12)?;
        let day = field(31)?;
        Some(PgnDate::new(year as u16, month as u8, day as u8))
    }
}

impl fmt::Display for PgnDate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.year == 0 {
            f.write_str("????")?;
        } else {
            write!(f, "{:04}", self.year)?;
        }
        if self.month == 0 {
            f.write_str(".??")?;
        } else {
            write!(f, ".{:02}", self.month)?;
        }
        if self.day == 0 {
            f.write_str(".??")
        } else {
            write!(f, ".{:02}", self.day)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    Text(String),
    Date(PgnDate),
    Number(u32),
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TagValue::Text(text) => f.write_str(text),
            TagValue::Date(date) => write!(f, "{}", date),
            TagValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for TagValue {
    fn from(text: &str) -> Self {
        TagValue::Text(text.to_string())
    }
}

impl From<String> for TagValue {
    fn from(text: String) -> Self {
        TagValue::Text(text)
    }
}

impl From<PgnDate> for TagValue {
    fn from(date: PgnDate) -> Self {
        TagValue::Date(date)
    }
}

impl From<u32> for TagValue {
    fn from(n: u32) -> Self {
        TagValue::Number(n)
    }
}

/// PGN header tags in insertion order. Setting an existing tag replaces
/// its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderTags {
    tags: Vec<(String, TagValue)>,
}

impl HeaderTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<TagValue>) {
        let value = value.into();
        match self.tags.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.tags.push((name.to_string(), value)),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<TagValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&TagValue> {
        self.tags.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn remove(&mut self, name: &str) -> Option<TagValue> {
        let index = self.tags.iter().position(|(n, _)| n == name)?;
        Some(self.tags.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.tags.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Tags outside the seven-tag roster, in insertion order.
    pub fn extra_tags(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.iter().filter(|(n, _)| !SEVEN_TAG_ROSTER.contains(n))
    }

    /// Value of a roster tag as written in PGN, with the PGN default when
    /// the tag is missing.
    pub fn roster_value(&self, name: &str) -> String {
        match self.get(name) {
            Some(value) => value.to_string(),
            None => match name {
                "Date" => PgnDate::default().to_string(),
                "Result" => GameResult::Unknown.to_string(),
                _ => "?".to_string(),
            },
        }
    }

    pub fn result(&self) -> GameResult {
        self.get("Result")
            .map(|v| GameResult::from_pgn(&v.to_string()))
            .unwrap_or_default()
    }

    pub fn set_result(&mut self, result: GameResult) {
        self.set("Result", result.as_str());
    }

    pub fn elo(&self, tag: &str) -> Option<u32> {
        match self.get(tag)? {
            TagValue::Number(n) => Some(*n),
            TagValue::Text(t) => t.parse().ok(),
            TagValue::Date(_) => None,
        }
        .filter(|&n| n > 0)
    }

    pub fn text(&self, tag: &str) -> Option<String> {
        self.get(tag).map(|v| v.to_string()).filter(|s| !s.is_empty() && s != "?")
    }
}
