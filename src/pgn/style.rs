use std::fmt;
use std::str::FromStr;

/// Markup flavour of the rendered text. Only annotation glyphs and comment
/// escaping differ between formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Plain,
    Html,
    Latex,
    Color,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" => Ok(Format::Plain),
            "html" => Ok(Format::Html),
            "latex" => Ok(Format::Latex),
            "color" | "colour" => Ok(Format::Color),
            other => Err(format!("unknown format '{}' (expected plain, html, latex or color)", other)),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Format::Plain => "plain",
            Format::Html => "html",
            Format::Latex => "latex",
            Format::Color => "color",
        })
    }
}

/// What the PGN renderer emits and how it lays it out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderStyle {
    pub format: Format,
    pub include_comments: bool,
    pub include_variations: bool,
    pub include_nags: bool,
    pub short_header: bool,
    pub wrap_column: usize,
}

impl RenderStyle {
    pub fn new() -> Self {
        RenderStyle {
            format: Format::Plain,
            include_comments: true,
            include_variations: true,
            include_nags: true,
            short_header: false,
            wrap_column: 80,
        }
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn with_comments(mut self, include: bool) -> Self {
        self.include_comments = include;
        self
    }

    pub fn with_variations(mut self, include: bool) -> Self {
        self.include_variations = include;
        self
    }

    pub fn with_nags(mut self, include: bool) -> Self {
        self.include_nags = include;
        self
    }

    pub fn with_short_header(mut self, short: bool) -> Self {
        self.short_header = short;
        self
    }

    /// Column to wrap at; a single token longer than this gets a line of
    /// its own.
    pub fn with_wrap_column(mut self, column: usize) -> Self {
        self.wrap_column = column;
        self
    }
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style() {
        let style = RenderStyle::default();
        assert_eq!(style.format, Format::Plain);
        assert!(style.include_comments && style.include_variations && style.include_nags);
        assert!(!style.short_header);
        assert_eq!(style.wrap_column, 80);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("LaTeX".parse::<Format>(), Ok(Format::Latex));
        assert_eq!("colour".parse::<Format>(), Ok(Format::Color));
        assert!("rtf".parse::<Format>().is_err());
        assert_eq!(Format::Html.to_string().parse::<Format>(), Ok(Format::Html));
    }
}
