//! Annotation glyphs (NAGs) in each output format.
//!
//! [`lookup`] is total: every code has an entry in every format, possibly
//! the empty string.

use std::borrow::Cow;
use std::fmt::Write;

use super::Format;

/// Largest code with a typeset form.
pub const MAX_TYPESET_NAG: u8 = 215;

/// Codes that are glued to the move they annotate (`e4!`, `Nf3?!`).
pub fn is_move_suffix(code: u8) -> bool {
    (1..=6).contains(&code)
}

/// Text for `code` in `format`.
pub fn lookup(code: u8, format: Format) -> Cow<'static, str> {
    match format {
        Format::Plain => Cow::Borrowed(plain(code)),
        Format::Latex => latex(code),
        Format::Color => Cow::Borrowed(symbol(code)),
        Format::Html => html_escape(symbol(code)),
    }
}

fn plain(code: u8) -> &'static str {
    match code {
        1 => "!",
        2 => "?",
        3 => "!!",
        4 => "??",
        5 => "!?",
        6 => "?!",
        7 => "forced",
        9 => "worst",
        _ => "",
    }
}

fn latex(code: u8) -> Cow<'static, str> {
    let literal = match code {
        1..=7 | 9 => plain(code),
        12 => "{$\\leftrightarrows$}",
        30 => "{$\\circlearrowleft$}",
        31 => "{$\\circlearrowright$}",
        48 | 49 => "{$$\\boxplus$$}",
        _ => match xskak_keyword(code) {
            Some(keyword) => return Cow::Owned(format!(" \\xskakcomment{{\\{}}}", keyword)),
            None => "",
        },
    };
    Cow::Borrowed(literal)
}

/// xskak macro names, spelled as the xskak package spells them.
fn xskak_keyword(code: u8) -> Option<&'static str> {
    let keyword = match code {
        8 => "onlymove",
        10 => "equal",
        13 => "unclear",
        14 => "wbetter",
        15 => "bbetter",
        16 => "wupperhand",
        17 => "bupperhand",
        18 => "wdecisive",
        19 => "bdecisive",
        22 | 23 => "zugzwang",
        26 => "moreroom",
        35 => "devadvantage",
        36 => "withinit",
        40 => "withattack",
        44 => "compensation",
        50 | 51 => "centre",
        58 => "kside",
        62 => "qside",
        132 => "counterplay",
        136 => "timelimt",
        140 => "withidea",
        142 => "betteris",
        144 => "various",
        145 => "comment",
        146 => "novelty",
        147 => "weakpt",
        148 => "ending",
        149 => "file",
        150 => "diagonal",
        151 => "bishoppair",
        153 => "opposbishops",
        154 => "samebishops",
        190 => "etc",
        191 => "doublepawns",
        192 => "seppawns",
        193 => "unitedpawns",
        210 => "see",
        211 => "mate",
        212 => "passedpawn",
        213 => "morepawns",
        214 => "with",
        215 => "without",
        _ => return None,
    };
    Some(keyword)
}

fn symbol(code: u8) -> &'static str {
    match code {
        1..=6 => plain(code),
        7 | 8 => "\u{25A1}",
        9 => "\u{2717}",
        10 => "=",
        12 => "\u{21C6}",
        13 => "\u{221E}",
        14 => "\u{2A72}",
        15 => "\u{2A71}",
        16 => "\u{00B1}",
        17 => "\u{2213}",
        18 => "+\u{2212}",
        19 => "\u{2212}+",
        22 | 23 => "\u{2A00}",
        26 => "\u{25CB}",
        30 => "\u{21BA}",
        31 => "\u{21BB}",
        35 => "\u{27F3}",
        36 => "\u{2191}",
        40 => "\u{2192}",
        44 => "=/\u{221E}",
        48..=51 => "\u{229E}",
        58 => "\u{27EB}",
        62 => "\u{27EA}",
        132 => "\u{21C4}",
        136 => "\u{2295}",
        140 => "\u{2206}",
        142 => "\u{2313}",
        144 => "R",
        145 => "RR",
        146 => "N",
        147 => "\u{00D7}",
        148 => "\u{22A5}",
        149 => "\u{21D4}",
        150 => "\u{21D7}",
        151 => "\u{25E9}\u{25E9}",
        153 => "\u{25E9}\u{25EA}",
        154 => "\u{25E9}\u{25E9}=",
        190 => "etc.",
        191 => "\u{26AF}",
        192 => "\u{26AE}",
        193 => "\u{26AD}",
        210 => "\u{21D2}",
        211 => "#",
        212 => "\u{21D1}",
        213 => "> P",
        214 => "w/",
        215 => "w/o",
        _ => "",
    }
}

/// Escape `&`, `<` and `>`, and write non-ASCII characters as numeric
/// references.
pub(crate) fn html_escape(text: &str) -> Cow<'_, str> {
    if text.chars().all(|c| c.is_ascii() && !matches!(c, '&' | '<' | '>')) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() * 4);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c if c.is_ascii() => out.push(c),
            c => {
                let _ = write!(out, "&#{};", c as u32);
            }
        }
    }
    Cow::Owned(out)
}

/// Escape the characters LaTeX treats specially in running text.
pub(crate) fn latex_escape(text: &str) -> Cow<'_, str> {
    const SPECIAL: &[char] = &['\\', '{', '}', '#', '$', '%', '&', '_', '~', '^'];
    if !text.contains(SPECIAL) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '{' | '}' | '#' | '$' | '%' | '&' | '_' => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}
