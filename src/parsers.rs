//! Line parsers for the two supported text-file grammars.
//!
//! * Simple: `Artist - Title.ext` (ASCII hyphen surrounded by spaces, file extension suffix).
//! * Export: `Artist – Title [FORMAT]` (en-dash, bracketed format tag), the same shape that
//!   `txtfiles::export_txt` writes.
//!
//! The two separators are distinct on purpose: a simple line never splits on an en-dash and an
//! export line never splits on `" - "`.
//!
//! Both parsers are pure. A blank line yields `None`.

use std::fmt;

use thiserror::Error;

use crate::common::{Filetype, EN_DASH};

const SIMPLE_SEPARATOR: &str = " - ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("no file extension")]
    NoExtension,
    #[error("unknown format '{0}'")]
    UnknownFormat(String),
    #[error("malformed: missing brackets")]
    MissingBrackets,
    #[error("format parse error")]
    FormatParseError,
    #[error("missing title")]
    MissingTitle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseResult {
    Parsed { artist: String, title: String, filetype: Filetype },
    Rejected { reason: RejectReason },
}

impl ParseResult {
    fn rejected(reason: RejectReason) -> Self {
        ParseResult::Rejected { reason }
    }

    fn parsed(artist: &str, title: &str, filetype: Filetype) -> Self {
        if title.is_empty() {
            return Self::rejected(RejectReason::MissingTitle);
        }
        ParseResult::Parsed {
            artist: artist.to_string(),
            title: title.to_string(),
            filetype,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFormat {
    Simple,
    Export,
}

impl LineFormat {
    pub fn parse_line(&self, line: &str) -> Option<ParseResult> {
        match self {
            LineFormat::Simple => parse_simple_line(line),
            LineFormat::Export => parse_export_line(line),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            LineFormat::Simple => "Artist - Title.Filetype",
            LineFormat::Export => "DubplateCollector Export Format",
        }
    }
}

impl fmt::Display for LineFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Trim both halves of a first-occurrence split; without a separator the whole name is the title.
fn artist_and_title<'a>(name: &'a str, split: Option<(&'a str, &'a str)>) -> (&'a str, &'a str) {
    match split {
        Some((artist, title)) => (artist.trim(), title.trim()),
        None => ("", name.trim()),
    }
}

/// `Artist - Title.ext`
pub fn parse_simple_line(line: &str) -> Option<ParseResult> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let Some((name_part, ext)) = line.rsplit_once('.') else {
        return Some(ParseResult::rejected(RejectReason::NoExtension));
    };
    let ext = ext.to_lowercase();
    let Ok(filetype) = ext.parse::<Filetype>() else {
        return Some(ParseResult::rejected(RejectReason::UnknownFormat(ext)));
    };

    let (artist, title) = artist_and_title(name_part, name_part.split_once(SIMPLE_SEPARATOR));
    Some(ParseResult::parsed(artist, title, filetype))
}

/// `Artist – Title [FORMAT]`
pub fn parse_export_line(line: &str) -> Option<ParseResult> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (Some(open), Some(close)) = (line.rfind('['), line.rfind(']')) else {
        return Some(ParseResult::rejected(RejectReason::MissingBrackets));
    };
    if open > close {
        return Some(ParseResult::rejected(RejectReason::FormatParseError));
    }

    let tag = line[open + 1..close].to_lowercase();
    let Ok(filetype) = tag.parse::<Filetype>() else {
        return Some(ParseResult::rejected(RejectReason::UnknownFormat(tag)));
    };

    let main = line[..open].trim();
    let (artist, title) = artist_and_title(main, main.split_once(EN_DASH));
    Some(ParseResult::parsed(artist, title, filetype))
}
