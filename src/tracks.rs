//! The tracks module wraps the store with the validation and reporting every entry path shares:
//! the duplicate check before insert, and user-facing outcome messages.
//!
//! Duplicate detection is exact and case-sensitive while search is case-insensitive. Identity is
//! strict, lookup is fuzzy.

use std::fmt;

use tracing::info;

use crate::common::{display_name, Filetype};
use crate::error::Result;
use crate::store::{Store, Track};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(Track),
    Duplicate { artist: String, title: String },
}

impl fmt::Display for AddOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddOutcome::Added(track) => write!(f, "✓ Added: {track}"),
            AddOutcome::Duplicate { artist, title } => write!(f, "⚠ Duplicate: {}", display_name(artist, title)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Deleted(usize),
    NotFound,
}

impl fmt::Display for RemoveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoveOutcome::Deleted(_) => f.write_str("✓ Track deleted."),
            RemoveOutcome::NotFound => f.write_str("⚠ Track not found."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindOutcome {
    Found(Vec<Track>),
    NoResults,
}

impl fmt::Display for FindOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindOutcome::NoResults => f.write_str("No results found."),
            FindOutcome::Found(tracks) => {
                writeln!(f, "Found {} tracks:", tracks.len())?;
                writeln!(f)?;
                for (i, track) in tracks.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{track}")?;
                }
                Ok(())
            }
        }
    }
}

/// Insert a track unless one with the same (artist, title) already exists. `filetype` is already
/// validated by construction.
pub fn add_track(store: &Store, artist: &str, title: &str, filetype: Filetype) -> Result<AddOutcome> {
    if store.exists(artist, title)? {
        info!("skipped duplicate track {}", display_name(artist, title));
        return Ok(AddOutcome::Duplicate {
            artist: artist.to_string(),
            title: title.to_string(),
        });
    }
    let id = store.insert(artist, title, filetype)?;
    let track = Track {
        id,
        artist: artist.to_string(),
        title: title.to_string(),
        filetype,
    };
    info!("added track {}", track);
    Ok(AddOutcome::Added(track))
}

pub fn remove_track(store: &Store, artist: &str, title: &str) -> Result<RemoveOutcome> {
    let removed = store.delete(artist, title)?;
    if removed == 0 {
        return Ok(RemoveOutcome::NotFound);
    }
    info!("deleted {} track(s) matching {}", removed, display_name(artist, title));
    Ok(RemoveOutcome::Deleted(removed))
}

pub fn find_tracks(store: &Store, query: &str) -> Result<FindOutcome> {
    let tracks = store.search(query)?;
    if tracks.is_empty() {
        return Ok(FindOutcome::NoResults);
    }
    Ok(FindOutcome::Found(tracks))
}
