//! Plain-text import and export of the catalog.
//!
//! Export always writes the en-dash/bracket grammar, so an exported file can be re-imported with
//! `LineFormat::Export`. Import is best-effort: a rejected line is recorded and the rest of the
//! file is still processed.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::{info, warn};

use crate::error::{DubplateExpectedError, Result};
use crate::parsers::{LineFormat, ParseResult, RejectReason};
use crate::store::{Store, Track};
use crate::tracks::{add_track, AddOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportEntry {
    Parsed(AddOutcome),
    Rejected { line: String, reason: RejectReason },
}

impl fmt::Display for ImportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportEntry::Parsed(outcome) => write!(f, "{outcome}"),
            ImportEntry::Rejected { line, reason } => write!(f, "⚠ Skipped ({reason}): {line}"),
        }
    }
}

/// One entry per non-blank input line, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub entries: Vec<ImportEntry>,
}

impl ImportReport {
    pub fn added(&self) -> usize {
        self.entries.iter().filter(|e| matches!(e, ImportEntry::Parsed(AddOutcome::Added(_)))).count()
    }

    pub fn duplicates(&self) -> usize {
        self.entries.iter().filter(|e| matches!(e, ImportEntry::Parsed(AddOutcome::Duplicate { .. }))).count()
    }

    pub fn rejected(&self) -> usize {
        self.entries.iter().filter(|e| matches!(e, ImportEntry::Rejected { .. })).count()
    }

    pub fn summary(&self) -> String {
        format!(
            "Imported {} tracks ({} duplicates, {} skipped).",
            self.added(),
            self.duplicates(),
            self.rejected()
        )
    }
}

/// Write every track to `path`, overwriting it. Returns the number of lines written.
pub fn export_txt(store: &Store, path: &Path) -> Result<usize> {
    let tracks = store.list_all()?;
    write_lines(path, &tracks).map_err(|e| DubplateExpectedError::ExportFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    info!("exported {} tracks to {}", tracks.len(), path.display());
    Ok(tracks.len())
}

fn write_lines(path: &Path, tracks: &[Track]) -> io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    for track in tracks {
        writeln!(w, "{track}")?;
    }
    w.flush()
}

/// Feed each line through the parser and insert what parses.
pub fn import_lines<'a, I>(store: &Store, format: LineFormat, lines: I) -> Result<ImportReport>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut report = ImportReport::default();
    for raw in lines {
        let entry = match format.parse_line(raw) {
            None => continue,
            Some(ParseResult::Rejected { reason }) => {
                let line = raw.trim().to_string();
                warn!("rejected import line {:?}: {}", line, reason);
                ImportEntry::Rejected { line, reason }
            }
            Some(ParseResult::Parsed { artist, title, filetype }) => {
                ImportEntry::Parsed(add_track(store, &artist, &title, filetype)?)
            }
        };
        report.entries.push(entry);
    }
    info!(
        "import finished: {} added, {} duplicates, {} rejected",
        report.added(),
        report.duplicates(),
        report.rejected()
    );
    Ok(report)
}

/// Import a UTF-8 text file. A missing or unreadable file aborts before any insert.
pub fn import_txt(store: &Store, format: LineFormat, path: &Path) -> Result<ImportReport> {
    if !path.exists() {
        return Err(DubplateExpectedError::FileNotFound { path: path.to_path_buf() }.into());
    }
    let contents = fs::read_to_string(path).map_err(|e| DubplateExpectedError::ImportUnreadable {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    info!("importing {} as {}", path.display(), format);
    // Editors on some platforms prepend a byte order mark; it must not end up in the first artist.
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(&contents);
    import_lines(store, format, contents.lines())
}
