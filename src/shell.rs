//! The interactive, line-oriented front end.
//!
//! Each multi-step entry is a small state machine implementing [`PromptFlow`]. The shell only
//! drives them: print the prompt, read a line, advance. Nothing touches the store until a flow
//! reaches its `Done` state, so typing the back sentinel (`0`) at any prompt discards the partial
//! entry. End of input at a prompt behaves like `0`.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use tracing::{debug, info};

use crate::common::Filetype;
use crate::config::Config;
use crate::error::{DubplateError, Result};
use crate::parsers::LineFormat;
use crate::store::Store;
use crate::tracks::{add_track, find_tracks, remove_track};
use crate::txtfiles::{export_txt, import_txt};

/// Typed at any prompt to abandon the current flow.
pub const BACK: &str = "0";

pub trait PromptFlow: Sized {
    /// The prompt for the current state, or `None` once the flow is finished.
    fn prompt(&self) -> Option<&'static str>;
    /// Consume one line of input. The second element is feedback to show the user.
    fn advance(self, input: &str) -> (Self, Option<&'static str>);
    fn cancel(self) -> Self;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddTrackFlow {
    CollectingArtist,
    CollectingTitle { artist: String },
    CollectingFormat { artist: String, title: String },
    Done { artist: String, title: String, filetype: Filetype },
    Cancelled,
}

impl AddTrackFlow {
    pub fn new() -> Self {
        AddTrackFlow::CollectingArtist
    }
}

impl Default for AddTrackFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptFlow for AddTrackFlow {
    fn prompt(&self) -> Option<&'static str> {
        match self {
            AddTrackFlow::CollectingArtist => Some("Artist (can be empty): "),
            AddTrackFlow::CollectingTitle { .. } => Some("Title: "),
            AddTrackFlow::CollectingFormat { .. } => Some("Format (mp3/flac/wav/aiff): "),
            AddTrackFlow::Done { .. } | AddTrackFlow::Cancelled => None,
        }
    }

    fn advance(self, input: &str) -> (Self, Option<&'static str>) {
        let input = input.trim();
        if input == BACK && self.prompt().is_some() {
            return (AddTrackFlow::Cancelled, None);
        }
        match self {
            AddTrackFlow::CollectingArtist => (AddTrackFlow::CollectingTitle { artist: input.to_string() }, None),
            AddTrackFlow::CollectingTitle { artist } => {
                if input.is_empty() {
                    return (AddTrackFlow::CollectingTitle { artist }, Some("Title cannot be empty."));
                }
                let title = input.to_string();
                (AddTrackFlow::CollectingFormat { artist, title }, None)
            }
            AddTrackFlow::CollectingFormat { artist, title } => match input.parse::<Filetype>() {
                Ok(filetype) => (AddTrackFlow::Done { artist, title, filetype }, None),
                Err(_) => (AddTrackFlow::CollectingFormat { artist, title }, Some("Invalid format.")),
            },
            finished => (finished, None),
        }
    }

    fn cancel(self) -> Self {
        match self {
            AddTrackFlow::Done { .. } => self,
            _ => AddTrackFlow::Cancelled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTrackFlow {
    CollectingArtist,
    CollectingTitle { artist: String },
    Done { artist: String, title: String },
    Cancelled,
}

impl PromptFlow for DeleteTrackFlow {
    fn prompt(&self) -> Option<&'static str> {
        match self {
            DeleteTrackFlow::CollectingArtist => Some("Artist (can be empty): "),
            DeleteTrackFlow::CollectingTitle { .. } => Some("Title: "),
            DeleteTrackFlow::Done { .. } | DeleteTrackFlow::Cancelled => None,
        }
    }

    fn advance(self, input: &str) -> (Self, Option<&'static str>) {
        let input = input.trim();
        if input == BACK && self.prompt().is_some() {
            return (DeleteTrackFlow::Cancelled, None);
        }
        match self {
            DeleteTrackFlow::CollectingArtist => (DeleteTrackFlow::CollectingTitle { artist: input.to_string() }, None),
            DeleteTrackFlow::CollectingTitle { artist } => (
                DeleteTrackFlow::Done {
                    artist,
                    title: input.to_string(),
                },
                None,
            ),
            finished => (finished, None),
        }
    }

    fn cancel(self) -> Self {
        match self {
            DeleteTrackFlow::Done { .. } => self,
            _ => DeleteTrackFlow::Cancelled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportFlow {
    ChoosingFormat,
    CollectingPath { format: LineFormat },
    Done { format: LineFormat, path: PathBuf },
    Cancelled,
}

impl PromptFlow for ImportFlow {
    fn prompt(&self) -> Option<&'static str> {
        match self {
            ImportFlow::ChoosingFormat => Some("> "),
            ImportFlow::CollectingPath { .. } => Some("Enter path to TXT file: "),
            ImportFlow::Done { .. } | ImportFlow::Cancelled => None,
        }
    }

    fn advance(self, input: &str) -> (Self, Option<&'static str>) {
        let input = input.trim();
        if input == BACK && self.prompt().is_some() {
            return (ImportFlow::Cancelled, None);
        }
        match self {
            ImportFlow::ChoosingFormat => match input {
                "1" => (ImportFlow::CollectingPath { format: LineFormat::Simple }, None),
                "2" => (ImportFlow::CollectingPath { format: LineFormat::Export }, None),
                _ => (ImportFlow::Cancelled, Some("Invalid option.")),
            },
            ImportFlow::CollectingPath { format } => (
                ImportFlow::Done {
                    format,
                    path: PathBuf::from(shellexpand::tilde(input).into_owned()),
                },
                None,
            ),
            finished => (finished, None),
        }
    }

    fn cancel(self) -> Self {
        match self {
            ImportFlow::Done { .. } => self,
            _ => ImportFlow::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    AddTrack,
    DeleteTrack,
    Search,
    Export,
    Import,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<MenuChoice> {
        match input.trim() {
            "1" => Some(MenuChoice::AddTrack),
            "2" => Some(MenuChoice::DeleteTrack),
            "3" => Some(MenuChoice::Search),
            "4" => Some(MenuChoice::Export),
            "5" => Some(MenuChoice::Import),
            "0" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

const MAIN_MENU: &str = "\n=== Main Menu ===
1 — Add Track
2 — Delete Track
3 — Search
4 — Export to TXT
5 — Import from TXT
0 — Exit";

pub struct Shell<'a, R, W> {
    store: &'a Store,
    config: &'a Config,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Shell<'a, R, W> {
    pub fn new(store: &'a Store, config: &'a Config, input: R, output: W) -> Self {
        Shell {
            store,
            config,
            input,
            output,
        }
    }

    /// Run the menu loop until the user exits or input ends. Only storage and terminal I/O
    /// failures are returned.
    pub fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.output, "{MAIN_MENU}")?;
            let Some(line) = self.prompt("> ")? else {
                debug!("input closed at main menu");
                writeln!(self.output, "Goodbye.")?;
                return Ok(());
            };
            match MenuChoice::parse(&line) {
                Some(MenuChoice::AddTrack) => self.add_track()?,
                Some(MenuChoice::DeleteTrack) => self.delete_track()?,
                Some(MenuChoice::Search) => self.search()?,
                Some(MenuChoice::Export) => self.export()?,
                Some(MenuChoice::Import) => self.import()?,
                Some(MenuChoice::Exit) => {
                    writeln!(self.output, "Goodbye.")?;
                    info!("exiting on user request");
                    return Ok(());
                }
                None => writeln!(self.output, "Invalid option.")?,
            }
        }
    }

    /// Write `text` without a newline and read one line. `None` at end of input.
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{text}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn drive<F: PromptFlow>(&mut self, mut flow: F) -> Result<F> {
        while let Some(text) = flow.prompt() {
            let Some(line) = self.prompt(text)? else {
                return Ok(flow.cancel());
            };
            let (next, feedback) = flow.advance(&line);
            if let Some(msg) = feedback {
                writeln!(self.output, "{msg}")?;
            }
            flow = next;
        }
        Ok(flow)
    }

    /// Print an expected error and swallow it; anything else propagates.
    fn report<T>(&mut self, result: Result<T>) -> Result<Option<T>> {
        match result {
            Ok(v) => Ok(Some(v)),
            Err(DubplateError::Expected(e)) => {
                writeln!(self.output, "⚠ {e}")?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn add_track(&mut self) -> Result<()> {
        writeln!(self.output, "\n=== Add Track (0 — Back) ===")?;
        if let AddTrackFlow::Done { artist, title, filetype } = self.drive(AddTrackFlow::new())? {
            let outcome = add_track(self.store, &artist, &title, filetype)?;
            writeln!(self.output, "{outcome}")?;
        }
        Ok(())
    }

    fn delete_track(&mut self) -> Result<()> {
        writeln!(self.output, "\n=== Delete Track (0 — Back) ===")?;
        if let DeleteTrackFlow::Done { artist, title } = self.drive(DeleteTrackFlow::CollectingArtist)? {
            let outcome = remove_track(self.store, &artist, &title)?;
            writeln!(self.output, "{outcome}")?;
        }
        Ok(())
    }

    fn search(&mut self) -> Result<()> {
        writeln!(self.output, "\n=== Search Tracks (0 — Back) ===")?;
        let Some(query) = self.prompt("Search query: ")? else {
            return Ok(());
        };
        if query == BACK {
            return Ok(());
        }
        let outcome = find_tracks(self.store, &query)?;
        writeln!(self.output, "\n{outcome}")?;
        Ok(())
    }

    fn export(&mut self) -> Result<()> {
        writeln!(self.output, "\n=== Export ===")?;
        let path = self.config.export_path.clone();
        if let Some(count) = self.report(export_txt(self.store, &path))? {
            writeln!(self.output, "✓ Export saved to {} ({} tracks)", path.display(), count)?;
        }
        Ok(())
    }

    fn import(&mut self) -> Result<()> {
        writeln!(self.output, "\n=== Import from TXT (0 — Back) ===")?;
        writeln!(self.output, "1 — {}", LineFormat::Simple)?;
        writeln!(self.output, "2 — {}", LineFormat::Export)?;
        let ImportFlow::Done { format, path } = self.drive(ImportFlow::ChoosingFormat)? else {
            return Ok(());
        };
        let Some(report) = self.report(import_txt(self.store, format, &path))? else {
            return Ok(());
        };
        writeln!(self.output, "\n📥 Import: {format}")?;
        for entry in &report.entries {
            writeln!(self.output, "{entry}")?;
        }
        writeln!(self.output, "{}", report.summary())?;
        Ok(())
    }
}
