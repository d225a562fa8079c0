/// The common module holds the small shared vocabulary of the catalog: the filetype enumeration,
/// the canonical display formatting for tracks, and process-wide logging setup.
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt as tracing_fmt, EnvFilter};

use crate::config::{Config, LogOutput};
use crate::error::{DubplateError, DubplateExpectedError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Separator used between artist and title in the canonical export format (U+2013).
pub const EN_DASH: char = '–';

/// The four audio container formats the catalog accepts. Stored lower-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Filetype {
    Mp3,
    Flac,
    Wav,
    Aiff,
}

impl Filetype {
    pub const ALL: [Filetype; 4] = [Filetype::Mp3, Filetype::Flac, Filetype::Wav, Filetype::Aiff];

    pub fn as_str(&self) -> &'static str {
        match self {
            Filetype::Mp3 => "mp3",
            Filetype::Flac => "flac",
            Filetype::Wav => "wav",
            Filetype::Aiff => "aiff",
        }
    }

    /// The bracketed tag form used in exports, e.g. `MP3`.
    pub fn tag(&self) -> &'static str {
        match self {
            Filetype::Mp3 => "MP3",
            Filetype::Flac => "FLAC",
            Filetype::Wav => "WAV",
            Filetype::Aiff => "AIFF",
        }
    }
}

impl fmt::Display for Filetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filetype {
    type Err = DubplateExpectedError;

    /// Case-insensitive; surrounding whitespace is significant.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Filetype::ALL
            .into_iter()
            .find(|ft| ft.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DubplateExpectedError::InvalidFileFormat { format: s.to_string() })
    }
}

impl ToSql for Filetype {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Filetype {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        s.parse().map_err(|e: DubplateExpectedError| FromSqlError::Other(Box::new(e)))
    }
}

/// `Artist – Title`, or just `Title` when there is no artist.
pub fn display_name(artist: &str, title: &str) -> String {
    if artist.is_empty() {
        title.to_string()
    } else {
        format!("{artist} {EN_DASH} {title}")
    }
}

/// The canonical export line: `Artist – Title [MP3]` or `Title [MP3]`.
pub fn export_line(artist: &str, title: &str, filetype: Filetype) -> String {
    format!("{} [{}]", display_name(artist, title), filetype.tag())
}

fn open_log_file(log_dir: &Path) -> Result<RollingFileAppender> {
    fs::create_dir_all(log_dir)?;
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("dubplate")
        .filename_suffix("log")
        .build(log_dir)
        .map_err(|e| DubplateError::Generic(format!("Failed to open log file in {}: {e}", log_dir.display())))
}

static LOGGING_INITIALIZED: Mutex<bool> = Mutex::new(false);

/// Install the global tracing subscriber described by the config. Subsequent calls are no-ops.
///
/// When logging to a file, the returned guard must be kept alive for buffered lines to be
/// flushed; dropping it stops the background writer.
pub fn initialize_logging(c: &Config) -> Result<Option<WorkerGuard>> {
    let mut initialized = LOGGING_INITIALIZED.lock().unwrap_or_else(|e| e.into_inner());
    if *initialized {
        return Ok(None);
    }
    *initialized = true;
    drop(initialized);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match c.log_output {
        LogOutput::Off => Ok(None),
        LogOutput::Stderr => {
            let subscriber = tracing_fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| DubplateError::Generic(format!("Failed to install logger: {e}")))?;
            Ok(None)
        }
        LogOutput::File => {
            // An unusable log directory must not keep the catalog from starting.
            let file_appender = match open_log_file(&c.log_dir) {
                Ok(appender) => appender,
                Err(e) => {
                    eprintln!("Logging disabled: {e}");
                    return Ok(None);
                }
            };
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let subscriber = tracing_fmt::Subscriber::builder()
                .with_env_filter(env_filter)
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .with_file(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| DubplateError::Generic(format!("Failed to install logger: {e}")))?;
            Ok(Some(guard))
        }
    }
}
