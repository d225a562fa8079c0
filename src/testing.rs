use std::fs;
use std::path::PathBuf;
use std::sync::Once;

use tempfile::TempDir;

use crate::common::Filetype;
use crate::config::{Config, LogOutput};
use crate::store::Store;

static INIT: Once = Once::new();

pub fn init() -> TempDir {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    });
    TempDir::new().expect("failed to create temp dir")
}

// Creates a config pointing into a fresh temp dir. Nothing is created on disk.
pub fn config() -> (Config, TempDir) {
    let temp_dir = init();
    let base_path = temp_dir.path();
    let config = Config {
        database_path: base_path.join("data").join("dubplates.db"),
        export_path: base_path.join("export.txt"),
        log_output: LogOutput::Off,
        log_dir: base_path.join("logs"),
        unrecognized_keys: vec![],
    };
    (config, temp_dir)
}

pub fn store() -> (Store, Config, TempDir) {
    let (config, temp_dir) = config();
    let store = Store::open(&config).expect("failed to open store");
    (store, config, temp_dir)
}

// A store with a handful of tracks, including one without an artist.
pub fn seeded_store() -> (Store, Config, TempDir) {
    let (store, config, temp_dir) = store();
    for (artist, title, filetype) in [
        ("Burial", "Archangel", Filetype::Mp3),
        ("Burial", "Near Dark", Filetype::Flac),
        ("Four Tet", "Rounds", Filetype::Flac),
        ("Kode9", "Black Sun", Filetype::Wav),
        ("", "Untitled Dub", Filetype::Aiff),
    ] {
        store.insert(artist, title, filetype).expect("failed to seed store");
    }
    (store, config, temp_dir)
}

pub fn write_file(temp_dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = temp_dir.path().join(name);
    fs::write(&path, contents).expect("failed to write file");
    path
}
