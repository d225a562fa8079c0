use std::collections::BTreeSet;
use std::fs;

use crate::common::Filetype;
use crate::error::{DubplateError, DubplateExpectedError};
use crate::parsers::{LineFormat, RejectReason};
use crate::store::Store;
use crate::testing;
use crate::tracks::{remove_track, AddOutcome, RemoveOutcome};
use crate::txtfiles::*;

fn triples(store: &Store) -> BTreeSet<(String, String, Filetype)> {
    store
        .list_all()
        .unwrap()
        .into_iter()
        .map(|t| (t.artist, t.title, t.filetype))
        .collect()
}

#[test]
fn test_export_txt() {
    let (store, config, _temp_dir) = testing::seeded_store();
    let count = export_txt(&store, &config.export_path).unwrap();
    assert_eq!(count, 5);
    let contents = fs::read_to_string(&config.export_path).unwrap();
    assert_eq!(
        contents,
        "Untitled Dub [AIFF]\n\
         Burial – Archangel [MP3]\n\
         Burial – Near Dark [FLAC]\n\
         Four Tet – Rounds [FLAC]\n\
         Kode9 – Black Sun [WAV]\n"
    );
}

#[test]
fn test_export_overwrites_existing_file() {
    let (store, config, _temp_dir) = testing::store();
    fs::write(&config.export_path, "stale contents\nmore stale contents\n").unwrap();
    assert_eq!(export_txt(&store, &config.export_path).unwrap(), 0);
    assert_eq!(fs::read_to_string(&config.export_path).unwrap(), "");
}

#[test]
fn test_export_to_missing_directory_is_reported() {
    let (store, _config, temp_dir) = testing::seeded_store();
    let path = temp_dir.path().join("no-such-dir").join("export.txt");
    let err = export_txt(&store, &path).unwrap_err();
    assert!(matches!(err, DubplateError::Expected(DubplateExpectedError::ExportFailed { .. })));
}

#[test]
fn test_export_then_reimport_round_trips() {
    let (store, config, _temp_dir) = testing::seeded_store();
    let before = triples(&store);
    export_txt(&store, &config.export_path).unwrap();

    // Re-import into the same store: everything is a duplicate.
    let report = import_txt(&store, LineFormat::Export, &config.export_path).unwrap();
    assert_eq!(report.added(), 0);
    assert_eq!(report.rejected(), 0);
    assert_eq!(report.duplicates(), 5);
    assert_eq!(triples(&store), before);

    // Import into an empty store reproduces the same set.
    let fresh = Store::open_in_memory().unwrap();
    let report = import_txt(&fresh, LineFormat::Export, &config.export_path).unwrap();
    assert_eq!(report.added(), 5);
    assert_eq!(triples(&fresh), before);
}

#[test]
fn test_export_reimport_splits_untitled_artist_on_en_dash() {
    // A title-only track whose title holds an en-dash exports as `Foo – Bar [MP3]`, which the
    // export grammar reads back as artist `Foo`.
    let (store, config, _temp_dir) = testing::store();
    store.insert("", "Foo – Bar", Filetype::Mp3).unwrap();
    export_txt(&store, &config.export_path).unwrap();

    let fresh = Store::open_in_memory().unwrap();
    import_txt(&fresh, LineFormat::Export, &config.export_path).unwrap();
    assert_eq!(
        triples(&fresh),
        BTreeSet::from([("Foo".to_string(), "Bar".to_string(), Filetype::Mp3)])
    );
}

#[test]
fn test_import_strips_byte_order_mark() {
    let (store, _config, temp_dir) = testing::store();
    let path = testing::write_file(&temp_dir, "bom.txt", "\u{feff}Burial - Archangel.mp3\nKode9 - Black Sun.wav\n");
    let report = import_txt(&store, LineFormat::Simple, &path).unwrap();
    assert_eq!(report.added(), 2);
    assert!(store.exists("Burial", "Archangel").unwrap());
    assert_eq!(remove_track(&store, "Burial", "Archangel").unwrap(), RemoveOutcome::Deleted(1));
}

#[test]
fn test_import_mixed_lines_is_best_effort() {
    let (store, _config, temp_dir) = testing::store();
    let path = testing::write_file(
        &temp_dir,
        "simple.txt",
        "Four Tet - Rounds.flac\n\
         \n\
         onlyname\n\
         notitle.xyz\n\
         Burial - Archangel.MP3\n\
         Four Tet - Rounds.wav\n\
         Untitled Dub.aiff\n",
    );

    let report = import_txt(&store, LineFormat::Simple, &path).unwrap();
    assert_eq!(report.added(), 3);
    assert_eq!(report.duplicates(), 1);
    assert_eq!(report.rejected(), 2);
    assert_eq!(report.entries.len(), 6);
    assert_eq!(store.count().unwrap(), 3);

    assert_eq!(
        report.entries[1],
        ImportEntry::Rejected {
            line: "onlyname".to_string(),
            reason: RejectReason::NoExtension
        }
    );
    assert_eq!(report.entries[2].to_string(), "⚠ Skipped (unknown format 'xyz'): notitle.xyz");
    assert!(matches!(report.entries[4], ImportEntry::Parsed(AddOutcome::Duplicate { .. })));
    assert_eq!(report.summary(), "Imported 3 tracks (1 duplicates, 2 skipped).");
}

#[test]
fn test_import_lines_export_format() {
    let (store, _config, _temp_dir) = testing::store();
    let lines = ["Burial – Archangel [MP3]", "NoBracket.mp3", "Title Only [WAV]", "   "];
    let report = import_lines(&store, LineFormat::Export, lines).unwrap();
    assert_eq!(report.added(), 2);
    assert_eq!(report.rejected(), 1);
    assert!(store.exists("Burial", "Archangel").unwrap());
    assert!(store.exists("", "Title Only").unwrap());
}

#[test]
fn test_import_missing_file() {
    let (store, _config, temp_dir) = testing::store();
    let path = temp_dir.path().join("missing.txt");
    let err = import_txt(&store, LineFormat::Simple, &path).unwrap_err();
    match err {
        DubplateError::Expected(DubplateExpectedError::FileNotFound { path: p }) => assert_eq!(p, path),
        other => panic!("expected FileNotFound, got {other:?}"),
    }
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn test_import_non_utf8_file_is_reported() {
    let (store, _config, temp_dir) = testing::store();
    let path = temp_dir.path().join("latin1.txt");
    fs::write(&path, b"Caf\xe9 - Ol\xe9.mp3\n").unwrap();
    let err = import_txt(&store, LineFormat::Simple, &path).unwrap_err();
    assert!(matches!(err, DubplateError::Expected(DubplateExpectedError::ImportUnreadable { .. })));
    assert_eq!(store.count().unwrap(), 0);
}
