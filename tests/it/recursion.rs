//! End-to-end scenarios against [`extractor::api`].

use std::fs;

use extractor::api::{extract_archives, Expansion, Options};
use tempfile::tempdir;

use crate::testdata::{collect_files, write_tar_gz, write_zip};

#[test]
fn nested_zip_recursion_extracts_the_inner_archive_too() {
    let dir = tempdir().unwrap();

    // Build the inner archive first, then embed its bytes in the outer one.
    let inner_path = dir.path().join("inner.zip");
    write_zip(&inner_path, &[("leaf.txt", b"leaf content")]);
    let inner_bytes = fs::read(&inner_path).unwrap();
    fs::remove_file(&inner_path).unwrap();

    let outer_path = dir.path().join("outer.zip");
    write_zip(&outer_path, &[("inner.zip", &inner_bytes)]);

    let options = Options::default();
    let events: Vec<_> = extract_archives(dir.path(), &options).unwrap().collect();
    let expansion = Expansion::from_events(events.into_iter());
    assert!(!expansion.has_errors());

    let outer_extract = dir.path().join("outer.zip-extract");
    assert!(outer_extract.join("inner.zip-extract/leaf.txt").exists());
}

#[test]
fn shallow_extraction_stops_after_the_top_level() {
    let dir = tempdir().unwrap();

    let inner_path = dir.path().join("inner.zip");
    write_zip(&inner_path, &[("leaf.txt", b"leaf content")]);
    let inner_bytes = fs::read(&inner_path).unwrap();
    fs::remove_file(&inner_path).unwrap();

    let outer_path = dir.path().join("outer.zip");
    write_zip(&outer_path, &[("inner.zip", &inner_bytes)]);

    let options = Options::builder().recurse(false).build();
    let events: Vec<_> = extract_archives(dir.path(), &options).unwrap().collect();
    let expansion = Expansion::from_events(events.into_iter());
    assert!(!expansion.has_errors());

    let outer_extract = dir.path().join("outer.zip-extract");
    assert!(outer_extract.join("inner.zip").exists());
    assert!(!outer_extract.join("inner.zip-extract").exists());
}

#[test]
fn ignore_pattern_excludes_matching_archives() {
    let dir = tempdir().unwrap();
    write_zip(&dir.path().join("keep.zip"), &[("a.txt", b"a")]);
    write_zip(&dir.path().join("skip.zip"), &[("b.txt", b"b")]);

    let options = Options::builder()
        .ignore_pattern(vec!["skip.*".to_string()])
        .build();
    let events: Vec<_> = extract_archives(dir.path(), &options).unwrap().collect();
    let expansion = Expansion::from_events(events.into_iter());

    assert!(dir.path().join("keep.zip-extract").exists());
    assert!(!dir.path().join("skip.zip-extract").exists());
    assert!(!expansion.has_errors());
}

#[test]
fn broken_archive_is_reported_without_stopping_the_walk() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("broken.zip"), b"not actually a zip").unwrap();
    write_zip(&dir.path().join("good.zip"), &[("a.txt", b"a")]);

    let options = Options::default();
    let events: Vec<_> = extract_archives(dir.path(), &options).unwrap().collect();
    let expansion = Expansion::from_events(events.into_iter());

    assert!(expansion.has_errors());
    assert!(expansion.errors().keys().any(|p| p.ends_with("broken.zip")));
    assert!(dir.path().join("good.zip-extract/a.txt").exists());
}

#[test]
fn unicode_paths_round_trip_through_extraction() {
    let dir = tempdir().unwrap();
    write_zip(
        &dir.path().join("unicode.zip"),
        &[("héllo/wörld.txt", "café".as_bytes())],
    );

    let options = Options::default();
    let events: Vec<_> = extract_archives(dir.path(), &options).unwrap().collect();
    let expansion = Expansion::from_events(events.into_iter());
    assert!(!expansion.has_errors());

    let extracted = dir.path().join("unicode.zip-extract");
    let files = collect_files(&extracted);
    assert!(files
        .iter()
        .any(|(path, content)| path.to_string_lossy().contains("wörld.txt")
            && content == "café".as_bytes()));
}

#[test]
fn replace_originals_swaps_each_archive_for_its_extracted_tree() {
    let dir = tempdir().unwrap();
    write_zip(&dir.path().join("a.zip"), &[("a.txt", b"a")]);
    write_tar_gz(&dir.path().join("b.tar.gz"), &[("b.txt", b"b")]);

    let options = Options::builder().replace_originals(true).build();
    let events: Vec<_> = extract_archives(dir.path(), &options).unwrap().collect();
    let expansion = Expansion::from_events(events.into_iter());
    assert!(!expansion.has_errors());

    let a = dir.path().join("a.zip");
    let b = dir.path().join("b.tar.gz");
    assert!(a.is_dir());
    assert!(a.join("a.txt").exists());
    assert!(b.is_dir());
    assert!(b.join("b.txt").exists());
    assert!(!dir.path().join("a.zip-extract").exists());
    assert!(!dir.path().join("b.tar.gz-extract").exists());
}
