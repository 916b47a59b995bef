//! Helpers for building archive fixtures on the fly, since this repository
//! ships no binary test archives.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use zip::write::FileOptions;

/// Write a zip archive at `path` containing `entries` (relative path, content).
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).expect("create zip fixture");
    let mut writer = zip::ZipWriter::new(file);
    for (name, content) in entries {
        writer
            .start_file(*name, FileOptions::default())
            .expect("start zip entry");
        writer.write_all(content).expect("write zip entry");
    }
    writer.finish().expect("finish zip");
}

/// Write a `.tar.gz` archive at `path` containing `entries`.
pub fn write_tar_gz(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).expect("create tar.gz fixture");
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, *name, *content)
            .expect("append tar entry");
    }
    builder.into_inner().expect("finish tar").finish().expect("finish gzip");
}

/// Read every regular file under `dir`, returning (relative path, content) pairs.
pub fn collect_files(dir: &Path) -> Vec<(std::path::PathBuf, Vec<u8>)> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let content = fs::read(entry.path()).expect("read fixture output");
            let relative = entry.path().strip_prefix(dir).unwrap().to_path_buf();
            (relative, content)
        })
        .collect()
}
