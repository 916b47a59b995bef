//! Single-stream decompressor handler (gzip, bzip2).
//!
//! Each of these formats carries exactly one compressed member; anything
//! after the logical end of that member is "trailing garbage" and is
//! reported as a warning rather than an error.

use std::{
    fs::{self, File},
    io::{BufRead, BufReader, Read, Write},
    path::{Path, PathBuf},
};

use bzip2::bufread::BzDecoder;
use flate2::bufread::GzDecoder;
use tempfile::Builder;

use crate::error::Error;
use crate::path_utils::EXTRACT_SUFFIX;

/// 32 MiB, matching the buffer size the ambient stack's uncompress step uses.
const BUFFER_SIZE: usize = 32 * 1024 * 1024;

/// Extract a single gzip stream at `source` into `target_dir`.
pub fn extract_gzip(source: &Path, target_dir: &Path) -> Result<Vec<String>, Error> {
    let mut reader = BufReader::new(File::open(source)?);
    let tmp_path = {
        let mut decoder = GzDecoder::new(&mut reader);
        drain_to_temp(&mut decoder, source)?
    };
    let has_trailing_garbage = probe_trailing(&mut reader)?;
    commit(source, target_dir, tmp_path, has_trailing_garbage)
}

/// Extract a single bzip2 stream at `source` into `target_dir`.
pub fn extract_bzip2(source: &Path, target_dir: &Path) -> Result<Vec<String>, Error> {
    let mut reader = BufReader::new(File::open(source)?);
    let tmp_path = {
        let mut decoder = BzDecoder::new(&mut reader);
        drain_to_temp(&mut decoder, source)?
    };
    let has_trailing_garbage = probe_trailing(&mut reader)?;
    commit(source, target_dir, tmp_path, has_trailing_garbage)
}

/// Stream-copy a decoder's full logical member into a fresh temp file.
fn drain_to_temp<R: Read>(decoder: &mut R, source: &Path) -> Result<PathBuf, Error> {
    let tmp_dir = Builder::new().prefix("extractcode-extract-").tempdir()?;
    let base_name = source
        .file_stem()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "uncompressed".to_string());
    let tmp_path = tmp_dir.path().join(base_name);

    let mut out = File::create(&tmp_path)?;
    let mut buf = vec![0u8; BUFFER_SIZE];
    loop {
        let n = decoder.read(&mut buf)?;
        if n == 0 {
            break;
        }
        out.write_all(&buf[..n])?;
    }

    // The tempdir would delete the temp file on drop; persist it since the
    // caller still needs to move it into place.
    let _ = tmp_dir.into_path();
    Ok(tmp_path)
}

/// After the decoder has been dropped (releasing its borrow), check whether
/// the underlying buffered reader still has unread bytes past the logical
/// stream end.
///
/// The `bufread` decoders consume only as much of the reader's buffer as the
/// compressed member needs, so any leftover bytes remain available to be
/// read back out via `fill_buf` without needing to touch the raw file
/// descriptor (which a `read`-based decoder would have already buffered
/// past, making this check a no-op).
fn probe_trailing<R: BufRead>(reader: &mut R) -> Result<bool, Error> {
    Ok(!reader.fill_buf()?.is_empty())
}

fn commit(
    source: &Path,
    target_dir: &Path,
    tmp_path: PathBuf,
    has_trailing_garbage: bool,
) -> Result<Vec<String>, Error> {
    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let target_location = target_dir.join(format!("{file_name}{EXTRACT_SUFFIX}"));
    if target_location.exists() {
        if target_location.is_dir() {
            fs::remove_dir_all(&target_location)?;
        } else {
            fs::remove_file(&target_location)?;
        }
    }
    fs::rename(&tmp_path, &target_location)?;

    let mut warnings = Vec::new();
    if has_trailing_garbage {
        warnings.push(format!("{}: Trailing garbage found and ignored.", source.display()));
    }
    Ok(warnings)
}

#[cfg(test)]
mod test {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::tempdir;

    #[test]
    fn extracts_clean_gzip_stream_without_warnings() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("hello.txt.gz");
        {
            let file = File::create(&source).unwrap();
            let mut encoder = GzEncoder::new(file, Compression::default());
            encoder.write_all(b"hello world").unwrap();
            encoder.finish().unwrap();
        }
        let target_dir = dir.path().join("hello.txt.gz-extract");
        fs::create_dir(&target_dir).unwrap();

        let warnings = extract_gzip(&source, &target_dir).unwrap();
        assert!(warnings.is_empty());

        let extracted = target_dir.join("hello.txt.gz-extract");
        let content = fs::read(&extracted).unwrap();
        assert_eq!(content, b"hello world");
    }

    #[test]
    fn gzip_with_trailing_garbage_emits_warning() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("hello.txt.gz");
        {
            let file = File::create(&source).unwrap();
            let mut encoder = GzEncoder::new(file, Compression::default());
            encoder.write_all(b"hello world").unwrap();
            encoder.finish().unwrap();
        }
        // Append trailing garbage bytes after the logical gzip member end.
        {
            let mut file = std::fs::OpenOptions::new().append(true).open(&source).unwrap();
            file.write_all(b"garbage-not-gzip").unwrap();
        }
        let target_dir = dir.path().join("hello.txt.gz-extract");
        fs::create_dir(&target_dir).unwrap();

        let warnings = extract_gzip(&source, &target_dir).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Trailing garbage"));
    }
}
