//! Zip-family and application-bundle handler.
//!
//! A thin wrapper over the archive-library collaborator (`compress-tools`,
//! i.e. libarchive bindings). Android App Bundles (`.aab`) and other
//! zip-family application bundles route through this same handler: they are
//! zip containers, and need no bespoke code beyond a typing table entry.

use std::{fs::File, path::Path};

use compress_tools::{uncompress_archive, Ownership};

use crate::error::Error;

/// Extract every entry of the archive at `source` into `target_dir`.
///
/// Ownership bits are ignored (`Ownership::Ignore`) since this engine makes
/// no attempt to preserve permissions or ownership (see Non-goals).
pub fn extract(source: &Path, target_dir: &Path) -> Result<Vec<String>, Error> {
    let mut file = File::open(source)?;
    uncompress_archive(&mut file, target_dir, Ownership::Ignore).map_err(|err| {
        let message = err.to_string().to_lowercase();
        if message.contains("password") || message.contains("passphrase") || message.contains("encrypted") {
            Error::PasswordProtected {
                path: source.to_path_buf(),
            }
        } else {
            Error::Libarchive(err)
        }
    })?;
    Ok(Vec::new())
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::FileOptions;

    #[test]
    fn extracts_a_simple_zip() {
        let dir = tempdir().unwrap();
        let archive_path = dir.path().join("sample.zip");
        let file = File::create(&archive_path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("hello.txt", FileOptions::default())
            .unwrap();
        writer.write_all(b"hello").unwrap();
        writer.finish().unwrap();

        let target = dir.path().join("sample.zip-extract");
        std::fs::create_dir(&target).unwrap();
        let warnings = extract(&archive_path, &target).unwrap();
        assert!(warnings.is_empty());
        let content = std::fs::read_to_string(target.join("hello.txt")).unwrap();
        assert_eq!(content, "hello");
    }

    #[test]
    fn missing_archive_is_an_io_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.zip");
        let target = dir.path().join("missing.zip-extract");
        std::fs::create_dir(&target).unwrap();
        let result = extract(&missing, &target);
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
