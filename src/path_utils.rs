//! Path sanitization, canonicalization, and sibling-unique name resolution.

use std::{
    fs, io,
    path::{Component, Path, PathBuf},
};

use crate::error::{Error, Invariant};
use crate::invariant;

/// Suffix appended to an archive's own path to produce its extraction target.
pub const EXTRACT_SUFFIX: &str = "-extract";

/// Strip trailing path separators from a string, mirroring Python's `rstrip('\\/')`.
fn rstrip_separators(s: &str) -> &str {
    s.trim_end_matches(['\\', '/'])
}

/// Return the path at which `p`'s contents would be extracted.
pub fn get_extraction_path(p: impl AsRef<Path>) -> PathBuf {
    let stripped = rstrip_separators(&p.as_ref().to_string_lossy());
    PathBuf::from(format!("{stripped}{EXTRACT_SUFFIX}"))
}

/// True iff `p`, after trailing-separator strip, ends with [`EXTRACT_SUFFIX`].
pub fn is_extraction_path(p: impl AsRef<Path>) -> bool {
    let s = p.as_ref().to_string_lossy();
    if s.is_empty() {
        return false;
    }
    rstrip_separators(&s).ends_with(EXTRACT_SUFFIX)
}

/// True iff a filesystem entry exists at `get_extraction_path(location)`.
pub fn is_extracted(location: impl AsRef<Path>) -> bool {
    let location = location.as_ref();
    !location.as_os_str().is_empty() && get_extraction_path(location).exists()
}

/// Remove every occurrence of [`EXTRACT_SUFFIX`] from a path's string form.
pub fn remove_archive_suffix(p: impl AsRef<Path>) -> PathBuf {
    PathBuf::from(p.as_ref().to_string_lossy().replace(EXTRACT_SUFFIX, ""))
}

/// Return a fresh path in `location`'s parent directory that does not collide,
/// case-insensitively, with any existing sibling.
///
/// The final component `.`/`..` is replaced with `_`. Directories are padded
/// as a whole; files are split on the first `.` into a base and an extension,
/// which is preserved across the padding.
pub fn new_name(location: impl AsRef<Path>, is_dir: bool) -> Result<PathBuf, Error> {
    let location = location.as_ref();
    if location.as_os_str().is_empty() {
        return invariant!(EmptyLocation);
    }
    let stripped = rstrip_separators(&location.to_string_lossy()).to_string();
    if stripped.is_empty() {
        return invariant!(EmptyLocation);
    }
    let location = Path::new(&stripped);

    let parent = location.parent().ok_or_else(|| Error::Invariant(Invariant::NoParent {
        path: location.to_path_buf(),
    }))?;

    let siblings_lower: std::collections::HashSet<String> = match fs::read_dir(parent) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_lowercase())
            .collect(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => std::collections::HashSet::new(),
        Err(e) => return Err(Error::Io(e)),
    };

    let mut filename = location
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    if filename == "." || filename == ".." {
        filename = "_".to_string();
    }

    if !siblings_lower.contains(&filename.to_lowercase()) {
        return Ok(parent.join(filename));
    }

    let (base_name, ext) = if is_dir {
        (filename.clone(), String::new())
    } else {
        match filename.split_once('.') {
            Some((base, rest)) => (base.to_string(), format!(".{rest}")),
            None => (filename.clone(), String::new()),
        }
    };

    let mut counter = 1usize;
    loop {
        let candidate = format!("{base_name}_{counter}{ext}");
        if !siblings_lower.contains(&candidate.to_lowercase()) {
            return Ok(parent.join(candidate));
        }
        counter += 1;
    }
}

/// Walk `directory`; for any filename containing `\` or `..`, rewrite it by
/// treating backslashes as path separators and collapsing `..` segments,
/// creating intermediate directories and moving the file. Returns the paths
/// that could not be rewritten; never raises.
pub fn remove_backslashes_and_dotdots(directory: impl AsRef<Path>) -> Vec<PathBuf> {
    let mut errors = Vec::new();
    let walker = walkdir::WalkDir::new(directory.as_ref())
        .into_iter()
        .filter_map(|e| e.ok());

    for entry in walker {
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().to_string();
        if !(file_name.contains('\\') || file_name.contains("..")) {
            continue;
        }
        let top = match entry.path().parent() {
            Some(p) => p,
            None => {
                errors.push(entry.path().to_path_buf());
                continue;
            }
        };
        match rewrite_entry(top, &file_name, entry.path()) {
            Ok(()) => {}
            Err(()) => errors.push(entry.path().to_path_buf()),
        }
    }
    errors
}

fn rewrite_entry(top: &Path, file_name: &str, original: &Path) -> Result<(), ()> {
    let posix = file_name.replace('\\', "/");
    let collapsed = collapse_dotdots(&posix);
    let segments: Vec<&str> = collapsed
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    if segments.is_empty() {
        return Err(());
    }
    let (dirs, base) = segments.split_at(segments.len() - 1);
    let mut target_dir = top.to_path_buf();
    for d in dirs {
        target_dir.push(d);
    }
    fs::create_dir_all(&target_dir).map_err(|_| ())?;
    let target = target_dir.join(base[0]);
    fs::rename(original, &target).map_err(|_| ())
}

/// Replace every `..` path segment with `/`, mirroring the original's
/// `str.replace('..', '/')` on an already-normalized POSIX path string.
fn collapse_dotdots(s: &str) -> String {
    s.replace("..", "/")
}

/// Normalize a user-supplied path fragment into a relative, POSIX-style path:
/// backslashes become forward slashes, `.`/`..` components and empty
/// components are dropped, and any leading root is stripped. `preserve_spaces`
/// controls whether runs of whitespace are kept verbatim or collapsed to a
/// single space.
pub fn safe_path(p: impl AsRef<Path>, preserve_spaces: bool) -> PathBuf {
    let raw = p.as_ref().to_string_lossy().replace('\\', "/");
    let mut out = PathBuf::new();
    for component in Path::new(&raw).components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_string_lossy();
                let cleaned = sanitize_component(&part, preserve_spaces);
                if !cleaned.is_empty() {
                    out.push(cleaned);
                }
            }
            // RootDir, Prefix, CurDir, ParentDir are all dropped: the result
            // is always relative and never escapes upward.
            _ => {}
        }
    }
    out
}

fn sanitize_component(part: &str, preserve_spaces: bool) -> String {
    let collapsed = if preserve_spaces {
        part.to_string()
    } else {
        part.split_whitespace().collect::<Vec<_>>().join(" ")
    };
    collapsed
        .chars()
        .filter(|c| !matches!(c, '\0'..='\x1f' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect()
}
