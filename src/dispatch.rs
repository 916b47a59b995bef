//! Handler dispatch: selects a handler for a given file by kind, then by
//! file-name signature within that kind.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;

use crate::error::Error;
use crate::handlers::{bundle, patch, source_map, uncompress};
use crate::kind::{Kind, KindSet};
use crate::typing::{DefaultTyping, Typing};
use crate::vmimage;

/// The uniform handler signature: extract `source` into `target_dir`,
/// returning non-fatal warnings or raising on fatal failure.
pub type HandlerFn = fn(&Path, &Path) -> Result<Vec<String>, Error>;

/// Directory names skipped by the default ignore predicate, independent of
/// any caller-supplied ignore globs.
const DEFAULT_IGNORED_DIRS: &[&str] = &[".git", ".svn", ".hg", "__pycache__"];

/// Maps a classified, kind-eligible path to the handler that extracts it.
pub struct HandlerRegistry {
    typing: Box<dyn Typing + Send + Sync>,
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerRegistry {
    /// Build a registry using the [`DefaultTyping`] collaborator.
    pub fn new() -> Self {
        Self {
            typing: Box::new(DefaultTyping),
        }
    }

    /// Build a registry using a caller-supplied typing collaborator.
    pub fn with_typing(typing: Box<dyn Typing + Send + Sync>) -> Self {
        Self { typing }
    }

    /// Classify `path` using the registry's typing collaborator.
    pub fn classify(&self, path: &Path) -> Kind {
        self.typing.classify(path)
    }

    /// Return the handler for `path`, if its kind is in `kinds` and a
    /// handler is registered for its signature.
    pub fn get_extractor(&self, path: &Path, kinds: &KindSet) -> Option<HandlerFn> {
        let kind = self.classify(path);
        if !kinds.contains(kind) {
            debug!("{path:?} classified as {kind:?}, not in requested kind-set");
            return None;
        }
        let name = path.file_name()?.to_string_lossy().to_lowercase();
        handler_for(kind, &name)
    }

    /// True iff the file should be extracted: not ignored, classified into
    /// a requested kind, and a handler is registered for it.
    pub fn should_extract(&self, path: &Path, kinds: &KindSet, ignore: &GlobSet) -> bool {
        if ignore.is_match(path) {
            debug!("{path:?} matched an ignore pattern");
            return false;
        }
        self.get_extractor(path, kinds).is_some()
    }
}

fn has_any_suffix(name: &str, suffixes: &[&str]) -> bool {
    suffixes.iter().any(|suffix| name.ends_with(suffix))
}

fn handler_for(kind: Kind, name: &str) -> Option<HandlerFn> {
    match kind {
        Kind::Patches => Some(patch::extract),
        Kind::SpecialPackage => Some(source_map::extract),
        Kind::FileSystem => Some(vmimage::extract),
        Kind::Docs => None,
        Kind::Regular | Kind::RegularNested | Kind::Package => {
            let is_tar_combo = has_any_suffix(
                name,
                &[".tar.gz", ".tgz", ".tar.bz2", ".tbz2", ".tar.xz", ".txz", ".tar.zst"],
            );
            if is_tar_combo {
                // libarchive handles the compression and the tar layer in one pass.
                Some(bundle::extract)
            } else if name.ends_with(".gz") {
                Some(uncompress::extract_gzip)
            } else if name.ends_with(".bz2") {
                Some(uncompress::extract_bzip2)
            } else {
                Some(bundle::extract)
            }
        }
    }
}

/// True iff `name` is one of the directory names always excluded from the
/// walk, independent of any caller-supplied ignore globs.
pub fn is_default_ignored_dir(name: &str) -> bool {
    DEFAULT_IGNORED_DIRS.contains(&name)
}

/// Build a [`GlobSet`] matching any of the caller-supplied glob patterns.
pub fn build_ignore_globset(patterns: &[String]) -> Result<GlobSet, Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|_| Error::NotSupported {
            path: PathBuf::from(pattern.as_str()),
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|_| Error::NotSupported { path: PathBuf::from("<ignore-pattern>") })
}
