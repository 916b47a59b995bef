//! Public entry points: [`extract_archives`] (recursive, tree-wide) and
//! [`extract_archive`] (single file), plus the [`Options`] configuration
//! object and the [`Expansion`] convenience summary.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bimap::BiHashMap;
use typed_builder::TypedBuilder;

use crate::dispatch::{build_ignore_globset, HandlerRegistry};
use crate::error::Error;
use crate::event::{Destination, ExtractEvent, Source};
use crate::extractor;
use crate::kind::KindSet;
use crate::path_utils::get_extraction_path;
use crate::recurse::{self, DEFAULT_MAX_DEPTH};

/// Configuration for [`extract_archives`]. Immutable once built.
#[derive(Debug, Clone, TypedBuilder)]
pub struct Options {
    /// Descend into freshly extracted trees, repeating dispatch on their contents.
    #[builder(default = true)]
    pub recurse: bool,

    /// After a clean finish, replace the original archive in place with its
    /// extracted directory.
    #[builder(default = false)]
    pub replace_originals: bool,

    /// Glob patterns excluded from consideration regardless of kind.
    #[builder(default)]
    pub ignore_pattern: Vec<String>,

    /// Select every kind (including `docs`, `patches`, `special_package`)
    /// rather than the default kind-set.
    #[builder(default = false)]
    pub all_formats: bool,

    /// Bound on archive-expansion recursion depth.
    #[builder(default = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Include a second, debug-formatted error line per failure.
    #[builder(default = false)]
    pub verbose: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Options {
    fn kinds(&self) -> KindSet {
        if self.all_formats {
            KindSet::all_kinds()
        } else {
            KindSet::default_kinds()
        }
    }
}

/// Walk `location` and extract every eligible archive found, recursing into
/// extracted trees per `options`. Returns a lazy iterator of [`ExtractEvent`]s
/// produced by a dedicated walk thread.
pub fn extract_archives(
    location: impl Into<PathBuf>,
    options: &Options,
) -> Result<impl Iterator<Item = ExtractEvent>, Error> {
    let registry = HandlerRegistry::new();
    let kinds = options.kinds();
    let ignore = build_ignore_globset(&options.ignore_pattern)?;

    recurse::extract(
        location,
        registry,
        kinds,
        options.recurse,
        options.replace_originals,
        ignore,
        options.verbose,
        options.max_depth,
    )
}

/// Extract a single known archive `location` into `target`, without walking
/// or recursing. Returns the start/finish event pair (empty if `location`'s
/// kind has no registered handler).
pub fn extract_archive(
    location: impl AsRef<Path>,
    target: impl AsRef<Path>,
    verbose: bool,
) -> Vec<ExtractEvent> {
    let registry = HandlerRegistry::new();
    let kinds = KindSet::all_kinds();
    extractor::extract_file(&registry, location.as_ref(), target.as_ref(), &kinds, verbose)
}

/// Compute the canonical extraction target for `location` without performing
/// any extraction, e.g. to pass into [`extract_archive`].
pub fn extraction_target(location: impl AsRef<Path>) -> PathBuf {
    let location = location.as_ref();
    let parent = location.parent().unwrap_or_else(|| Path::new(""));
    let name = location.file_name().unwrap_or_default();
    parent.join(get_extraction_path(name))
}

/// A drained summary of a walk: every clean source→destination mapping, plus
/// any warnings or errors keyed by source path.
#[derive(Debug, Default)]
pub struct Expansion {
    mapping: BiHashMap<Source, Destination>,
    warnings: HashMap<PathBuf, Vec<String>>,
    errors: HashMap<PathBuf, Vec<String>>,
}

impl Expansion {
    /// Drain `events` into an [`Expansion`] summary. Only finish events
    /// contribute; start events are discarded once paired.
    pub fn from_events(events: impl Iterator<Item = ExtractEvent>) -> Self {
        let mut expansion = Self::default();
        for event in events {
            if !event.done() {
                continue;
            }
            if !event.warnings().is_empty() {
                expansion
                    .warnings
                    .insert(event.source().clone(), event.warnings().clone());
            }
            if !event.errors().is_empty() {
                expansion
                    .errors
                    .insert(event.source().clone(), event.errors().clone());
                continue;
            }
            expansion.mapping.insert(
                Source::from(event.source().clone()),
                Destination::from(event.target().clone()),
            );
        }
        expansion
    }

    /// The clean source→destination mapping.
    pub fn mapping(&self) -> &BiHashMap<Source, Destination> {
        &self.mapping
    }

    /// Non-fatal warnings keyed by source archive path.
    pub fn warnings(&self) -> &HashMap<PathBuf, Vec<String>> {
        &self.warnings
    }

    /// Fatal errors keyed by source archive path.
    pub fn errors(&self) -> &HashMap<PathBuf, Vec<String>> {
        &self.errors
    }

    /// True iff any archive failed.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::FileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, content) in entries {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn default_options_use_default_kind_set_and_recurse() {
        let options = Options::default();
        assert!(options.recurse);
        assert!(!options.replace_originals);
        assert!(!options.all_formats);
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn extract_archives_yields_events_for_a_simple_tree() {
        let dir = tempdir().unwrap();
        write_zip(&dir.path().join("a.zip"), &[("a.txt", b"a")]);
        fs::write(dir.path().join("readme.md"), b"not an archive").unwrap();

        let options = Options::default();
        let events: Vec<_> = extract_archives(dir.path(), &options).unwrap().collect();

        let expansion = Expansion::from_events(events.into_iter());
        assert!(!expansion.has_errors());
        assert_eq!(expansion.mapping().len(), 1);
    }

    #[test]
    fn extraction_target_appends_extract_suffix() {
        let target = extraction_target("/tmp/a.zip");
        assert_eq!(target, PathBuf::from("/tmp/a.zip-extract"));
    }

    #[test]
    fn extract_archive_extracts_a_single_known_file() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("a.zip");
        write_zip(&archive, &[("a.txt", b"a")]);
        let target = extraction_target(&archive);

        let events = extract_archive(&archive, &target, false);
        assert_eq!(events.len(), 2);
        assert!(events[1].is_clean_finish());
        assert!(target.join("a.txt").exists());
    }
}
