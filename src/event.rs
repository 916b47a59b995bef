//! The event model emitted by the recursion driver.

use std::path::PathBuf;

use derive_more::From;
use duplicate::duplicate_item;
use getset::{CopyGetters, Getters};

/// The archive path at which an extraction candidate was discovered.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, From)]
pub struct Source(PathBuf);

/// The directory to which an archive's contents were (or will be) extracted.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, From)]
pub struct Destination(PathBuf);

#[duplicate_item(
    name          returns;
    [Source]      [PathBuf];
    [Destination] [PathBuf];
)]
impl name {
    /// Convert self into its inner path.
    pub fn into_inner(self) -> returns {
        self.0
    }

    /// Reference the inner path of self.
    pub fn inner(&self) -> &returns {
        &self.0
    }
}

/// An immutable record emitted before and after a candidate archive is extracted.
///
/// Exactly two events are emitted per archive the driver decides to extract: a
/// "start" event (`done = false`, empty `warnings`/`errors`) and a "finish"
/// event (`done = true`, populated).
#[derive(Clone, Debug, Getters, CopyGetters)]
#[getset(get = "pub")]
pub struct ExtractEvent {
    /// Absolute path of the archive.
    source: PathBuf,

    /// Absolute path of the extraction directory.
    target: PathBuf,

    /// `false` for the start event, `true` for the finish event.
    #[getset(get_copy = "pub")]
    done: bool,

    /// Ordered, non-fatal advisories keyed or prefixed by the offending entry path.
    warnings: Vec<String>,

    /// Ordered error messages; empty on success.
    errors: Vec<String>,
}

impl ExtractEvent {
    /// Build the start event for an archive about to be extracted.
    pub fn start(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            done: false,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Build the finish event for an archive once extraction has concluded.
    pub fn finish(
        source: impl Into<PathBuf>,
        target: impl Into<PathBuf>,
        warnings: Vec<String>,
        errors: Vec<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            done: true,
            warnings,
            errors,
        }
    }

    /// True iff this is a finish event with no warnings and no errors.
    pub fn is_clean_finish(&self) -> bool {
        self.done && self.warnings.is_empty() && self.errors.is_empty()
    }

    /// True iff this event carried any error.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
