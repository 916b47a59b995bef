//! The CLI front-end's flag surface, kept separate from `main` so it can be
//! unit tested without spawning a process.

use std::path::PathBuf;

use clap::Parser;

/// Recursively extract archives, compressed files, patches, source maps, and
/// VM disk images found under a directory tree.
#[derive(Parser, Debug)]
#[clap(version, about)]
pub struct Cli {
    /// Existing, readable path to walk.
    pub input: PathBuf,

    /// Emit a second, debug-formatted line for every error, and print the
    /// relative path (rather than just the file name) on each start line.
    #[clap(long)]
    pub verbose: bool,

    /// Suppress per-archive progress lines; only the final summary is printed.
    #[clap(long)]
    pub quiet: bool,

    /// Do not recurse into extracted archives.
    #[clap(long)]
    pub shallow: bool,

    /// After a clean extraction, replace the original archive in place with
    /// its extracted directory.
    #[clap(long)]
    pub replace_originals: bool,

    /// Glob pattern to exclude from consideration; may be repeated.
    #[clap(long = "ignore")]
    pub ignore_pattern: Vec<String>,

    /// Select every kind, including docs, patches, and source maps.
    #[clap(long)]
    pub all_formats: bool,
}

impl Cli {
    /// Translate the parsed flags into an [`crate::api::Options`].
    pub fn options(&self) -> crate::api::Options {
        crate::api::Options::builder()
            .recurse(!self.shallow)
            .replace_originals(self.replace_originals)
            .ignore_pattern(self.ignore_pattern.clone())
            .all_formats(self.all_formats)
            .verbose(self.verbose)
            .build()
    }
}
