//! The recursion driver: walks a tree, drives the extraction driver on each
//! eligible file, recurses into extracted trees, and optionally replaces
//! originals once the whole walk has completed.

use std::{
    fs,
    path::{Path, PathBuf},
    thread,
};

use crossbeam::channel::{bounded, Receiver};
use globset::GlobSet;
use log::debug;

use crate::dispatch::{self, HandlerRegistry};
use crate::error::Error;
use crate::event::ExtractEvent;
use crate::extractor::{self, copy_dir_recursive};
use crate::kind::KindSet;
use crate::path_utils::{get_extraction_path, is_extraction_path};

/// Default bound on archive-expansion recursion depth (not plain directory
/// depth), guarding against pathological self-referential archives.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Channel capacity for the event-producer thread; zero makes the channel
/// rendezvous-style, keeping at most one event in flight.
const CHANNEL_CAPACITY: usize = 16;

/// Run the recursion driver over `location`, returning a lazy iterator of
/// [`ExtractEvent`]s produced by a dedicated walk thread.
#[allow(clippy::too_many_arguments)]
pub fn extract(
    location: impl Into<PathBuf>,
    registry: HandlerRegistry,
    kinds: KindSet,
    recurse: bool,
    replace_originals: bool,
    ignore: GlobSet,
    verbose: bool,
    max_depth: usize,
) -> Result<impl Iterator<Item = ExtractEvent>, Error> {
    let location = fs::canonicalize(location.into())?;

    let (sender, receiver): (_, Receiver<ExtractEvent>) = bounded(CHANNEL_CAPACITY);

    thread::spawn(move || {
        let mut finish_buffer = replace_originals.then(Vec::new);

        let result = walk_and_extract(
            &location,
            &registry,
            &kinds,
            recurse,
            &ignore,
            verbose,
            0,
            max_depth,
            &sender,
            &mut finish_buffer,
        );

        if let Err(err) = result {
            debug!("walk terminated with error: {err}");
        }

        if let Some(buffer) = finish_buffer {
            if let Err(err) = replay_replace_originals(buffer) {
                debug!("replace_originals replay failed: {err}");
            }
        }
        // `sender` is dropped here, closing the channel and ending the iterator.
    });

    Ok(receiver.into_iter())
}

#[allow(clippy::too_many_arguments)]
fn walk_and_extract(
    root: &Path,
    registry: &HandlerRegistry,
    kinds: &KindSet,
    recurse: bool,
    ignore: &GlobSet,
    verbose: bool,
    depth: usize,
    max_depth: usize,
    sender: &crossbeam::channel::Sender<ExtractEvent>,
    finish_buffer: &mut Option<Vec<ExtractEvent>>,
) -> Result<(), Error> {
    if depth > max_depth {
        return Err(Error::RecursionLimit(max_depth));
    }

    let mut dirs = Vec::new();
    let mut files = Vec::new();

    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            let name = entry.file_name().to_string_lossy().to_string();
            if dispatch::is_default_ignored_dir(&name) {
                continue;
            }
            if !recurse && is_extraction_path(&path) {
                // Pruned: do not descend into extraction targets when shallow.
                continue;
            }
            dirs.push(path);
        } else if file_type.is_file() {
            if !recurse && is_extraction_path(&path) {
                continue;
            }
            files.push(path);
        }
    }

    dirs.sort();
    files.sort();

    // Files are visited per directory before descending into subdirectories,
    // so a directory's own archives are fully resolved before its children
    // are walked.
    for file in &files {
        if !registry.should_extract(file, kinds, ignore) {
            continue;
        }

        let parent = file.parent().unwrap_or_else(|| Path::new(""));
        let file_name = file.file_name().unwrap_or_default();
        let target = parent.join(get_extraction_path(file_name));

        let events = extractor::extract_file(registry, file, &target, kinds, verbose);
        for event in events {
            if event.done() {
                if let Some(buffer) = finish_buffer.as_mut() {
                    buffer.push(event.clone());
                }
            }
            if sender.send(event).is_err() {
                // Receiver dropped: caller stopped iterating, stop walking.
                return Ok(());
            }
        }

        if recurse && target.is_dir() {
            walk_and_extract(
                &target,
                registry,
                kinds,
                recurse,
                ignore,
                verbose,
                depth + 1,
                max_depth,
                sender,
                finish_buffer,
            )?;
        }
    }

    for dir in &dirs {
        walk_and_extract(
            dir, registry, kinds, recurse, ignore, verbose, depth, max_depth, sender,
            finish_buffer,
        )?;
    }

    Ok(())
}

/// Replay buffered finish events in reverse order: for each clean finish,
/// delete the original source, copy the target tree onto it, then delete the
/// target. Reverse order reintegrates deeper extractions before shallower
/// ones so intermediate paths remain valid.
fn replay_replace_originals(buffer: Vec<ExtractEvent>) -> Result<(), Error> {
    for event in buffer.into_iter().rev() {
        if !event.is_clean_finish() {
            continue;
        }
        let source = event.source();
        let target = event.target();

        if source.exists() {
            if source.is_dir() {
                fs::remove_dir_all(source)?;
            } else {
                fs::remove_file(source)?;
            }
        }
        copy_dir_recursive(target, source)?;
        fs::remove_dir_all(target)?;
    }
    Ok(())
}
