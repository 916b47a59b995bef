//! The extraction driver: per-file staging, commit, and event reporting.

use std::{fs, path::Path};

use tempfile::Builder;

use crate::dispatch::HandlerRegistry;
use crate::error::Error;
use crate::event::ExtractEvent;
use crate::kind::KindSet;

/// Extract one candidate file `source` into its pre-computed `target`
/// directory, dispatching to the registered handler.
///
/// Yields nothing if no handler is registered. Otherwise yields exactly a
/// start event followed by a finish event, regardless of success or failure.
pub fn extract_file(
    registry: &HandlerRegistry,
    source: &Path,
    target: &Path,
    kinds: &KindSet,
    verbose: bool,
) -> Vec<ExtractEvent> {
    let mut events = Vec::new();

    let handler = match registry.get_extractor(source, kinds) {
        Some(handler) => handler,
        None => return events,
    };

    events.push(ExtractEvent::start(source, target));

    let mut warnings = Vec::new();
    let mut errors = Vec::new();

    let outcome: Result<(), Error> = (|| {
        let staging = Builder::new().prefix("extractcode-extract-").tempdir()?;
        warnings.extend(handler(source, staging.path())?);
        copy_dir_recursive(staging.path(), target)?;
        Ok(())
    })();

    if let Err(err) = outcome {
        errors.push(clean_error_message(&err.to_string()));
        if verbose {
            errors.push(format!("{err:?}"));
        }
    }

    events.push(ExtractEvent::finish(source, target, warnings, errors));
    events
}

/// Strip surrounding quotes and spaces from an error message, mirroring the
/// `str(e).strip(' \'"')` normalization applied to handler exceptions.
fn clean_error_message(message: &str) -> String {
    message.trim_matches(|c: char| c == '\'' || c == '"' || c == ' ').to_string()
}

/// Recursively copy a staging directory's contents into `to`. Used so that a
/// partial handler failure leaves no corrupt target: the handler writes into
/// a disposable staging directory, which is only merged into `to` after the
/// handler returns successfully.
pub(crate) fn copy_dir_recursive(from: &Path, to: &Path) -> Result<(), Error> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let dest = to.join(entry.file_name());
        if file_type.is_dir() {
            copy_dir_recursive(&entry.path(), &dest)?;
        } else {
            // Symlinks are followed and their target content copied whole;
            // faithful symlink/permission reproduction is out of scope.
            fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}
