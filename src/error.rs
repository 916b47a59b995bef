//! Error types shared by every fallible seam in this crate.

use std::{io, path::PathBuf, time::Duration};

use thiserror::Error;

/// Convenience macro to construct an invariant error.
#[macro_export]
macro_rules! invariant {
    ($kind:ident) => {
        Err($crate::error::Error::Invariant($crate::error::Invariant::$kind))
    };
    ($kind:ident, $arg:ident) => {
        Err($crate::error::Error::Invariant($crate::error::Invariant::$kind { $arg }))
    };
    ($kind:ident, $( $arg:expr ),*) => {
        Err($crate::error::Error::Invariant($crate::error::Invariant::$kind { $($arg),* }))
    }
}

/// Errors encountered while extracting archives.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An invariant was violated.
    #[error("invariant")]
    Invariant(#[from] Invariant),

    /// Unable to walk entries.
    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    /// Generic IO error.
    #[error("io error")]
    Io(#[from] io::Error),

    /// No handler is registered for this file's kind and signature.
    #[error("no handler registered for {path:?}")]
    NotSupported {
        /// The path that could not be dispatched.
        path: PathBuf,
    },

    /// The archive library collaborator failed to expand an archive.
    #[error("archive expansion failed")]
    Libarchive(#[from] compress_tools::Error),

    /// The archive requires a password the caller did not supply.
    #[error("{path:?} is password protected")]
    PasswordProtected {
        /// The archive that could not be opened.
        path: PathBuf,
    },

    /// A patch file failed to parse.
    #[error("failed to parse patch file {path:?}")]
    PatchParse {
        /// The patch file that failed to parse.
        path: PathBuf,
    },

    /// A JSON source map failed to parse.
    #[error("failed to parse source map {path:?}")]
    SourceMapParse {
        /// The source map that failed to parse.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The VM-image shim could not locate its external tool.
    #[error("vm-image tool not found at {path:?}; set EXTRACTCODE_GUESTFISH_PATH or install guestfish")]
    GuestfishNotFound {
        /// The path that was probed, either resolved from the environment or from `PATH`.
        path: PathBuf,
    },

    /// VM-image extraction was attempted on a non-Linux host.
    #[error("vm-image extraction requires a Linux host")]
    NotLinux,

    /// No readable kernel image was found, so the VM-image tool cannot run.
    #[error("no readable kernel image found under /boot/vmlinuz-*")]
    KernelUnreadable,

    /// The external VM-image tool exited with a non-zero status.
    #[error("guestfish exited with status {status}: {stderr}")]
    GuestfishFailed {
        /// The process exit status.
        status: i32,
        /// Captured stderr.
        stderr: String,
    },

    /// The external VM-image tool did not finish within its allotted time.
    #[error("vm-image tool invocation timed out after {0:?}")]
    GuestfishTimeout(Duration),

    /// Unable to remove a staging or destination directory.
    #[error("unable to remove directory {path:?}")]
    Cleanup {
        /// The directory that failed to be removed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Reached the recursion depth limit.
    #[error("recursion limit of {0} reached")]
    RecursionLimit(usize),
}

/// Invariants expected by this library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Invariant {
    /// `new_name` was called with a location that is empty after trailing-separator strip.
    #[error("location is empty after trailing-separator strip")]
    EmptyLocation,

    /// A path has no parent directory, so a sibling-relative operation cannot proceed.
    #[error("{path:?} has no parent directory")]
    NoParent {
        /// The path that lacked a parent.
        path: PathBuf,
    },

    /// A resolved entry path would land outside its target directory.
    #[error("entry {entry:?} resolves to {resolved:?}, which escapes its target directory")]
    PathEscape {
        /// The original, unresolved entry path.
        entry: PathBuf,
        /// The path it resolved to.
        resolved: PathBuf,
    },
}
