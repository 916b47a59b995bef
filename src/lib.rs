//! A recursive archive-extraction engine: walks a filesystem tree, identifies
//! archive and compressed files, extracts each to a canonical sibling
//! directory, and recurses into extracted trees. Patch files, source maps,
//! VM disk images, and application bundles are treated as archive-like
//! containers and handled uniformly alongside zip/tar/gzip/bzip2.
//!
//! The primary entry points are [`api::extract_archives`] (recursive,
//! tree-wide) and [`api::extract_archive`] (single known file). Both return
//! [`event::ExtractEvent`]s; [`api::Expansion`] drains those into a summary
//! for callers that don't want a live stream.

pub mod api;
#[cfg(feature = "bin")]
pub mod cli;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod extractor;
pub mod handlers;
pub mod kind;
pub mod path_utils;
pub mod recurse;
pub mod typing;
pub mod vmimage;

pub use api::{extract_archive, extract_archives, Expansion, Options};
pub use error::{Error, Invariant};
pub use event::{Destination, ExtractEvent, Source};
pub use kind::{Kind, KindSet};
