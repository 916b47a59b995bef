//! Per-kind handlers. Each exposes a function of the uniform shape
//! `(abs_source_path, abs_target_directory) -> Result<Vec<String>, Error>`,
//! matching the handler contract of the dispatch module.

pub mod bundle;
pub mod patch;
pub mod source_map;
pub mod uncompress;
