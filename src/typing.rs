//! The typing collaborator: classifies a path into a [`Kind`].
//!
//! The dispatch and driver code depend only on the [`Typing`] trait; this
//! module's [`DefaultTyping`] is one implementation among potentially many,
//! driven by a static extension table with a content-sniffing fallback.

use std::path::Path;

use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::kind::Kind;

/// Supplies a [`Kind`] classification for a candidate path.
pub trait Typing: Send + Sync {
    /// Classify `path`. Implementations may inspect the extension, the
    /// content, or both.
    fn classify(&self, path: &Path) -> Kind;

    /// True iff `path` looks like a unified-diff patch file, independent of
    /// its general [`Kind`] classification.
    fn is_patch(&self, path: &Path) -> bool {
        let name = path.file_name().map(|n| n.to_string_lossy().to_lowercase());
        matches!(&name, Some(n) if (n.ends_with(".diff") || n.ends_with(".patch"))
            && !n.ends_with(crate::path_utils::EXTRACT_SUFFIX))
    }
}

lazy_static! {
    static ref EXTENSION_KINDS: HashMap<&'static str, Kind> = {
        let mut m = HashMap::new();
        // Zip-family and generic containers.
        for ext in [".zip", ".jar", ".war", ".ear", ".7z", ".rar"] {
            m.insert(ext, Kind::Regular);
        }
        // Tar-family and other containers that commonly nest further archives.
        for ext in [
            ".tar", ".tar.gz", ".tgz", ".tar.bz2", ".tbz2", ".tar.xz", ".txz", ".tar.zst",
        ] {
            m.insert(ext, Kind::RegularNested);
        }
        // Single-stream compressors.
        for ext in [".gz", ".bz2", ".xz", ".zst"] {
            m.insert(ext, Kind::Regular);
        }
        // Language/OS package formats.
        for ext in [
            ".whl", ".egg", ".gem", ".apk", ".aab", ".nupkg", ".deb", ".rpm",
        ] {
            m.insert(ext, Kind::Package);
        }
        // Patch files.
        for ext in [".diff", ".patch"] {
            m.insert(ext, Kind::Patches);
        }
        // Source maps.
        m.insert(".map", Kind::SpecialPackage);
        // VM disk images.
        for ext in [".qcow2", ".qcow2c", ".qcow", ".img", ".vmdk", ".vdi"] {
            m.insert(ext, Kind::FileSystem);
        }
        m
    };
}

/// Default [`Typing`] implementation: extension table, falling back to
/// magic-byte sniffing via `infer`, falling back to `docs`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultTyping;

impl DefaultTyping {
    fn classify_by_extension(name: &str) -> Option<Kind> {
        // Try the longest matching suffix first so `.tar.gz` beats `.gz`.
        let mut candidates: Vec<&&'static str> = EXTENSION_KINDS.keys().collect();
        candidates.sort_by_key(|e| std::cmp::Reverse(e.len()));
        candidates
            .into_iter()
            .find(|ext| name.ends_with(**ext))
            .map(|ext| EXTENSION_KINDS[ext])
    }

    fn classify_by_content(path: &Path) -> Option<Kind> {
        let kind = infer::get_from_path(path).ok().flatten()?;
        match kind.matcher_type() {
            infer::MatcherType::Archive => Some(Kind::Regular),
            _ => None,
        }
    }
}

impl Typing for DefaultTyping {
    fn classify(&self, path: &Path) -> Kind {
        let name = path.file_name().map(|n| n.to_string_lossy().to_lowercase());
        if let Some(name) = &name {
            if let Some(kind) = Self::classify_by_extension(name) {
                return kind;
            }
        }
        if let Some(kind) = Self::classify_by_content(path) {
            return kind;
        }
        Kind::Docs
    }
}
