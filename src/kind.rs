//! Coarse archive classification used to select which handlers run.

use std::collections::HashSet;

/// A finite classification of an input file, assigned by the typing collaborator.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Kind {
    /// Documentation or other content not normally worth extracting.
    Docs,
    /// An ordinary single-format archive (zip, tar, …).
    Regular,
    /// An archive that commonly contains other archives nested within it.
    RegularNested,
    /// A language or OS package format (wheel, gem, apk, nupkg, …).
    Package,
    /// A filesystem-like container, e.g. a VM disk image.
    FileSystem,
    /// A unified-diff patch file.
    Patches,
    /// A package format requiring bespoke handling beyond the generic bundle handler.
    SpecialPackage,
}

/// An immutable, ordered set of [`Kind`]s the caller has selected for extraction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KindSet(HashSet<Kind>);

impl KindSet {
    /// The default kind-set: the kinds that are extracted unless the caller opts into `all`.
    pub fn default_kinds() -> Self {
        Self(HashSet::from([Kind::Regular, Kind::RegularNested, Kind::Package]))
    }

    /// Every kind the engine knows about, including `docs`, `patches`, and `special_package`.
    pub fn all_kinds() -> Self {
        Self(HashSet::from([
            Kind::Regular,
            Kind::RegularNested,
            Kind::Package,
            Kind::FileSystem,
            Kind::Docs,
            Kind::Patches,
            Kind::SpecialPackage,
        ]))
    }

    /// True iff `kind` is a member of this set.
    pub fn contains(&self, kind: Kind) -> bool {
        self.0.contains(&kind)
    }
}

impl Default for KindSet {
    fn default() -> Self {
        Self::default_kinds()
    }
}

impl FromIterator<Kind> for KindSet {
    fn from_iter<I: IntoIterator<Item = Kind>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
