//! The artifact store interface used by the build pipeline.

use std::path::{Path, PathBuf};

use kiln_common::SourceUnit;

use crate::error::CacheError;

/// Maps source texts to previously linked binaries.
///
/// Keys are the exact source text, preamble included; there is no
/// normalization. Implementations must make `store` atomic with respect to
/// concurrent `lookup` calls: a reader either sees no entry or a complete
/// one. No lock spans lookup, build and store, so two processes building the
/// same source may both store it; the last write wins.
pub trait ArtifactStore {
    /// Returns the cached binary for `source`, if any.
    ///
    /// Unreadable or inconsistent entries are reported as misses.
    fn lookup(&self, source: &SourceUnit) -> Option<PathBuf>;

    /// Copies `artifact` into the store under `source` and returns the path
    /// of the stored copy.
    fn store(&self, source: &SourceUnit, artifact: &Path) -> Result<PathBuf, CacheError>;
}

impl<S: ArtifactStore + ?Sized> ArtifactStore for &S {
    fn lookup(&self, source: &SourceUnit) -> Option<PathBuf> {
        (**self).lookup(source)
    }

    fn store(&self, source: &SourceUnit, artifact: &Path) -> Result<PathBuf, CacheError> {
        (**self).store(source, artifact)
    }
}
