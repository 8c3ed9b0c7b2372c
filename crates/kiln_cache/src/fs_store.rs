//! Filesystem-backed artifact store.
//!
//! Layout under the cache root:
//!
//! ```text
//! <root>/<fingerprint>/entry.json
//! <root>/<fingerprint>/<artifact file name>
//! ```
//!
//! Both files are written to a temporary file in the entry directory and
//! renamed into place, the binary first and `entry.json` last. A lookup only
//! trusts an entry whose `entry.json` exists, so it never observes a
//! half-written binary.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use kiln_common::{Fingerprint, SourceUnit};

use crate::entry::CacheEntry;
use crate::error::CacheError;
use crate::store::ArtifactStore;

/// Name of the metadata file in each entry directory.
const ENTRY_FILE: &str = "entry.json";

/// An [`ArtifactStore`] rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    /// Creates a store rooted at `root`. The directory is created lazily on
    /// the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The cache root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory holding the entry for `fingerprint`.
    pub fn entry_dir(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.root.join(fingerprint.to_string())
    }

    /// Reads the metadata of the entry for `fingerprint`.
    fn read_entry(&self, fingerprint: &Fingerprint) -> Option<CacheEntry> {
        let path = self.entry_dir(fingerprint).join(ENTRY_FILE);
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Lists every readable entry, oldest first.
    ///
    /// Directories that are not named like a fingerprint are ignored;
    /// entries with unreadable metadata are skipped with a warning.
    pub fn entries(&self) -> Result<Vec<CacheEntry>, CacheError> {
        let mut entries = Vec::new();
        for fingerprint in self.entry_fingerprints()? {
            match self.read_entry(&fingerprint) {
                Some(entry) => entries.push(entry),
                None => tracing::warn!(
                    "skipping unreadable cache entry {}",
                    self.entry_dir(&fingerprint).display()
                ),
            }
        }
        entries.sort_by_key(|e| (e.created_at, e.fingerprint));
        Ok(entries)
    }

    /// Removes the entry for `source`. Returns `true` if one existed.
    pub fn remove(&self, source: &SourceUnit) -> Result<bool, CacheError> {
        let dir = self.entry_dir(&source.fingerprint());
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::Io {
                path: dir,
                source: e,
            }),
        }
    }

    /// Removes every entry directory, readable or not. Returns the number
    /// removed. Files in the root that are not entries are left alone.
    pub fn clear(&self) -> Result<usize, CacheError> {
        let mut removed = 0;
        for fingerprint in self.entry_fingerprints()? {
            let dir = self.entry_dir(&fingerprint);
            fs::remove_dir_all(&dir).map_err(|e| CacheError::Io {
                path: dir.clone(),
                source: e,
            })?;
            removed += 1;
        }
        Ok(removed)
    }

    fn entry_fingerprints(&self) -> Result<Vec<Fingerprint>, CacheError> {
        let read = match fs::read_dir(&self.root) {
            Ok(read) => read,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(CacheError::Io {
                    path: self.root.clone(),
                    source: e,
                })
            }
        };
        let mut fingerprints = Vec::new();
        for entry in read {
            let entry = entry.map_err(|e| CacheError::Io {
                path: self.root.clone(),
                source: e,
            })?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(fp) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<Fingerprint>().ok())
            {
                fingerprints.push(fp);
            }
        }
        Ok(fingerprints)
    }

    /// Writes `contents` to `dest` through a temporary file in `dir`.
    fn write_atomic(
        dir: &Path,
        dest: &Path,
        contents: impl FnOnce(&mut fs::File) -> std::io::Result<()>,
    ) -> Result<(), CacheError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| CacheError::Io { path, source }
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err(dir))?;
        contents(tmp.as_file_mut()).map_err(io_err(tmp.path()))?;
        tmp.as_file().sync_all().map_err(io_err(tmp.path()))?;
        tmp.persist(dest).map_err(|e| CacheError::Io {
            path: dest.to_path_buf(),
            source: e.error,
        })?;
        Ok(())
    }
}

impl ArtifactStore for FsArtifactStore {
    fn lookup(&self, source: &SourceUnit) -> Option<PathBuf> {
        let fingerprint = source.fingerprint();
        let entry = self.read_entry(&fingerprint)?;
        if !entry.matches(source) {
            tracing::warn!(
                "cache entry {fingerprint} holds a different source; treating as a miss"
            );
            return None;
        }
        let path = self.entry_dir(&fingerprint).join(&entry.artifact);
        if !path.is_file() {
            tracing::debug!("cache entry {fingerprint} is missing {}", entry.artifact);
            return None;
        }
        tracing::info!("found cached binary {fingerprint}/{}", entry.artifact);
        Some(path)
    }

    fn store(&self, source: &SourceUnit, artifact: &Path) -> Result<PathBuf, CacheError> {
        let name = match artifact.file_name().and_then(|n| n.to_str()) {
            Some(name) if artifact.is_file() => name.to_string(),
            _ => {
                return Err(CacheError::NotAFile {
                    path: artifact.to_path_buf(),
                })
            }
        };

        let entry = CacheEntry::new(source, &name);
        let dir = self.entry_dir(&entry.fingerprint);
        fs::create_dir_all(&dir).map_err(|e| CacheError::Io {
            path: dir.clone(),
            source: e,
        })?;

        let permissions = fs::metadata(artifact)
            .map_err(|e| CacheError::Io {
                path: artifact.to_path_buf(),
                source: e,
            })?
            .permissions();
        let dest = dir.join(&name);
        Self::write_atomic(&dir, &dest, |file| {
            let mut src = fs::File::open(artifact)?;
            std::io::copy(&mut src, file)?;
            file.set_permissions(permissions)
        })?;

        let json = serde_json::to_vec_pretty(&entry).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
        Self::write_atomic(&dir, &dir.join(ENTRY_FILE), |file| file.write_all(&json))?;

        tracing::info!("cached binary {}/{name}", entry.fingerprint);
        Ok(dest)
    }
}
