//! Scratch directories for a single build.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// File name of the integration stub produced by the device compile.
pub const STUB_FILE: &str = "stub.sycl";

/// File name of the object produced by the host compile.
pub const OBJECT_FILE: &str = "host.o";

/// A uniquely named scratch directory owned by one build.
///
/// The directory and everything in it are removed when the workspace is
/// dropped, whether the build succeeded or not.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Creates a fresh `kiln-*` directory under `parent`, or under the system
    /// temporary directory when `parent` is `None`.
    pub fn create(parent: Option<&Path>) -> std::io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("kiln-");
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        tracing::debug!("created workspace {}", dir.path().display());
        Ok(Self { dir })
    }

    /// The workspace directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the device compile writes the integration stub.
    pub fn stub_path(&self) -> PathBuf {
        self.path().join(STUB_FILE)
    }

    /// Where the host compile writes the object file.
    pub fn object_path(&self) -> PathBuf {
        self.path().join(OBJECT_FILE)
    }

    /// Where the link writes the shared library called `file_name`.
    pub fn library_path(&self, file_name: &str) -> PathBuf {
        self.path().join(file_name)
    }
}
