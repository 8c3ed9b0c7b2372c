//! Build errors and pipeline stages.

use std::fmt;
use std::path::PathBuf;

use kiln_cache::CacheError;
use kiln_config::ConfigError;
use kiln_toolchain::ToolchainError;

/// The toolchain stages of a build, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Device compile producing the integration stub.
    DeviceCompile,
    /// Host compile producing the object file.
    HostCompile,
    /// Link producing the shared library.
    Link,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::DeviceCompile => "device compile",
            Stage::HostCompile => "host compile",
            Stage::Link => "link",
        })
    }
}

/// Errors that abort a build.
///
/// None are handled inside the pipeline; every one propagates to the caller
/// after the scratch workspace has been removed.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The toolchain is not installed or the configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A toolchain process failed.
    #[error("{stage} failed: {source}")]
    Toolchain {
        /// The stage that was running.
        stage: Stage,
        /// The underlying failure.
        #[source]
        source: ToolchainError,
    },

    /// A toolchain process succeeded without writing its output file.
    #[error("{stage} reported success but produced no {}", path.display())]
    MissingOutput {
        /// The stage that was running.
        stage: Stage,
        /// The expected output path.
        path: PathBuf,
    },

    /// The scratch workspace could not be created.
    #[error("failed to create build workspace: {0}")]
    Workspace(#[source] std::io::Error),

    /// The linked library could not be stored in the cache.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl BuildError {
    /// The toolchain failure behind this error, if there is one.
    pub fn toolchain_error(&self) -> Option<&ToolchainError> {
        match self {
            BuildError::Toolchain { source, .. } => Some(source),
            _ => None,
        }
    }
}
