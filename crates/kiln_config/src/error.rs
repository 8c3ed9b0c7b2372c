//! Error types for configuration loading and toolchain discovery.

use std::path::PathBuf;

/// Errors that can occur while loading settings or checking the toolchain
/// installation.
///
/// All of these are fatal for a build: they are detected before any compiler
/// process is spawned.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// A file the offload toolchain must provide is absent.
    #[error("toolchain file '{}' not found; is the offload toolchain installed?", path.display())]
    MissingToolchainFile {
        /// The expected location of the file.
        path: PathBuf,
    },

    /// Package metadata for a required library could not be queried.
    #[error("package '{package}' could not be resolved: {reason}")]
    PackageNotFound {
        /// The package name passed to `pkg-config`.
        package: String,
        /// Why the query failed.
        reason: String,
    },

    /// No user cache directory could be determined and none was configured.
    #[error("no cache directory available; set [cache] dir or KILN_CACHE_DIR")]
    NoCacheDir,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing_toolchain_file() {
        let err = ConfigError::MissingToolchainFile {
            path: PathBuf::from("/opt/computecpp/bin/compute++"),
        };
        assert_eq!(
            err.to_string(),
            "toolchain file '/opt/computecpp/bin/compute++' not found; is the offload toolchain installed?"
        );
    }

    #[test]
    fn display_parse_error() {
        let err = ConfigError::ParseError("expected '=' at line 3".to_string());
        assert_eq!(
            format!("{err}"),
            "failed to parse configuration: expected '=' at line 3"
        );
    }

    #[test]
    fn display_package_not_found() {
        let err = ConfigError::PackageNotFound {
            package: "opencv".to_string(),
            reason: "exit status 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "package 'opencv' could not be resolved: exit status 1"
        );
    }

    #[test]
    fn display_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ConfigError::IoError(io_err);
        assert!(format!("{err}").starts_with("failed to read configuration:"));
    }
}
