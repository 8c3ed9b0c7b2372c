//! Resolving a [`ToolchainConfig`] from settings and package metadata.

use std::path::PathBuf;

use kiln_config::{ConfigError, Settings, ToolchainConfig, ToolchainLayout};

use crate::error::ToolchainError;
use crate::process::run_captured;

/// Source of compile and link flags for external library packages.
pub trait PackageProbe {
    /// Compile flags for `package`.
    fn cflags(&self, package: &str) -> Result<Vec<String>, ConfigError>;

    /// Link flags for `package`.
    fn libs(&self, package: &str) -> Result<Vec<String>, ConfigError>;
}

/// Queries the `pkg-config` binary.
///
/// The binary is taken from the `PKG_CONFIG` environment variable when set,
/// otherwise `pkg-config` on `PATH`.
#[derive(Debug, Clone)]
pub struct PkgConfig {
    binary: PathBuf,
}

impl PkgConfig {
    /// Uses `PKG_CONFIG` or `pkg-config`.
    pub fn from_env() -> Self {
        let binary = std::env::var_os("PKG_CONFIG")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("pkg-config"));
        Self { binary }
    }

    /// Uses a specific `pkg-config` binary.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn query(&self, mode: &str, package: &str) -> Result<Vec<String>, ConfigError> {
        let stdout = run_captured(&self.binary, &[mode.to_string(), package.to_string()], None)
            .map_err(|e| ConfigError::PackageNotFound {
                package: package.to_string(),
                reason: match e {
                    ToolchainError::Failed(f) if !f.stderr.trim().is_empty() => {
                        f.stderr.trim().to_string()
                    }
                    other => other.to_string(),
                },
            })?;
        Ok(stdout.split_whitespace().map(str::to_string).collect())
    }
}

impl PackageProbe for PkgConfig {
    fn cflags(&self, package: &str) -> Result<Vec<String>, ConfigError> {
        self.query("--cflags", package)
    }

    fn libs(&self, package: &str) -> Result<Vec<String>, ConfigError> {
        self.query("--libs", package)
    }
}

/// Resolves the toolchain config using `pkg-config`.
pub fn discover(settings: &Settings) -> Result<ToolchainConfig, ConfigError> {
    discover_with(settings, &PkgConfig::from_env())
}

/// Resolves the toolchain config using `probe` for package metadata.
///
/// Packages are queried in configured order; cflags and libs are
/// concatenated in that order.
pub fn discover_with(
    settings: &Settings,
    probe: &dyn PackageProbe,
) -> Result<ToolchainConfig, ConfigError> {
    let mut cflags = Vec::new();
    let mut libs = Vec::new();
    for package in &settings.build.packages {
        cflags.extend(probe.cflags(package)?);
        libs.extend(probe.libs(package)?);
    }
    tracing::debug!(?cflags, ?libs, "package flags");
    Ok(ToolchainConfig::new(
        ToolchainLayout::from_settings(&settings.toolchain),
        &settings.build,
        cflags,
        libs,
    ))
}
