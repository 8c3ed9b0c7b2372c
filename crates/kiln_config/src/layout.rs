//! Install layout of the offload toolchain.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::ToolchainSettings;

/// Locations of the files the offload toolchain provides under its prefix.
///
/// ```text
/// <prefix>/bin/<device_info>
/// <prefix>/bin/<compiler>
/// <prefix>/lib/<runtime_library>
/// <prefix>/include/
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainLayout {
    prefix: PathBuf,
    device_info: String,
    compiler: String,
    runtime_library: String,
}

impl ToolchainLayout {
    /// Creates a layout with the stock ComputeCpp file names.
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self::from_settings(&ToolchainSettings {
            prefix: prefix.into(),
            ..ToolchainSettings::default()
        })
    }

    /// Creates a layout from configured settings.
    pub fn from_settings(settings: &ToolchainSettings) -> Self {
        Self {
            prefix: settings.prefix.clone(),
            device_info: settings.device_info.clone(),
            compiler: settings.compiler.clone(),
            runtime_library: settings.runtime_library.clone(),
        }
    }

    /// The install prefix.
    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Path of the device-info tool.
    pub fn device_info_tool(&self) -> PathBuf {
        self.prefix.join("bin").join(&self.device_info)
    }

    /// Path of the device/host compiler.
    pub fn compiler(&self) -> PathBuf {
        self.prefix.join("bin").join(&self.compiler)
    }

    /// Path of the shared runtime library.
    pub fn runtime_library(&self) -> PathBuf {
        self.lib_dir().join(&self.runtime_library)
    }

    /// The toolchain's library directory.
    pub fn lib_dir(&self) -> PathBuf {
        self.prefix.join("lib")
    }

    /// The toolchain's header directory.
    pub fn include_dir(&self) -> PathBuf {
        self.prefix.join("include")
    }

    /// Verifies that the device-info tool, compiler and runtime library all
    /// exist, in that order.
    ///
    /// Fails with [`ConfigError::MissingToolchainFile`] naming the first
    /// missing path. Touches only the filesystem; no process is spawned.
    pub fn check_installed(&self) -> Result<(), ConfigError> {
        for path in [
            self.device_info_tool(),
            self.compiler(),
            self.runtime_library(),
        ] {
            if !path.exists() {
                return Err(ConfigError::MissingToolchainFile { path });
            }
        }
        Ok(())
    }
}
