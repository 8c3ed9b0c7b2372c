//! Settings types deserialized from `kiln.toml`.

use serde::Deserialize;
use std::path::PathBuf;

/// The complete settings for a kiln invocation.
///
/// Every section is optional; an empty file (or no file) yields the defaults,
/// which match a stock ComputeCpp install under `/usr/local/computecpp`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// Where the offload toolchain is installed and what its files are called.
    #[serde(default)]
    pub toolchain: ToolchainSettings,
    /// Compiler and linker flag inputs.
    #[serde(default)]
    pub build: BuildSettings,
    /// Artifact cache location.
    #[serde(default)]
    pub cache: CacheSettings,
}

/// Install prefix and file names of the offload toolchain.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolchainSettings {
    /// Install prefix containing `bin/`, `lib/` and `include/`.
    #[serde(default = "default_prefix")]
    pub prefix: PathBuf,
    /// File name of the device-info tool under `bin/`.
    #[serde(default = "default_device_info")]
    pub device_info: String,
    /// File name of the device/host compiler under `bin/`.
    #[serde(default = "default_compiler")]
    pub compiler: String,
    /// File name of the shared runtime library under `lib/`.
    #[serde(default = "default_runtime_library")]
    pub runtime_library: String,
}

impl Default for ToolchainSettings {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            device_info: default_device_info(),
            compiler: default_compiler(),
            runtime_library: default_runtime_library(),
        }
    }
}

/// Inputs to host compile and link flag assembly.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSettings {
    /// Language standard passed as `-std=<value>`.
    #[serde(default = "default_std")]
    pub std: String,
    /// Macro definitions passed as `-D<value>`.
    #[serde(default = "default_defines")]
    pub defines: Vec<String>,
    /// Extra include directories, typically bundled headers.
    #[serde(default)]
    pub include_dirs: Vec<PathBuf>,
    /// `pkg-config` packages whose cflags and libs are added.
    #[serde(default = "default_packages")]
    pub packages: Vec<String>,
    /// Libraries linked with `-l<name>`.
    #[serde(default = "default_libraries")]
    pub libraries: Vec<String>,
    /// Base name of the produced shared library (`lib<name>.so`).
    #[serde(default = "default_library_name")]
    pub library_name: String,
    /// Parent directory for scratch workspaces. Defaults to the system
    /// temporary directory.
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            std: default_std(),
            defines: default_defines(),
            include_dirs: Vec::new(),
            packages: default_packages(),
            libraries: default_libraries(),
            library_name: default_library_name(),
            scratch_dir: None,
        }
    }
}

/// Artifact cache settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    /// Cache root. Defaults to the user cache directory.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_prefix() -> PathBuf {
    PathBuf::from("/usr/local/computecpp")
}

fn default_device_info() -> String {
    "computecpp_info".to_string()
}

fn default_compiler() -> String {
    "compute++".to_string()
}

fn default_runtime_library() -> String {
    "libComputeCpp.so".to_string()
}

fn default_std() -> String {
    "c++11".to_string()
}

fn default_defines() -> Vec<String> {
    // libstdc++ dual ABI: the toolchain runtime is built against the old one
    vec!["_GLIBCXX_USE_CXX11_ABI=0".to_string()]
}

fn default_packages() -> Vec<String> {
    vec!["opencv".to_string()]
}

fn default_libraries() -> Vec<String> {
    vec!["ComputeCpp".to_string(), "pthread".to_string()]
}

fn default_library_name() -> String {
    "kiln_native".to_string()
}
