//! Settings, install layout and resolved compiler flags for kiln builds.
//!
//! Settings come from an optional `kiln.toml` plus environment overrides.
//! [`ToolchainLayout`] locates the offload toolchain under its install prefix,
//! and [`ToolchainConfig`] is the fully resolved flag set handed to every
//! build. Nothing here is global: callers resolve a config and pass it down.

#![warn(missing_docs)]

pub mod error;
pub mod layout;
pub mod loader;
pub mod toolchain;
pub mod types;

pub use error::ConfigError;
pub use layout::ToolchainLayout;
pub use loader::{apply_env_overrides, load_settings, load_settings_from_str, CONFIG_FILE};
pub use toolchain::ToolchainConfig;
pub use types::*;
