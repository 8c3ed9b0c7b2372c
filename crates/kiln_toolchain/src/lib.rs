//! Invocation of the external offload compiler toolchain.
//!
//! [`Toolchain`] is the seam between the build pipeline and the real
//! compiler: [`ProcessToolchain`] spawns the installed binaries, tests plug in
//! fakes. [`discover`] resolves a [`kiln_config::ToolchainConfig`] by querying
//! `pkg-config` for the configured packages.

#![warn(missing_docs)]

pub mod discover;
pub mod error;
pub mod process;

pub use discover::{discover, discover_with, PackageProbe, PkgConfig};
pub use error::{FailedInvocation, ToolchainError};
pub use process::{ProcessToolchain, Toolchain, DEVICE_FLAGS_ARG};
