//! The three-stage offload build: device stub, host object, shared library.
//!
//! [`BuildPipeline::build`] checks the artifact cache, and on a miss compiles
//! the source in a scratch [`Workspace`] through the configured
//! [`kiln_toolchain::Toolchain`], then stores the linked library in the cache.
//! The scratch workspace is removed on every exit path.

#![warn(missing_docs)]

pub mod error;
pub mod flags;
pub mod pipeline;
pub mod progress;
pub mod workspace;

pub use error::{BuildError, Stage};
pub use pipeline::BuildPipeline;
pub use progress::{NoProgress, Progress, TerminalProgress};
pub use workspace::Workspace;
