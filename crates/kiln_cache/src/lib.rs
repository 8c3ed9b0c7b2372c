//! Content-addressed cache of linked offload binaries.
//!
//! Each distinct source text maps to at most one cached shared library. The
//! cache lives on disk, survives process restarts and is never evicted
//! automatically; `kiln cache clear` or deleting the directory resets it.

#![warn(missing_docs)]

pub mod entry;
pub mod error;
pub mod fs_store;
pub mod store;

pub use entry::CacheEntry;
pub use error::CacheError;
pub use fs_store::FsArtifactStore;
pub use store::ArtifactStore;
