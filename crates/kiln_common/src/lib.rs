//! Shared foundational types used across the kiln offload build toolchain.
//!
//! This crate provides the content fingerprint used as the artifact cache key
//! and the [`SourceUnit`] type that pairs submitted source text with the fixed
//! preamble every build compiles.

#![warn(missing_docs)]

pub mod fingerprint;
pub mod source;

pub use fingerprint::{Fingerprint, ParseFingerprintError};
pub use source::{SourceUnit, PREAMBLE};
