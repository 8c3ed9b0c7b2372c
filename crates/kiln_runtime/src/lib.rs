//! Loading built libraries into the running process and calling their
//! exported entry points.
//!
//! A [`NativeLibrary`] stays loaded until the process exits; there is
//! no unload or reload. Entry points are reached through typed wrappers:
//! [`ElementwiseOp`] for the float-buffer calling convention and
//! [`NativeLibrary::call_entry`] for zero-argument functions.

#![warn(missing_docs)]

pub mod buffer;
pub mod error;
pub mod library;

pub use buffer::{Buffer, BufferMut};
pub use error::RuntimeError;
pub use library::{
    run_demo, ElementwiseOp, NativeLibrary, ELEMENTWISE_ENTRY, EXPRESSION_TREE_ENTRY,
};
