//! Errors raised at the load boundary.

use std::path::PathBuf;

/// Errors raised while loading a library or calling into it.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The caller passed input the binding layer cannot accept.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// The dynamic loader rejected the file.
    #[error("failed to load {}: {source}", path.display())]
    Load {
        /// The library that was being loaded.
        path: PathBuf,
        /// The loader's error.
        source: libloading::Error,
    },

    /// The library does not export a required entry point.
    #[error("{} does not export '{symbol}'", path.display())]
    MissingSymbol {
        /// The loaded library.
        path: PathBuf,
        /// The symbol that was looked up.
        symbol: String,
        /// The loader's error.
        source: libloading::Error,
    },
}

impl RuntimeError {
    /// Returns `true` for errors caused by the caller's input rather than
    /// the library.
    pub fn is_argument(&self) -> bool {
        matches!(self, RuntimeError::Argument(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_display() {
        let err = RuntimeError::Argument("buffer lengths differ".to_string());
        assert_eq!(err.to_string(), "invalid argument: buffer lengths differ");
        assert!(err.is_argument());
    }
}
