//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur while writing to or maintaining the cache.
///
/// Lookups never fail: an unreadable or inconsistent entry is a cache miss.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing cache files.
    #[error("cache I/O error at {}: {source}", path.display())]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Entry metadata could not be serialized.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },

    /// The artifact handed to `store` is not a file.
    #[error("artifact {} is not a file", path.display())]
    NotAFile {
        /// The rejected path.
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = CacheError::Io {
            path: PathBuf::from("/home/u/.cache/kiln/entry.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cache I/O error"));
        assert!(msg.contains("entry.json"));
    }

    #[test]
    fn not_a_file_display() {
        let err = CacheError::NotAFile {
            path: PathBuf::from("/tmp/kiln-x"),
        };
        assert_eq!(err.to_string(), "artifact /tmp/kiln-x is not a file");
    }
}
