//! Content fingerprints for the artifact cache.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 128-bit XXH3 fingerprint of a source text.
///
/// The fingerprint is taken over the exact bytes of the text with no
/// normalization, so two sources that differ only in whitespace have
/// different fingerprints. It is the name of a cache entry on disk and is
/// serialized as 32 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
    /// Computes the fingerprint of a byte slice using XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }

    /// Computes the fingerprint of a text.
    pub fn of(text: &str) -> Self {
        Self::from_bytes(text.as_bytes())
    }
}

/// Error returned when a string is not a 32-character hex fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid fingerprint '{input}': expected 32 hex characters")]
pub struct ParseFingerprintError {
    /// The rejected input.
    pub input: String,
}

impl FromStr for Fingerprint {
    type Err = ParseFingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseFingerprintError {
            input: s.to_string(),
        };
        if s.len() != 32 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        let mut bytes = [0u8; 16];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).map_err(|_| err())?;
        }
        Ok(Self(bytes))
    }
}

impl From<Fingerprint> for String {
    fn from(fp: Fingerprint) -> Self {
        fp.to_string()
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = ParseFingerprintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        assert_eq!(Fingerprint::of("int x = 1;"), Fingerprint::of("int x = 1;"));
    }

    #[test]
    fn trailing_whitespace_is_significant() {
        assert_ne!(Fingerprint::of("A"), Fingerprint::of("A "));
    }

    #[test]
    fn display_is_32_hex_chars() {
        let s = Fingerprint::of("kernel").to_string();
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn parse_display_output() {
        let fp = Fingerprint::of("kernel");
        let back: Fingerprint = fp.to_string().parse().unwrap();
        assert_eq!(fp, back);
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!("".parse::<Fingerprint>().is_err());
        assert!("abc".parse::<Fingerprint>().is_err());
        let err = "zz".repeat(16).parse::<Fingerprint>().unwrap_err();
        assert!(err.to_string().contains("expected 32 hex characters"));
    }

    #[test]
    fn debug_abbreviated() {
        let s = format!("{:?}", Fingerprint::of("kernel"));
        assert!(s.starts_with("Fingerprint("));
        assert!(s.ends_with("..)"));
    }

    #[test]
    fn serializes_as_hex_string() {
        let fp = Fingerprint::of("serde test");
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, format!("\"{fp}\""));
        let back: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(fp, back);
    }
}
