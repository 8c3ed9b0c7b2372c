//! Source units submitted for compilation.

use std::fmt;

use crate::fingerprint::Fingerprint;

/// Boilerplate prepended to every submitted source before it is fingerprinted
/// and compiled.
///
/// Exports a C-linkage elementwise add over `float` buffers so every produced
/// library has at least one entry point with a known signature.
pub const PREAMBLE: &str = r#"
extern "C" {
void test_add(float *a, float *b, float *c, long n) {
  while (n--) {
    *c++ = *a++ + *b++;
  }
}
}
    "#;

/// The complete text handed to the offload compiler: [`PREAMBLE`] followed by
/// the caller's source, byte for byte.
///
/// A `SourceUnit` is immutable. Its identity is its exact text, which is also
/// the artifact cache key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SourceUnit {
    text: String,
}

impl SourceUnit {
    /// Builds a unit from caller source, prepending the preamble.
    pub fn new(body: impl AsRef<str>) -> Self {
        let body = body.as_ref();
        let mut text = String::with_capacity(PREAMBLE.len() + body.len());
        text.push_str(PREAMBLE);
        text.push_str(body);
        Self { text }
    }

    /// The full text, preamble included.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The caller's part of the text, without the preamble.
    pub fn body(&self) -> &str {
        &self.text[PREAMBLE.len()..]
    }

    /// The cache fingerprint of the full text.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.text)
    }
}

impl fmt::Debug for SourceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceUnit")
            .field("fingerprint", &self.fingerprint())
            .field("body_len", &self.body().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_starts_with_preamble() {
        let unit = SourceUnit::new("int x = 1;");
        assert!(unit.as_str().starts_with(PREAMBLE));
        assert!(unit.as_str().ends_with("int x = 1;"));
        assert_eq!(unit.body(), "int x = 1;");
    }

    #[test]
    fn fingerprint_covers_preamble() {
        let unit = SourceUnit::new("X");
        assert_ne!(unit.fingerprint(), Fingerprint::of("X"));
        assert_eq!(unit.fingerprint(), Fingerprint::of(&format!("{PREAMBLE}X")));
    }

    #[test]
    fn whitespace_changes_identity() {
        let a = SourceUnit::new("A");
        let b = SourceUnit::new("A ");
        assert_ne!(a, b);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn empty_body() {
        let unit = SourceUnit::new("");
        assert_eq!(unit.as_str(), PREAMBLE);
        assert!(unit.body().is_empty());
    }

    #[test]
    fn preamble_exports_test_add() {
        assert!(PREAMBLE.contains("extern \"C\""));
        assert!(PREAMBLE.contains("void test_add(float *a, float *b, float *c, long n)"));
    }
}
