//! Per-entry metadata stored next to each cached binary.

use std::time::{SystemTime, UNIX_EPOCH};

use kiln_common::{Fingerprint, SourceUnit};
use serde::{Deserialize, Serialize};

/// Contents of `entry.json` inside an entry directory.
///
/// The full source text is kept so a lookup can confirm an exact match
/// rather than trusting the fingerprint alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Fingerprint of `source`; also the entry directory name.
    pub fingerprint: Fingerprint,
    /// The exact text that was compiled, preamble included.
    pub source: String,
    /// File name of the cached binary within the entry directory.
    pub artifact: String,
    /// kiln version that produced the entry.
    pub kiln_version: String,
    /// Creation time in seconds since the Unix epoch.
    pub created_at: u64,
}

impl CacheEntry {
    /// Creates metadata for `source` compiled to a binary named `artifact`.
    pub fn new(source: &SourceUnit, artifact: &str) -> Self {
        Self {
            fingerprint: source.fingerprint(),
            source: source.as_str().to_string(),
            artifact: artifact.to_string(),
            kiln_version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    /// Returns `true` if this entry was built from exactly `source`.
    pub fn matches(&self, source: &SourceUnit) -> bool {
        self.fingerprint == source.fingerprint() && self.source == source.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_records_source() {
        let unit = SourceUnit::new("int x = 1;");
        let entry = CacheEntry::new(&unit, "libkiln_native.so");
        assert_eq!(entry.fingerprint, unit.fingerprint());
        assert_eq!(entry.source, unit.as_str());
        assert_eq!(entry.artifact, "libkiln_native.so");
        assert!(entry.created_at > 0);
    }

    #[test]
    fn matches_exact_source_only() {
        let entry = CacheEntry::new(&SourceUnit::new("A"), "lib.so");
        assert!(entry.matches(&SourceUnit::new("A")));
        assert!(!entry.matches(&SourceUnit::new("A ")));
    }

    #[test]
    fn tampered_source_does_not_match() {
        let unit = SourceUnit::new("A");
        let mut entry = CacheEntry::new(&unit, "lib.so");
        entry.source.push('B');
        assert!(!entry.matches(&unit));
    }

    #[test]
    fn json_fields() {
        let entry = CacheEntry::new(&SourceUnit::new("A"), "lib.so");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["artifact"], "lib.so");
        assert_eq!(json["fingerprint"], entry.fingerprint.to_string());
        let back: CacheEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }
}
