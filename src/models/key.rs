use sha2::{Digest, Sha256};
use super::Language;

/// Bumped whenever the on-disk cache entry schema changes; stale files are
/// then simply never matched, no migration required.
pub const CACHE_VERSION: u32 = 1;

/// Composite identity of a cached verdict: the pattern source string plus the
/// engine dialect it targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub pattern: String,
    pub language: Language,
}

impl CacheKey {
    pub fn new(pattern: impl Into<String>, language: Language) -> Self {
        Self { pattern: pattern.into(), language }
    }

    /// Canonical string identity, used verbatim as the document key on the
    /// server and as the hashed basis of the persistent filename.
    pub fn canonical(&self) -> String {
        format!("/{}/:{}", self.pattern, self.language.as_str())
    }

    /// Filename for the persistent store: a fixed-width digest of the
    /// canonical key plus a format version tag. Truncating to 128 bits keeps
    /// names short; collisions are accepted given the small per-process
    /// key space (hundreds of patterns).
    pub fn file_name(&self) -> String {
        let digest = Sha256::digest(self.canonical().as_bytes());
        let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        format!("{}-v{}.json", &hex[..32], CACHE_VERSION)
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical())
    }
}
