use serde::{Deserialize, Serialize};

/// Outcome of a ReDoS analysis for a `(pattern, language)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Catastrophic backtracking demonstrated (evidence required).
    Vulnerable,
    /// No detector found super-linear behavior within budget.
    Safe,
    /// Not yet analyzed; never persisted as authoritative.
    Unknown,
    /// Malformed query or claim; never persisted.
    Invalid,
}

impl Verdict {
    /// Only `Vulnerable` and `Safe` may be cached locally or stored long-term.
    pub fn is_cacheable(&self) -> bool {
        matches!(self, Verdict::Vulnerable | Verdict::Safe)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Vulnerable => "VULNERABLE",
            Verdict::Safe => "SAFE",
            Verdict::Unknown => "UNKNOWN",
            Verdict::Invalid => "INVALID",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
