use serde::{Deserialize, Serialize};

/// Regex engine dialect a pattern targets. This tags the engine the verdict
/// applies to, not the language this tool is written in: `(a+)+$` can be
/// vulnerable under backtracking engines and safe under RE2-style ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[serde(alias = "js", alias = "node")]
    Javascript,
    Python,
    Java,
    Php,
    Ruby,
    Go,
    Perl,
    Rust,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Javascript => "javascript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Php => "php",
            Language::Ruby => "ruby",
            Language::Go => "go",
            Language::Perl => "perl",
            Language::Rust => "rust",
        }
    }

    /// Lenient parse used at CLI and wire boundaries.
    pub fn parse(s: &str) -> Option<Language> {
        match s.trim().to_ascii_lowercase().as_str() {
            "javascript" | "js" | "node" => Some(Language::Javascript),
            "python" => Some(Language::Python),
            "java" => Some(Language::Java),
            "php" => Some(Language::Php),
            "ruby" => Some(Language::Ruby),
            "go" => Some(Language::Go),
            "perl" => Some(Language::Perl),
            "rust" => Some(Language::Rust),
            _ => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_aliases_deserialize_to_javascript() {
        for wire in ["\"js\"", "\"javascript\"", "\"node\""] {
            let parsed: Language = serde_json::from_str(wire).unwrap();
            assert_eq!(parsed, Language::Javascript);
        }
    }

    #[test]
    fn test_serializes_canonical_lowercase() {
        assert_eq!(serde_json::to_string(&Language::Javascript).unwrap(), "\"javascript\"");
        assert_eq!(serde_json::to_string(&Language::Perl).unwrap(), "\"perl\"");
    }

    #[test]
    fn test_unknown_language_rejected() {
        assert!(serde_json::from_str::<Language>("\"cobol\"").is_err());
        assert!(Language::parse("cobol").is_none());
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Language::parse("JS"), Some(Language::Javascript));
        assert_eq!(Language::parse(" Python "), Some(Language::Python));
    }
}
