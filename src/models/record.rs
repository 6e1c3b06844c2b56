use serde::{Deserialize, Serialize};
use super::{CacheKey, EvilInput, Language, Verdict};

/// Authoritative row in the trusted collection. Only the reconciliation job
/// writes these, and only after the checker independently confirmed the
/// verdict. Invariant: `result == Vulnerable` implies `evil_input` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedRecord {
    pub pattern: String,
    pub language: Language,
    pub result: Verdict,
    #[serde(rename = "evilInput", skip_serializing_if = "Option::is_none")]
    pub evil_input: Option<EvilInput>,
}

impl TrustedRecord {
    pub fn key(&self) -> CacheKey {
        CacheKey::new(self.pattern.clone(), self.language)
    }
}

/// Quarantined client claim awaiting adjudication. Created by the lookup
/// service, consumed (and always deleted) by the reconciliation job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UntrustedClaim {
    pub id: String,
    pub pattern: String,
    pub language: Language,
    pub result: Verdict,
    #[serde(rename = "evilInput", skip_serializing_if = "Option::is_none")]
    pub evil_input: Option<EvilInput>,
}

impl UntrustedClaim {
    pub fn new(
        pattern: impl Into<String>,
        language: Language,
        result: Verdict,
        evil_input: Option<EvilInput>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            pattern: pattern.into(),
            language,
            result,
            evil_input,
        }
    }

    pub fn key(&self) -> CacheKey {
        CacheKey::new(self.pattern.clone(), self.language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trusted_record_omits_absent_evidence() {
        let rec = TrustedRecord {
            pattern: "abc".into(),
            language: Language::Javascript,
            result: Verdict::Safe,
            evil_input: None,
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert!(json.get("evilInput").is_none());
        assert_eq!(json["result"], "SAFE");
    }

    #[test]
    fn test_claims_get_distinct_ids() {
        let a = UntrustedClaim::new("x", Language::Javascript, Verdict::Unknown, None);
        let b = UntrustedClaim::new("x", Language::Javascript, Verdict::Unknown, None);
        assert_ne!(a.id, b.id);
        assert_eq!(a.key(), b.key());
    }
}
