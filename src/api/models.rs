use serde::{Deserialize, Serialize};
use crate::models::{EvilInput, TrustedRecord, Verdict};

/// How the caller intends to follow up. `LOOKUP_ONLY` callers will never
/// submit an UPDATE, so an unknown pattern is staged server-side for the
/// reconciliation job instead of waiting on the client to report back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestType {
    Lookup,
    LookupOnly,
}

/// Body of `POST /api/lookup`. `pattern` and `language` are raw strings here
/// so that malformed input comes back as an `INVALID` verdict, not a 422.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRequest {
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub request_type: Option<RequestType>,
}

/// Body of `POST /api/update`: a client-claimed verdict, with evidence
/// mandatory for `VULNERABLE`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub evil_input: Option<EvilInput>,
}

/// `result` is either a bare verdict string (`UNKNOWN`, `INVALID`) or the
/// full trusted record when the key is known.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LookupResult {
    Verdict(Verdict),
    Record(TrustedRecord),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupResponse {
    pub result: LookupResult,
}

impl LookupResponse {
    pub fn verdict(v: Verdict) -> Self {
        Self { result: LookupResult::Verdict(v) }
    }

    pub fn record(record: TrustedRecord) -> Self {
        Self { result: LookupResult::Record(record) }
    }
}

pub const UPDATE_ACK: &str = "Thank you!";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub result: String,
}

impl UpdateResponse {
    pub fn ack() -> Self {
        Self { result: UPDATE_ACK.to_string() }
    }

    pub fn invalid() -> Self {
        Self { result: Verdict::Invalid.as_str().to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;

    #[test]
    fn test_lookup_result_parses_bare_verdict() {
        let resp: LookupResponse = serde_json::from_str(r#"{"result": "UNKNOWN"}"#).unwrap();
        assert!(matches!(resp.result, LookupResult::Verdict(Verdict::Unknown)));
    }

    #[test]
    fn test_lookup_result_parses_full_record() {
        let raw = r#"{"result": {"pattern": "abc", "language": "javascript", "result": "SAFE"}}"#;
        let resp: LookupResponse = serde_json::from_str(raw).unwrap();
        match resp.result {
            LookupResult::Record(rec) => {
                assert_eq!(rec.pattern, "abc");
                assert_eq!(rec.language, Language::Javascript);
                assert_eq!(rec.result, Verdict::Safe);
            }
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_request_tolerates_missing_fields() {
        let req: LookupRequest = serde_json::from_str("{}").unwrap();
        assert!(req.pattern.is_none());
        assert!(req.request_type.is_none());
    }

    #[test]
    fn test_request_type_wire_form() {
        assert_eq!(serde_json::to_string(&RequestType::LookupOnly).unwrap(), "\"LOOKUP_ONLY\"");
    }
}
