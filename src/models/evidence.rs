use serde::{Deserialize, Serialize};

/// One `(prefix, pump)` segment of an attack input. The attack string is
/// built by concatenating each prefix followed by its pump repeated nPumps
/// times, then the suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PumpPair {
    pub prefix: String,
    pub pump: String,
}

/// Reproducing attack input for a `VULNERABLE` verdict. A vulnerable claim
/// without one is rejected outright; the reconciliation job replays it
/// through the checker before anything reaches the trusted store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvilInput {
    pub pump_pairs: Vec<PumpPair>,
    pub suffix: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_form_uses_camel_case() {
        let evil = EvilInput {
            pump_pairs: vec![PumpPair { prefix: "".into(), pump: "a".into() }],
            suffix: "!".into(),
        };
        let json = serde_json::to_value(&evil).unwrap();
        assert!(json.get("pumpPairs").is_some());
        assert_eq!(json["pumpPairs"][0]["pump"], "a");
        assert_eq!(json["suffix"], "!");
    }

    #[test]
    fn test_roundtrip() {
        let raw = r#"{"pumpPairs":[{"prefix":"x","pump":"ab"}],"suffix":"z"}"#;
        let evil: EvilInput = serde_json::from_str(raw).unwrap();
        assert_eq!(evil.pump_pairs.len(), 1);
        assert_eq!(evil.pump_pairs[0].prefix, "x");
    }
}
