use chrono::Utc;
use serde::{Deserialize, Serialize};
use crate::models::{EvilInput, Verdict};

/// The server response worth keeping: a cacheable verdict plus, for
/// vulnerable patterns, its reproducing evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub result: Verdict,
    #[serde(rename = "evilInput", skip_serializing_if = "Option::is_none")]
    pub evil_input: Option<EvilInput>,
}

/// One cached verdict with its absolute expiry time (unix seconds).
/// Expiration is evaluated at read time; nothing sweeps expired entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub response: CachedResponse,
    #[serde(rename = "validUntil")]
    pub valid_until: i64,
}

impl CacheEntry {
    /// Entry valid for `ttl_secs` from now. A non-positive TTL produces an
    /// already-expired entry, which reads as a miss.
    pub fn with_ttl(result: Verdict, evil_input: Option<EvilInput>, ttl_secs: i64) -> Self {
        Self {
            response: CachedResponse { result, evil_input },
            valid_until: Utc::now().timestamp() + ttl_secs,
        }
    }

    pub fn is_expired(&self, now: i64) -> bool {
        now > self.valid_until
    }

    pub fn is_expired_now(&self) -> bool {
        self.is_expired(Utc::now().timestamp())
    }
}
