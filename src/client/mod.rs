use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

use crate::api::models::{
    LookupRequest, LookupResponse, LookupResult, RequestType, UpdateRequest, UpdateResponse,
};
use crate::config::types::{ClientConfig, ResolvedClientConfig};
use crate::errors::CacheError;
use crate::models::{CacheKey, EvilInput, Language, Verdict};
use crate::store::{self, CacheEntry, Store};

/// Client side of the verdict cache: local tiered store in front of the
/// remote lookup service. One instance per configuration; no hidden global
/// state.
pub struct CacheClient {
    config: ResolvedClientConfig,
    store: Box<dyn Store>,
    http: reqwest::Client,
    network_attempts: AtomicU64,
}

impl CacheClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_resolved(config.resolved())
    }

    pub fn with_resolved(config: ResolvedClientConfig) -> Self {
        let store = store::for_config(&config);
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            config,
            store,
            http,
            network_attempts: AtomicU64::new(0),
        }
    }

    /// Remote round trips performed so far. Cache hits make none.
    pub fn network_attempts(&self) -> u64 {
        self.network_attempts.load(Ordering::Relaxed)
    }

    /// Query the cache for a verdict. Resolution order: local store, then the
    /// remote lookup service. Cacheable responses are written back to the
    /// local store best-effort; `UNKNOWN`/`INVALID` and transport failures
    /// are never cached. This is the single execution path; `check_blocking`
    /// drives the same future for synchronous callers.
    pub async fn check(&self, pattern: &str, language: Language) -> Verdict {
        if pattern.is_empty() {
            return Verdict::Invalid;
        }

        let key = CacheKey::new(pattern, language);
        if let Some(entry) = self.store.get(&key) {
            debug!(key = %key, result = %entry.response.result, "Local cache hit");
            return entry.response.result;
        }

        let (verdict, evil_input) = match self.remote_lookup(pattern, language).await {
            Ok(found) => found,
            Err(e) => {
                debug!(key = %key, error = %e, "Remote lookup failed");
                return Verdict::Invalid;
            }
        };

        if verdict.is_cacheable() {
            let entry = CacheEntry::with_ttl(verdict, evil_input, self.config.expiration_secs);
            if let Err(e) = self.store.put(&key, entry) {
                // Caching is an optimization; the verdict still stands.
                warn!(key = %key, error = %e, "Cache write failed");
            }
        }
        verdict
    }

    /// Synchronous form of [`check`](Self::check). Runs the async core on a
    /// throwaway current-thread runtime; do not call from async context.
    pub fn check_blocking(&self, pattern: &str, language: Language) -> Verdict {
        match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(rt) => rt.block_on(self.check(pattern, language)),
            Err(e) => {
                warn!(error = %e, "Failed to build runtime for blocking check");
                Verdict::Invalid
            }
        }
    }

    async fn remote_lookup(
        &self,
        pattern: &str,
        language: Language,
    ) -> Result<(Verdict, Option<EvilInput>), CacheError> {
        let request = LookupRequest {
            pattern: Some(pattern.to_string()),
            language: Some(language.as_str().to_string()),
            request_type: Some(RequestType::LookupOnly),
        };

        self.network_attempts.fetch_add(1, Ordering::Relaxed);
        let response = self
            .http
            .post(self.config.lookup_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| CacheError::Transport(e.to_string()))?;

        let body: LookupResponse = response
            .json()
            .await
            .map_err(|e| CacheError::Transport(format!("Invalid response: {}", e)))?;

        Ok(match body.result {
            LookupResult::Verdict(v) => (v, None),
            LookupResult::Record(rec) => (rec.result, rec.evil_input),
        })
    }

    /// Submit a locally-computed verdict to the server's quarantine store.
    /// The proof obligation is enforced before any I/O: a `VULNERABLE` claim
    /// without evidence never leaves the process. Returns the server's
    /// acknowledgement string.
    pub async fn submit(
        &self,
        pattern: &str,
        language: Language,
        result: Verdict,
        evil_input: Option<EvilInput>,
    ) -> Result<String, CacheError> {
        if pattern.is_empty() {
            return Err(CacheError::InvalidQuery("empty pattern".into()));
        }
        if !result.is_cacheable() {
            return Err(CacheError::InvalidQuery(format!(
                "result {} is not reportable",
                result
            )));
        }
        if result == Verdict::Vulnerable && evil_input.is_none() {
            return Err(CacheError::UnverifiedClaimRejected(
                "VULNERABLE claim requires evilInput".into(),
            ));
        }

        let request = UpdateRequest {
            pattern: Some(pattern.to_string()),
            language: Some(language.as_str().to_string()),
            result: Some(result.as_str().to_string()),
            evil_input,
        };

        self.network_attempts.fetch_add(1, Ordering::Relaxed);
        let response = self
            .http
            .post(self.config.update_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| CacheError::Transport(e.to_string()))?;

        let body: UpdateResponse = response
            .json()
            .await
            .map_err(|e| CacheError::Transport(format!("Invalid response: {}", e)))?;
        Ok(body.result)
    }

    /// Synchronous form of [`submit`](Self::submit).
    pub fn submit_blocking(
        &self,
        pattern: &str,
        language: Language,
        result: Verdict,
        evil_input: Option<EvilInput>,
    ) -> Result<String, CacheError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| CacheError::Internal(e.to_string()))?;
        rt.block_on(self.submit(pattern, language, result, evil_input))
    }
}
