use axum::{extract::State, Json};
use tracing::{debug, warn};

use crate::api::models::{LookupRequest, LookupResponse, RequestType};
use crate::api::AppState;
use crate::models::{CacheKey, Language, UntrustedClaim, Verdict};

/// `POST /api/lookup`. Answers from the trusted store or `UNKNOWN`. Every
/// failure mode short of a malformed query degrades to `UNKNOWN`:
/// availability beats precision, resolution is a background concern.
pub async fn lookup(
    State(state): State<AppState>,
    Json(req): Json<LookupRequest>,
) -> Json<LookupResponse> {
    let Some((pattern, language)) = validate(&req) else {
        return Json(LookupResponse::verdict(Verdict::Invalid));
    };

    let key = CacheKey::new(pattern.clone(), language);
    match state.db.get_trusted(&key) {
        Ok(Some(record)) => {
            debug!(key = %key, result = %record.result, "Trusted store hit");
            Json(LookupResponse::record(record))
        }
        Ok(None) => {
            // Lookup-only callers never report back; stage the query so the
            // reconciliation job resolves it for the next asker. Fire and
            // forget: the caller is not kept waiting on the write.
            if req.request_type == Some(RequestType::LookupOnly) {
                let db = state.db.clone();
                let claim = UntrustedClaim::new(pattern, language, Verdict::Unknown, None);
                tokio::task::spawn_blocking(move || {
                    if let Err(e) = db.stage_claim(&claim) {
                        warn!(key = %claim.key(), error = %e, "Failed to stage lookup-only query");
                    }
                });
            }
            Json(LookupResponse::verdict(Verdict::Unknown))
        }
        Err(e) => {
            warn!(key = %key, error = %e, "Trusted store unavailable, degrading to UNKNOWN");
            Json(LookupResponse::verdict(Verdict::Unknown))
        }
    }
}

fn validate(req: &LookupRequest) -> Option<(String, Language)> {
    let pattern = req.pattern.as_deref().filter(|p| !p.is_empty())?;
    let language = Language::parse(req.language.as_deref()?)?;
    req.request_type.as_ref()?;
    Some((pattern.to_string(), language))
}
