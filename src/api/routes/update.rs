use axum::{extract::State, Json};
use tracing::{debug, warn};

use crate::api::models::{UpdateRequest, UpdateResponse};
use crate::api::AppState;
use crate::models::{Language, UntrustedClaim, Verdict};

/// `POST /api/update`. Validates the claim's shape, acknowledges the caller,
/// and stages the claim for the reconciliation job in the background. The
/// caller is never blocked on (or told about) backend persistence; the only
/// hard rejection is a shape violation, notably a `VULNERABLE` claim with no
/// proof.
pub async fn update(
    State(state): State<AppState>,
    Json(req): Json<UpdateRequest>,
) -> Json<UpdateResponse> {
    let Some(claim) = validate(&req) else {
        return Json(UpdateResponse::invalid());
    };

    debug!(key = %claim.key(), result = %claim.result, "Staging client claim");
    let db = state.db.clone();
    tokio::task::spawn_blocking(move || {
        if let Err(e) = db.stage_claim(&claim) {
            warn!(key = %claim.key(), error = %e, "Failed to stage claim");
        }
    });

    Json(UpdateResponse::ack())
}

fn validate(req: &UpdateRequest) -> Option<UntrustedClaim> {
    let pattern = req.pattern.as_deref().filter(|p| !p.is_empty())?;
    let language = Language::parse(req.language.as_deref()?)?;
    let result: Verdict = serde_json::from_str(&format!("\"{}\"", req.result.as_deref()?)).ok()?;

    // Only actual analysis outcomes are reportable.
    if result == Verdict::Invalid {
        return None;
    }
    // Proof obligation: a dangerous claim without reproducing evidence is
    // rejected outright.
    if result == Verdict::Vulnerable && req.evil_input.is_none() {
        return None;
    }

    Some(UntrustedClaim::new(
        pattern,
        language,
        result,
        req.evil_input.clone(),
    ))
}
