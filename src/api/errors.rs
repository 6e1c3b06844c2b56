use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use crate::errors::CacheError;

impl IntoResponse for CacheError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            CacheError::InvalidQuery(_) | CacheError::UnverifiedClaimRejected(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            CacheError::Config(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        (status, Json(json!({"error": message}))).into_response()
    }
}
