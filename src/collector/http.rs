//! Request/response submission surface.
//!
//! `POST /api/v1/submit_trace` with `Authorization: Bearer <token>` and a trace
//! tree as the JSON body. The token is checked from the raw headers before the
//! body is parsed, so unauthenticated requests never reach the archive.

use crate::collector::state::CollectorState;
use crate::domain::error::TracelogError;
use crate::domain::{Acknowledgment, Trace};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Handler for `POST /api/v1/submit_trace`.
///
/// # Errors
///
/// - `401` when the bearer token is missing or wrong
/// - `400` when the body is not a storable trace
/// - `500` when the archive write fails
pub async fn submit_trace(
    State(state): State<CollectorState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Acknowledgment>, TracelogError> {
    let authorization = headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok());
    if let Err(e) = state.token().verify_bearer(authorization) {
        tracing::warn!(error = %e, "rejected trace submission");
        return Err(e);
    }

    let trace: Trace = serde_json::from_slice(&body)
        .map_err(|e| TracelogError::InvalidTrace(format!("malformed trace: {e}")))?;

    let function_name = trace.function_name().to_string();
    let path = state.persist(trace).await?;
    tracing::info!(function_name = %function_name, path = ?path, "trace stored");

    Ok(Json(Acknowledgment::success()))
}

impl TracelogError {
    /// HTTP status reported for this error by the collector.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidTrace(_) | Self::Json(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> String {
        match self {
            Self::Unauthorized(message) | Self::InvalidTrace(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for TracelogError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "trace submission failed");
        }

        let mut response = (status, Json(json!({ "detail": self.detail() }))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_statuses() {
        assert_eq!(
            TracelogError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            TracelogError::InvalidTrace("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            TracelogError::Storage("disk full".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unauthorized_response_challenges_for_bearer() {
        let response = TracelogError::Unauthorized("Invalid authentication token".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");
    }
}
