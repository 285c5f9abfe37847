//! Anti-forgery token middleware.
//!
//! Import requests carry the token inside the JSON body. The middleware
//! reads the body, checks the `token` field against the stored token, and
//! restores the body for the handler. Any failure — unreadable body, bad
//! JSON, missing field, mismatch — terminates the request immediately with
//! the fixed rejection string. An empty stored token disables checking.

use abim_common::api::token::{validate_token, TOKEN_REJECT_MESSAGE};
use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::warn;

use crate::AppState;

/// Maximum request body size the middleware will buffer.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Token validation middleware for the import routes.
pub async fn token_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, TokenRejection> {
    if state.import_token.is_empty() {
        // Token checking disabled
        return Ok(next.run(request).await);
    }

    let (parts, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| TokenRejection)?;

    let json: Value = serde_json::from_slice(&body_bytes).map_err(|_| TokenRejection)?;
    let provided = json.get("token").and_then(|v| v.as_str()).unwrap_or("");

    if validate_token(provided, &state.import_token).is_err() {
        warn!("Import request rejected: token mismatch");
        return Err(TokenRejection);
    }

    // Restore the body for the downstream handler
    let request = Request::from_parts(parts, Body::from(body_bytes));
    Ok(next.run(request).await)
}

/// Terminal rejection carrying the fixed error string.
#[derive(Debug)]
pub struct TokenRejection;

impl IntoResponse for TokenRejection {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, TOKEN_REJECT_MESSAGE).into_response()
    }
}
