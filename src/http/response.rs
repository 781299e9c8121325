//! Responses produced by the gateway itself.
//!
//! # Design Decisions
//! - Denials are a bare 403: no body, no extra headers, no reason
//! - Upstream failures map to 502

use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Empty `403 Forbidden`.
pub fn forbidden() -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::FORBIDDEN;
    response
}

/// `502 Bad Gateway` for an unreachable or failing upstream.
pub fn bad_gateway() -> Response {
    (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
}
