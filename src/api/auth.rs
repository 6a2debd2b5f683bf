// =============================================================================
// Bearer Token Authentication for the Manual Refresh Endpoint
// =============================================================================
//
// Validates the `Authorization: Bearer <token>` header against the configured
// refresh token. The scheme is matched case-insensitively; the token itself
// is compared in constant time to prevent timing side-channels. An empty
// configured token rejects every caller.
// =============================================================================

use axum::http::HeaderMap;

/// Compare two byte slices in constant time. The comparison always examines
/// every byte of both slices even when a mismatch is found early.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// `true` when the request carries a valid bearer token for `expected`.
pub fn authorize_refresh(headers: &HeaderMap, expected: &str) -> bool {
    // Unset token means the endpoint is disabled for everyone.
    if expected.is_empty() {
        return false;
    }

    let Some(value) = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };

    let Some((scheme, token)) = value.split_once(' ') else {
        return false;
    };
    if !scheme.eq_ignore_ascii_case("bearer") {
        return false;
    }

    constant_time_eq(token.trim().as_bytes(), expected.as_bytes())
}
