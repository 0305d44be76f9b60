use http::HeaderMap;
use http::header::AUTHORIZATION;

use crate::error::AuthError;

const BEARER_SCHEME: &str = "bearer";

/// Pulls the raw bearer credential out of the `Authorization` header.
///
/// The header must consist of exactly two whitespace-separated parts, the first
/// of which is `Bearer` in any letter case. The credential itself is returned
/// verbatim and is not inspected.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(AuthError::missing_header)?
        .to_str()
        .map_err(|_| AuthError::malformed_header())?;

    let parts: Vec<&str> = value.split_whitespace().collect();
    match parts.as_slice() {
        [] => Err(AuthError::missing_header()),
        [scheme, ..] if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) => {
            Err(AuthError::invalid_scheme())
        }
        [_] => Err(AuthError::missing_token()),
        [_, token] => Ok(*token),
        _ => Err(AuthError::malformed_header()),
    }
}
