use std::fmt;
use std::sync::Arc;

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Machine-readable classification of an authorization failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidHeader,
    TokenExpired,
    InvalidClaims,
    Unauthorized,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidHeader => "invalid_header",
            ErrorCode::TokenExpired => "token_expired",
            ErrorCode::InvalidClaims => "invalid_claims",
            ErrorCode::Unauthorized => "unauthorized",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected authorization attempt.
///
/// Carries its own HTTP status so the surrounding web layer can render it as-is
/// instead of folding it into a generic server error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code} ({status}): {description}")]
pub struct AuthError {
    code: ErrorCode,
    description: String,
    status: StatusCode,
}

impl AuthError {
    pub fn new<S: ToString>(code: ErrorCode, description: S, status: StatusCode) -> Self {
        Self {
            code,
            description: description.to_string(),
            status,
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub(crate) fn missing_header() -> Self {
        Self::new(
            ErrorCode::InvalidHeader,
            "Authorization header is expected",
            StatusCode::UNAUTHORIZED,
        )
    }

    pub(crate) fn invalid_scheme() -> Self {
        Self::new(
            ErrorCode::InvalidHeader,
            "Authorization header must start with 'Bearer'",
            StatusCode::UNAUTHORIZED,
        )
    }

    pub(crate) fn missing_token() -> Self {
        Self::new(
            ErrorCode::InvalidHeader,
            "Token not found",
            StatusCode::UNAUTHORIZED,
        )
    }

    pub(crate) fn malformed_header() -> Self {
        Self::new(
            ErrorCode::InvalidHeader,
            "Authorization header must be bearer token",
            StatusCode::UNAUTHORIZED,
        )
    }

    pub(crate) fn missing_kid() -> Self {
        Self::new(
            ErrorCode::InvalidHeader,
            "Authorization malformed",
            StatusCode::UNAUTHORIZED,
        )
    }

    pub(crate) fn unparsable_token() -> Self {
        Self::new(
            ErrorCode::InvalidHeader,
            "Unable to parse authorization token",
            StatusCode::BAD_REQUEST,
        )
    }

    pub(crate) fn unknown_key() -> Self {
        Self::new(
            ErrorCode::InvalidHeader,
            "Unable to find the appropriate key",
            StatusCode::BAD_REQUEST,
        )
    }

    pub(crate) fn key_set_unavailable() -> Self {
        Self::new(
            ErrorCode::InvalidHeader,
            "Unable to fetch signing keys",
            StatusCode::BAD_REQUEST,
        )
    }

    pub(crate) fn token_expired() -> Self {
        Self::new(
            ErrorCode::TokenExpired,
            "Token expired",
            StatusCode::UNAUTHORIZED,
        )
    }

    pub(crate) fn invalid_claims() -> Self {
        Self::new(
            ErrorCode::InvalidClaims,
            "Incorrect claims. Please check the audience and issuer",
            StatusCode::UNAUTHORIZED,
        )
    }

    pub(crate) fn missing_permissions() -> Self {
        Self::new(
            ErrorCode::Unauthorized,
            "Permissions not included in token",
            StatusCode::FORBIDDEN,
        )
    }

    pub(crate) fn permission_denied() -> Self {
        Self::new(
            ErrorCode::Unauthorized,
            "Permission not found",
            StatusCode::FORBIDDEN,
        )
    }

    pub(crate) fn unverified_request() -> Self {
        Self::new(
            ErrorCode::Unauthorized,
            "Request was not authorized",
            StatusCode::FORBIDDEN,
        )
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "error": self.status.as_u16(),
            "message": {
                "code": self.code,
                "description": self.description,
            },
        }));
        (self.status, body).into_response()
    }
}

/// Failure to obtain the identity provider's key set.
#[derive(Error, Debug)]
pub enum JwksError {
    #[error("failed to fetch JWK set: {0}")]
    Request(#[from] reqwest::Error),

    #[error("received error response when fetching JWK set: {status}")]
    Status { status: reqwest::StatusCode },

    #[error("failed to parse JWK set: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Shared(Arc<JwksError>),
}

impl From<JwksError> for AuthError {
    fn from(_: JwksError) -> Self {
        AuthError::key_set_unavailable()
    }
}

/// Invalid authorization settings detected at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("identity provider domain is not configured")]
    MissingDomain,

    #[error("token audience is not configured")]
    MissingAudience,

    #[error("at least one signing algorithm must be allowed")]
    NoAlgorithms,

    #[error("invalid JWKS URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to build JWKS client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
