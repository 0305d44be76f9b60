//! # coffee-auth
//!
//! Bearer token authorization backed by an identity provider's published JSON
//! Web Key Set.
//!
//! ## Components
//!
//! - **Bearer:** Extracts the credential from the `Authorization` header.
//! - **JWKS:** Fetches the provider's public keys, optionally caching them.
//! - **Verifier:** Checks signature, algorithm, audience, issuer and expiry.
//! - **Permissions:** Requires a scope in the token's `permissions` claim.
//! - **Gate:** Chains the above in front of a handler, either directly or as
//!   an axum layer.
//!
//! ```rust,no_run
//! use axum::{Router, routing::get};
//! use coffee_auth::{AuthConfig, Authorizer, Claims};
//!
//! # fn app() -> Result<Router, coffee_auth::ConfigError> {
//! let authorizer = Authorizer::new(AuthConfig::new("tenant.auth0.com", "drinks"))?;
//! let router = Router::new().route(
//!     "/drinks-detail",
//!     get(|claims: Claims| async move { format!("hello {}", claims.subject()) })
//!         .route_layer(authorizer.guard("get:drinks-detail").layer()),
//! );
//! # Ok(router)
//! # }
//! ```

pub mod bearer;
pub mod claims;
pub mod config;
pub mod error;
pub mod gate;
pub mod jwks;
pub mod layer;
pub mod permissions;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod verifier;

pub use bearer::bearer_token;
pub use claims::{Audience, Claims};
pub use config::AuthConfig;
pub use error::{AuthError, ConfigError, ErrorCode, JwksError};
pub use gate::{Authorizer, Guard, Protected, requires_auth};
pub use jwks::{Jwks, KeySource};
pub use layer::RequireAuthLayer;
pub use permissions::check_permissions;
pub use verifier::TokenVerifier;

pub use jsonwebtoken::Algorithm;
