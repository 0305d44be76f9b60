use std::future::Future;
use std::sync::Arc;

use http::HeaderMap;
use log::warn;

use crate::bearer::bearer_token;
use crate::claims::Claims;
use crate::config::AuthConfig;
use crate::error::{AuthError, ConfigError};
use crate::jwks::{Jwks, create_key_source};
use crate::layer::RequireAuthLayer;
use crate::permissions::check_permissions;
use crate::verifier::TokenVerifier;

/// Entry point of the authorization core.
///
/// Runs header extraction, token verification and the permission check in
/// that order. Cloning is cheap; every clone shares the same settings and key
/// source.
#[derive(Clone)]
pub struct Authorizer {
    verifier: TokenVerifier,
}

impl Authorizer {
    /// Validates `config` and connects to the key set it describes.
    pub fn new(config: AuthConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let keys = create_key_source(&config)?;
        Ok(Self::with_key_source(config, keys))
    }

    /// Uses `keys` instead of the endpoint named in `config`.
    pub fn with_key_source(config: AuthConfig, keys: impl Into<Jwks>) -> Self {
        Self {
            verifier: TokenVerifier::new(Arc::new(config), keys.into()),
        }
    }

    pub fn config(&self) -> &AuthConfig {
        self.verifier.config()
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Authorizes a request carrying `headers` for `permission`.
    ///
    /// An empty `permission` only requires a valid token.
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        permission: &str,
    ) -> Result<Claims, AuthError> {
        let result = self.try_authorize(headers, permission).await;
        if let Err(err) = &result {
            warn!(
                "Rejected request requiring '{}': {} ({}) {}",
                permission,
                err.code(),
                err.status(),
                err.description()
            );
        }
        result
    }

    async fn try_authorize(
        &self,
        headers: &HeaderMap,
        permission: &str,
    ) -> Result<Claims, AuthError> {
        let token = bearer_token(headers)?;
        let claims = self.verifier.verify(token).await?;
        check_permissions(permission, &claims)?;
        Ok(claims)
    }

    /// A guard requiring `permission`.
    pub fn guard(&self, permission: impl Into<String>) -> Guard {
        Guard {
            authorizer: self.clone(),
            permission: permission.into(),
        }
    }
}

/// Shorthand for [`Authorizer::guard`].
pub fn requires_auth(authorizer: &Authorizer, permission: impl Into<String>) -> Guard {
    authorizer.guard(permission)
}

/// Protects handlers with a single required permission.
#[derive(Clone)]
pub struct Guard {
    authorizer: Authorizer,
    permission: String,
}

impl Guard {
    pub fn permission(&self) -> &str {
        &self.permission
    }

    /// Authorizes the request and returns its claims.
    pub async fn check(&self, headers: &HeaderMap) -> Result<Claims, AuthError> {
        self.authorizer.authorize(headers, &self.permission).await
    }

    /// Runs `handler` with the verified claims followed by `args`.
    ///
    /// The handler is not invoked at all when authorization fails; the error is
    /// returned unchanged.
    pub async fn call<H, Fut, A, R>(
        &self,
        headers: &HeaderMap,
        handler: H,
        args: A,
    ) -> Result<R, AuthError>
    where
        H: FnOnce(Claims, A) -> Fut,
        Fut: Future<Output = R>,
    {
        let claims = self.check(headers).await?;
        Ok(handler(claims, args).await)
    }

    /// Binds `handler` to this guard for repeated use.
    pub fn wrap<H>(self, handler: H) -> Protected<H> {
        Protected {
            guard: self,
            handler,
        }
    }

    /// Tower layer enforcing this guard on axum routes.
    pub fn layer(&self) -> RequireAuthLayer {
        RequireAuthLayer::new(self.clone())
    }
}

/// A handler that only runs for authorized requests.
#[derive(Clone)]
pub struct Protected<H> {
    guard: Guard,
    handler: H,
}

impl<H> Protected<H> {
    pub fn guard(&self) -> &Guard {
        &self.guard
    }

    pub async fn call<A, Fut, R>(&self, headers: &HeaderMap, args: A) -> Result<R, AuthError>
    where
        H: Fn(Claims, A) -> Fut,
        Fut: Future<Output = R>,
    {
        let claims = self.guard.check(headers).await?;
        Ok((self.handler)(claims, args).await)
    }
}
