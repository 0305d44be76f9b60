use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;

use crate::config::AuthConfig;
use crate::error::{ConfigError, JwksError};

pub mod cached;
pub mod fixed;
pub mod remote;

/// Source of the identity provider's public signing keys.
///
/// Implementations must be cheap to clone and safe to share between
/// concurrently served requests.
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Returns the current key set
    async fn key_set(&self) -> Result<Arc<JwkSet>, JwksError>;
}

/// Key set provider chosen at startup.
#[derive(Clone)]
pub enum Jwks {
    /// Fetches the key set on every verification
    Remote(remote::RemoteJwks),
    /// Reuses a fetched key set until its time-to-live elapses
    Cached(cached::CachedJwks),
    /// A key set fixed at construction time
    Fixed(fixed::FixedJwks),
}

#[async_trait]
impl KeySource for Jwks {
    async fn key_set(&self) -> Result<Arc<JwkSet>, JwksError> {
        match self {
            Self::Remote(jwks) => jwks.key_set().await,
            Self::Cached(jwks) => jwks.key_set().await,
            Self::Fixed(jwks) => jwks.key_set().await,
        }
    }
}

impl From<JwkSet> for Jwks {
    fn from(key_set: JwkSet) -> Self {
        Self::Fixed(fixed::FixedJwks::new(key_set))
    }
}

/// Builds the key source described by `config`.
///
/// A non-zero `jwks_cache_ttl` puts a cache in front of the remote endpoint,
/// otherwise every verification triggers a fresh fetch.
pub fn create_key_source(config: &AuthConfig) -> Result<Jwks, ConfigError> {
    let remote = remote::RemoteJwks::new(config.jwks_url()?, config.jwks_timeout())?;
    match config.jwks_cache_ttl() {
        Some(ttl) => Ok(Jwks::Cached(cached::CachedJwks::new(remote, ttl))),
        None => Ok(Jwks::Remote(remote)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_create_key_source() {
        let config = AuthConfig::new("coffee.auth0.com", "drinks");
        assert!(matches!(
            create_key_source(&config).unwrap(),
            Jwks::Remote(_)
        ));

        let config = config.with_jwks_cache_ttl(Duration::from_secs(60));
        assert!(matches!(
            create_key_source(&config).unwrap(),
            Jwks::Cached(_)
        ));
    }

    #[test]
    fn test_create_key_source_rejects_bad_url() {
        let config = AuthConfig::new("coffee.auth0.com", "drinks").with_jwks_uri("::");
        assert!(matches!(
            create_key_source(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_fixed_key_set() {
        let jwks = Jwks::from(JwkSet { keys: vec![] });
        let key_set = jwks.key_set().await.unwrap();
        assert!(key_set.keys.is_empty());
    }
}
