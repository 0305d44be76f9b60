use std::time::Duration;

use jsonwebtoken::Algorithm;
use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

/// Well-known path under the identity provider's domain serving its public keys.
pub const JWKS_PATH: &str = ".well-known/jwks.json";

/// Settings for verifying bearer tokens issued by an identity provider.
///
/// Built once at startup and shared read-only by every verification.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AuthConfig {
    /// Identity provider domain, e.g. `tenant.auth0.com`
    #[serde(default)]
    pub domain: String,

    /// Expected `aud` claim
    #[serde(default)]
    pub audience: String,

    /// Signing algorithms accepted in token headers (default: RS256)
    #[serde(default = "default_algorithms")]
    pub algorithms: Vec<Algorithm>,

    /// Overrides the expected `iss` claim (default: `https://<domain>/`)
    #[serde(default)]
    pub issuer: Option<String>,

    /// Overrides the key set location (default: `https://<domain>/.well-known/jwks.json`)
    #[serde(default)]
    pub jwks_uri: Option<String>,

    /// Timeout for a key set request in seconds (default: 5)
    #[serde(default = "default_jwks_timeout")]
    pub jwks_timeout: u64,

    /// How long a fetched key set is reused, in seconds. 0 fetches on every verification.
    #[serde(default)]
    pub jwks_cache_ttl: u64,

    /// Clock skew tolerated on `exp`, in seconds (default: 0)
    #[serde(default)]
    pub leeway: u64,
}

fn default_algorithms() -> Vec<Algorithm> {
    vec![Algorithm::RS256]
}

fn default_jwks_timeout() -> u64 {
    5
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            audience: String::new(),
            algorithms: default_algorithms(),
            issuer: None,
            jwks_uri: None,
            jwks_timeout: default_jwks_timeout(),
            jwks_cache_ttl: 0,
            leeway: 0,
        }
    }
}

impl AuthConfig {
    pub fn new(domain: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            audience: audience.into(),
            ..Self::default()
        }
    }

    pub fn with_algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.algorithms = algorithms;
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_jwks_uri(mut self, jwks_uri: impl Into<String>) -> Self {
        self.jwks_uri = Some(jwks_uri.into());
        self
    }

    pub fn with_jwks_cache_ttl(mut self, ttl: Duration) -> Self {
        self.jwks_cache_ttl = ttl.as_secs();
        self
    }

    /// The `iss` value every accepted token must carry.
    pub fn issuer(&self) -> String {
        match &self.issuer {
            Some(issuer) => issuer.clone(),
            None => format!("https://{}/", self.domain),
        }
    }

    /// Location of the identity provider's published key set.
    pub fn jwks_url(&self) -> Result<Url, ConfigError> {
        match &self.jwks_uri {
            Some(uri) => Ok(Url::parse(uri)?),
            None => Ok(Url::parse(&format!("https://{}/", self.domain))?.join(JWKS_PATH)?),
        }
    }

    pub fn jwks_timeout(&self) -> Duration {
        Duration::from_secs(self.jwks_timeout)
    }

    pub fn jwks_cache_ttl(&self) -> Option<Duration> {
        (self.jwks_cache_ttl > 0).then(|| Duration::from_secs(self.jwks_cache_ttl))
    }

    /// Rejects settings that could never verify a token.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.domain.trim().is_empty() {
            return Err(ConfigError::MissingDomain);
        }
        if self.audience.trim().is_empty() {
            return Err(ConfigError::MissingAudience);
        }
        if self.algorithms.is_empty() {
            return Err(ConfigError::NoAlgorithms);
        }
        self.jwks_url()?;
        Ok(())
    }
}
