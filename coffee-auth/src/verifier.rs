use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, PublicKeyUse};
use jsonwebtoken::{DecodingKey, Validation, decode, decode_header};
use log::debug;
use serde_json::Value;

use crate::claims::Claims;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::jwks::{Jwks, KeySource};

/// Validates bearer tokens against the identity provider's published keys.
#[derive(Clone)]
pub struct TokenVerifier {
    config: Arc<AuthConfig>,
    keys: Jwks,
}

impl TokenVerifier {
    pub fn new(config: Arc<AuthConfig>, keys: Jwks) -> Self {
        Self { config, keys }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Decodes `token` into its claims once signature, algorithm, audience,
    /// issuer and expiry have all been checked.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        // Only the header is read here; nothing in it is trusted beyond the key id.
        let header = decode_header(token).map_err(|err| {
            debug!("Rejecting token with undecodable header: {err}");
            AuthError::unparsable_token()
        })?;
        let kid = header.kid.ok_or_else(AuthError::missing_kid)?;

        let key_set = self.keys.key_set().await.map_err(|err| {
            log::error!("Unable to obtain JWK set: {err}");
            AuthError::from(err)
        })?;

        // First match wins if the provider publishes duplicate ids.
        let jwk = key_set.find(&kid).ok_or_else(|| {
            debug!("No key with kid {kid} in JWK set");
            AuthError::unknown_key()
        })?;

        let decoding_key = decoding_key(jwk)?;
        // Registered claims are validated on the raw payload so a missing
        // one is reported as such rather than as a deserialization failure.
        let data = decode::<Value>(token, &decoding_key, &self.validation()).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::token_expired(),
                ErrorKind::InvalidAudience
                | ErrorKind::InvalidIssuer
                | ErrorKind::MissingRequiredClaim(_) => AuthError::invalid_claims(),
                _ => {
                    debug!("Token verification failed: {err}");
                    AuthError::unparsable_token()
                }
            }
        })?;

        serde_json::from_value::<Claims>(data.claims).map_err(|err| {
            debug!("Token claims are malformed: {err}");
            AuthError::unparsable_token()
        })
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::default();
        validation.algorithms = self.config.algorithms.clone();
        validation.leeway = self.config.leeway;
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[self.config.issuer()]);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);
        validation
    }
}

/// Rebuilds the RSA public key described by a signing JWK.
fn decoding_key(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
    if let Some(key_use) = &jwk.common.public_key_use {
        if *key_use != PublicKeyUse::Signature {
            debug!("Key {:?} is not a signing key", jwk.common.key_id);
            return Err(AuthError::unparsable_token());
        }
    }

    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => DecodingKey::from_rsa_components(&rsa.n, &rsa.e)
            .map_err(|_| AuthError::unparsable_token()),
        _ => Err(AuthError::unparsable_token()),
    }
}
