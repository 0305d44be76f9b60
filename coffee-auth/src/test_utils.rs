//! Signing keys, token builders and a mock identity provider for tests.

use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::jwk::{
    AlgorithmParameters, CommonParameters, Jwk, JwkSet, KeyAlgorithm, PublicKeyUse,
    RSAKeyParameters, RSAKeyType,
};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use openssl::rsa::Rsa;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::{AuthConfig, JWKS_PATH};

static PRIMARY: LazyLock<TestKeys> = LazyLock::new(|| TestKeys::generate("primary"));
static SECONDARY: LazyLock<TestKeys> = LazyLock::new(|| TestKeys::generate("secondary"));

/// An RSA key pair published under a key id.
pub struct TestKeys {
    kid: String,
    private_der: Vec<u8>,
    jwk: Jwk,
}

impl TestKeys {
    /// Generates a fresh 2048 bit key pair.
    pub fn generate(kid: &str) -> Self {
        let rsa = Rsa::generate(2048).expect("Failed to generate RSA key");
        let jwk = Jwk {
            common: CommonParameters {
                public_key_use: Some(PublicKeyUse::Signature),
                key_algorithm: Some(KeyAlgorithm::RS256),
                key_id: Some(kid.to_string()),
                ..CommonParameters::default()
            },
            algorithm: AlgorithmParameters::RSA(RSAKeyParameters {
                key_type: RSAKeyType::RSA,
                n: URL_SAFE_NO_PAD.encode(rsa.n().to_vec()),
                e: URL_SAFE_NO_PAD.encode(rsa.e().to_vec()),
            }),
        };
        let private_der = rsa
            .private_key_to_der()
            .expect("Failed to export RSA key");

        Self {
            kid: kid.to_string(),
            private_der,
            jwk,
        }
    }

    /// Shared key pair published by the mock provider
    pub fn primary() -> &'static TestKeys {
        &PRIMARY
    }

    /// Shared key pair that providers normally do not publish
    pub fn secondary() -> &'static TestKeys {
        &SECONDARY
    }

    pub fn jwk(&self) -> Jwk {
        self.jwk.clone()
    }

    pub fn key_set(&self) -> JwkSet {
        JwkSet {
            keys: vec![self.jwk()],
        }
    }

    /// Signs `claims` with RS256 under this key's id.
    pub fn sign(&self, claims: &Value) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.kid.clone());
        self.sign_with_header(header, claims)
    }

    pub fn sign_with_header(&self, header: Header, claims: &Value) -> String {
        encode(&header, claims, &EncodingKey::from_rsa_der(&self.private_der))
            .expect("Failed to sign token")
    }
}

/// Claims accepted by `config`, expiring `ttl_secs` from now (negative for the past).
pub fn token_claims(config: &AuthConfig, permissions: Option<&[&str]>, ttl_secs: i64) -> Value {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Clock before epoch")
        .as_secs() as i64;

    let mut claims = json!({
        "iss": config.issuer(),
        "aud": config.audience,
        "sub": "auth0|test-user",
        "iat": now - ttl_secs.abs().min(60),
        "exp": now + ttl_secs,
    });
    if let Some(permissions) = permissions {
        claims["permissions"] = json!(permissions);
    }
    claims
}

/// A wiremock server publishing a key set at the well-known JWKS path.
pub struct MockIdentityProvider {
    pub server: MockServer,
}

impl MockIdentityProvider {
    pub fn jwks_uri(&self) -> String {
        format!("{}/{}", self.server.uri(), JWKS_PATH)
    }

    /// Settings that verify tokens against this provider.
    pub fn auth_config(&self, audience: &str) -> AuthConfig {
        let domain = self.server.address().to_string();
        AuthConfig::new(domain, audience).with_jwks_uri(self.jwks_uri())
    }
}

/// Starts a provider serving `key_set`, expecting exactly `expected_fetches` requests.
pub async fn mock_identity_provider(
    key_set: &JwkSet,
    expected_fetches: u64,
) -> MockIdentityProvider {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/{JWKS_PATH}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(key_set))
        .expect(expected_fetches)
        .mount(&server)
        .await;
    MockIdentityProvider { server }
}
