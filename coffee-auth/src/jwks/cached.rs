use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use log::debug;
use moka::future::Cache as MokaCache;

use super::KeySource;
use super::remote::RemoteJwks;
use crate::error::JwksError;

const KEY_SET_ENTRY: &str = "jwk_set";

/// Remote key set kept in memory for a fixed time-to-live.
///
/// Concurrent misses share a single fetch. Failed fetches are not cached, so the
/// next verification retries. A `kid` missing from the cached set is not a
/// reason to refetch: the verifier fails closed until the entry expires.
#[derive(Clone)]
pub struct CachedJwks {
    remote: RemoteJwks,
    cache: MokaCache<&'static str, Arc<JwkSet>>,
}

impl CachedJwks {
    pub fn new(remote: RemoteJwks, time_to_live: Duration) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(1)
            .time_to_live(time_to_live)
            .build();
        Self { remote, cache }
    }
}

#[async_trait]
impl KeySource for CachedJwks {
    async fn key_set(&self) -> Result<Arc<JwkSet>, JwksError> {
        self.cache
            .try_get_with(KEY_SET_ENTRY, async {
                debug!("JWK set not cached, fetching from {}", self.remote.url());
                self.remote.fetch().await.map(Arc::new)
            })
            .await
            .map_err(JwksError::Shared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn remote_for(server: &MockServer) -> RemoteJwks {
        let url = Url::parse(&format!("{}/.well-known/jwks.json", server.uri())).unwrap();
        RemoteJwks::new(url, Duration::from_secs(5)).unwrap()
    }

    async fn mount_key_set(server: &MockServer, expected_calls: u64) {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "keys": [{"kty": "RSA", "kid": "key-1", "use": "sig", "n": "AQAB", "e": "AQAB"}]
            })))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_key_set_is_reused() {
        let server = MockServer::start().await;
        mount_key_set(&server, 1).await;

        let cached = CachedJwks::new(remote_for(&server), Duration::from_secs(60));
        for _ in 0..3 {
            let key_set = cached.key_set().await.unwrap();
            assert!(key_set.find("key-1").is_some());
        }
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_fetch() {
        let server = MockServer::start().await;
        mount_key_set(&server, 1).await;

        let cached = CachedJwks::new(remote_for(&server), Duration::from_secs(60));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cached = cached.clone();
                tokio::spawn(async move { cached.key_set().await.map(|set| set.keys.len()) })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 1);
        }
    }

    #[tokio::test]
    async fn test_key_set_expires() {
        let server = MockServer::start().await;
        mount_key_set(&server, 2).await;

        let cached = CachedJwks::new(remote_for(&server), Duration::from_secs(1));
        cached.key_set().await.unwrap();

        tokio::time::sleep(Duration::from_secs(2)).await;
        cached.key_set().await.unwrap();
    }

    #[tokio::test]
    async fn test_cache_hits_skip_the_fetch() {
        let server = MockServer::start().await;
        mount_key_set(&server, 1).await;

        let cached = CachedJwks::new(remote_for(&server), Duration::from_secs(60));
        let first = cached.key_set().await.unwrap();
        for _ in 0..5 {
            let again = cached.key_set().await.unwrap();
            assert!(Arc::ptr_eq(&first, &again));
        }
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        mount_key_set(&server, 1).await;

        let cached = CachedJwks::new(remote_for(&server), Duration::from_secs(60));
        assert!(matches!(
            cached.key_set().await.unwrap_err(),
            JwksError::Shared(_)
        ));
        assert!(cached.key_set().await.is_ok());
    }
}
