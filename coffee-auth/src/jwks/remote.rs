use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use log::debug;
use reqwest::Client;
use url::Url;

use super::KeySource;
use crate::error::JwksError;

/// Fetches the key set from the identity provider's JWKS endpoint.
#[derive(Clone, Debug)]
pub struct RemoteJwks {
    client: Client,
    url: Url,
}

impl RemoteJwks {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub(crate) async fn fetch(&self) -> Result<JwkSet, JwksError> {
        debug!("Fetching JWK set from {}", self.url);
        let response = self.client.get(self.url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(JwksError::Status {
                status: response.status(),
            });
        }

        let body = response.bytes().await?;
        let key_set: JwkSet = serde_json::from_slice(&body)?;
        debug!("Fetched {} keys from {}", key_set.keys.len(), self.url);
        Ok(key_set)
    }
}

#[async_trait]
impl KeySource for RemoteJwks {
    async fn key_set(&self) -> Result<Arc<JwkSet>, JwksError> {
        self.fetch().await.map(Arc::new)
    }
}
