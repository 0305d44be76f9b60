use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;

use super::KeySource;
use crate::error::JwksError;

/// A key set supplied in code, never refreshed.
#[derive(Clone, Debug)]
pub struct FixedJwks {
    key_set: Arc<JwkSet>,
}

impl FixedJwks {
    pub fn new(key_set: JwkSet) -> Self {
        Self {
            key_set: Arc::new(key_set),
        }
    }
}

#[async_trait]
impl KeySource for FixedJwks {
    async fn key_set(&self) -> Result<Arc<JwkSet>, JwksError> {
        Ok(Arc::clone(&self.key_set))
    }
}
