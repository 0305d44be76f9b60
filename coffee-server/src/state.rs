use crate::config::Settings;
use crate::store::DrinkStore;
use coffee_auth::{Authorizer, ConfigError};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub authorizer: Authorizer,
    pub drinks: Arc<DrinkStore>,
}

impl AppState {
    /// Validates the auth settings and prepares the drink store.
    pub async fn new(settings: Settings) -> Result<Self, ConfigError> {
        let authorizer = Authorizer::new(settings.auth.clone())?;
        Ok(Self::with_authorizer(settings, authorizer).await)
    }

    pub async fn with_authorizer(settings: Settings, authorizer: Authorizer) -> Self {
        let drinks = if settings.seed_drinks {
            DrinkStore::seeded().await
        } else {
            DrinkStore::new()
        };
        Self {
            settings: Arc::new(settings),
            authorizer,
            drinks: Arc::new(drinks),
        }
    }
}
