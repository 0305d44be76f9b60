use std::collections::BTreeMap;

use log::debug;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::{Drink, Ingredient};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("Drink {0} not found")]
    NotFound(u64),
    #[error("A drink titled '{0}' already exists")]
    DuplicateTitle(String),
    #[error("Invalid drink: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Default)]
struct Drinks {
    next_id: u64,
    by_id: BTreeMap<u64, Drink>,
}

impl Drinks {
    fn title_taken(&self, title: &str, except: Option<u64>) -> bool {
        self.by_id
            .values()
            .any(|drink| drink.title == title && Some(drink.id) != except)
    }
}

/// In-memory drink repository, ordered by id.
#[derive(Debug, Default)]
pub struct DrinkStore {
    inner: RwLock<Drinks>,
}

impl DrinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the house drink.
    pub async fn seeded() -> Self {
        let store = Self::new();
        let water = vec![Ingredient {
            name: "water".to_string(),
            color: "blue".to_string(),
            parts: 1,
        }];
        if let Err(err) = store.create("water".to_string(), water).await {
            log::error!("Failed to seed drinks: {}", err);
        }
        store
    }

    pub async fn list(&self) -> Vec<Drink> {
        self.inner.read().await.by_id.values().cloned().collect()
    }

    pub async fn get(&self, id: u64) -> Result<Drink, StoreError> {
        self.inner
            .read()
            .await
            .by_id
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    pub async fn create(
        &self,
        title: String,
        recipe: Vec<Ingredient>,
    ) -> Result<Drink, StoreError> {
        let title = validate_title(title)?;
        validate_recipe(&recipe)?;

        let mut drinks = self.inner.write().await;
        if drinks.title_taken(&title, None) {
            return Err(StoreError::DuplicateTitle(title));
        }
        drinks.next_id += 1;
        let drink = Drink {
            id: drinks.next_id,
            title,
            recipe,
        };
        drinks.by_id.insert(drink.id, drink.clone());
        debug!("Created drink {} '{}'", drink.id, drink.title);
        Ok(drink)
    }

    /// Replaces the given fields of drink `id`, leaving the others untouched.
    pub async fn update(
        &self,
        id: u64,
        title: Option<String>,
        recipe: Option<Vec<Ingredient>>,
    ) -> Result<Drink, StoreError> {
        let title = title.map(validate_title).transpose()?;
        if let Some(recipe) = &recipe {
            validate_recipe(recipe)?;
        }

        let mut drinks = self.inner.write().await;
        if !drinks.by_id.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        if let Some(title) = &title {
            if drinks.title_taken(title, Some(id)) {
                return Err(StoreError::DuplicateTitle(title.clone()));
            }
        }
        let drink = drinks.by_id.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if let Some(title) = title {
            drink.title = title;
        }
        if let Some(recipe) = recipe {
            drink.recipe = recipe;
        }
        debug!("Updated drink {}", id);
        Ok(drink.clone())
    }

    pub async fn delete(&self, id: u64) -> Result<Drink, StoreError> {
        let removed = self.inner.write().await.by_id.remove(&id);
        let drink = removed.ok_or(StoreError::NotFound(id))?;
        debug!("Deleted drink {} '{}'", drink.id, drink.title);
        Ok(drink)
    }
}

fn validate_title(title: String) -> Result<String, StoreError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(StoreError::Invalid("title must not be empty"));
    }
    Ok(title.to_string())
}

fn validate_recipe(recipe: &[Ingredient]) -> Result<(), StoreError> {
    if recipe.is_empty() {
        return Err(StoreError::Invalid("recipe must list at least one ingredient"));
    }
    if recipe.iter().any(|ingredient| ingredient.parts == 0) {
        return Err(StoreError::Invalid("ingredient parts must be positive"));
    }
    Ok(())
}
