use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One component of a drink's recipe
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct Ingredient {
    /// Ingredient name, e.g. `milk`
    pub name: String,
    /// Display color used when drawing the drink
    pub color: String,
    /// Relative amount of this ingredient
    pub parts: u32,
}

/// Public view of an ingredient, without its name
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct IngredientShort {
    pub color: String,
    pub parts: u32,
}

impl From<&Ingredient> for IngredientShort {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            color: ingredient.color.clone(),
            parts: ingredient.parts,
        }
    }
}

/// A drink with its full recipe
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct Drink {
    pub id: u64,
    /// Unique drink title
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl Drink {
    /// The representation served to anonymous clients.
    pub fn short(&self) -> DrinkShort {
        DrinkShort {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.iter().map(IngredientShort::from).collect(),
        }
    }
}

/// A drink whose recipe only shows colors and proportions
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct DrinkShort {
    pub id: u64,
    pub title: String,
    pub recipe: Vec<IngredientShort>,
}

/// A recipe given either as a single ingredient or as a list
#[derive(Debug, Deserialize, ToSchema, Clone, PartialEq)]
#[serde(untagged)]
pub enum RecipeInput {
    One(Ingredient),
    Many(Vec<Ingredient>),
}

impl From<RecipeInput> for Vec<Ingredient> {
    fn from(recipe: RecipeInput) -> Self {
        match recipe {
            RecipeInput::One(ingredient) => vec![ingredient],
            RecipeInput::Many(ingredients) => ingredients,
        }
    }
}

/// Request body for creating a drink
#[derive(Debug, Deserialize, ToSchema, Clone, PartialEq)]
pub struct NewDrink {
    pub title: String,
    pub recipe: RecipeInput,
}

/// Request body for updating a drink; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, ToSchema, Clone, PartialEq)]
pub struct DrinkUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub recipe: Option<RecipeInput>,
}

/// Envelope returned by the drink listing and mutation endpoints
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct DrinksResponse<T> {
    pub success: bool,
    pub drinks: Vec<T>,
}

impl<T> DrinksResponse<T> {
    pub fn new(drinks: Vec<T>) -> Self {
        Self {
            success: true,
            drinks,
        }
    }
}

/// Envelope returned after deleting a drink
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct DeleteResponse {
    pub success: bool,
    /// Id of the removed drink
    pub delete: u64,
}
