use std::collections::HashSet;
use std::path::Path;

use log::{debug, info};

use crate::error::CatalogError;
use crate::model::Recipe;

const EMBEDDED_CATALOG: &str = include_str!("../data/recipes.json");

/// Immutable, ordered table of recipes.
///
/// A catalog is loaded once and never mutated afterwards; share it behind an
/// `Arc` when several tasks need it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeCatalog {
    recipes: Vec<Recipe>,
}

impl RecipeCatalog {
    /// Catalog compiled into the library
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json_str(EMBEDDED_CATALOG)
    }

    /// Parse a JSON array of recipes.
    ///
    /// Every field of every entry is required. Besides parse failures this
    /// rejects duplicate ids, empty recipe names and empty ingredient names.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let recipes: Vec<Recipe> = serde_json::from_str(json)?;
        Self::from_recipes(recipes)
    }

    /// Read and parse a catalog file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        debug!("Loading recipe catalog from {}", path.display());
        let json = tokio::fs::read_to_string(path).await?;
        let catalog = Self::from_json_str(&json)?;
        info!("Loaded {} recipes from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn from_recipes(recipes: Vec<Recipe>) -> Result<Self, CatalogError> {
        let mut seen_ids = HashSet::new();
        for recipe in &recipes {
            if !seen_ids.insert(recipe.id) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate recipe id {}",
                    recipe.id
                )));
            }
            if recipe.name.trim().is_empty() {
                return Err(CatalogError::Invalid(format!(
                    "recipe {} has an empty name",
                    recipe.id
                )));
            }
            if recipe.ingredient_names().any(|name| name.trim().is_empty()) {
                return Err(CatalogError::Invalid(format!(
                    "recipe '{}' has an ingredient without a name",
                    recipe.name
                )));
            }
        }

        Ok(RecipeCatalog { recipes })
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn get(&self, id: u32) -> Option<&Recipe> {
        self.recipes.iter().find(|recipe| recipe.id == id)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Every distinct ingredient name, in first-seen catalog order
    pub fn ingredient_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.recipes
            .iter()
            .flat_map(Recipe::ingredient_names)
            .filter(|name| seen.insert(*name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog_loads() {
        let catalog = RecipeCatalog::embedded().unwrap();
        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog.recipes()[0].name, "Chicken Fried Rice");
        assert_eq!(catalog.recipes()[7].name, "Stuffed Mushrooms");
    }

    #[test]
    fn test_get_by_id() {
        let catalog = RecipeCatalog::embedded().unwrap();
        assert_eq!(catalog.get(7).unwrap().name, "Tomato Egg Drop Soup");
        assert!(catalog.get(99).is_none());
    }

    #[test]
    fn test_ingredient_names_are_distinct() {
        let catalog = RecipeCatalog::embedded().unwrap();
        let names = catalog.ingredient_names();
        assert_eq!(names[0], "chicken");
        assert_eq!(names.iter().filter(|n| **n == "onion").count(), 1);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"[
            {"id": 1, "name": "A", "ingredients": [], "instructions": []},
            {"id": 1, "name": "B", "ingredients": [], "instructions": []}
        ]"#;
        let result = RecipeCatalog::from_json_str(json);
        assert!(matches!(result, Err(CatalogError::Invalid(_))));
    }

    #[test]
    fn test_missing_field_is_parse_error() {
        let json = r#"[{"id": 1, "name": "A", "ingredients": []}]"#;
        let result = RecipeCatalog::from_json_str(json);
        assert!(matches!(result, Err(CatalogError::Parse(_))));
    }

    #[test]
    fn test_blank_ingredient_name_rejected() {
        let json = r#"[{"id": 1, "name": "A",
            "ingredients": [{"name": " ", "quantity": "1"}],
            "instructions": []}]"#;
        let result = RecipeCatalog::from_json_str(json);
        assert!(matches!(result, Err(CatalogError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = RecipeCatalog::load("does/not/exist.json").await;
        assert!(matches!(result, Err(CatalogError::Io(_))));
    }
}
