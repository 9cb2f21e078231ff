//! UniFFI bindings for recipe-lens
//!
//! This module provides FFI-compatible types and functions for use with iOS and Android.
//! Matching is synchronous, so unlike the session API no async runtime is needed here.

use std::fmt;

use crate::{CatalogError, Ingredient, LensError, MatchMode, Recipe, RecipeCatalog, RecipeMatcher};

// Re-export UniFFI macro
#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();

/// FFI-compatible ingredient
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiIngredient {
    pub name: String,
    pub quantity: String,
}

/// FFI-compatible recipe structure
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiRecipe {
    pub id: u32,
    pub name: String,
    pub ingredients: Vec<FfiIngredient>,
    pub instructions: Vec<String>,
}

impl From<&Ingredient> for FfiIngredient {
    fn from(ingredient: &Ingredient) -> Self {
        FfiIngredient {
            name: ingredient.name.clone(),
            quantity: ingredient.quantity.clone(),
        }
    }
}

impl From<&Recipe> for FfiRecipe {
    fn from(recipe: &Recipe) -> Self {
        FfiRecipe {
            id: recipe.id,
            name: recipe.name.clone(),
            ingredients: recipe.ingredients.iter().map(FfiIngredient::from).collect(),
            instructions: recipe.instructions.clone(),
        }
    }
}

/// FFI-compatible match mode
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum FfiMatchMode {
    All,
    Any,
    Complete,
}

impl From<FfiMatchMode> for MatchMode {
    fn from(mode: FfiMatchMode) -> Self {
        match mode {
            FfiMatchMode::All => MatchMode::All,
            FfiMatchMode::Any => MatchMode::Any,
            FfiMatchMode::Complete => MatchMode::Complete,
        }
    }
}

/// FFI-compatible error type
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Error))]
pub enum FfiLensError {
    /// Recipe catalog could not be loaded
    CatalogError { message: String },
    /// Any other failure
    Other { message: String },
}

impl fmt::Display for FfiLensError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FfiLensError::CatalogError { message } => write!(f, "Catalog error: {}", message),
            FfiLensError::Other { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for FfiLensError {}

impl From<CatalogError> for FfiLensError {
    fn from(err: CatalogError) -> Self {
        FfiLensError::CatalogError {
            message: err.to_string(),
        }
    }
}

impl From<LensError> for FfiLensError {
    fn from(err: LensError) -> Self {
        match err {
            LensError::Catalog(e) => e.into(),
            other => FfiLensError::Other {
                message: other.to_string(),
            },
        }
    }
}

fn catalog_from(json: Option<String>) -> Result<RecipeCatalog, FfiLensError> {
    let catalog = match json {
        Some(json) => RecipeCatalog::from_json_str(&json)?,
        None => RecipeCatalog::embedded()?,
    };
    Ok(catalog)
}

/// Find recipes for the detected ingredient labels
///
/// # Arguments
/// * `labels` - Detected ingredient labels
/// * `mode` - Matching policy
/// * `catalog_json` - Optional catalog JSON; the embedded catalog is used when absent
///
/// # Returns
/// Display text of each matching recipe, in catalog order
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn find_recipes(
    labels: Vec<String>,
    mode: FfiMatchMode,
    catalog_json: Option<String>,
) -> Result<Vec<String>, FfiLensError> {
    let matcher = RecipeMatcher::new(catalog_from(catalog_json)?.into());
    Ok(matcher.find_matches(&labels, mode.into()))
}

/// List every recipe in the catalog
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn list_recipes(catalog_json: Option<String>) -> Result<Vec<FfiRecipe>, FfiLensError> {
    let catalog = catalog_from(catalog_json)?;
    Ok(catalog.recipes().iter().map(FfiRecipe::from).collect())
}

/// Join suggestions into the text shown on the results screen
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn render_suggestions(suggestions: Vec<String>) -> String {
    crate::render_suggestions(&suggestions)
}

/// Get the library version
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_recipes_embedded() {
        let found = find_recipes(
            vec!["cheese".to_string()],
            FfiMatchMode::Any,
            None,
        )
        .unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].starts_with("Stuffed Mushrooms\n\n"));
    }

    #[test]
    fn test_find_recipes_bad_catalog() {
        let result = find_recipes(vec![], FfiMatchMode::Any, Some("{".to_string()));
        assert!(matches!(result, Err(FfiLensError::CatalogError { .. })));
    }

    #[test]
    fn test_list_recipes_conversion() {
        let recipes = list_recipes(None).unwrap();
        assert_eq!(recipes.len(), 8);
        assert_eq!(recipes[0].ingredients[0].name, "chicken");
        assert_eq!(recipes[0].ingredients[0].quantity, "200g");
    }

    #[test]
    fn test_get_version() {
        let version = get_version();
        assert!(!version.is_empty());
    }
}
