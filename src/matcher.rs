use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::catalog::RecipeCatalog;
use crate::model::Recipe;

/// Shown when no recipe matches the detected ingredients
pub const NO_SUGGESTIONS_PLACEHOLDER: &str = "No recipes found for the detected ingredients.";

/// Policy deciding whether a recipe matches the detected labels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Every detected label is one of the recipe's ingredients
    All,
    /// At least one detected label is one of the recipe's ingredients
    #[default]
    Any,
    /// Every ingredient of the recipe has been detected
    Complete,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::All => "all",
            MatchMode::Any => "any",
            MatchMode::Complete => "complete",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(MatchMode::All),
            "any" => Ok(MatchMode::Any),
            "complete" => Ok(MatchMode::Complete),
            other => Err(format!("Unknown match mode: {}", other)),
        }
    }
}

/// Filters a catalog by the ingredient labels currently detected.
///
/// Matching is a pure query over the shared catalog, so a matcher can be
/// cloned freely and used from any thread.
#[derive(Debug, Clone)]
pub struct RecipeMatcher {
    catalog: Arc<RecipeCatalog>,
}

impl RecipeMatcher {
    pub fn new(catalog: Arc<RecipeCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &RecipeCatalog {
        &self.catalog
    }

    /// Recipes matching `detected` under `mode`, in catalog order.
    ///
    /// Labels are compared case-sensitively against ingredient names. With
    /// `MatchMode::All` an empty `detected` matches every recipe.
    pub fn matching_recipes<I, S>(&self, detected: I, mode: MatchMode) -> Vec<&Recipe>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let detected: Vec<S> = detected.into_iter().collect();
        let detected: HashSet<&str> = detected.iter().map(|label| label.as_ref()).collect();

        if detected.is_empty() && mode == MatchMode::All {
            debug!("No ingredients detected; every recipe matches in 'all' mode");
        }

        self.catalog
            .recipes()
            .iter()
            .filter(|recipe| {
                let ingredients: HashSet<&str> = recipe.ingredient_names().collect();
                match mode {
                    MatchMode::All => detected.iter().all(|label| ingredients.contains(label)),
                    MatchMode::Any => detected.iter().any(|label| ingredients.contains(label)),
                    MatchMode::Complete => {
                        !detected.is_empty()
                            && ingredients.iter().all(|name| detected.contains(name))
                    }
                }
            })
            .collect()
    }

    /// Display text of every matching recipe, in catalog order
    pub fn find_matches<I, S>(&self, detected: I, mode: MatchMode) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let matches: Vec<String> = self
            .matching_recipes(detected, mode)
            .into_iter()
            .map(Recipe::display_text)
            .collect();
        debug!("Found {} recipes in '{}' mode", matches.len(), mode);
        matches
    }
}

/// Join suggestions for display, or fall back to the placeholder text
pub fn render_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        NO_SUGGESTIONS_PLACEHOLDER.to_string()
    } else {
        suggestions.join("\n\n\n")
    }
}
