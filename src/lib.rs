pub mod builder;
pub mod catalog;
pub mod config;
pub mod detection;
pub mod error;
pub mod matcher;
pub mod model;
pub mod session;
pub mod uniffi_bindings;

pub use builder::{RecipeLens, RecipeLensBuilder};
pub use catalog::RecipeCatalog;
pub use config::{load_config, DetectionConfig, LensConfig};
pub use detection::{
    DetectedLabelSet, DetectionEvent, DetectionSource, DetectionThreshold, ReplaySource,
};
pub use error::{CatalogError, LensError};
pub use matcher::{render_suggestions, MatchMode, RecipeMatcher, NO_SUGGESTIONS_PLACEHOLDER};
pub use model::{Ingredient, Recipe};
pub use session::{SessionCommand, SessionHandle, SessionSnapshot};

use log::debug;

/// Suggestions for `detected` from the embedded catalog
///
/// Convenience wrapper for one-off queries; keep a [`RecipeMatcher`] around
/// when matching repeatedly.
pub fn suggest_recipes<I, S>(detected: I, mode: MatchMode) -> Result<Vec<String>, LensError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let lens = RecipeLens::builder().mode(mode).build()?;
    let suggestions = lens.suggest(detected);
    debug!("{:#?}", suggestions);
    Ok(suggestions)
}

/// Build a [`RecipeLens`] from configuration, loading the configured catalog
/// file when one is set
pub async fn lens_from_config(config: &LensConfig) -> Result<RecipeLens, LensError> {
    let mut builder = RecipeLens::builder().config(config);
    if let Some(path) = &config.catalog_path {
        builder = builder.catalog(RecipeCatalog::load(path).await?);
    }
    builder.build()
}
