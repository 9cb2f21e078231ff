use thiserror::Error;

/// Errors raised while loading or validating a recipe catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Failed to read the catalog file
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog JSON is malformed or an entry is missing a field
    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// Catalog parsed but an entry breaks a catalog rule
    #[error("Invalid catalog: {0}")]
    Invalid(String),
}

/// Errors that can occur while running recipe suggestions
#[derive(Error, Debug)]
pub enum LensError {
    /// Catalog could not be loaded
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    Builder(String),

    /// The detection session has already stopped
    #[error("Detection session is closed")]
    SessionClosed,

    /// The detection session task panicked or was aborted
    #[error("Detection session failed: {0}")]
    SessionFailed(String),
}
