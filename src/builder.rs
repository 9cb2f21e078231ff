use std::sync::Arc;

use log::debug;

use crate::catalog::RecipeCatalog;
use crate::config::LensConfig;
use crate::detection::DetectionThreshold;
use crate::error::LensError;
use crate::matcher::{MatchMode, RecipeMatcher};
use crate::session::SessionHandle;

const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Builder for configuring recipe suggestions
#[derive(Debug, Default)]
pub struct RecipeLensBuilder {
    catalog: Option<Arc<RecipeCatalog>>,
    mode: MatchMode,
    threshold: Option<f32>,
    channel_capacity: Option<usize>,
}

impl RecipeLensBuilder {
    /// Use this catalog instead of the embedded one
    ///
    /// # Example
    /// ```
    /// use recipe_lens::{RecipeCatalog, RecipeLens};
    ///
    /// let catalog = RecipeCatalog::embedded().unwrap();
    /// let builder = RecipeLens::builder().catalog(catalog);
    /// ```
    pub fn catalog(mut self, catalog: impl Into<Arc<RecipeCatalog>>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// Set the matching policy
    ///
    /// # Example
    /// ```
    /// use recipe_lens::{MatchMode, RecipeLens};
    ///
    /// let builder = RecipeLens::builder().mode(MatchMode::All);
    /// ```
    pub fn mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the minimum detection score accepted by sessions
    pub fn threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Set how many detection events may queue before producers wait
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = Some(capacity);
        self
    }

    /// Take mode, threshold and capacity from loaded configuration.
    ///
    /// The catalog path is not read here; load it with
    /// [`RecipeCatalog::load`] and pass it to [`catalog`](Self::catalog).
    pub fn config(self, config: &LensConfig) -> Self {
        self.mode(config.match_mode)
            .threshold(config.detection.threshold)
            .channel_capacity(config.detection.channel_capacity)
    }

    /// Build the matcher
    ///
    /// # Errors
    /// Returns `LensError` if:
    /// - the threshold lies outside `[0.0, 1.0]`
    /// - the channel capacity is zero
    /// - no catalog was given and the embedded one fails to load
    pub fn build(self) -> Result<RecipeLens, LensError> {
        let threshold = match self.threshold {
            Some(value) => DetectionThreshold::new(value).ok_or_else(|| {
                LensError::Builder(format!(
                    "Detection threshold must be between 0.0 and 1.0, got {}",
                    value
                ))
            })?,
            None => DetectionThreshold::default(),
        };

        let channel_capacity = self.channel_capacity.unwrap_or(DEFAULT_CHANNEL_CAPACITY);
        if channel_capacity == 0 {
            return Err(LensError::Builder(
                "Channel capacity must be at least 1".to_string(),
            ));
        }

        let catalog = match self.catalog {
            Some(catalog) => catalog,
            None => Arc::new(RecipeCatalog::embedded()?),
        };
        debug!(
            "Recipe lens ready with {} recipes in '{}' mode",
            catalog.len(),
            self.mode
        );

        Ok(RecipeLens {
            matcher: RecipeMatcher::new(catalog),
            mode: self.mode,
            threshold,
            channel_capacity,
        })
    }

    /// Build and start a detection session on the current tokio runtime
    pub fn spawn(self) -> Result<SessionHandle, LensError> {
        Ok(self.build()?.start_session())
    }
}

/// Configured recipe matcher plus session defaults
#[derive(Debug, Clone)]
pub struct RecipeLens {
    matcher: RecipeMatcher,
    mode: MatchMode,
    threshold: DetectionThreshold,
    channel_capacity: usize,
}

impl RecipeLens {
    /// Creates a new builder
    ///
    /// # Example
    /// ```
    /// use recipe_lens::RecipeLens;
    ///
    /// let builder = RecipeLens::builder();
    /// ```
    pub fn builder() -> RecipeLensBuilder {
        RecipeLensBuilder::default()
    }

    pub fn matcher(&self) -> &RecipeMatcher {
        &self.matcher
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn threshold(&self) -> DetectionThreshold {
        self.threshold
    }

    /// Suggestions for `detected` using the configured mode
    pub fn suggest<I, S>(&self, detected: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.matcher.find_matches(detected, self.mode)
    }

    /// Start a detection session on the current tokio runtime
    pub fn start_session(&self) -> SessionHandle {
        SessionHandle::spawn(
            self.matcher.clone(),
            self.mode,
            self.threshold,
            self.channel_capacity,
        )
    }
}
