//! Builder for creating and configuring PlannerController instances.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use jiff::civil::Date;

use super::PlannerController;
use crate::{
    config::PlannerConfig,
    error::Result,
    host::{PlannerHost, SimpleTemplate, TemplateRenderer},
    validation::{validate_config, MessageLog},
};

/// Builder for creating and configuring [`PlannerController`] instances.
pub struct PlannerBuilder<H: PlannerHost> {
    host: Arc<H>,
    config: Option<PlannerConfig>,
    config_path: Option<PathBuf>,
    renderer: Option<Arc<dyn TemplateRenderer>>,
    today: Option<Date>,
}

impl<H: PlannerHost> PlannerBuilder<H> {
    /// Creates a new builder for the given host with default settings.
    pub fn new(host: Arc<H>) -> Self {
        Self {
            host,
            config: None,
            config_path: None,
            renderer: None,
            today: None,
        }
    }

    /// Uses the given configuration as is. Takes precedence over any path.
    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets a custom configuration file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_CONFIG_HOME/rota/planner.json` when that file exists, otherwise
    /// the built-in defaults.
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.config_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Sets the renderer for titles. Defaults to [`SimpleTemplate`].
    pub fn with_renderer(mut self, renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Fixes the evaluation date used for `is_today`.
    pub fn with_today(mut self, today: Date) -> Self {
        self.today = Some(today);
        self
    }

    /// Builds the configured controller.
    ///
    /// Configuration problems do not fail the build; they are recorded as
    /// fatal messages and stop the controller from fetching.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::FileSystem` if a configuration file cannot be read
    /// Returns `PlannerError::Serialization` if it is not valid configuration
    pub fn build(self) -> Result<PlannerController<H>> {
        let config = match (self.config, self.config_path) {
            (Some(config), _) => config,
            (None, Some(path)) => PlannerConfig::from_path(path)?,
            (None, None) => match PlannerConfig::default_path() {
                Some(path) => {
                    log::info!("Loading planner configuration from {}", path.display());
                    PlannerConfig::from_path(path)?
                }
                None => PlannerConfig::default(),
            },
        };

        let messages = MessageLog::new(validate_config(&config));
        for message in messages.iter() {
            log::error!("{}", message.text);
        }

        let renderer = self.renderer.unwrap_or_else(|| Arc::new(SimpleTemplate));

        Ok(PlannerController::new(
            self.host,
            renderer,
            config,
            self.today,
            messages,
        ))
    }
}
