//! Planner configuration.
//!
//! A [`PlannerConfig`] tells the controller how resources, entries and titles
//! are obtained from the host and which actions run on clicks. It is plain
//! serde data, normally loaded from
//! `$XDG_CONFIG_HOME/rota/planner.json`.
//!
//! ```json
//! {
//!   "resources": {
//!     "source": { "kind": "query", "entity": "Resource", "constraint": "[team = '[%CurrentObject%]']" },
//!     "title": { "kind": "attribute", "name": "name" }
//!   },
//!   "entries": { "owner_reference": "resource", "date_attribute": "date" }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    calendar::GridOptions,
    error::{PlannerError, Result},
};

/// Token in a resource constraint that is replaced by the context identity.
pub const CURRENT_OBJECT_TOKEN: &str = "[%CurrentObject%]";

/// Complete planner configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub resources: ResourceConfig,
    pub entries: EntryConfig,
    pub view: ViewConfig,
    pub events: EventSettings,
}

/// Where resource rows come from and how they are titled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    pub source: ResourceSource,
    pub title: TitleSource,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            source: ResourceSource::Query {
                entity: "Resource".to_string(),
                constraint: None,
            },
            title: TitleSource::Attribute {
                name: "name".to_string(),
            },
        }
    }
}

/// Resource data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceSource {
    /// Host query over an entity with an optional constraint
    Query {
        entity: String,
        #[serde(default)]
        constraint: Option<String>,
    },
    /// Host action returning the resource objects
    Action { action: ActionSpec },
}

/// Entry data source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntrySource {
    /// Host query for the entries of the loaded resources
    #[default]
    Query,
    /// Host action run with the loaded resources and the month's date range
    Action { action: ActionSpec },
}

/// Where entries come from and how they are interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryConfig {
    pub source: EntrySource,
    /// Reference from an entry to its owning resource
    pub owner_reference: String,
    /// Attribute holding the day an entry occurs on
    pub date_attribute: String,
    /// Cell content; entries show a placeholder when unset
    pub title: Option<TitleSource>,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self {
            source: EntrySource::Query,
            owner_reference: "resource".to_string(),
            date_attribute: "date".to_string(),
            title: Some(TitleSource::Attribute {
                name: "title".to_string(),
            }),
        }
    }
}

/// Source of display text for a resource or entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TitleSource {
    Attribute { name: String },
    Action { action: ActionSpec },
}

/// Where the viewed month is read from on the context object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub year_attribute: String,
    pub month_attribute: String,
    pub grid: GridOptions,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            year_attribute: "year".to_string(),
            month_attribute: "month".to_string(),
            grid: GridOptions::default(),
        }
    }
}

/// An externally executed piece of business logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionSpec {
    /// Runs on the server
    Server { name: String },
    /// Runs in the client
    Client { name: String },
    /// Opens a page with the context object
    OpenPage {
        page: String,
        #[serde(default)]
        open_as: PageLocation,
    },
}

impl ActionSpec {
    /// Name of the action or page.
    pub fn name(&self) -> &str {
        match self {
            ActionSpec::Server { name } | ActionSpec::Client { name } => name,
            ActionSpec::OpenPage { page, .. } => page,
        }
    }
}

/// Where a page opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageLocation {
    #[default]
    Content,
    Popup,
    Modal,
}

/// Single or double click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickKind {
    #[default]
    Single,
    Double,
}

/// Action bound to a click target.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickBinding {
    pub action: Option<ActionSpec>,
    pub trigger: ClickKind,
}

impl ClickBinding {
    /// Action to run for a click of the given kind, if any.
    pub fn action_for(&self, click: ClickKind) -> Option<&ActionSpec> {
        self.action.as_ref().filter(|_| self.trigger == click)
    }
}

/// Click handling for the three grid targets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSettings {
    pub resource: ClickBinding,
    pub entry: ClickBinding,
    /// Empty cells; page actions are not supported here
    pub empty: ClickBinding,
}

impl PlannerConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::FileSystem` if the file cannot be read and
    /// `PlannerError::Serialization` if it is not valid configuration JSON.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| PlannerError::FileSystem {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Returns the configuration file found under the XDG config directories,
    /// if any.
    pub fn default_path() -> Option<PathBuf> {
        xdg::BaseDirectories::with_prefix("rota").find_config_file("planner.json")
    }
}
