//! The planner controller and its building blocks.
//!
//! This module provides [`PlannerController`], which owns the day grid, the
//! resource rows and the active watches, and keeps them in step with the
//! host.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌──────────────────┐    ┌──────────────────┐    ┌──────────────────┐
//! │  loading,        │    │  reconcile,      │    │   PlannerHost    │
//! │  notices, events │───▶│  row_store,      │    │ (fetch, actions, │
//! │                  │    │  subscriptions   │    │  change watch)   │
//! └──────────────────┘    └──────────────────┘    └──────────────────┘
//!    Orchestration          Pure state             External collaborators
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: Factory for [`PlannerController`] instances with configuration
//! - [`row_store`]: Ordered resource rows with replace-by-identity updates
//! - [`reconcile`]: Merges entry records into rows
//! - [`subscriptions`]: Watch registration and per-identity lifecycle
//! - `loading`: Full load pipeline
//! - `notices`: Scoped reloads driven by change notices
//! - `events`: Click handling
//!
//! ## Lifecycle
//!
//! ```text
//! Idle ─▶ GridBuilt ─▶ ResourcesLoading ─▶ ResourcesLoaded ─▶ EntriesLoading ─▶ Ready
//!                             ▲                                                  │
//!                             └───────────────── context change ─────────────────┤
//!                                                                                │
//!                                         scoped reload (notice) ◀───────────────┘
//! ```
//!
//! A fatal validation message short-circuits from `GridBuilt` straight to
//! `Ready` without fetching anything.
//!
//! ## Concurrency
//!
//! The controller is driven from a single task. Fetches are suspension
//! points, but every mutation of rows and watches happens between them on
//! that task. Notices arrive on a channel and are drained with
//! [`PlannerController::process_pending`] or
//! [`PlannerController::process_next`]; they are never handled re-entrantly
//! from inside a host callback.
//!
//! A full load bumps a generation counter. A [`ScopedReload`] prepared before
//! the bump is discarded when applied, so a slow incremental update cannot
//! overwrite rows of a later full load.
//!
//! # Usage Examples
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use jiff::civil::date;
//! use rota_core::{
//!     host::{MemoryHost, MemoryObject},
//!     PlannerBuilder,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let host = Arc::new(MemoryHost::new());
//! host.insert(MemoryObject::resource("r1", "Alice"));
//! host.insert(MemoryObject::entry("e1", "r1", date(2024, 2, 10), "On call"));
//! let context = MemoryObject::context("view", 2024, 2);
//!
//! let mut planner = PlannerBuilder::new(host.clone())
//!     .with_config(Default::default())
//!     .build()?;
//! planner.load(Some(context)).await;
//!
//! assert_eq!(planner.rows().len(), 1);
//!
//! // Move the entry to another day and let the planner catch up.
//! host.update(&"e1".into(), |e| {
//!     e.fields.insert("date".into(), date(2024, 2, 11).into());
//! });
//! host.notify(&"e1".into());
//! planner.process_pending().await;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use jiff::{civil::Date, Zoned};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    config::PlannerConfig,
    host::{ChangeNotice, PlannerHost, TemplateRenderer},
    models::{DayDescriptor, ObjectId, ResourceRow},
    validation::MessageLog,
};

pub mod builder;
mod events;
mod loading;
mod notices;
pub mod reconcile;
pub mod row_store;
pub mod subscriptions;


pub use builder::PlannerBuilder;
pub use notices::ScopedReload;
pub use row_store::RowStore;
pub use subscriptions::{SubscriptionManager, WatchState, WatchTarget};

/// Where the controller is in its load pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerState {
    Idle,
    GridBuilt,
    ResourcesLoading,
    ResourcesLoaded,
    EntriesLoading,
    Ready,
}

/// Orchestrates grid building, fetching, reconciliation and watches.
pub struct PlannerController<H: PlannerHost> {
    pub(crate) host: Arc<H>,
    pub(crate) renderer: Arc<dyn TemplateRenderer>,
    pub(crate) config: PlannerConfig,
    pub(crate) today: Option<Date>,
    pub(crate) state: PlannerState,
    pub(crate) days: Vec<DayDescriptor>,
    pub(crate) rows: RowStore,
    pub(crate) messages: MessageLog,
    pub(crate) subscriptions: SubscriptionManager<H>,
    pub(crate) notices: mpsc::UnboundedReceiver<ChangeNotice>,
    pub(crate) context: Option<H::Handle>,
    pub(crate) generation: u64,
    pub(crate) is_loading: bool,
}

impl<H: PlannerHost> PlannerController<H> {
    pub(crate) fn new(
        host: Arc<H>,
        renderer: Arc<dyn TemplateRenderer>,
        config: PlannerConfig,
        today: Option<Date>,
        messages: MessageLog,
    ) -> Self {
        let (sink, notices) = mpsc::unbounded_channel();
        Self {
            subscriptions: SubscriptionManager::new(host.clone(), sink),
            host,
            renderer,
            config,
            today,
            state: PlannerState::Idle,
            days: Vec::new(),
            rows: RowStore::new(),
            messages,
            notices,
            context: None,
            generation: 0,
            is_loading: false,
        }
    }

    /// Evaluation date for `is_today`; the fixed date if one was given.
    pub fn today(&self) -> Date {
        self.today.unwrap_or_else(|| Zoned::now().date())
    }

    pub fn state(&self) -> PlannerState {
        self.state
    }

    pub fn days(&self) -> &[DayDescriptor] {
        &self.days
    }

    pub fn rows(&self) -> &[ResourceRow] {
        self.rows.rows()
    }

    pub fn row(&self, identity: &ObjectId) -> Option<&ResourceRow> {
        self.rows.get(identity)
    }

    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    /// Dismisses a warning. Fatal messages stay.
    pub fn dismiss_message(&mut self, id: Uuid) -> bool {
        self.messages.dismiss(id)
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Identity of the object the planner is shown for.
    pub fn context_identity(&self) -> Option<ObjectId> {
        self.context.as_ref().map(|c| self.host.identity(c))
    }

    /// Number of full loads started so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn subscriptions(&self) -> &SubscriptionManager<H> {
        &self.subscriptions
    }
}
