//! Collaborator contracts implemented by the platform integration layer.
//!
//! The planner never touches host objects directly. It sees opaque handles
//! and reaches their identity, attributes and references only through
//! [`FieldAccess`]. Fetching, actions and change notification are likewise
//! delegated:
//!
//! ```text
//! ┌──────────────────┐   fetch / run    ┌──────────────────┐
//! │ PlannerController│─────────────────▶│   PlannerHost    │
//! │                  │◀─────────────────│ (SQLite, memory) │
//! └──────────────────┘   ChangeNotice   └──────────────────┘
//! ```
//!
//! Every async method is a suspension point; the controller wraps each
//! result in its own failure handling and never lets an error escape a
//! load or reload.
//!
//! Two implementations ship with the crate: [`memory::MemoryHost`] for tests
//! and embedding, and the reusable [`watch::WatchRegistry`] for the
//! [`ChangeWatch`] half of a host.

use async_trait::async_trait;
use jiff::civil::Date;
use tokio::sync::mpsc;

use crate::{
    calendar::DateRange,
    config::ActionSpec,
    error::{PlannerError, Result},
    models::{FieldValue, ObjectId},
};

pub mod memory;
pub mod template;
pub mod watch;

pub use memory::{MemoryHost, MemoryObject};
pub use template::SimpleTemplate;
pub use watch::WatchRegistry;

/// Base trait fixing the host's opaque object handle.
pub trait Host: Send + Sync + 'static {
    /// Opaque reference to one host object
    type Handle: Clone + Send + Sync + 'static;
}

/// Query handed to [`ResourceFetch::fetch_resources`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterContext {
    /// Entity to query
    pub entity: String,
    /// Constraint with the context token already substituted
    pub constraint: Option<String>,
    /// Identity of the context object the planner is shown for
    pub context: Option<ObjectId>,
}

#[async_trait]
pub trait ResourceFetch: Host {
    async fn fetch_resources(&self, filter: &FilterContext) -> Result<Vec<Self::Handle>>;

    /// Returns `Ok(None)` when the resource no longer exists.
    async fn fetch_resource_by_id(&self, id: &ObjectId) -> Result<Option<Self::Handle>>;
}

#[async_trait]
pub trait EntryFetch: Host {
    /// Entries owned by any of `resources` within `range`.
    async fn fetch_entries(
        &self,
        resources: &[Self::Handle],
        range: DateRange,
    ) -> Result<Vec<Self::Handle>>;

    /// Returns `Ok(None)` when the entry no longer exists.
    async fn fetch_entry_by_id(&self, id: &ObjectId) -> Result<Option<Self::Handle>>;
}

/// Re-reads the context object after it changed.
#[async_trait]
pub trait ContextFetch: Host {
    async fn fetch_context(&self, id: &ObjectId) -> Result<Option<Self::Handle>>;
}

/// Capability-scoped accessors on handles.
pub trait FieldAccess: Host {
    fn identity(&self, handle: &Self::Handle) -> ObjectId;

    /// Scalar attribute value, `None` if the attribute is unknown.
    fn field(&self, handle: &Self::Handle, field: &str) -> Option<FieldValue>;

    /// Identity of the referenced object, `None` if unset.
    fn reference(&self, handle: &Self::Handle, reference: &str) -> Option<ObjectId>;
}

/// Object an action runs against.
#[derive(Debug)]
pub enum ActionContext<'a, H> {
    None,
    Object(&'a H),
    /// An empty cell: the row's resource and the clicked day
    Cell { resource: &'a H, day: Date },
    /// Entry data source: the loaded resources and the days to cover
    Entries { resources: &'a [H], range: DateRange },
}

/// What an action produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutput<H> {
    Nothing,
    Text(String),
    Objects(Vec<H>),
}

impl<H> ActionOutput<H> {
    /// Objects returned by a data source action.
    pub fn into_objects(self, action: &ActionSpec) -> Result<Vec<H>> {
        match self {
            ActionOutput::Objects(objects) => Ok(objects),
            ActionOutput::Nothing => Ok(Vec::new()),
            ActionOutput::Text(_) => Err(PlannerError::action(
                action.name(),
                "expected a list of objects, got text",
            )),
        }
    }

    /// Text returned by a title action.
    pub fn into_text(self, action: &ActionSpec) -> Result<String> {
        match self {
            ActionOutput::Text(text) => Ok(text),
            ActionOutput::Nothing => Ok(String::new()),
            ActionOutput::Objects(_) => Err(PlannerError::action(
                action.name(),
                "expected text, got a list of objects",
            )),
        }
    }
}

/// Runs externally configured business logic. No retries are attempted.
#[async_trait]
pub trait ActionRunner: Host {
    async fn run(
        &self,
        action: &ActionSpec,
        context: ActionContext<'_, Self::Handle>,
    ) -> Result<ActionOutput<Self::Handle>>;
}

/// Notification that a watched object changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChangeNotice {
    pub identity: ObjectId,
}

/// Channel on which a host delivers [`ChangeNotice`]s.
pub type NoticeSender = mpsc::UnboundedSender<ChangeNotice>;

/// Token returned by [`ChangeWatch::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchHandle(pub u64);

/// Change-notification transport.
///
/// Delivery is at-least-once; the planner tolerates duplicate and late
/// notices.
pub trait ChangeWatch: Send + Sync {
    fn subscribe(&self, id: &ObjectId, sink: NoticeSender) -> WatchHandle;

    /// Unknown or already cancelled handles are ignored.
    fn unsubscribe(&self, handle: WatchHandle);
}

/// Turns raw title text into display content.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: &str, data: &serde_json::Value) -> String;
}

/// Everything the planner needs from its host.
pub trait PlannerHost:
    ResourceFetch + EntryFetch + ContextFetch + FieldAccess + ActionRunner + ChangeWatch
{
}

impl<T> PlannerHost for T where
    T: ResourceFetch + EntryFetch + ContextFetch + FieldAccess + ActionRunner + ChangeWatch
{
}
