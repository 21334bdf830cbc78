//! In-memory [`PlannerHost`](super::PlannerHost) implementation.
//!
//! Objects live in a map guarded by a lock; handles are snapshots taken at
//! fetch time. Mutations do not notify on their own: call
//! [`MemoryHost::notify`] afterwards, the way a real host's commit would.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use async_trait::async_trait;
use jiff::civil::Date;

use super::{
    ActionContext, ActionOutput, ActionRunner, ChangeWatch, ContextFetch, EntryFetch, FieldAccess,
    FilterContext, Host, NoticeSender, ResourceFetch, WatchHandle, WatchRegistry,
};
use crate::{
    calendar::DateRange,
    config::ActionSpec,
    error::{PlannerError, Result},
    models::{FieldValue, ObjectId},
};

/// Entity name used by [`MemoryObject::resource`].
pub const RESOURCE_ENTITY: &str = "Resource";
/// Entity name used by [`MemoryObject::entry`].
pub const ENTRY_ENTITY: &str = "Entry";
/// Entity name used by [`MemoryObject::context`].
pub const CONTEXT_ENTITY: &str = "View";

/// A stored object and the handle type of [`MemoryHost`].
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryObject {
    pub id: ObjectId,
    pub entity: String,
    pub fields: BTreeMap<String, FieldValue>,
    pub references: BTreeMap<String, ObjectId>,
}

impl MemoryObject {
    pub fn new(id: impl Into<ObjectId>, entity: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entity: entity.into(),
            fields: BTreeMap::new(),
            references: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn with_reference(mut self, name: &str, target: impl Into<ObjectId>) -> Self {
        self.references.insert(name.to_string(), target.into());
        self
    }

    /// Resource titled by a `name` attribute.
    pub fn resource(id: &str, name: &str) -> Self {
        Self::new(id, RESOURCE_ENTITY).with_field("name", name)
    }

    /// Entry with `resource` reference and `date`/`title` attributes.
    pub fn entry(id: &str, owner: &str, date: Date, title: &str) -> Self {
        Self::new(id, ENTRY_ENTITY)
            .with_reference("resource", owner)
            .with_field("date", date)
            .with_field("title", title)
    }

    /// Context object carrying the viewed `year` and `month`.
    pub fn context(id: &str, year: i64, month: i64) -> Self {
        Self::new(id, CONTEXT_ENTITY)
            .with_field("year", year)
            .with_field("month", month)
    }
}

/// Host operations that can be made to fail on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchResources,
    FetchResourceById,
    FetchEntries,
    FetchEntryById,
    FetchContext,
    RunAction,
}

/// Canned behaviour of a named action.
#[derive(Debug, Clone, PartialEq)]
pub enum MemoryAction {
    /// Text output; `{id}` is replaced by the context object's identity
    Text(String),
    /// The listed objects, in order
    Objects(Vec<ObjectId>),
    Fail(String),
}

/// One recorded action invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCall {
    pub action: String,
    pub object: Option<ObjectId>,
    pub day: Option<Date>,
    /// Resources handed to an entry data source
    pub resources: Vec<ObjectId>,
    pub range: Option<DateRange>,
}

/// In-memory object store with change notification.
pub struct MemoryHost {
    objects: RwLock<Vec<MemoryObject>>,
    actions: RwLock<HashMap<String, MemoryAction>>,
    failing: Mutex<HashSet<Operation>>,
    calls: Mutex<Vec<ActionCall>>,
    filters: Mutex<Vec<FilterContext>>,
    owner_reference: String,
    date_attribute: String,
    watches: WatchRegistry,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    /// Creates an empty host using the default entry attribute names.
    pub fn new() -> Self {
        Self::with_entry_link("resource", "date")
    }

    /// Creates an empty host whose entries point at their resource through
    /// `owner_reference` and carry their day in `date_attribute`.
    pub fn with_entry_link(owner_reference: &str, date_attribute: &str) -> Self {
        Self {
            objects: RwLock::new(Vec::new()),
            actions: RwLock::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            filters: Mutex::new(Vec::new()),
            owner_reference: owner_reference.to_string(),
            date_attribute: date_attribute.to_string(),
            watches: WatchRegistry::new(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<MemoryObject>> {
        self.objects.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<MemoryObject>> {
        self.objects.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts or replaces an object, keeping its original position.
    pub fn insert(&self, object: MemoryObject) {
        let mut objects = self.write();
        match objects.iter_mut().find(|o| o.id == object.id) {
            Some(existing) => *existing = object,
            None => objects.push(object),
        }
    }

    /// Applies `change` to a stored object. Returns whether it existed.
    pub fn update(&self, id: &ObjectId, change: impl FnOnce(&mut MemoryObject)) -> bool {
        let mut objects = self.write();
        match objects.iter_mut().find(|o| &o.id == id) {
            Some(object) => {
                change(object);
                true
            }
            None => false,
        }
    }

    /// Removes an object. Returns whether it existed.
    pub fn remove(&self, id: &ObjectId) -> bool {
        let mut objects = self.write();
        let before = objects.len();
        objects.retain(|o| &o.id != id);
        objects.len() != before
    }

    /// Snapshot of a stored object.
    pub fn get(&self, id: &ObjectId) -> Option<MemoryObject> {
        self.read().iter().find(|o| &o.id == id).cloned()
    }

    /// Delivers a change notice to every watcher of `id`.
    pub fn notify(&self, id: &ObjectId) -> usize {
        self.watches.notify(id)
    }

    /// Number of live watches.
    pub fn active_watches(&self) -> usize {
        self.watches.active()
    }

    /// Whether anyone watches `id`.
    pub fn is_watched(&self, id: &ObjectId) -> bool {
        self.watches.is_watched(id)
    }

    /// Registers a named action.
    pub fn define_action(&self, name: &str, action: MemoryAction) {
        self.actions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), action);
    }

    /// Makes `operation` fail until reset.
    pub fn set_failing(&self, operation: Operation, failing: bool) {
        let mut set = lock(&self.failing);
        if failing {
            set.insert(operation);
        } else {
            set.remove(&operation);
        }
    }

    /// Actions run so far, oldest first.
    pub fn action_calls(&self) -> Vec<ActionCall> {
        lock(&self.calls).clone()
    }

    /// Resource queries issued so far, oldest first.
    pub fn resource_queries(&self) -> Vec<FilterContext> {
        lock(&self.filters).clone()
    }

    fn check(&self, operation: Operation) -> Result<()> {
        if lock(&self.failing).contains(&operation) {
            return Err(PlannerError::fetch(format!("{operation:?} is unavailable")).build());
        }
        Ok(())
    }

    fn find(&self, id: &ObjectId, entity: Option<&str>) -> Option<MemoryObject> {
        self.read()
            .iter()
            .find(|o| &o.id == id && entity.map_or(true, |e| o.entity == e))
            .cloned()
    }
}

impl Host for MemoryHost {
    type Handle = MemoryObject;
}

#[async_trait]
impl ResourceFetch for MemoryHost {
    async fn fetch_resources(&self, filter: &FilterContext) -> Result<Vec<MemoryObject>> {
        self.check(Operation::FetchResources)?;
        lock(&self.filters).push(filter.clone());
        Ok(self
            .read()
            .iter()
            .filter(|o| o.entity == filter.entity)
            .cloned()
            .collect())
    }

    async fn fetch_resource_by_id(&self, id: &ObjectId) -> Result<Option<MemoryObject>> {
        self.check(Operation::FetchResourceById)?;
        Ok(self.find(id, None))
    }
}

#[async_trait]
impl EntryFetch for MemoryHost {
    async fn fetch_entries(
        &self,
        resources: &[MemoryObject],
        range: DateRange,
    ) -> Result<Vec<MemoryObject>> {
        self.check(Operation::FetchEntries)?;
        let owners: HashSet<&ObjectId> = resources.iter().map(|r| &r.id).collect();

        Ok(self
            .read()
            .iter()
            .filter(|o| o.entity == ENTRY_ENTITY)
            .filter(|o| {
                o.references
                    .get(&self.owner_reference)
                    .is_some_and(|owner| owners.contains(owner))
            })
            .filter(|o| {
                // Entries without a usable date are returned and left to the
                // reconciler to drop.
                o.fields
                    .get(&self.date_attribute)
                    .and_then(FieldValue::as_date)
                    .map_or(true, |date| range.contains(date))
            })
            .cloned()
            .collect())
    }

    async fn fetch_entry_by_id(&self, id: &ObjectId) -> Result<Option<MemoryObject>> {
        self.check(Operation::FetchEntryById)?;
        Ok(self.find(id, Some(ENTRY_ENTITY)))
    }
}

#[async_trait]
impl ContextFetch for MemoryHost {
    async fn fetch_context(&self, id: &ObjectId) -> Result<Option<MemoryObject>> {
        self.check(Operation::FetchContext)?;
        Ok(self.find(id, None))
    }
}

impl FieldAccess for MemoryHost {
    fn identity(&self, handle: &MemoryObject) -> ObjectId {
        handle.id.clone()
    }

    fn field(&self, handle: &MemoryObject, field: &str) -> Option<FieldValue> {
        handle.fields.get(field).cloned()
    }

    fn reference(&self, handle: &MemoryObject, reference: &str) -> Option<ObjectId> {
        handle.references.get(reference).cloned()
    }
}

#[async_trait]
impl ActionRunner for MemoryHost {
    async fn run(
        &self,
        action: &ActionSpec,
        context: ActionContext<'_, MemoryObject>,
    ) -> Result<ActionOutput<MemoryObject>> {
        self.check(Operation::RunAction)?;

        let mut resources = Vec::new();
        let mut range = None;
        let (object, day) = match context {
            ActionContext::None => (None, None),
            ActionContext::Object(object) => (Some(object), None),
            ActionContext::Cell { resource, day } => (Some(resource), Some(day)),
            ActionContext::Entries {
                resources: handles,
                range: days,
            } => {
                resources = handles.iter().map(|o| o.id.clone()).collect();
                range = Some(days);
                (None, None)
            }
        };
        lock(&self.calls).push(ActionCall {
            action: action.name().to_string(),
            object: object.map(|o| o.id.clone()),
            day,
            resources,
            range,
        });

        let behaviour = self
            .actions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(action.name())
            .cloned();

        match behaviour {
            None => Ok(ActionOutput::Nothing),
            Some(MemoryAction::Text(template)) => {
                let id = object.map(|o| o.id.to_string()).unwrap_or_default();
                Ok(ActionOutput::Text(template.replace("{id}", &id)))
            }
            Some(MemoryAction::Objects(ids)) => Ok(ActionOutput::Objects(
                ids.iter().filter_map(|id| self.find(id, None)).collect(),
            )),
            Some(MemoryAction::Fail(reason)) => Err(PlannerError::action(action.name(), reason)),
        }
    }
}

impl ChangeWatch for MemoryHost {
    fn subscribe(&self, id: &ObjectId, sink: NoticeSender) -> WatchHandle {
        self.watches.subscribe(id, sink)
    }

    fn unsubscribe(&self, handle: WatchHandle) {
        self.watches.unsubscribe(handle);
    }
}
