//! Planner host backed by the SQLite database.
//!
//! Identities are `resource-<id>`, `entry-<id>` and `view` for the single
//! context object. Every operation opens its own connection on a blocking
//! thread. Mutations notify watchers after they are committed.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use jiff::civil::Date;
use rota_core::{
    calendar::DateRange,
    config::ActionSpec,
    error::{PlannerError, Result},
    host::{
        ActionContext, ActionOutput, ActionRunner, ChangeWatch, ContextFetch, EntryFetch,
        FieldAccess, FilterContext, Host, NoticeSender, ResourceFetch, WatchHandle,
    },
    FieldValue, ObjectId, WatchRegistry,
};
use tokio::task;

use crate::db::{Database, StoredEntry, StoredResource, StoredView};

const RESOURCE_PREFIX: &str = "resource-";
const ENTRY_PREFIX: &str = "entry-";
/// Identity of the context object holding the viewed month.
pub const VIEW_ID: &str = "view";

/// Entity name the default configuration queries for resources.
const RESOURCE_ENTITY: &str = "Resource";

/// A row read from the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredObject {
    Resource(StoredResource),
    Entry(StoredEntry),
    View(StoredView),
}

pub fn resource_identity(id: i64) -> ObjectId {
    ObjectId::new(format!("{RESOURCE_PREFIX}{id}"))
}

pub fn entry_identity(id: i64) -> ObjectId {
    ObjectId::new(format!("{ENTRY_PREFIX}{id}"))
}

fn parse_identity(id: &ObjectId, prefix: &str) -> Option<i64> {
    id.as_str().strip_prefix(prefix)?.parse().ok()
}

/// SQLite planner host.
pub struct SqliteHost {
    db_path: PathBuf,
    watches: WatchRegistry,
}

impl SqliteHost {
    /// Opens the database at `path`, or at `$XDG_DATA_HOME/rota/rota.db`
    /// when no path is given, creating the schema if needed.
    pub async fn open(path: Option<PathBuf>) -> Result<Self> {
        let db_path = match path {
            Some(path) => path,
            None => default_database_path()?,
        };

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| PlannerError::FileSystem {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let host = Self {
            db_path,
            watches: WatchRegistry::new(),
        };
        host.with_db(|_| Ok(())).await?;
        log::debug!("Opened database at {}", host.db_path.display());
        Ok(host)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Runs `f` against a fresh connection on a blocking thread.
    async fn with_db<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db_path = self.db_path.clone();
        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            f(&mut db)
        })
        .await
        .map_err(|e| PlannerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }

    /// The stored view, or the month containing `today` when none is stored.
    pub async fn current_view(&self, today: Date) -> Result<StoredObject> {
        let stored = self.with_db(|db| db.get_view()).await?;
        Ok(StoredObject::View(stored.unwrap_or(StoredView {
            year: i64::from(today.year()),
            month: i64::from(today.month()),
        })))
    }

    /// Stores the viewed month and notifies the context watchers.
    pub async fn set_view(&self, year: i64, month: i64) -> Result<()> {
        if !(1..=12).contains(&month) {
            return Err(PlannerError::invalid_input("month")
                .with_reason(format!("{month} is not a month between 1 and 12")));
        }
        self.with_db(move |db| db.set_view(StoredView { year, month }))
            .await?;
        self.watches.notify(&ObjectId::new(VIEW_ID));
        Ok(())
    }

    pub async fn list_resources(&self) -> Result<Vec<StoredResource>> {
        self.with_db(|db| db.list_resources()).await
    }

    /// Creates a resource. New resources only show up after a full load.
    pub async fn add_resource(&self, name: String) -> Result<StoredResource> {
        self.with_db(move |db| db.insert_resource(&name)).await
    }

    /// Deletes a resource together with its entries.
    pub async fn remove_resource(&self, id: i64) -> Result<()> {
        if !self.with_db(move |db| db.delete_resource(id)).await? {
            return Err(PlannerError::NotFound {
                id: resource_identity(id).to_string(),
            });
        }
        self.watches.notify(&resource_identity(id));
        Ok(())
    }

    /// Creates an entry and notifies the owning resource's watchers.
    pub async fn add_entry(&self, resource_id: i64, date: Date, title: String) -> Result<StoredEntry> {
        let entry = self
            .with_db(move |db| {
                if db.get_resource(resource_id)?.is_none() {
                    return Err(PlannerError::NotFound {
                        id: resource_identity(resource_id).to_string(),
                    });
                }
                db.insert_entry(resource_id, date, &title)
            })
            .await?;
        self.watches.notify(&resource_identity(resource_id));
        Ok(entry)
    }

    /// Reassigns an entry to another resource.
    pub async fn move_entry(&self, id: i64, resource_id: i64) -> Result<()> {
        self.with_db(move |db| {
            if db.get_resource(resource_id)?.is_none() {
                return Err(PlannerError::NotFound {
                    id: resource_identity(resource_id).to_string(),
                });
            }
            if !db.move_entry(id, resource_id)? {
                return Err(PlannerError::NotFound {
                    id: entry_identity(id).to_string(),
                });
            }
            Ok(())
        })
        .await?;
        self.watches.notify(&entry_identity(id));
        Ok(())
    }

    /// Deletes an entry. The owning resource is notified as well, since a
    /// deleted entry's cell is only cleared when its row is refreshed.
    pub async fn remove_entry(&self, id: i64) -> Result<()> {
        let owner = self
            .with_db(move |db| {
                let Some(entry) = db.get_entry(id)? else {
                    return Err(PlannerError::NotFound {
                        id: entry_identity(id).to_string(),
                    });
                };
                db.delete_entry(id)?;
                Ok(entry.resource_id)
            })
            .await?;

        self.watches.notify(&entry_identity(id));
        if let Some(owner) = owner {
            self.watches.notify(&resource_identity(owner));
        }
        Ok(())
    }
}

fn default_database_path() -> Result<PathBuf> {
    xdg::BaseDirectories::with_prefix("rota")
        .place_data_file("rota.db")
        .map_err(|e| PlannerError::XdgDirectory(e.to_string()))
}

impl Host for SqliteHost {
    type Handle = StoredObject;
}

#[async_trait]
impl ResourceFetch for SqliteHost {
    async fn fetch_resources(&self, filter: &FilterContext) -> Result<Vec<StoredObject>> {
        if filter.entity != RESOURCE_ENTITY {
            return Err(PlannerError::fetch(format!("Unknown entity '{}'", filter.entity)).build());
        }
        if let Some(constraint) = &filter.constraint {
            return Err(PlannerError::fetch(format!(
                "Constraints are not supported by the SQLite host: {constraint}"
            ))
            .build());
        }

        let resources = self.with_db(|db| db.list_resources()).await?;
        Ok(resources.into_iter().map(StoredObject::Resource).collect())
    }

    async fn fetch_resource_by_id(&self, id: &ObjectId) -> Result<Option<StoredObject>> {
        let Some(id) = parse_identity(id, RESOURCE_PREFIX) else {
            return Ok(None);
        };
        let resource = self.with_db(move |db| db.get_resource(id)).await?;
        Ok(resource.map(StoredObject::Resource))
    }
}

#[async_trait]
impl EntryFetch for SqliteHost {
    async fn fetch_entries(
        &self,
        resources: &[StoredObject],
        range: DateRange,
    ) -> Result<Vec<StoredObject>> {
        let owners: Vec<i64> = resources
            .iter()
            .filter_map(|object| match object {
                StoredObject::Resource(resource) => Some(resource.id),
                _ => None,
            })
            .collect();

        let entries = self
            .with_db(move |db| db.entries_in_range(range.start, range.end))
            .await?;
        Ok(entries
            .into_iter()
            .filter(|entry| entry.resource_id.is_some_and(|id| owners.contains(&id)))
            .map(StoredObject::Entry)
            .collect())
    }

    async fn fetch_entry_by_id(&self, id: &ObjectId) -> Result<Option<StoredObject>> {
        let Some(id) = parse_identity(id, ENTRY_PREFIX) else {
            return Ok(None);
        };
        let entry = self.with_db(move |db| db.get_entry(id)).await?;
        Ok(entry.map(StoredObject::Entry))
    }
}

#[async_trait]
impl ContextFetch for SqliteHost {
    async fn fetch_context(&self, id: &ObjectId) -> Result<Option<StoredObject>> {
        if id.as_str() != VIEW_ID {
            return Ok(None);
        }
        let view = self.with_db(|db| db.get_view()).await?;
        Ok(view.map(StoredObject::View))
    }
}

impl FieldAccess for SqliteHost {
    fn identity(&self, handle: &StoredObject) -> ObjectId {
        match handle {
            StoredObject::Resource(resource) => resource_identity(resource.id),
            StoredObject::Entry(entry) => entry_identity(entry.id),
            StoredObject::View(_) => ObjectId::new(VIEW_ID),
        }
    }

    fn field(&self, handle: &StoredObject, field: &str) -> Option<FieldValue> {
        match (handle, field) {
            (StoredObject::Resource(resource), "name") => {
                Some(FieldValue::Text(resource.name.clone()))
            }
            (StoredObject::Entry(entry), "title") => Some(FieldValue::Text(entry.title.clone())),
            (StoredObject::Entry(entry), "date") => Some(match &entry.date {
                Some(date) => FieldValue::Text(date.clone()),
                None => FieldValue::Empty,
            }),
            (StoredObject::View(view), "year") => Some(FieldValue::Integer(view.year)),
            (StoredObject::View(view), "month") => Some(FieldValue::Integer(view.month)),
            _ => None,
        }
    }

    fn reference(&self, handle: &StoredObject, reference: &str) -> Option<ObjectId> {
        match (handle, reference) {
            (StoredObject::Entry(entry), "resource") => entry.resource_id.map(resource_identity),
            _ => None,
        }
    }
}

#[async_trait]
impl ActionRunner for SqliteHost {
    async fn run(
        &self,
        action: &ActionSpec,
        _context: ActionContext<'_, StoredObject>,
    ) -> Result<ActionOutput<StoredObject>> {
        Err(PlannerError::action(
            action.name(),
            "actions are not supported by the SQLite host",
        ))
    }
}

impl ChangeWatch for SqliteHost {
    fn subscribe(&self, id: &ObjectId, sink: NoticeSender) -> WatchHandle {
        self.watches.subscribe(id, sink)
    }

    fn unsubscribe(&self, handle: WatchHandle) {
        self.watches.unsubscribe(handle)
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use tempfile::TempDir;

    use super::*;

    async fn create_test_host() -> (TempDir, SqliteHost) {
        let temp_dir = TempDir::new().expect("Failed to create temporary directory");
        let host = SqliteHost::open(Some(temp_dir.path().join("nested/rota.db")))
            .await
            .expect("Failed to open host");
        (temp_dir, host)
    }

    #[tokio::test]
    async fn test_open_creates_parent_directories() {
        let (temp_dir, host) = create_test_host().await;
        assert!(host.db_path().exists());
        assert!(temp_dir.path().join("nested").is_dir());
    }

    #[tokio::test]
    async fn test_fields_and_references() {
        let (_temp_dir, host) = create_test_host().await;
        let alice = host
            .add_resource("Alice".to_string())
            .await
            .expect("Failed to add resource");
        let entry = host
            .add_entry(alice.id, date(2024, 2, 10), "On call".to_string())
            .await
            .expect("Failed to add entry");

        let handle = host
            .fetch_entry_by_id(&entry_identity(entry.id))
            .await
            .expect("Failed to fetch entry")
            .expect("Entry should exist");
        assert_eq!(host.identity(&handle), entry_identity(entry.id));
        assert_eq!(
            host.field(&handle, "date").and_then(|v| v.as_date()),
            Some(date(2024, 2, 10))
        );
        assert_eq!(
            host.reference(&handle, "resource"),
            Some(resource_identity(alice.id))
        );
        assert_eq!(host.field(&handle, "unknown"), None);
    }

    #[tokio::test]
    async fn test_fetch_entries_limits_to_owners() {
        let (_temp_dir, host) = create_test_host().await;
        let alice = host.add_resource("Alice".to_string()).await.unwrap();
        let bob = host.add_resource("Bob".to_string()).await.unwrap();
        host.add_entry(alice.id, date(2024, 2, 10), "A".to_string())
            .await
            .unwrap();
        host.add_entry(bob.id, date(2024, 2, 11), "B".to_string())
            .await
            .unwrap();

        let range = DateRange {
            start: date(2024, 2, 1),
            end: date(2024, 2, 29),
        };
        let entries = host
            .fetch_entries(&[StoredObject::Resource(alice.clone())], range)
            .await
            .expect("Failed to fetch entries");

        assert_eq!(entries.len(), 1);
        assert_eq!(
            host.reference(&entries[0], "resource"),
            Some(resource_identity(alice.id))
        );
    }

    #[tokio::test]
    async fn test_unknown_identities_are_not_found() {
        let (_temp_dir, host) = create_test_host().await;

        assert!(host
            .fetch_resource_by_id(&ObjectId::new("entry-1"))
            .await
            .unwrap()
            .is_none());
        assert!(host
            .fetch_context(&ObjectId::new("elsewhere"))
            .await
            .unwrap()
            .is_none());
        assert!(host.remove_entry(42).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_view_defaults_to_today() {
        let (_temp_dir, host) = create_test_host().await;

        let view = host
            .current_view(date(2024, 2, 14))
            .await
            .expect("Failed to read view");
        assert_eq!(view, StoredObject::View(StoredView { year: 2024, month: 2 }));

        host.set_view(2025, 7).await.expect("Failed to set view");
        let view = host.current_view(date(2024, 2, 14)).await.unwrap();
        assert_eq!(host.field(&view, "month"), Some(FieldValue::Integer(7)));

        assert!(host.set_view(2025, 13).await.is_err());
    }

    #[tokio::test]
    async fn test_constraints_are_rejected() {
        let (_temp_dir, host) = create_test_host().await;
        let filter = FilterContext {
            entity: "Resource".to_string(),
            constraint: Some("[team = 'view']".to_string()),
            context: Some(ObjectId::new(VIEW_ID)),
        };
        assert!(host.fetch_resources(&filter).await.is_err());
    }
}
