//! Change-watch bookkeeping for the planner.
//!
//! Every tracked identity holds exactly one registration with the host's
//! [`ChangeWatch`]. The per-identity lifecycle is:
//!
//! ```text
//!              arm                 notice
//! Unwatched ─────────▶ Watched ─────────────▶ Reconciling
//!     ▲                   ▲                        │
//!     │                   └──── finish_reconcile ──┤
//!     └──────────── drop_watch / teardown ─────────┘
//! ```
//!
//! Identities that are not registered are `Unwatched`; a resource found to
//! be gone is dropped and so returns there.

use std::{collections::HashMap, sync::Arc};

use crate::{
    host::{ChangeWatch, NoticeSender, WatchHandle},
    models::{ObjectId, ResourceRow},
};

/// What a watched identity stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchTarget {
    /// The object the planner is shown for
    Context,
    Resource,
    /// An entry, with the row it was placed on when armed
    Entry { row: ObjectId },
}

/// Lifecycle state of a registered identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Watched,
    Reconciling,
}

#[derive(Debug)]
struct Watch {
    handle: WatchHandle,
    target: WatchTarget,
    state: WatchState,
}

/// Registers and cancels watches on behalf of the controller.
pub struct SubscriptionManager<W: ChangeWatch + ?Sized> {
    watch: Arc<W>,
    sink: NoticeSender,
    watches: HashMap<ObjectId, Watch>,
}

impl<W: ChangeWatch + ?Sized> SubscriptionManager<W> {
    /// Creates a manager delivering notices to `sink`.
    pub fn new(watch: Arc<W>, sink: NoticeSender) -> Self {
        Self {
            watch,
            sink,
            watches: HashMap::new(),
        }
    }

    fn register(&mut self, identity: &ObjectId, target: WatchTarget) {
        if self.watches.contains_key(identity) {
            return;
        }
        let handle = self.watch.subscribe(identity, self.sink.clone());
        self.watches.insert(
            identity.clone(),
            Watch {
                handle,
                target,
                state: WatchState::Watched,
            },
        );
    }

    /// Watches the context, every row's resource and every entry placed on a
    /// row. An identity already registered keeps its first registration.
    pub fn arm(&mut self, context: Option<&ObjectId>, rows: &[ResourceRow]) {
        if let Some(context) = context {
            self.register(context, WatchTarget::Context);
        }
        for row in rows {
            self.register(&row.identity, WatchTarget::Resource);
        }
        for row in rows {
            for entry in row.entry_identities() {
                self.register(
                    entry,
                    WatchTarget::Entry {
                        row: row.identity.clone(),
                    },
                );
            }
        }
        log::debug!("arm: {} watch(es) active", self.watches.len());
    }

    /// Cancels every watch. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        for (_, watch) in self.watches.drain() {
            self.watch.unsubscribe(watch.handle);
        }
    }

    /// Tears down and arms again from scratch.
    pub fn rearm(&mut self, context: Option<&ObjectId>, rows: &[ResourceRow]) {
        self.teardown();
        self.arm(context, rows);
    }

    /// Brings entry watches in line with freshly reconciled rows.
    ///
    /// Entry watches pointing at one of `rows` are dropped unless the entry
    /// is still placed on one of them; entries newly placed on `rows` are
    /// registered. Watches of other rows are left alone.
    pub fn rearm_rows(&mut self, rows: &[ResourceRow]) {
        let mut placed: HashMap<&ObjectId, &ObjectId> = HashMap::new();
        for row in rows {
            for entry in row.entry_identities() {
                placed.insert(entry, &row.identity);
            }
        }

        let stale: Vec<ObjectId> = self
            .watches
            .iter()
            .filter_map(|(identity, watch)| match &watch.target {
                WatchTarget::Entry { row }
                    if rows.iter().any(|r| &r.identity == row)
                        && !placed.contains_key(identity) =>
                {
                    Some(identity.clone())
                }
                _ => None,
            })
            .collect();
        for identity in stale {
            self.drop_watch(&identity);
        }

        for (entry, row) in placed {
            match self.watches.get_mut(entry) {
                Some(watch) => {
                    if let WatchTarget::Entry { row: current } = &mut watch.target {
                        *current = row.clone();
                    }
                }
                None => self.register(entry, WatchTarget::Entry { row: row.clone() }),
            }
        }
    }

    pub fn target_of(&self, identity: &ObjectId) -> Option<&WatchTarget> {
        self.watches.get(identity).map(|w| &w.target)
    }

    pub fn state_of(&self, identity: &ObjectId) -> Option<WatchState> {
        self.watches.get(identity).map(|w| w.state)
    }

    /// Marks a notified identity as being reconciled.
    ///
    /// Returns `None` for identities that are no longer watched, which is
    /// how late and duplicate notices get ignored.
    pub fn begin_reconcile(&mut self, identity: &ObjectId) -> Option<WatchTarget> {
        let watch = self.watches.get_mut(identity)?;
        watch.state = WatchState::Reconciling;
        Some(watch.target.clone())
    }

    /// Returns a reconciled identity to `Watched`.
    pub fn finish_reconcile(&mut self, identity: &ObjectId) {
        if let Some(watch) = self.watches.get_mut(identity) {
            watch.state = WatchState::Watched;
        }
    }

    /// Cancels the watch of one identity, if any.
    pub fn drop_watch(&mut self, identity: &ObjectId) {
        if let Some(watch) = self.watches.remove(identity) {
            self.watch.unsubscribe(watch.handle);
        }
    }

    pub fn is_watched(&self, identity: &ObjectId) -> bool {
        self.watches.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.watches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }
}

impl<W: ChangeWatch + ?Sized> Drop for SubscriptionManager<W> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use tokio::sync::mpsc;

    use super::*;
    use crate::{calendar::DateKey, host::WatchRegistry};

    fn row_with(id: &str, entries: &[(&str, i8)]) -> ResourceRow {
        let mut row = ResourceRow::new(ObjectId::new(id), id);
        for (entry, day) in entries {
            row.set_cell(
                DateKey::encode(date(2024, 2, *day)),
                ObjectId::new(*entry),
                *entry,
            );
        }
        row
    }

    fn manager() -> (
        Arc<WatchRegistry>,
        SubscriptionManager<WatchRegistry>,
        mpsc::UnboundedReceiver<crate::host::ChangeNotice>,
    ) {
        let registry = Arc::new(WatchRegistry::new());
        let (tx, rx) = mpsc::unbounded_channel();
        (registry.clone(), SubscriptionManager::new(registry, tx), rx)
    }

    #[test]
    fn test_arm_watches_context_resources_and_entries() {
        let (registry, mut subs, _rx) = manager();
        let rows = vec![row_with("a", &[("e1", 1)]), row_with("b", &[])];

        subs.arm(Some(&ObjectId::new("ctx")), &rows);

        assert_eq!(subs.len(), 4);
        assert_eq!(registry.active(), 4);
        assert_eq!(
            subs.target_of(&ObjectId::new("e1")),
            Some(&WatchTarget::Entry {
                row: ObjectId::new("a")
            })
        );
        assert_eq!(
            subs.target_of(&ObjectId::new("ctx")),
            Some(&WatchTarget::Context)
        );
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let (registry, mut subs, _rx) = manager();
        subs.teardown();
        subs.arm(None, &[row_with("a", &[("e1", 1)])]);
        subs.teardown();
        subs.teardown();

        assert!(subs.is_empty());
        assert_eq!(registry.active(), 0);
    }

    #[test]
    fn test_reconcile_state_transitions() {
        let (_registry, mut subs, _rx) = manager();
        subs.arm(None, &[row_with("a", &[])]);
        let a = ObjectId::new("a");

        assert_eq!(subs.begin_reconcile(&a), Some(WatchTarget::Resource));
        assert_eq!(subs.state_of(&a), Some(WatchState::Reconciling));
        subs.finish_reconcile(&a);
        assert_eq!(subs.state_of(&a), Some(WatchState::Watched));

        subs.drop_watch(&a);
        assert!(subs.begin_reconcile(&a).is_none());
    }

    #[test]
    fn test_rearm_rows_follows_moved_entry() {
        let (registry, mut subs, _rx) = manager();
        subs.arm(
            None,
            &[row_with("a", &[("e1", 1), ("e2", 2)]), row_with("b", &[])],
        );

        // e1 moved to b, e2 deleted
        subs.rearm_rows(&[row_with("a", &[]), row_with("b", &[("e1", 1)])]);

        assert_eq!(
            subs.target_of(&ObjectId::new("e1")),
            Some(&WatchTarget::Entry {
                row: ObjectId::new("b")
            })
        );
        assert!(!subs.is_watched(&ObjectId::new("e2")));
        assert!(!registry.is_watched(&ObjectId::new("e2")));
        assert_eq!(registry.active(), 3);
    }

    #[test]
    fn test_drop_cancels_all_watches() {
        let (registry, mut subs, _rx) = manager();
        subs.arm(None, &[row_with("a", &[("e1", 1)])]);
        drop(subs);

        assert_eq!(registry.active(), 0);
    }
}
