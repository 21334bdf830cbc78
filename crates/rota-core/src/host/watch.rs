//! In-process change-watch registry.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
};

use super::{ChangeNotice, ChangeWatch, NoticeSender, WatchHandle};
use crate::models::ObjectId;

struct Registration {
    identity: ObjectId,
    sink: NoticeSender,
}

/// Keeps subscriptions and fans [`ChangeNotice`]s out to them.
///
/// Hosts embed a registry and call [`WatchRegistry::notify`] after they
/// change an object.
#[derive(Default)]
pub struct WatchRegistry {
    next_handle: AtomicU64,
    registrations: Mutex<HashMap<WatchHandle, Registration>>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn registrations(&self) -> MutexGuard<'_, HashMap<WatchHandle, Registration>> {
        self.registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Sends a notice to every subscriber of `identity`. Returns how many
    /// subscribers were reached.
    pub fn notify(&self, identity: &ObjectId) -> usize {
        let mut registrations = self.registrations();
        let mut delivered = 0;
        // Subscribers whose receiver is gone are pruned on the way.
        registrations.retain(|_, registration| {
            if &registration.identity != identity {
                return true;
            }
            let notice = ChangeNotice {
                identity: identity.clone(),
            };
            match registration.sink.send(notice) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => false,
            }
        });
        log::debug!("notify {identity}: {delivered} subscriber(s)");
        delivered
    }

    /// Number of live subscriptions.
    pub fn active(&self) -> usize {
        self.registrations().len()
    }

    /// Whether anyone watches `identity`.
    pub fn is_watched(&self, identity: &ObjectId) -> bool {
        self.registrations()
            .values()
            .any(|registration| &registration.identity == identity)
    }
}

impl ChangeWatch for WatchRegistry {
    fn subscribe(&self, id: &ObjectId, sink: NoticeSender) -> WatchHandle {
        let handle = WatchHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        self.registrations().insert(
            handle,
            Registration {
                identity: id.clone(),
                sink,
            },
        );
        handle
    }

    fn unsubscribe(&self, handle: WatchHandle) {
        self.registrations().remove(&handle);
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    #[test]
    fn test_notify_reaches_only_matching_subscribers() {
        let registry = WatchRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        registry.subscribe(&ObjectId::new("a"), tx.clone());
        registry.subscribe(&ObjectId::new("b"), tx);

        assert_eq!(registry.notify(&ObjectId::new("a")), 1);
        assert_eq!(rx.try_recv().unwrap().identity, ObjectId::new("a"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let registry = WatchRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let handle = registry.subscribe(&ObjectId::new("a"), tx);

        registry.unsubscribe(handle);
        registry.unsubscribe(handle);

        assert_eq!(registry.active(), 0);
        assert!(!registry.is_watched(&ObjectId::new("a")));
        assert_eq!(registry.notify(&ObjectId::new("a")), 0);
    }

    #[test]
    fn test_closed_receivers_are_pruned() {
        let registry = WatchRegistry::new();
        let (tx, rx) = mpsc::unbounded_channel();
        registry.subscribe(&ObjectId::new("a"), tx);
        drop(rx);

        assert_eq!(registry.notify(&ObjectId::new("a")), 0);
        assert_eq!(registry.active(), 0);
    }
}
